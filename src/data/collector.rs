use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::error::PipelineError;

/// A candidate input file whose name parsed as `<subject>_<index>.<ext>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleFile {
    pub path: PathBuf,
    pub subject: String,
    pub center_index: i64,
}

/// List the sample files of `dir`, sorted by file name.
///
/// Only regular files ending in `.{extension}` are considered. Names that do
/// not split into a subject and an integer index are skipped silently.
pub fn collect_sample_files(dir: &Path, extension: &str) -> Result<Vec<SampleFile>> {
    if !dir.is_dir() {
        return Err(PipelineError::MissingInputDir(dir.to_path_buf()).into());
    }

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let entry = entry.with_context(|| format!("listing {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => log::debug!("skipping non UTF-8 file name {raw:?}"),
        }
    }
    names.sort();

    let files = names
        .into_iter()
        .filter_map(|name| {
            let parsed = parse_file_name(&name, extension);
            if parsed.is_none() && name.ends_with(&format!(".{extension}")) {
                log::debug!("skipping {name}: not <subject>_<index>.{extension}");
            }
            let (subject, center_index) = parsed?;
            Some(SampleFile {
                path: dir.join(&name),
                subject,
                center_index,
            })
        })
        .collect();
    Ok(files)
}

/// Split `ICARE_0042_17.json` into `("ICARE_0042", 17)`.
///
/// The index is whatever follows the last underscore of the base name.
pub fn parse_file_name(file_name: &str, extension: &str) -> Option<(String, i64)> {
    let base = file_name.strip_suffix(extension)?.strip_suffix('.')?;
    let (subject, index) = base.rsplit_once('_')?;
    let index = index.parse::<i64>().ok()?;
    Some((subject.to_string(), index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subject_and_index() {
        assert_eq!(
            parse_file_name("SUBJ01_7.json", "json"),
            Some(("SUBJ01".to_string(), 7))
        );
        assert_eq!(
            parse_file_name("ICARE_0042_117.json", "json"),
            Some(("ICARE_0042".to_string(), 117))
        );
    }

    #[test]
    fn rejects_malformed_names() {
        assert_eq!(parse_file_name("malformed.json", "json"), None);
        assert_eq!(parse_file_name("SUBJ01_x7.json", "json"), None);
        assert_eq!(parse_file_name("SUBJ01_7.parquet", "json"), None);
        assert_eq!(parse_file_name("SUBJ01_7json", "json"), None);
    }

    #[test]
    fn missing_directory_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let err = collect_sample_files(&tmp.path().join("nope"), "json").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::MissingInputDir(_))
        ));
    }

    #[test]
    fn collects_sorted_well_formed_files() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["B_2.json", "A_10.json", "malformed.json", "A_3.txt", "A_1.json"] {
            std::fs::write(tmp.path().join(name), "{}").unwrap();
        }
        std::fs::create_dir(tmp.path().join("D_1.json")).unwrap();

        let files = collect_sample_files(tmp.path(), "json").unwrap();
        let got: Vec<(&str, i64)> = files
            .iter()
            .map(|f| (f.subject.as_str(), f.center_index))
            .collect();
        // Lexicographic file-name order, not numeric.
        assert_eq!(got, vec![("A", 1), ("A", 10), ("B", 2)]);
        assert_eq!(files[0].path, tmp.path().join("A_1.json"));
    }
}
