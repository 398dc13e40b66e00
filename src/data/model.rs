use std::fmt;

use ndarray::Array2;

use crate::error::PipelineError;

// ---------------------------------------------------------------------------
// ClassLabel – the closed set of predicted classes
// ---------------------------------------------------------------------------

/// Predicted class of a CP-center.
///
/// The declaration order is index-significant: position `i` in a score
/// vector belongs to `ClassLabel::ALL[i]`. Reordering the variants
/// invalidates every previously computed labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClassLabel {
    Seizure,
    Lpd,
    Gpd,
    Lrda,
    Grda,
    Other,
}

impl ClassLabel {
    pub const ALL: [ClassLabel; 6] = [
        ClassLabel::Seizure,
        ClassLabel::Lpd,
        ClassLabel::Gpd,
        ClassLabel::Lrda,
        ClassLabel::Grda,
        ClassLabel::Other,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ClassLabel::Seizure => "Seizure",
            ClassLabel::Lpd => "LPD",
            ClassLabel::Gpd => "GPD",
            ClassLabel::Lrda => "LRDA",
            ClassLabel::Grda => "GRDA",
            ClassLabel::Other => "Other",
        }
    }

    /// Position of this class in a score vector.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Label a sample from its score vector.
    ///
    /// Scores beyond the number of known classes are dropped before the
    /// argmax. Ties go to the lowest index; a NaN score counts as the
    /// maximum, so the first NaN wins. Returns `None` for an empty vector.
    pub fn from_scores(scores: &[f64]) -> Option<Self> {
        let scores = &scores[..scores.len().min(Self::ALL.len())];
        let mut best: Option<(usize, f64)> = None;
        for (i, &s) in scores.iter().enumerate() {
            if s.is_nan() {
                best = Some((i, s));
                break;
            }
            match best {
                Some((_, b)) if s <= b => {}
                _ => best = Some((i, s)),
            }
        }
        best.and_then(|(i, _)| Self::from_index(i))
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the sample table
// ---------------------------------------------------------------------------

/// One parsed CP-center.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub subject: String,
    pub center_index: i64,
    pub label: ClassLabel,
    /// Feature columns `f0..f{n-1}`, kept as read (non-finite values included).
    pub features: Vec<f64>,
}

impl Record {
    /// Column name of feature `index`.
    pub fn feature_name(index: usize) -> String {
        format!("f{index}")
    }
}

// ---------------------------------------------------------------------------
// SampleTable – all records of one run
// ---------------------------------------------------------------------------

/// All loaded records, one row per input file, in collection order.
#[derive(Debug, Clone, Default)]
pub struct SampleTable {
    pub records: Vec<Record>,
}

impl SampleTable {
    pub fn new(records: Vec<Record>) -> Self {
        SampleTable { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of feature columns: the longest feature vector in the table.
    pub fn feature_width(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.features.len())
            .max()
            .unwrap_or(0)
    }

    /// Count per class, in class-list order, for the classes that occur.
    pub fn label_counts(&self) -> Vec<(ClassLabel, usize)> {
        let mut counts = [0usize; ClassLabel::ALL.len()];
        for r in &self.records {
            counts[r.label.index()] += 1;
        }
        ClassLabel::ALL
            .into_iter()
            .zip(counts)
            .filter(|(_, n)| *n > 0)
            .collect()
    }

    /// The N×W single-precision matrix handed to the embedding engine.
    ///
    /// NaN and ±Inf become 0.0, as do the missing trailing columns of rows
    /// shorter than `feature_width()`. The records themselves are untouched.
    pub fn feature_matrix(&self) -> Array2<f32> {
        let width = self.feature_width();
        let mut matrix = Array2::<f32>::zeros((self.len(), width));
        for (mut row, record) in matrix.rows_mut().into_iter().zip(&self.records) {
            for (cell, &v) in row.iter_mut().zip(&record.features) {
                let v = v as f32;
                *cell = if v.is_finite() { v } else { 0.0 };
            }
        }
        matrix
    }
}

// ---------------------------------------------------------------------------
// EmbeddingResult – records with their 2-D coordinates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedSample {
    pub record: Record,
    pub x: f64,
    pub y: f64,
}

/// The sample table augmented with `x`, `y`, row-for-row.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingResult {
    pub samples: Vec<EmbeddedSample>,
}

impl EmbeddingResult {
    /// Attach engine output to the table. Row `i` of `coords` belongs to
    /// record `i`; the matrix must be exactly N×2.
    pub fn attach(table: SampleTable, coords: &Array2<f32>) -> Result<Self, PipelineError> {
        let expected = (table.len(), 2);
        if coords.dim() != expected {
            return Err(PipelineError::ShapeMismatch {
                expected,
                got: coords.dim(),
            });
        }
        let samples = table
            .records
            .into_iter()
            .zip(coords.rows())
            .map(|(record, xy)| EmbeddedSample {
                record,
                x: f64::from(xy[0]),
                y: f64::from(xy[1]),
            })
            .collect();
        Ok(EmbeddingResult { samples })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples of one class, in table order.
    pub fn by_label(&self, label: ClassLabel) -> impl Iterator<Item = &EmbeddedSample> {
        self.samples.iter().filter(move |s| s.record.label == label)
    }

    /// Classes present in the result, in class-list order.
    pub fn labels(&self) -> Vec<ClassLabel> {
        ClassLabel::ALL
            .into_iter()
            .filter(|l| self.samples.iter().any(|s| s.record.label == *l))
            .collect()
    }
}
