use std::path::PathBuf;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

const N_FEATURES: usize = 28;
const N_CLASSES: usize = 6;

/// Box-Muller transform for normal distribution
fn gauss(rng: &mut SmallRng, mean: f64, std_dev: f64) -> f64 {
    let u1 = rng.gen::<f64>().max(1e-15);
    let u2 = rng.gen::<f64>();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std_dev * z
}

/// Class scores peaking at `class`, normalised to sum to 1.
fn class_scores(class: usize, rng: &mut SmallRng) -> Vec<f64> {
    let raw: Vec<f64> = (0..N_CLASSES)
        .map(|c| {
            let peak = if c == class { 3.0 } else { 0.0 };
            (peak + gauss(rng, 0.0, 0.5)).exp()
        })
        .collect();
    let total: f64 = raw.iter().sum();
    raw.into_iter().map(|v| v / total).collect()
}

fn main() {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("GUI_results/AllCenters/CP_centers_all"));
    std::fs::create_dir_all(&out_dir).expect("Failed to create output directory");

    let mut rng = SmallRng::seed_from_u64(42);

    // One feature centroid per class.
    let centroids: Vec<Vec<f64>> = (0..N_CLASSES)
        .map(|_| (0..N_FEATURES).map(|_| gauss(&mut rng, 0.0, 3.0)).collect())
        .collect();

    let subjects = ["ICARE_0101", "ICARE_0214", "ICARE_0333", "ICARE_0450"];
    let centers_per_subject = 40;

    let mut written = 0;
    for subject in &subjects {
        for idx in 1..=centers_per_subject {
            let class = rng.gen_range(0..N_CLASSES);
            let feat_row: Vec<f64> = centroids[class]
                .iter()
                .map(|&mu| gauss(&mut rng, mu, 1.0))
                .collect();
            let scores = class_scores(class, &mut rng);

            let body = json!({ "feat_row": [feat_row], "scores": [scores] });
            let path = out_dir.join(format!("{subject}_{idx}.json"));
            std::fs::write(&path, body.to_string()).expect("Failed to write sample file");
            written += 1;
        }
    }

    // Files the loader is expected to skip, plus one non-finite feature.
    std::fs::write(out_dir.join("README.json"), "{}").expect("Failed to write sample file");
    std::fs::write(
        out_dir.join(format!("{}_999.json", subjects[0])),
        json!({ "feat_row": [vec![0.0; N_FEATURES]] }).to_string(),
    )
    .expect("Failed to write sample file");
    let mut with_gap = vec![0.5; N_FEATURES];
    with_gap[3] = f64::NAN;
    std::fs::write(
        out_dir.join(format!("{}_998.json", subjects[1])),
        json!({ "feat_row": [with_gap], "scores": [class_scores(0, &mut rng)] }).to_string(),
    )
    .expect("Failed to write sample file");

    println!(
        "Wrote {} samples ({N_FEATURES} features, {N_CLASSES} scores each) to {}",
        written + 1,
        out_dir.display()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_are_normalised_and_reproducible() {
        let mut a = SmallRng::seed_from_u64(42);
        let mut b = SmallRng::seed_from_u64(42);
        let scores = class_scores(2, &mut a);
        assert_eq!(scores, class_scores(2, &mut b));
        assert_eq!(scores.len(), N_CLASSES);
        assert!((scores.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(scores.iter().all(|&s| s > 0.0));
    }

    #[test]
    fn gauss_centres_on_the_mean() {
        let mut rng = SmallRng::seed_from_u64(7);
        let n = 20_000;
        let mean = (0..n).map(|_| gauss(&mut rng, 5.0, 1.0)).sum::<f64>() / n as f64;
        assert!((mean - 5.0).abs() < 0.05, "mean={mean}");
    }
}
