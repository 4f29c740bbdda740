use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use statrs::statistics::Statistics;

/// Mean score with a normal-approximation 95% confidence interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub ci95_low: f64,
    pub ci95_high: f64,
    pub min: i32,
    pub max: i32,
}

impl ScoreSummary {
    pub fn from_scores(scores: &[i32]) -> Option<Self> {
        let min = *scores.iter().min()?;
        let max = *scores.iter().max()?;
        let values: Vec<f64> = scores.iter().map(|&s| f64::from(s)).collect();
        let mean = values.iter().mean();
        let std_dev = if values.len() > 1 {
            values.iter().std_dev()
        } else {
            0.0
        };
        let half_width = z_975() * std_dev / (values.len() as f64).sqrt();
        Some(Self {
            count: values.len(),
            mean,
            std_dev,
            ci95_low: mean - half_width,
            ci95_high: mean + half_width,
            min,
            max,
        })
    }
}

fn z_975() -> f64 {
    Normal::new(0.0, 1.0)
        .map(|normal| normal.inverse_cdf(0.975))
        .unwrap_or(1.959_963_984_540_054)
}
