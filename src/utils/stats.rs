//! Summary statistics for batch runs

use serde::Serialize;
use std::fmt;

/// Mean, spread and range of a set of samples
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Distribution {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation
    pub sigma: f64,
    pub min: f64,
    pub max: f64,
}

impl Distribution {
    /// `None` for an empty sample
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let count = samples.len();
        let mean = samples.iter().sum::<f64>() / count as f64;
        let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / count as f64;
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            count,
            mean,
            sigma: variance.sqrt(),
            min,
            max,
        })
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.4} ± {:.4} (n={}, min {:.4}, max {:.4})",
            self.mean, self.sigma, self.count, self.min, self.max
        )
    }
}
