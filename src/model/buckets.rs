use serde::{Deserialize, Serialize};

use crate::domain::Rank;
use crate::errors::PredictionError;

/// Ordered, right-closed buckets over non-negative rank values.
///
/// Bucket `i` holds values in `(upper_bounds[i-1], upper_bounds[i]]`; the first
/// bucket also holds 0 and the last one everything above the final bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketScale {
    upper_bounds: Vec<Rank>,
    labels: Vec<String>,
}

impl BucketScale {
    pub fn new(upper_bounds: Vec<Rank>, labels: &[&str]) -> Self {
        Self {
            upper_bounds,
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    pub fn validate(&self) -> Result<(), PredictionError> {
        if self.labels.len() != self.upper_bounds.len() + 1 {
            return Err(PredictionError::invalid(
                "bucket labels",
                format!(
                    "{} labels for {} bounds",
                    self.labels.len(),
                    self.upper_bounds.len()
                ),
            ));
        }
        if self.upper_bounds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(PredictionError::invalid(
                "bucket bounds",
                format!("{:?} is not strictly increasing", self.upper_bounds),
            ));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn index_of(&self, value: Rank) -> usize {
        self.upper_bounds
            .iter()
            .position(|&bound| value <= bound)
            .unwrap_or(self.upper_bounds.len())
    }

    pub fn label(&self, index: usize) -> &str {
        &self.labels[index]
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}
