use thiserror::Error;

/// Failures surfaced by the estimation core.
///
/// A head-to-head record below the minimum sample is not an error; it is a
/// regular `H2HResult` variant that contributes nothing to the combination.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    #[error("malformed match data{}: {reason}", record_suffix(.index))]
    Data { index: Option<usize>, reason: String },

    #[error("no match history for {player}")]
    NoHistory { player: String },

    #[error("name '{name}' belongs to more than one player")]
    AmbiguousPlayer { name: String },

    #[error("no rank-gap estimate for best rank {best_bucket}, gap {gap_bucket}")]
    LookupMiss {
        best_bucket: String,
        gap_bucket: String,
    },

    #[error("invalid value for {name}: {value}")]
    InvalidParameter { name: &'static str, value: String },
}

impl PredictionError {
    pub fn data(reason: impl Into<String>) -> Self {
        PredictionError::Data {
            index: None,
            reason: reason.into(),
        }
    }

    /// Attaches the position of the offending input row to a data error
    pub fn at_record(self, index: usize) -> Self {
        match self {
            PredictionError::Data { reason, .. } => PredictionError::Data {
                index: Some(index),
                reason,
            },
            other => other,
        }
    }

    pub fn invalid(name: &'static str, value: impl ToString) -> Self {
        PredictionError::InvalidParameter {
            name,
            value: value.to_string(),
        }
    }

    /// Whether the failure is tied to the request rather than to the loaded data
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            PredictionError::NoHistory { .. }
                | PredictionError::AmbiguousPlayer { .. }
                | PredictionError::InvalidParameter { .. }
        )
    }
}

fn record_suffix(index: &Option<usize>) -> String {
    index.map(|i| format!(" in record {i}")).unwrap_or_default()
}

/// Context for cache failures
pub fn cache_context(operation: &str, key: &str) -> String {
    format!("Failed to {} cache for key: {}", operation, key)
}

/// Context for input file failures
pub fn input_context(path: &std::path::Path) -> String {
    format!("Failed to read input file: {}", path.display())
}

/// Context for parse failures
pub fn parse_context(data_type: &str) -> String {
    format!("Failed to parse {}", data_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_error_names_its_record() {
        let err = PredictionError::data("rank 0.5 is not a positive integer");
        assert_eq!(
            err.to_string(),
            "malformed match data: rank 0.5 is not a positive integer"
        );

        let located = err.at_record(7);
        assert!(matches!(located, PredictionError::Data { index: Some(7), .. }));
        assert_eq!(
            located.to_string(),
            "malformed match data in record 7: rank 0.5 is not a positive integer"
        );
    }

    #[test]
    fn test_at_record_leaves_other_errors_alone() {
        let err = PredictionError::invalid("lambda", "NaN");
        assert_eq!(err.clone().at_record(3), err);
    }
}
