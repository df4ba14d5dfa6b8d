pub mod buckets;
pub mod form;
pub mod head_to_head;
pub mod predictor;
pub mod probability;
pub mod rank_gap;
pub mod types;
pub mod weighting;

pub use form::{FormEstimator, FormParams, FormPoint, FormSeries};
pub use head_to_head::{H2HResult, H2HSummary, HeadToHeadEstimator, HeadToHeadParams};
pub use predictor::{Predictor, predict};
pub use rank_gap::{GapLookup, GapSource, MissPolicy, RankGapTable};
pub use types::{Diagnostics, PlayerOutcome, Prediction, PredictionRequest};
