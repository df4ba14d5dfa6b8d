pub mod corpus;
pub mod models;
pub mod raw;

pub use corpus::MatchCorpus;
pub use models::*;
pub use raw::{CleaningReport, RawMatch, clean_matches};
