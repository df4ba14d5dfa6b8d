pub mod ingestion;
pub mod prediction;
pub mod server;
