mod structs;

pub use structs::{Cache, CorpusKind};
