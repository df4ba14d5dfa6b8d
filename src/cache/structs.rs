use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::settings::Tour;
use crate::domain::MatchCorpus;
use crate::errors::cache_context;

/// Which stored corpus of a circuit a set of matches belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusKind {
    /// Historical archive: feeds the rank-gap table and every prediction
    Archive,
    /// Recent matches that feed form and head-to-head only
    Supplement,
}

impl CorpusKind {
    pub fn cache_key(&self, tour: Tour) -> String {
        match self {
            CorpusKind::Archive => format!("matches_{tour}"),
            CorpusKind::Supplement => format!("supplement_{tour}"),
        }
    }
}

/// File-based JSON store for the cleaned match corpus
pub struct Cache {
    cache_dir: PathBuf,
}

impl Cache {
    /// Create a new cache instance
    pub fn new<P: AsRef<Path>>(cache_dir: P) -> Result<Self> {
        let cache_dir = cache_dir.as_ref().to_path_buf();
        fs::create_dir_all(&cache_dir).context("Failed to create cache directory")?;
        Ok(Self { cache_dir })
    }

    /// Save data to cache
    pub fn save<T: Serialize>(&self, key: &str, data: &T) -> Result<()> {
        let file_path = self.build_path(key);
        let json = serde_json::to_string_pretty(data).with_context(|| cache_context("serialize", key))?;
        fs::write(&file_path, json).with_context(|| cache_context("write", key))?;

        info!("Saved data to cache: {}", file_path.display());
        Ok(())
    }

    /// Load data from cache
    pub fn load<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Result<Option<T>> {
        if !self.exists(key) {
            return Ok(None);
        }
        let file_path = self.build_path(key);

        let json = fs::read_to_string(&file_path).with_context(|| cache_context("read", key))?;
        let data = serde_json::from_str(&json).with_context(|| {
            format!(
                "Failed to parse JSON from {:?}. First 200 chars: {}",
                file_path,
                json.chars().take(200).collect::<String>()
            )
        })?;

        info!("Loaded data from cache: {}", file_path.display());
        Ok(Some(data))
    }

    /// Check if cached data exists
    pub fn exists(&self, key: &str) -> bool {
        self.build_path(key).exists()
    }

    pub fn save_corpus(&self, tour: Tour, kind: CorpusKind, corpus: &MatchCorpus) -> Result<()> {
        self.save(&kind.cache_key(tour), corpus)
    }

    pub fn load_corpus(&self, tour: Tour, kind: CorpusKind) -> Result<Option<MatchCorpus>> {
        self.load(&kind.cache_key(tour))
    }

    /// The archive of `tour`, which every prediction session needs
    pub fn load_archive(&self, tour: Tour) -> Result<MatchCorpus> {
        self.load_corpus(tour, CorpusKind::Archive)?.ok_or_else(|| {
            anyhow::anyhow!("No {tour} matches found in cache, run `ingest --tour {tour}` first")
        })
    }

    fn build_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::fixtures::*;

    #[test]
    fn test_cache_save_and_load_corpus() {
        let temp_dir = std::env::temp_dir().join("tennis_predictor_test_cache");
        let cache = Cache::new(&temp_dir).unwrap();

        let corpus = MatchCorpus::new(vec![
            record(date(2024, 2, 1), (1, 5), (2, 9)),
            record(date(2024, 1, 1), (3, 50), (1, 5)),
        ]);

        cache.save_corpus(Tour::Atp, CorpusKind::Archive, &corpus).unwrap();
        assert!(cache.exists("matches_atp"));
        let loaded = cache.load_archive(Tour::Atp).unwrap();
        assert_eq!(loaded, corpus);

        // Cleanup
        fs::remove_dir_all(&temp_dir).unwrap();
        assert!(cache.load_archive(Tour::Atp).is_err());
    }

    #[test]
    fn test_tours_and_kinds_use_separate_keys() {
        let temp_dir = std::env::temp_dir().join("tennis_predictor_test_cache_keys");
        let cache = Cache::new(&temp_dir).unwrap();
        let corpus = MatchCorpus::new(vec![record(date(2024, 2, 1), (1, 5), (2, 9))]);

        cache.save_corpus(Tour::Wta, CorpusKind::Supplement, &corpus).unwrap();

        assert!(cache.exists("supplement_wta"));
        assert!(cache.load_corpus(Tour::Wta, CorpusKind::Archive).unwrap().is_none());
        assert!(cache.load_corpus(Tour::Atp, CorpusKind::Supplement).unwrap().is_none());
        let err = cache.load_archive(Tour::Wta).unwrap_err();
        assert!(err.to_string().contains("ingest --tour wta"));

        fs::remove_dir_all(&temp_dir).unwrap();
    }
}
