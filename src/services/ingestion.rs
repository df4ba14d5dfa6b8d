use anyhow::{Context, Result};
use log::{info, warn};
use std::fs;
use std::path::Path;

use crate::cache::{Cache, CorpusKind};
use crate::config::settings::{AppConfig, IngestionSettings, Tour};
use crate::domain::{CleaningReport, MatchCorpus, RawMatch, clean_matches};
use crate::errors::{input_context, parse_context};

/// Turns an acquired match export into the cleaned corpus stored in the cache
pub struct IngestionService {
    cache: Cache,
    settings: IngestionSettings,
    tour: Tour,
}

impl IngestionService {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            cache: Cache::new(&config.cache_dir)?,
            settings: config.ingestion.clone(),
            tour: config.tour,
        })
    }

    pub fn run(&self, input: &Path, append: bool, kind: CorpusKind) -> Result<CleaningReport> {
        info!("=== Starting {} Match Ingestion ({:?}) ===\n", self.tour, kind);

        // Step 1: Read raw rows
        let raw = self.read_raw_matches(input)?;
        info!("  → Read {} raw matches from {}\n", raw.len(), input.display());

        // Step 2: Clean and validate
        let (records, report) = clean_matches(raw, &self.settings)?;
        self.log_report(&report);

        // Step 3: Merge with the stored corpus if requested
        let fresh = MatchCorpus::new(records);
        let existing = if append {
            self.cache.load_corpus(self.tour, kind)?
        } else {
            None
        };
        let corpus = match existing {
            Some(existing) => {
                info!("  → Appending to {} cached matches", existing.len());
                existing.merge(fresh)
            }
            None => fresh,
        };

        // Step 4: Save
        self.cache.save_corpus(self.tour, kind, &corpus)?;
        info!("  → Saved corpus of {} matches\n", corpus.len());

        info!("=== Ingestion Complete ===");
        Ok(report)
    }

    fn read_raw_matches(&self, input: &Path) -> Result<Vec<RawMatch>> {
        let json = fs::read_to_string(input).with_context(|| input_context(input))?;
        serde_json::from_str(&json).with_context(|| parse_context("raw match export"))
    }

    fn log_report(&self, report: &CleaningReport) {
        info!("  → Kept {} matches", report.kept);
        if report.dropped() > 0 {
            info!(
                "  Dropped {} matches ({} missing rank, {} team events, {} before {})",
                report.dropped(),
                report.missing_rank,
                report.team_event,
                report.before_start,
                self.settings.start_year
            );
        }
        if report.kept == 0 {
            warn!("No matches survived cleaning");
        }
    }
}
