use anyhow::{Context, Result};
use colored::Colorize;
use log::{info, warn};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::cache::{Cache, CorpusKind};
use crate::config::settings::{AppConfig, Tour};
use crate::domain::{MatchCorpus, Player};
use crate::errors::{PredictionError, input_context, parse_context};
use crate::model::{FormEstimator, FormPoint, Prediction, PredictionRequest, RankGapTable, predict};

/// Result of one request in a batch; failures are kept, not propagated
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchOutcome {
    Ok {
        prediction: Prediction,
    },
    Failed {
        player_a: String,
        player_b: String,
        error: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct FormHistory {
    pub player: Player,
    pub points: Vec<FormPoint>,
    pub last_form_logit: f64,
}

/// Owns one session's corpus and the rank-gap table built from it.
///
/// The table only sees the archive, cut at `table_until` when set. Form and
/// head-to-head see the archive together with any supplementary matches.
pub struct PredictionService {
    config: AppConfig,
    corpus: MatchCorpus,
    table: RankGapTable,
}

impl PredictionService {
    pub fn new(config: AppConfig) -> Result<Self> {
        let cache = Cache::new(&config.cache_dir)?;
        let archive = cache.load_archive(config.tour)?;
        let supplement = cache
            .load_corpus(config.tour, CorpusKind::Supplement)?
            .unwrap_or_default();
        Self::from_sources(config, archive, supplement)
    }

    /// Session over a single corpus that feeds both the table and predictions
    pub fn from_corpus(config: AppConfig, corpus: MatchCorpus) -> Result<Self> {
        Self::from_sources(config, corpus, MatchCorpus::default())
    }

    pub fn from_sources(config: AppConfig, archive: MatchCorpus, supplement: MatchCorpus) -> Result<Self> {
        let table_records = match config.table_until {
            Some(until) => archive.until(until),
            None => archive.records(),
        };
        info!(
            "Building {} rank-gap table from {} of {} archived matches",
            config.tour,
            table_records.len(),
            archive.len()
        );

        let table = RankGapTable::build(
            table_records,
            config.buckets.clone(),
            config.model.miss_policy,
        )
        .context("Failed to build rank-gap table")?;

        if !supplement.is_empty() {
            info!("Adding {} supplementary matches", supplement.len());
        }
        let corpus = archive.merge(supplement);
        if let Some((first, last)) = corpus.date_range() {
            info!("Loaded {} matches from {} to {}", corpus.len(), first, last);
        }

        Ok(Self {
            config,
            corpus,
            table,
        })
    }

    pub fn table(&self) -> &RankGapTable {
        &self.table
    }

    pub fn tour(&self) -> Tour {
        self.config.tour
    }

    pub fn predict(&self, request: &PredictionRequest) -> Result<Prediction, PredictionError> {
        predict(&self.corpus, &self.table, &self.config.model, request)
    }

    pub fn predict_batch(&self, requests: &[PredictionRequest]) -> Vec<BatchOutcome> {
        requests
            .iter()
            .map(|request| match self.predict(request) {
                Ok(prediction) => BatchOutcome::Ok { prediction },
                Err(e) => {
                    warn!("Skipping {} vs {}: {}", request.player_a, request.player_b, e);
                    BatchOutcome::Failed {
                        player_a: request.player_a.clone(),
                        player_b: request.player_b.clone(),
                        error: e.to_string(),
                    }
                }
            })
            .collect()
    }

    pub fn form_history(&self, name: &str) -> Result<FormHistory, PredictionError> {
        let player = self.corpus.resolve(name)?;
        let form = FormEstimator::new(self.config.model.form_params())?;
        let records = self.corpus.records();

        Ok(FormHistory {
            points: form.series(records, player.id).collect(),
            last_form_logit: form.last_form(records, player.id),
            player,
        })
    }

    pub fn run_predict(&self, request: &PredictionRequest) -> Result<()> {
        let prediction = self.predict(request)?;
        println!("{}", render_report(&prediction));
        Ok(())
    }

    pub fn run_batch(&self, input: &Path) -> Result<()> {
        let json = fs::read_to_string(input).with_context(|| input_context(input))?;
        let requests: Vec<PredictionRequest> =
            serde_json::from_str(&json).with_context(|| parse_context("prediction requests"))?;

        let outcomes = self.predict_batch(&requests);
        let failed = outcomes
            .iter()
            .filter(|o| matches!(o, BatchOutcome::Failed { .. }))
            .count();
        info!("Predicted {} of {} matches", outcomes.len() - failed, outcomes.len());

        println!("{}", serde_json::to_string_pretty(&outcomes)?);
        Ok(())
    }

    pub fn run_form(&self, name: &str) -> Result<()> {
        let history = self.form_history(name)?;
        println!("{}", format!("Recent form of {}", history.player.name).bold());
        for point in &history.points {
            println!("{}  {:.3}", point.date, point.posterior_mean);
        }
        println!("Last form logit: {:.3}", history.last_form_logit);
        Ok(())
    }

    pub fn run_table(&self) {
        println!(
            "{}",
            format!(
                "{} P(better-ranked wins) from {} matches, base rate {:.3}",
                self.config.tour.as_str().to_uppercase(),
                self.table.total_matches(),
                self.table.base_rate()
            )
            .bold()
        );
        print!("{}", self.table);
    }
}

/// Human-readable breakdown of a prediction
pub fn render_report(prediction: &Prediction) -> String {
    let d = &prediction.diagnostics;
    let a = &prediction.player_a;
    let b = &prediction.player_b;

    let h2h_line = match d.head_to_head.summary() {
        Some(summary) => summary.to_string(),
        None => d.head_to_head.to_string(),
    };

    let mut lines = vec![
        format!("Factors (as of {}):", d.as_of).bold().to_string(),
        format!(
            " - Baseline p_gap: {:.3} | logit_gap: {:.3} [{} / {}, {:?}]",
            d.gap.probability, d.gap.logit, d.gap.best_bucket, d.gap.gap_bucket, d.gap.source
        ),
        format!(" - Form {}: {:.3}", a.name, d.form_logit_a),
        format!(" - Form {}: {:.3}", b.name, d.form_logit_b),
        format!(" - {}", h2h_line),
        format!(" - logit_h2h: {:.3} (λ={})", d.h2h_logit, d.lambda),
        format!(" - Final logit: {:.3}", d.final_logit),
        String::new(),
    ];
    for player in [a, b] {
        lines.push(format!(
            "{} (rank {}) - win probability: {:.3}",
            player.name, player.rank, player.probability
        ));
    }
    lines.push(format!("➡ Favorite: {}", prediction.favorite).green().bold().to_string());
    lines.join("\n")
}
