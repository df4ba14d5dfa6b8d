use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::tournaments::get_excluded_events;
use crate::model::buckets::BucketScale;
use crate::model::form::FormParams;
use crate::model::head_to_head::HeadToHeadParams;
use crate::model::rank_gap::MissPolicy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    pub form_window: usize,
    pub form_alpha: f64,
    pub form_beta: f64,
    pub h2h_gamma: f64,
    pub h2h_alpha: f64,
    pub h2h_beta: f64,
    pub h2h_min_matches: usize,
    pub lambda_h2h: f64,
    pub miss_policy: MissPolicy,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            form_window: 20,
            form_alpha: 2.0,
            form_beta: 2.0,
            h2h_gamma: 0.95,
            h2h_alpha: 1.0,
            h2h_beta: 1.0,
            h2h_min_matches: 4,
            lambda_h2h: 1.0,
            miss_policy: MissPolicy::NearestBucket,
        }
    }
}

impl ModelSettings {
    pub fn form_params(&self) -> FormParams {
        FormParams {
            window: self.form_window,
            alpha: self.form_alpha,
            beta: self.form_beta,
        }
    }

    pub fn h2h_params(&self) -> HeadToHeadParams {
        HeadToHeadParams {
            gamma: self.h2h_gamma,
            alpha: self.h2h_alpha,
            beta: self.h2h_beta,
            min_matches: self.h2h_min_matches,
        }
    }
}

/// Bucket boundaries for the rank-gap table, handed to `RankGapTable::build`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketSettings {
    pub best_rank: BucketScale,
    pub gap: BucketScale,
}

impl Default for BucketSettings {
    fn default() -> Self {
        Self {
            best_rank: BucketScale::new(
                vec![10, 20, 50, 100, 200, 500, 1000],
                &["Top10", "11-20", "21-50", "51-100", "101-200", "201-500", "501-1000", "1000+"],
            ),
            gap: BucketScale::new(
                vec![5, 10, 20, 50, 100, 200, 500],
                &["0-5", "6-10", "11-20", "21-50", "51-100", "101-200", "201-500", "500+"],
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionSettings {
    pub start_year: i32,
    pub excluded_events: Vec<String>,
}

impl Default for IngestionSettings {
    fn default() -> Self {
        Self {
            start_year: 2015,
            excluded_events: get_excluded_events(),
        }
    }
}

/// Professional circuit a corpus belongs to. Each one is stored and modelled
/// on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Tour {
    #[default]
    Atp,
    Wta,
}

impl Tour {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tour::Atp => "atp",
            Tour::Wta => "wta",
        }
    }
}

impl fmt::Display for Tour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub model: ModelSettings,
    pub buckets: BucketSettings,
    pub ingestion: IngestionSettings,
    pub cache_dir: String,
    pub tour: Tour,
    /// Last date of the matches the rank-gap table is built from; later
    /// matches still feed form and head-to-head
    pub table_until: Option<NaiveDate>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    /// Defaults, with `CACHE_DIR` and `TENNIS_START_YEAR` taken from the environment
    pub fn new() -> Self {
        let mut ingestion = IngestionSettings::default();
        if let Some(year) = std::env::var("TENNIS_START_YEAR")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            ingestion.start_year = year;
        }

        Self {
            model: ModelSettings::default(),
            buckets: BucketSettings::default(),
            ingestion,
            cache_dir: std::env::var("CACHE_DIR").unwrap_or_else(|_| "cache".to_string()),
            tour: Tour::default(),
            table_until: None,
        }
    }

    /// Session configuration for one circuit and table cutoff
    pub fn for_session(tour: Tour, table_until: Option<NaiveDate>) -> Self {
        Self {
            tour,
            table_until,
            ..Self::new()
        }
    }
}
