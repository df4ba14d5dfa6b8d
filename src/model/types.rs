use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::head_to_head::H2HResult;
use super::rank_gap::GapLookup;
use crate::domain::{PlayerId, Rank};

/// Per-request knobs; anything left `None` falls back to the configured default
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub player_a: String,
    pub player_b: String,
    #[serde(default)]
    pub lambda: Option<f64>,
    #[serde(default)]
    pub gamma: Option<f64>,
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerOutcome {
    pub id: PlayerId,
    pub name: String,
    pub rank: Rank,
    pub probability: f64,
}

/// Itemized inputs of the final logit, all oriented toward the better-ranked player
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    pub as_of: NaiveDate,
    pub better_ranked: String,
    pub gap: GapLookup,
    pub form_logit_a: f64,
    pub form_logit_b: f64,
    pub head_to_head: H2HResult,
    pub h2h_logit: f64,
    pub lambda: f64,
    pub gamma: f64,
    pub final_logit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub player_a: PlayerOutcome,
    pub player_b: PlayerOutcome,
    pub favorite: String,
    pub diagnostics: Diagnostics,
}

