use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::settings::Tour;
use crate::model::MissPolicy;
use crate::model::rank_gap::TableCell;

#[derive(Debug, Default, Deserialize)]
pub struct PredictParams {
    pub lambda: Option<f64>,
    pub gamma: Option<f64>,
    pub as_of: Option<NaiveDate>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableResponse {
    pub tour: Tour,
    pub best_buckets: Vec<String>,
    pub gap_buckets: Vec<String>,
    pub cells: Vec<TableCell>,
    pub base_rate: f64,
    pub total_matches: u32,
    pub miss_policy: MissPolicy,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
