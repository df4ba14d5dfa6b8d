use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::models::{Entrant, MatchEntry, MatchRecord, PlayerId, Rank};
use crate::config::settings::IngestionSettings;
use crate::errors::PredictionError;

/// Tournament dates arrive either as a `YYYYMMDD` number or as text
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawDate {
    Compact(u32),
    Text(String),
}

/// Match row as delivered by the acquisition step, before cleaning
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawMatch {
    pub tourney_name: String,
    pub tourney_date: RawDate,
    #[serde(default)]
    pub surface: Option<String>,
    #[serde(default)]
    pub round: Option<String>,
    pub winner_id: i64,
    pub winner_name: String,
    #[serde(default)]
    pub winner_rank: Option<f64>,
    pub loser_id: i64,
    pub loser_name: String,
    #[serde(default)]
    pub loser_rank: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub kept: usize,
    pub missing_rank: usize,
    pub team_event: usize,
    pub before_start: usize,
}

impl CleaningReport {
    pub fn dropped(&self) -> usize {
        self.missing_rank + self.team_event + self.before_start
    }
}

/// Filters and validates raw rows. Rows without ranks, team events and rows
/// before the start year are dropped; any malformed row rejects the input.
pub fn clean_matches(
    raw: Vec<RawMatch>,
    settings: &IngestionSettings,
) -> Result<(Vec<MatchRecord>, CleaningReport)> {
    let mut report = CleaningReport::default();
    let mut records = Vec::with_capacity(raw.len());

    for (idx, row) in raw.into_iter().enumerate() {
        if is_team_event(&row.tourney_name, &settings.excluded_events) {
            report.team_event += 1;
            continue;
        }

        let (Some(winner_rank), Some(loser_rank)) = (row.winner_rank, row.loser_rank) else {
            report.missing_rank += 1;
            continue;
        };

        let date = parse_raw_date(&row.tourney_date)
            .map_err(|e| e.at_record(idx))
            .with_context(|| format!("Rejected match at {}", row.tourney_name))?;
        if date.year() < settings.start_year {
            report.before_start += 1;
            continue;
        }

        let record = build_record(row, date, winner_rank, loser_rank)
            .map_err(|e| e.at_record(idx))?;
        records.push(record);
    }

    report.kept = records.len();
    Ok((records, report))
}

pub fn is_team_event(tourney_name: &str, excluded: &[String]) -> bool {
    let lower = tourney_name.to_lowercase();
    excluded.iter().any(|event| lower.contains(&event.to_lowercase()))
}

fn build_record(
    row: RawMatch,
    date: NaiveDate,
    winner_rank: f64,
    loser_rank: f64,
) -> Result<MatchRecord, PredictionError> {
    let entry = MatchEntry {
        tourney_name: row.tourney_name,
        tourney_date: date,
        surface: row.surface.unwrap_or_default(),
        round: row.round.unwrap_or_default(),
        winner: Entrant {
            id: PlayerId(row.winner_id),
            name: row.winner_name,
            rank: parse_rank(winner_rank)?,
        },
        loser: Entrant {
            id: PlayerId(row.loser_id),
            name: row.loser_name,
            rank: parse_rank(loser_rank)?,
        },
    };
    MatchRecord::new(entry)
}

fn parse_rank(value: f64) -> Result<Rank, PredictionError> {
    if value.fract() != 0.0 || value < 1.0 || value > f64::from(Rank::MAX) {
        return Err(PredictionError::data(format!(
            "rank {value} is not a positive integer"
        )));
    }
    Ok(value as Rank)
}

pub fn parse_raw_date(date: &RawDate) -> Result<NaiveDate, PredictionError> {
    let text = match date {
        RawDate::Compact(value) => value.to_string(),
        RawDate::Text(text) => text.trim().to_string(),
    };

    if let Ok(d) = NaiveDate::parse_from_str(&text, "%Y%m%d") {
        return Ok(d);
    }

    if let Ok(d) = NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
        return Ok(d);
    }

    // Full timestamps, as spreadsheet exports sometimes carry them
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(&text) {
        return Ok(dt.date_naive());
    }

    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(&text, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt.date());
    }

    Err(PredictionError::data(format!(
        "unparsable tournament date '{text}'"
    )))
}
