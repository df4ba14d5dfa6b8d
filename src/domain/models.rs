use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::errors::PredictionError;

pub type Rank = u32;

/// Canonical player identifier assigned during ingestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub i64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player({})", self.0)
    }
}

/// A resolved player: canonical id plus the display name found in the corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

/// One side of a completed match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entrant {
    pub id: PlayerId,
    pub name: String,
    pub rank: Rank,
}

impl Entrant {
    pub fn player(&self) -> Player {
        Player {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// Stored form of a match, as written to and read from the cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEntry {
    pub tourney_name: String,
    pub tourney_date: NaiveDate,
    pub surface: String,
    pub round: String,
    pub winner: Entrant,
    pub loser: Entrant,
}

/// A validated match with its rank-derived fields computed once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MatchEntry", into = "MatchEntry")]
pub struct MatchRecord {
    entry: MatchEntry,
    gap: Rank,
    better_ranked_won: bool,
    best_rank: Rank,
}

impl MatchRecord {
    pub fn new(entry: MatchEntry) -> Result<Self, PredictionError> {
        validate_entrant(&entry.winner, "winner")?;
        validate_entrant(&entry.loser, "loser")?;

        if entry.winner.id == entry.loser.id {
            return Err(PredictionError::data(format!(
                "{} is listed as both winner and loser",
                entry.winner.id
            )));
        }

        let winner_rank = entry.winner.rank;
        let loser_rank = entry.loser.rank;

        Ok(Self {
            gap: winner_rank.abs_diff(loser_rank),
            better_ranked_won: winner_rank < loser_rank,
            best_rank: winner_rank.min(loser_rank),
            entry,
        })
    }

    pub fn entry(&self) -> &MatchEntry {
        &self.entry
    }

    pub fn date(&self) -> NaiveDate {
        self.entry.tourney_date
    }

    pub fn tourney_name(&self) -> &str {
        &self.entry.tourney_name
    }

    pub fn round(&self) -> &str {
        &self.entry.round
    }

    /// How far into its event the match was played, see [`round_stage`]
    pub fn stage(&self) -> u8 {
        round_stage(&self.entry.round)
    }

    pub fn winner(&self) -> &Entrant {
        &self.entry.winner
    }

    pub fn loser(&self) -> &Entrant {
        &self.entry.loser
    }

    /// |winner rank - loser rank|
    pub fn gap(&self) -> Rank {
        self.gap
    }

    /// True iff the winner held the numerically smaller rank
    pub fn better_ranked_won(&self) -> bool {
        self.better_ranked_won
    }

    pub fn best_rank(&self) -> Rank {
        self.best_rank
    }

    pub fn involves(&self, player: PlayerId) -> bool {
        self.entry.winner.id == player || self.entry.loser.id == player
    }

    pub fn is_between(&self, a: PlayerId, b: PlayerId) -> bool {
        (self.entry.winner.id == a && self.entry.loser.id == b)
            || (self.entry.winner.id == b && self.entry.loser.id == a)
    }

    pub fn won_by(&self, player: PlayerId) -> bool {
        self.entry.winner.id == player
    }

    /// The side of this match played by `player`, if any
    pub fn entrant(&self, player: PlayerId) -> Option<&Entrant> {
        if self.entry.winner.id == player {
            Some(&self.entry.winner)
        } else if self.entry.loser.id == player {
            Some(&self.entry.loser)
        } else {
            None
        }
    }
}

/// Position of a round within its event; later rounds get higher values.
///
/// Tournament dates are event start dates, so every round of an event shares
/// one date and the round is the only hint of which match came later.
/// Unrecognised rounds sort before everything else.
pub fn round_stage(round: &str) -> u8 {
    match round.trim() {
        "Q1" => 1,
        "Q2" => 2,
        "Q3" => 3,
        "Q4" => 4,
        "ER" => 5,
        "R128" | "1st Round" => 6,
        "R64" | "2nd Round" => 7,
        "R32" | "3rd Round" => 8,
        "R16" | "4th Round" => 9,
        "RR" | "Round Robin" => 10,
        "QF" | "Quarterfinals" => 11,
        "SF" | "Semifinals" => 12,
        "BR" => 13,
        "F" | "The Final" => 14,
        _ => 0,
    }
}

/// Total order of matches as they were played: date, then round stage.
/// Remaining ties fall back to tournament and player ids so the order never
/// depends on how the input happened to be arranged.
pub fn chronological(a: &MatchRecord, b: &MatchRecord) -> Ordering {
    a.date()
        .cmp(&b.date())
        .then_with(|| a.stage().cmp(&b.stage()))
        .then_with(|| a.tourney_name().cmp(b.tourney_name()))
        .then_with(|| a.winner().id.cmp(&b.winner().id))
        .then_with(|| a.loser().id.cmp(&b.loser().id))
}

fn validate_entrant(entrant: &Entrant, side: &str) -> Result<(), PredictionError> {
    if entrant.name.trim().is_empty() {
        return Err(PredictionError::data(format!(
            "{side} {} has an empty name",
            entrant.id
        )));
    }
    if entrant.rank == 0 {
        return Err(PredictionError::data(format!(
            "{side} {} has rank 0",
            entrant.name
        )));
    }
    Ok(())
}

impl TryFrom<MatchEntry> for MatchRecord {
    type Error = PredictionError;

    fn try_from(entry: MatchEntry) -> Result<Self, Self::Error> {
        MatchRecord::new(entry)
    }
}

impl From<MatchRecord> for MatchEntry {
    fn from(record: MatchRecord) -> Self {
        record.entry
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_derived_fields() {
        let upset = record(date(2024, 1, 1), (1, 120), (2, 5));
        assert_eq!(upset.gap(), 115);
        assert!(!upset.better_ranked_won());
        assert_eq!(upset.best_rank(), 5);

        let expected = record(date(2024, 1, 1), (1, 5), (2, 120));
        assert!(expected.better_ranked_won());
    }

    #[test]
    fn test_equal_ranks_are_not_a_better_ranked_win() {
        let even = record(date(2024, 1, 1), (1, 30), (2, 30));
        assert_eq!(even.gap(), 0);
        assert!(!even.better_ranked_won());
    }

    #[test]
    fn test_rejects_zero_rank_and_self_match() {
        let mut entry = record(date(2024, 1, 1), (1, 5), (2, 9)).entry().clone();
        entry.loser.rank = 0;
        assert!(matches!(MatchRecord::new(entry.clone()), Err(PredictionError::Data { .. })));

        entry.loser = entry.winner.clone();
        assert!(matches!(MatchRecord::new(entry), Err(PredictionError::Data { .. })));
    }

    #[test]
    fn test_rounds_are_ordered_by_stage() {
        let stages: Vec<u8> = ["Q1", "R128", "R64", "R32", "R16", "RR", "QF", "SF", "BR", "F"]
            .iter()
            .map(|r| round_stage(r))
            .collect();
        assert!(stages.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(round_stage("Semifinals"), round_stage("SF"));
        assert_eq!(round_stage("???"), 0);
    }

    #[test]
    fn test_chronological_uses_round_within_a_date() {
        let day = date(2024, 11, 10);
        let semi = record_in_round(day, "SF", (2, 8), (1, 3));
        let group = record_in_round(day, "RR", (1, 3), (2, 8));
        let next_week = record_in_round(date(2024, 11, 17), "R32", (1, 3), (5, 40));

        let mut matches = vec![&next_week, &semi, &group];
        matches.sort_by(|a, b| chronological(a, b));

        assert_eq!(matches, vec![&group, &semi, &next_week]);
    }

    #[test]
    fn test_deserialization_recomputes_derived_fields() {
        let stored = record(date(2023, 6, 5), (7, 40), (8, 12));
        let json = serde_json::to_string(&stored).unwrap();
        assert!(!json.contains("better_ranked_won"));

        let parsed: MatchRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, stored);
        assert_eq!(parsed.gap(), 28);
    }
}
