use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::models::{MatchRecord, Player, chronological};
use crate::errors::PredictionError;

/// Cleaned, name-reconciled match history, kept in date order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<MatchRecord>", into = "Vec<MatchRecord>")]
pub struct MatchCorpus {
    records: Vec<MatchRecord>,
}

impl MatchCorpus {
    pub fn new(mut records: Vec<MatchRecord>) -> Self {
        records.sort_by(chronological);
        Self { records }
    }

    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every match dated on or before `as_of`
    pub fn until(&self, as_of: NaiveDate) -> &[MatchRecord] {
        let end = self.records.partition_point(|r| r.date() <= as_of);
        &self.records[..end]
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.records.first()?.date(), self.records.last()?.date()))
    }

    /// Resolves a name to its canonical player by exact, case-insensitive match
    pub fn resolve(&self, name: &str) -> Result<Player, PredictionError> {
        let wanted = name.trim().to_lowercase();
        let mut found: Option<Player> = None;

        for entrant in self.records.iter().flat_map(|r| [r.winner(), r.loser()]) {
            if entrant.name.trim().to_lowercase() != wanted {
                continue;
            }
            match &found {
                Some(player) if player.id != entrant.id => {
                    return Err(PredictionError::AmbiguousPlayer {
                        name: name.trim().to_string(),
                    });
                }
                Some(_) => {}
                None => found = Some(entrant.player()),
            }
        }

        found.ok_or_else(|| PredictionError::NoHistory {
            player: name.trim().to_string(),
        })
    }

    /// Combines two corpora, keeping the match order total
    pub fn merge(self, other: MatchCorpus) -> MatchCorpus {
        let mut records = self.records;
        records.extend(other.records);
        Self::new(records)
    }
}

impl From<Vec<MatchRecord>> for MatchCorpus {
    fn from(records: Vec<MatchRecord>) -> Self {
        Self::new(records)
    }
}

impl From<MatchCorpus> for Vec<MatchRecord> {
    fn from(corpus: MatchCorpus) -> Self {
        corpus.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PlayerId;
    use crate::domain::models::fixtures::*;

    #[test]
    fn test_records_are_sorted_by_date() {
        let corpus = MatchCorpus::new(vec![
            record(date(2024, 3, 1), (1, 5), (2, 9)),
            record(date(2023, 3, 1), (1, 5), (3, 9)),
        ]);
        assert_eq!(corpus.records()[0].date(), date(2023, 3, 1));
        assert_eq!(corpus.date_range(), Some((date(2023, 3, 1), date(2024, 3, 1))));
    }

    #[test]
    fn test_same_day_order_is_independent_of_input() {
        let day = date(2024, 1, 1);
        let matches = vec![
            record_in_round(day, "F", (1, 5), (2, 9)),
            record_in_round(day, "R32", (3, 20), (1, 5)),
            record_in_round(day, "SF", (1, 5), (4, 9)),
        ];
        let mut reversed = matches.clone();
        reversed.reverse();

        let forward = MatchCorpus::new(matches);
        assert_eq!(forward, MatchCorpus::new(reversed));
        let rounds: Vec<&str> = forward.records().iter().map(|r| r.round()).collect();
        assert_eq!(rounds, vec!["R32", "SF", "F"]);
    }

    #[test]
    fn test_merge_interleaves_by_date() {
        let archive = MatchCorpus::new(vec![
            record(date(2023, 1, 1), (1, 5), (2, 9)),
            record(date(2024, 3, 1), (1, 5), (2, 9)),
        ]);
        let recent = MatchCorpus::new(vec![record(date(2024, 1, 1), (2, 9), (1, 5))]);

        let merged = archive.merge(recent);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.records()[1].date(), date(2024, 1, 1));
    }

    #[test]
    fn test_until_is_inclusive() {
        let corpus = MatchCorpus::new(vec![
            record(date(2024, 1, 1), (1, 5), (2, 9)),
            record(date(2024, 2, 1), (1, 5), (2, 9)),
            record(date(2024, 3, 1), (1, 5), (2, 9)),
        ]);
        assert_eq!(corpus.until(date(2024, 2, 1)).len(), 2);
        assert!(corpus.until(date(2023, 12, 31)).is_empty());
    }

    #[test]
    fn test_resolve_is_exact_and_case_insensitive() {
        let corpus = MatchCorpus::new(vec![record(date(2024, 1, 1), (12, 5), (2, 9))]);

        assert_eq!(corpus.resolve("  player 12 ").unwrap().id, PlayerId(12));
        // "Player 1" is a prefix of "Player 12" and must not match it
        assert!(matches!(
            corpus.resolve("Player 1"),
            Err(PredictionError::NoHistory { .. })
        ));
    }

    #[test]
    fn test_resolve_rejects_shared_names() {
        let mut twin = record(date(2024, 1, 1), (3, 5), (4, 9)).entry().clone();
        twin.winner.name = "Player 1".to_string();
        let corpus = MatchCorpus::new(vec![
            record(date(2024, 1, 1), (1, 5), (2, 9)),
            MatchRecord::new(twin).unwrap(),
        ]);
        assert!(matches!(
            corpus.resolve("player 1"),
            Err(PredictionError::AmbiguousPlayer { .. })
        ));
    }
}
