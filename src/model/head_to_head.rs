use serde::{Deserialize, Serialize};
use std::fmt;

use super::probability::{beta_posterior_mean, clip, logit};
use super::weighting::apply_recency_weights;
use crate::domain::{MatchRecord, Player};
use crate::errors::PredictionError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadToHeadParams {
    /// Decay per meeting, counted back from the most recent one
    pub gamma: f64,
    pub alpha: f64,
    pub beta: f64,
    /// Meetings needed before the record contributes a probability
    pub min_matches: usize,
}

impl Default for HeadToHeadParams {
    fn default() -> Self {
        Self {
            gamma: 0.95,
            alpha: 1.0,
            beta: 1.0,
            min_matches: 4,
        }
    }
}

impl HeadToHeadParams {
    pub fn validate(&self) -> Result<(), PredictionError> {
        if !(self.gamma > 0.0 && self.gamma <= 1.0) {
            return Err(PredictionError::invalid("gamma", self.gamma));
        }
        if !(self.alpha > 0.0 && self.beta > 0.0) {
            return Err(PredictionError::invalid(
                "head-to-head prior",
                format!("alpha={} beta={}", self.alpha, self.beta),
            ));
        }
        if self.min_matches == 0 {
            return Err(PredictionError::invalid("min matches", self.min_matches));
        }
        Ok(())
    }
}

/// Raw meeting counts, reported whatever the sample size
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct H2HSummary {
    pub player_a: String,
    pub player_b: String,
    pub total: usize,
    pub wins_a: usize,
    pub wins_b: usize,
}

impl fmt::Display for H2HSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Head-to-head: {} matches ({} {} x {} {})",
            self.total, self.player_a, self.wins_a, self.wins_b, self.player_b
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum H2HResult {
    /// The two players never met
    NoHistory { player_a: String, player_b: String },
    /// Fewer meetings than the minimum; no numeric contribution
    Insufficient { summary: H2HSummary },
    Weighted {
        summary: H2HSummary,
        probability: f64,
        logit: f64,
    },
}

impl H2HResult {
    pub fn logit(&self) -> Option<f64> {
        match self {
            H2HResult::Weighted { logit, .. } => Some(*logit),
            _ => None,
        }
    }

    pub fn probability(&self) -> Option<f64> {
        match self {
            H2HResult::Weighted { probability, .. } => Some(*probability),
            _ => None,
        }
    }

    pub fn summary(&self) -> Option<&H2HSummary> {
        match self {
            H2HResult::NoHistory { .. } => None,
            H2HResult::Insufficient { summary } | H2HResult::Weighted { summary, .. } => {
                Some(summary)
            }
        }
    }
}

impl fmt::Display for H2HResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            H2HResult::NoHistory { player_a, player_b } => {
                write!(f, "No meetings between {} and {}", player_a, player_b)
            }
            H2HResult::Insufficient { summary } => write!(f, "{} (too few to weigh)", summary),
            H2HResult::Weighted {
                summary,
                probability,
                ..
            } => write!(f, "{} weighted p={:.3}", summary, probability),
        }
    }
}

/// Recency-weighted pairwise win probability of `player_a` over `player_b`
#[derive(Debug, Clone, Copy)]
pub struct HeadToHeadEstimator {
    params: HeadToHeadParams,
}

impl HeadToHeadEstimator {
    pub fn new(params: HeadToHeadParams) -> Result<Self, PredictionError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> HeadToHeadParams {
        self.params
    }

    pub fn compute(&self, records: &[MatchRecord], player_a: &Player, player_b: &Player) -> H2HResult {
        let mut meetings: Vec<&MatchRecord> = records
            .iter()
            .filter(|r| r.is_between(player_a.id, player_b.id))
            .collect();

        if meetings.is_empty() {
            return H2HResult::NoHistory {
                player_a: player_a.name.clone(),
                player_b: player_b.name.clone(),
            };
        }

        let wins_a = meetings.iter().filter(|r| r.won_by(player_a.id)).count();
        let summary = H2HSummary {
            player_a: player_a.name.clone(),
            player_b: player_b.name.clone(),
            total: meetings.len(),
            wins_a,
            wins_b: meetings.len() - wins_a,
        };

        if summary.total < self.params.min_matches {
            return H2HResult::Insufficient { summary };
        }

        let weighted = apply_recency_weights(&mut meetings, self.params.gamma);
        let weighted_wins: f64 = weighted
            .iter()
            .filter(|(m, _)| m.won_by(player_a.id))
            .map(|(_, w)| w)
            .sum();
        let weighted_total: f64 = weighted.iter().map(|(_, w)| w).sum();

        let probability = clip(beta_posterior_mean(
            weighted_wins,
            weighted_total,
            self.params.alpha,
            self.params.beta,
        ));

        H2HResult::Weighted {
            summary,
            probability,
            logit: logit(probability),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PlayerId;
    use crate::domain::models::fixtures::*;
    use approx::assert_abs_diff_eq;

    fn player(id: i64) -> Player {
        Player {
            id: PlayerId(id),
            name: format!("Player {id}"),
        }
    }

    fn estimator() -> HeadToHeadEstimator {
        HeadToHeadEstimator::new(HeadToHeadParams::default()).unwrap()
    }

    /// Meetings of players 1 and 2 on consecutive months; `true` means player 1 won
    fn meetings(outcomes: &[bool]) -> Vec<MatchRecord> {
        outcomes
            .iter()
            .enumerate()
            .map(|(i, &one_won)| {
                let day = date(2020, 1 + i as u32, 1);
                if one_won {
                    record(day, (1, 10), (2, 20))
                } else {
                    record(day, (2, 20), (1, 10))
                }
            })
            .collect()
    }

    #[test]
    fn test_no_meetings() {
        let records = vec![record(date(2020, 1, 1), (1, 10), (3, 20))];
        let result = estimator().compute(&records, &player(1), &player(2));
        assert!(matches!(result, H2HResult::NoHistory { .. }));
        assert_eq!(result.logit(), None);
        assert!(result.summary().is_none());
    }

    #[test]
    fn test_three_meetings_give_summary_only() {
        let records = meetings(&[true, true, false]);
        let result = estimator().compute(&records, &player(1), &player(2));

        let H2HResult::Insufficient { summary } = &result else {
            panic!("expected summary only, got {result:?}");
        };
        assert_eq!((summary.total, summary.wins_a, summary.wins_b), (3, 2, 1));
        assert_eq!(result.logit(), None);
        assert_eq!(
            summary.to_string(),
            "Head-to-head: 3 matches (Player 1 2 x 1 Player 2)"
        );
    }

    #[test]
    fn test_four_meetings_give_weighted_result() {
        // Oldest to newest: W W L W
        let records = meetings(&[true, true, false, true]);
        let result = estimator().compute(&records, &player(1), &player(2));

        let g: f64 = 0.95;
        let wins = 1.0 + g * g + g * g * g;
        let total = 1.0 + g + g * g + g * g * g;
        let expected = (1.0 + wins) / (2.0 + total);

        let probability = result.probability().unwrap();
        assert_abs_diff_eq!(probability, expected, epsilon = 1e-12);
        assert_abs_diff_eq!(
            result.logit().unwrap(),
            (expected / (1.0 - expected)).ln(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let mut records = meetings(&[false, true, true, false, true, false]);
        let forward = estimator().compute(&records, &player(1), &player(2));
        records.reverse();
        records.swap(1, 4);
        let shuffled = estimator().compute(&records, &player(1), &player(2));
        assert_eq!(forward, shuffled);
    }

    #[test]
    fn test_latest_meeting_has_full_weight() {
        // With a tiny gamma only the most recent meeting matters
        let params = HeadToHeadParams {
            gamma: 1e-9,
            ..HeadToHeadParams::default()
        };
        let records = meetings(&[false, false, false, true]);
        let result = HeadToHeadEstimator::new(params)
            .unwrap()
            .compute(&records, &player(1), &player(2));
        assert_abs_diff_eq!(result.probability().unwrap(), 2.0 / 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_same_event_meetings_weighted_by_round() {
        // Tour finals: player 1 took the group match, player 2 the semifinal
        let params = HeadToHeadParams {
            gamma: 0.5,
            ..HeadToHeadParams::default()
        };
        let finals = date(2024, 11, 10);
        let records = vec![
            record_in_round(finals, "SF", (2, 20), (1, 10)),
            record_in_round(finals, "RR", (1, 10), (2, 20)),
            record_in_round(date(2023, 3, 6), "F", (1, 10), (2, 20)),
            record_in_round(date(2023, 8, 14), "F", (1, 10), (2, 20)),
        ];

        let result = HeadToHeadEstimator::new(params)
            .unwrap()
            .compute(&records, &player(1), &player(2));

        // weights 1 (SF), 0.5 (RR), 0.25, 0.125: player 1 holds 0.875 of 1.875
        assert_abs_diff_eq!(
            result.probability().unwrap(),
            1.875 / 3.875,
            epsilon = 1e-9
        );
        assert!(result.probability().unwrap() < 0.5);
    }

    #[test]
    fn test_perspective_flips() {
        let records = meetings(&[true, true, false, true, true]);
        let ab = estimator().compute(&records, &player(1), &player(2));
        let ba = estimator().compute(&records, &player(2), &player(1));
        assert_abs_diff_eq!(ab.logit().unwrap(), -ba.logit().unwrap(), epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_gamma() {
        for gamma in [0.0, 1.5, f64::NAN] {
            let params = HeadToHeadParams {
                gamma,
                ..HeadToHeadParams::default()
            };
            assert!(HeadToHeadEstimator::new(params).is_err());
        }
    }
}
