use log::{debug, info};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::probability::{beta_posterior_mean, clip, logit};
use crate::config::settings::BucketSettings;
use crate::domain::{MatchRecord, Rank};
use crate::errors::PredictionError;

// Beta(2,2) pseudo-counts for every cell
const CELL_PRIOR_ALPHA: f64 = 2.0;
const CELL_PRIOR_BETA: f64 = 2.0;

/// What `lookup` does when the bucket pair has no observed matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissPolicy {
    /// Closest populated cell by bucket distance, else the global base rate
    NearestBucket,
    /// Smoothed better-ranked win rate over the whole corpus
    BaseRate,
    /// Surface `PredictionError::LookupMiss`
    Strict,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GapSource {
    Observed,
    NearestBucket {
        best_bucket: String,
        gap_bucket: String,
    },
    BaseRate,
}

/// Probability that the numerically better-ranked player wins
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapLookup {
    pub best_bucket: String,
    pub gap_bucket: String,
    pub probability: f64,
    pub logit: f64,
    pub source: GapSource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableCell {
    pub best_bucket: String,
    pub gap_bucket: String,
    pub wins: u32,
    pub matches: u32,
    pub estimate: f64,
}

/// Smoothed empirical table of better-ranked wins, indexed by
/// (best-rank bucket, rank-gap bucket). Immutable once built.
#[derive(Debug, Clone)]
pub struct RankGapTable {
    buckets: BucketSettings,
    miss_policy: MissPolicy,
    wins: Array2<u32>,
    counts: Array2<u32>,
}

/// `(wins + 2) / (n + 4)`, strictly inside (0, 1) for every 0 <= wins <= n
pub fn smoothed_estimate(wins: u32, n: u32) -> f64 {
    beta_posterior_mean(wins as f64, n as f64, CELL_PRIOR_ALPHA, CELL_PRIOR_BETA)
}

impl RankGapTable {
    pub fn build(
        records: &[MatchRecord],
        buckets: BucketSettings,
        miss_policy: MissPolicy,
    ) -> Result<Self, PredictionError> {
        buckets.best_rank.validate()?;
        buckets.gap.validate()?;
        info!("Building rank-gap table from {} matches", records.len());

        let (wins, counts) = count_cells(records, &buckets);
        let table = Self {
            buckets,
            miss_policy,
            wins,
            counts,
        };

        info!(
            "Rank-gap table populated {} of {} cells",
            table.populated_cells(),
            table.counts.len()
        );
        Ok(table)
    }

    pub fn lookup(&self, rank_a: Rank, rank_b: Rank) -> Result<GapLookup, PredictionError> {
        if rank_a == 0 || rank_b == 0 {
            return Err(PredictionError::invalid("rank", format!("{rank_a} vs {rank_b}")));
        }

        let best = self.buckets.best_rank.index_of(rank_a.min(rank_b));
        let gap = self.buckets.gap.index_of(rank_a.abs_diff(rank_b));

        let (estimate, source) = match self.estimate(best, gap) {
            Some(p) => (p, GapSource::Observed),
            None => self.resolve_miss(best, gap)?,
        };

        let probability = clip(estimate);
        Ok(GapLookup {
            best_bucket: self.buckets.best_rank.label(best).to_string(),
            gap_bucket: self.buckets.gap.label(gap).to_string(),
            probability,
            logit: logit(probability),
            source,
        })
    }

    /// Smoothed estimate of a cell, `None` when the cell has no matches
    pub fn estimate(&self, best: usize, gap: usize) -> Option<f64> {
        let n = *self.counts.get((best, gap))?;
        (n > 0).then(|| smoothed_estimate(self.wins[[best, gap]], n))
    }

    pub fn base_rate(&self) -> f64 {
        smoothed_estimate(self.wins.sum(), self.counts.sum())
    }

    pub fn total_matches(&self) -> u32 {
        self.counts.sum()
    }

    pub fn populated_cells(&self) -> usize {
        self.counts.iter().filter(|&&n| n > 0).count()
    }

    pub fn buckets(&self) -> &BucketSettings {
        &self.buckets
    }

    pub fn miss_policy(&self) -> MissPolicy {
        self.miss_policy
    }

    pub fn cells(&self) -> Vec<TableCell> {
        self.counts
            .indexed_iter()
            .filter(|&(_, &n)| n > 0)
            .map(|((best, gap), &n)| TableCell {
                best_bucket: self.buckets.best_rank.label(best).to_string(),
                gap_bucket: self.buckets.gap.label(gap).to_string(),
                wins: self.wins[[best, gap]],
                matches: n,
                estimate: smoothed_estimate(self.wins[[best, gap]], n),
            })
            .collect()
    }

    fn resolve_miss(&self, best: usize, gap: usize) -> Result<(f64, GapSource), PredictionError> {
        let best_label = self.buckets.best_rank.label(best);
        let gap_label = self.buckets.gap.label(gap);
        debug!("No rank-gap data for ({best_label}, {gap_label}), applying {:?}", self.miss_policy);

        match self.miss_policy {
            MissPolicy::Strict => Err(PredictionError::LookupMiss {
                best_bucket: best_label.to_string(),
                gap_bucket: gap_label.to_string(),
            }),
            MissPolicy::BaseRate => Ok((self.base_rate(), GapSource::BaseRate)),
            MissPolicy::NearestBucket => Ok(match self.nearest_populated(best, gap) {
                Some((b, g)) => (
                    smoothed_estimate(self.wins[[b, g]], self.counts[[b, g]]),
                    GapSource::NearestBucket {
                        best_bucket: self.buckets.best_rank.label(b).to_string(),
                        gap_bucket: self.buckets.gap.label(g).to_string(),
                    },
                ),
                None => (self.base_rate(), GapSource::BaseRate),
            }),
        }
    }

    // Manhattan distance over bucket indices; ties go to the first cell in row-major order
    fn nearest_populated(&self, best: usize, gap: usize) -> Option<(usize, usize)> {
        self.counts
            .indexed_iter()
            .filter(|&(_, &n)| n > 0)
            .min_by_key(|&((b, g), _)| b.abs_diff(best) + g.abs_diff(gap))
            .map(|(idx, _)| idx)
    }
}

fn count_cells(records: &[MatchRecord], buckets: &BucketSettings) -> (Array2<u32>, Array2<u32>) {
    let shape = (buckets.best_rank.len(), buckets.gap.len());
    let mut wins = Array2::<u32>::zeros(shape);
    let mut counts = Array2::<u32>::zeros(shape);

    for record in records {
        let best = buckets.best_rank.index_of(record.best_rank());
        let gap = buckets.gap.index_of(record.gap());

        counts[[best, gap]] += 1;
        if record.better_ranked_won() {
            wins[[best, gap]] += 1;
        }
    }

    (wins, counts)
}

impl fmt::Display for RankGapTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>10}", "best\\gap")?;
        for label in self.buckets.gap.labels() {
            write!(f, "{:>9}", label)?;
        }
        writeln!(f)?;

        for (best, label) in self.buckets.best_rank.labels().iter().enumerate() {
            write!(f, "{:>10}", label)?;
            for gap in 0..self.buckets.gap.len() {
                match self.estimate(best, gap) {
                    Some(p) => write!(f, "{:>9.3}", p)?,
                    None => write!(f, "{:>9}", "-")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
