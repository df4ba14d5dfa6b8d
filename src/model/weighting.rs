use std::cmp::Ordering;

use crate::domain::{MatchRecord, chronological};

/// Weight of the `position`-th most recent meeting: gamma^position
pub fn recency_weight(position: usize, gamma: f64) -> f64 {
    // formula: weight = γ^i, so the latest meeting always counts fully
    gamma.powi(position as i32)
}

/// Orders matches most recent first: the reverse of [`chronological`], so a
/// final outranks the semifinal of the same event
pub fn most_recent_first(a: &MatchRecord, b: &MatchRecord) -> Ordering {
    chronological(b, a)
}

/// Sorts `matches` most recent first and pairs each one with its weight
pub fn apply_recency_weights<'a>(
    matches: &mut [&'a MatchRecord],
    gamma: f64,
) -> Vec<(&'a MatchRecord, f64)> {
    matches.sort_by(|a, b| most_recent_first(a, b));
    matches
        .iter()
        .enumerate()
        .map(|(i, &m)| (m, recency_weight(i, gamma)))
        .collect()
}
