use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::probability::{beta_posterior_mean, logit};
use crate::domain::{MatchRecord, PlayerId, chronological};
use crate::errors::PredictionError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormParams {
    /// Most recent matches considered before each cutoff
    pub window: usize,
    pub alpha: f64,
    pub beta: f64,
}

impl Default for FormParams {
    fn default() -> Self {
        Self {
            window: 20,
            alpha: 2.0,
            beta: 2.0,
        }
    }
}

impl FormParams {
    pub fn validate(&self) -> Result<(), PredictionError> {
        if self.window == 0 {
            return Err(PredictionError::invalid("form window", self.window));
        }
        if !(self.alpha > 0.0) || !(self.beta > 0.0) {
            return Err(PredictionError::invalid(
                "form prior",
                format!("alpha={} beta={}", self.alpha, self.beta),
            ));
        }
        Ok(())
    }

    /// Posterior mean of a player with an empty window
    pub fn prior_mean(&self) -> f64 {
        beta_posterior_mean(0.0, 0.0, self.alpha, self.beta)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FormPoint {
    pub date: NaiveDate,
    pub posterior_mean: f64,
}

/// Lazily evaluated form history of one player.
///
/// Yields one point per distinct match date, in increasing date order. Each
/// point only sees the player's matches dated strictly before it.
#[derive(Debug, Clone)]
pub struct FormSeries<'a> {
    player: PlayerId,
    history: Vec<&'a MatchRecord>,
    params: FormParams,
    cursor: usize,
}

impl<'a> FormSeries<'a> {
    fn new(records: &'a [MatchRecord], player: PlayerId, params: FormParams) -> Self {
        let mut history: Vec<&MatchRecord> = records.iter().filter(|r| r.involves(player)).collect();
        history.sort_by(|a, b| chronological(a, b));

        Self {
            player,
            history,
            params,
            cursor: 0,
        }
    }

    pub fn restart(&mut self) {
        self.cursor = 0;
    }

    fn posterior_before(&self, end: usize) -> f64 {
        let window = &self.history[end.saturating_sub(self.params.window)..end];
        let wins = window.iter().filter(|r| r.won_by(self.player)).count();
        beta_posterior_mean(
            wins as f64,
            window.len() as f64,
            self.params.alpha,
            self.params.beta,
        )
    }
}

impl Iterator for FormSeries<'_> {
    type Item = FormPoint;

    fn next(&mut self) -> Option<FormPoint> {
        let date = self.history.get(self.cursor)?.date();
        let posterior_mean = self.posterior_before(self.cursor);

        while self
            .history
            .get(self.cursor)
            .is_some_and(|r| r.date() == date)
        {
            self.cursor += 1;
        }

        Some(FormPoint {
            date,
            posterior_mean,
        })
    }
}

/// Recent-form estimator: Beta posterior mean over a trailing match window
#[derive(Debug, Clone, Copy)]
pub struct FormEstimator {
    params: FormParams,
}

impl FormEstimator {
    pub fn new(params: FormParams) -> Result<Self, PredictionError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> FormParams {
        self.params
    }

    pub fn series<'a>(&self, records: &'a [MatchRecord], player: PlayerId) -> FormSeries<'a> {
        FormSeries::new(records, player, self.params)
    }

    /// Posterior mean at the player's latest point, or the prior without history
    pub fn last_posterior(&self, records: &[MatchRecord], player: PlayerId) -> f64 {
        self.series(records, player)
            .last()
            .map_or_else(|| self.params.prior_mean(), |point| point.posterior_mean)
    }

    /// Logit of `last_posterior`
    pub fn last_form(&self, records: &[MatchRecord], player: PlayerId) -> f64 {
        logit(self.last_posterior(records, player))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::fixtures::*;
    use approx::assert_abs_diff_eq;

    fn estimator() -> FormEstimator {
        FormEstimator::new(FormParams::default()).unwrap()
    }

    #[test]
    fn test_cold_start_is_prior_mean() {
        let records = vec![record(date(2024, 1, 1), (1, 5), (2, 9))];
        let form = estimator();

        assert_eq!(form.last_posterior(&records, PlayerId(42)), 0.5);
        assert_eq!(form.last_form(&records, PlayerId(42)), 0.0);
        assert_eq!(form.series(&records, PlayerId(42)).count(), 0);
    }

    #[test]
    fn test_first_point_has_no_lookahead() {
        let records = vec![record(date(2024, 1, 1), (1, 5), (2, 9))];
        let points: Vec<FormPoint> = estimator().series(&records, PlayerId(1)).collect();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].posterior_mean, 0.5);
    }

    #[test]
    fn test_series_uses_strictly_earlier_matches() {
        let records = vec![
            record(date(2024, 1, 1), (1, 5), (2, 9)),
            record(date(2024, 1, 8), (1, 5), (3, 9)),
            record(date(2024, 1, 15), (4, 9), (1, 5)),
        ];
        let points: Vec<FormPoint> = estimator().series(&records, PlayerId(1)).collect();

        assert_eq!(points.len(), 3);
        assert_abs_diff_eq!(points[1].posterior_mean, 3.0 / 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(points[2].posterior_mean, 4.0 / 6.0, epsilon = 1e-12);
        // The loss on the last date is not visible to its own point
        assert_abs_diff_eq!(
            estimator().last_form(&records, PlayerId(1)),
            (2.0f64).ln(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_same_day_matches_share_one_point() {
        let day = date(2024, 6, 1);
        let records = vec![
            record(date(2024, 5, 1), (1, 5), (2, 9)),
            record(day, (1, 5), (3, 9)),
            record(day, (1, 5), (4, 9)),
        ];
        let points: Vec<FormPoint> = estimator().series(&records, PlayerId(1)).collect();

        assert_eq!(points.len(), 2);
        assert!(points.windows(2).all(|w| w[0].date < w[1].date));
        assert_abs_diff_eq!(points[1].posterior_mean, 3.0 / 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_window_limits_history() {
        let params = FormParams {
            window: 2,
            ..FormParams::default()
        };
        let form = FormEstimator::new(params).unwrap();
        let records = vec![
            record(date(2024, 1, 1), (9, 9), (1, 5)),
            record(date(2024, 1, 2), (9, 9), (1, 5)),
            record(date(2024, 1, 3), (1, 5), (9, 9)),
            record(date(2024, 1, 4), (1, 5), (9, 9)),
            record(date(2024, 1, 5), (1, 5), (9, 9)),
        ];
        // Window before the last date holds the two wins on the 3rd and 4th
        assert_abs_diff_eq!(form.last_posterior(&records, PlayerId(1)), 4.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_window_follows_rounds_within_an_event() {
        let form = FormEstimator::new(FormParams {
            window: 2,
            ..FormParams::default()
        })
        .unwrap();
        let event = date(2024, 1, 1);
        let mut records = vec![
            record_in_round(event, "QF", (4, 9), (1, 5)),
            record_in_round(event, "R32", (1, 5), (2, 9)),
            record_in_round(event, "R16", (1, 5), (3, 9)),
            record(date(2024, 2, 1), (1, 5), (5, 9)),
        ];

        // The window before February holds the R16 win and the QF loss
        let expected = 3.0 / 6.0;
        assert_abs_diff_eq!(form.last_posterior(&records, PlayerId(1)), expected, epsilon = 1e-12);

        records.swap(0, 2);
        assert_abs_diff_eq!(form.last_posterior(&records, PlayerId(1)), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_same_day_order_ignores_input_order() {
        let form = FormEstimator::new(FormParams {
            window: 2,
            ..FormParams::default()
        })
        .unwrap();
        let day = date(2024, 1, 1);
        let mut records = vec![
            record(day, (1, 5), (2, 9)),
            record(day, (1, 5), (3, 9)),
            record(day, (4, 9), (1, 5)),
            record(date(2024, 2, 1), (1, 5), (5, 9)),
        ];
        let forward = form.last_posterior(&records, PlayerId(1));

        records.swap(0, 2);
        assert_eq!(form.last_posterior(&records, PlayerId(1)), forward);
        records.swap(1, 2);
        assert_eq!(form.last_posterior(&records, PlayerId(1)), forward);
    }

    #[test]
    fn test_series_is_restartable() {
        let records = vec![
            record(date(2024, 1, 1), (1, 5), (2, 9)),
            record(date(2024, 2, 1), (1, 5), (2, 9)),
        ];
        let mut series = estimator().series(&records, PlayerId(1));
        let first: Vec<FormPoint> = series.by_ref().collect();
        series.restart();
        let second: Vec<FormPoint> = series.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_params() {
        assert!(FormEstimator::new(FormParams { window: 0, ..FormParams::default() }).is_err());
        assert!(FormEstimator::new(FormParams { alpha: 0.0, ..FormParams::default() }).is_err());
    }
}
