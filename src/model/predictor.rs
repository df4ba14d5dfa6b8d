use chrono::Local;
use log::debug;

use super::form::FormEstimator;
use super::head_to_head::{HeadToHeadEstimator, HeadToHeadParams};
use super::probability::sigmoid;
use super::rank_gap::RankGapTable;
use super::types::{Diagnostics, PlayerOutcome, Prediction, PredictionRequest};
use crate::config::settings::ModelSettings;
use crate::domain::{MatchCorpus, MatchRecord, Player, Rank, chronological};
use crate::errors::PredictionError;

/// A player with the rank from their latest appearance
#[derive(Debug, Clone, PartialEq)]
struct Standing {
    player: Player,
    rank: Rank,
}

/// Fuses the rank-gap baseline, recent form and head-to-head record in logit space.
///
/// Holds only shared references, so any number of predictors can run over the
/// same corpus and table at once.
pub struct Predictor<'a> {
    corpus: &'a MatchCorpus,
    table: &'a RankGapTable,
    form: FormEstimator,
    h2h: HeadToHeadParams,
    lambda: f64,
}

impl<'a> Predictor<'a> {
    pub fn new(
        corpus: &'a MatchCorpus,
        table: &'a RankGapTable,
        settings: &ModelSettings,
    ) -> Result<Self, PredictionError> {
        let h2h = settings.h2h_params();
        h2h.validate()?;

        Ok(Self {
            corpus,
            table,
            form: FormEstimator::new(settings.form_params())?,
            h2h,
            lambda: settings.lambda_h2h,
        })
    }

    pub fn predict(&self, request: &PredictionRequest) -> Result<Prediction, PredictionError> {
        let lambda = request.lambda.unwrap_or(self.lambda);
        if !lambda.is_finite() {
            return Err(PredictionError::invalid("lambda", lambda));
        }
        let h2h = HeadToHeadEstimator::new(HeadToHeadParams {
            gamma: request.gamma.unwrap_or(self.h2h.gamma),
            ..self.h2h
        })?;
        let as_of = request.as_of.unwrap_or_else(|| Local::now().date_naive());

        let records = self.corpus.until(as_of);
        let a = self.standing(records, &request.player_a)?;
        let b = self.standing(records, &request.player_b)?;
        if a.player.id == b.player.id {
            return Err(PredictionError::invalid("players", &a.player.name));
        }

        // The better-ranked role goes to the lower rank number, ties broken by
        // id, so the orientation never depends on argument order
        let a_is_better = (a.rank, a.player.id) < (b.rank, b.player.id);
        let (better, other) = if a_is_better { (&a, &b) } else { (&b, &a) };

        let gap = self.table.lookup(better.rank, other.rank)?;
        let form_logit_a = self.form.last_form(records, a.player.id);
        let form_logit_b = self.form.last_form(records, b.player.id);
        let form_edge = if a_is_better {
            form_logit_a - form_logit_b
        } else {
            form_logit_b - form_logit_a
        };

        let head_to_head = h2h.compute(records, &better.player, &other.player);
        let h2h_logit = head_to_head.logit().unwrap_or(0.0);

        let final_logit = gap.logit + form_edge + lambda * h2h_logit;
        let p_better = sigmoid(final_logit);
        let (prob_a, prob_b) = if a_is_better {
            (p_better, 1.0 - p_better)
        } else {
            (1.0 - p_better, p_better)
        };

        debug!(
            "{} vs {}: gap {:.3}, form {:.3}, h2h {:.3} -> {:.3}",
            a.player.name, b.player.name, gap.logit, form_edge, h2h_logit, final_logit
        );

        let favorite = if prob_a > prob_b || (prob_a == prob_b && a_is_better) {
            a.player.name.clone()
        } else {
            b.player.name.clone()
        };

        Ok(Prediction {
            player_a: outcome(&a, prob_a),
            player_b: outcome(&b, prob_b),
            favorite,
            diagnostics: Diagnostics {
                as_of,
                better_ranked: better.player.name.clone(),
                gap,
                form_logit_a,
                form_logit_b,
                head_to_head,
                h2h_logit,
                lambda,
                gamma: h2h.params().gamma,
                final_logit,
            },
        })
    }

    fn standing(&self, records: &[MatchRecord], name: &str) -> Result<Standing, PredictionError> {
        let player = self.corpus.resolve(name)?;
        last_rank(records, &player)
            .map(|rank| Standing { player, rank })
            .ok_or_else(|| PredictionError::NoHistory {
                player: name.trim().to_string(),
            })
    }
}

/// Rank held at the player's chronologically last appearance in `records`
fn last_rank(records: &[MatchRecord], player: &Player) -> Option<Rank> {
    records
        .iter()
        .filter_map(|r| r.entrant(player.id).map(|e| (r, e.rank)))
        .max_by(|(a, _), (b, _)| chronological(a, b))
        .map(|(_, rank)| rank)
}

fn outcome(standing: &Standing, probability: f64) -> PlayerOutcome {
    PlayerOutcome {
        id: standing.player.id,
        name: standing.player.name.clone(),
        rank: standing.rank,
        probability,
    }
}

/// Convenience for one-off calls that do not keep a `Predictor` around
pub fn predict(
    corpus: &MatchCorpus,
    table: &RankGapTable,
    settings: &ModelSettings,
    request: &PredictionRequest,
) -> Result<Prediction, PredictionError> {
    Predictor::new(corpus, table, settings)?.predict(request)
}
