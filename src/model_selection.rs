//! Information-criterion ranking of candidate fits.

use crate::models::FittedModel;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A fitted model with its position in the ranking.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RankedModel {
    /// 1-based rank, 1 being the preferred model
    pub rank: usize,
    pub model: FittedModel,
    /// AIC distance to the best model (0 for rank 1)
    pub delta_aic: f64,
}

/// Orders candidates by ascending AIC, ties broken by ascending BIC.
///
/// Models whose AIC or BIC is not finite cannot be compared and are dropped.
/// The sort is stable, so fully tied models keep their input order.
pub fn rank_models(models: &[FittedModel]) -> Vec<RankedModel> {
    let mut rankable: Vec<&FittedModel> = models.iter().filter(|m| m.is_rankable()).collect();
    let dropped = models.len() - rankable.len();
    if dropped > 0 {
        log::debug!("{} candidate model(s) with undefined AIC/BIC left unranked", dropped);
    }

    rankable.sort_by(|a, b| a.aic.total_cmp(&b.aic).then(a.bic.total_cmp(&b.bic)));

    let best_aic = rankable.first().map_or(f64::NAN, |m| m.aic);
    rankable
        .into_iter()
        .enumerate()
        .map(|(i, model)| RankedModel {
            rank: i + 1,
            delta_aic: model.aic - best_aic,
            model: model.clone(),
        })
        .collect()
}

/// The top-ranked model, or `None` when no candidate is rankable.
pub fn select_best(models: &[FittedModel]) -> Option<RankedModel> {
    rank_models(models).into_iter().next()
}
