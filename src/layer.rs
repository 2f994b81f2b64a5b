use rayon::prelude::*;
use serde::Serialize;

use crate::types::{LossSet, RecoveryDistribution};

/// One excess-of-loss layer. Coverage runs from `excess` up to
/// `excess + limit` per claim; the aggregate terms apply across a whole
/// trial (year). `aggregate_limit = None` means uncapped; a deductible of
/// `None` means no annual deductible.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    pub excess: f64,
    pub limit: f64,
    pub aggregate_limit: Option<f64>,
    pub aggregate_deductible: Option<f64>,
    pub premium: f64,
    /// Per-reinstatement cost fractions of premium, in consumption order.
    /// The length is the number of reinstatements available per year.
    pub reinstatement_costs: Vec<f64>,
}

impl Layer {
    /// Strip the annual aggregate terms, keeping per-claim terms and premium.
    /// The sensitivity sweep runs its grid on layers in this form.
    pub fn without_aggregates(&self) -> Layer {
        Layer {
            aggregate_limit: None,
            aggregate_deductible: None,
            ..self.clone()
        }
    }

    /// A layer whose excess reaches its limit covers nothing: the band from
    /// `excess` to `excess + limit` is treated as absent. Representable, not
    /// an error.
    pub fn is_degenerate(&self) -> bool {
        self.limit <= 0.0 || self.excess >= self.limit
    }

    /// Apply this layer to one trial's (policy-capped) claims.
    ///
    /// Order of operations: per-claim clamp into the layer band, reinstatement
    /// gating, sum to a gross annual recovery, then aggregate deductible, then
    /// aggregate limit. A reinstatement is consumed only when the per-claim
    /// limit was exhausted by an earlier claim and a later claim actually
    /// draws on the layer; claims arriving with no capacity and no
    /// reinstatements left recover nothing.
    pub fn apply_trial(&self, claims: &[f64]) -> TrialOutcome {
        let mut per_claim = vec![0.0; claims.len()];
        if self.is_degenerate() {
            return TrialOutcome {
                recovery: 0.0,
                reinstatement_cost: 0.0,
                reinstatements_used: 0,
                per_claim,
            };
        }

        let mut gross = 0.0;
        let mut cost = 0.0;
        let mut used = 0;
        let mut exhausted = false;

        for (i, &claim) in claims.iter().enumerate() {
            let recovery = (claim - self.excess).clamp(0.0, self.limit);
            if recovery <= 0.0 {
                // Below the attachment: does not draw, does not reinstate.
                continue;
            }
            if exhausted {
                if used < self.reinstatement_costs.len() {
                    cost += self.reinstatement_costs[used] * self.premium;
                    used += 1;
                    exhausted = false;
                } else {
                    continue;
                }
            }
            per_claim[i] = recovery;
            gross += recovery;
            if recovery >= self.limit {
                exhausted = true;
            }
        }

        let net = match self.aggregate_deductible {
            Some(d) => (gross - d).max(0.0),
            None => gross,
        };
        let capped = match self.aggregate_limit {
            Some(a) => net.min(a),
            None => net,
        };

        TrialOutcome {
            recovery: capped,
            reinstatement_cost: cost,
            reinstatements_used: used,
            per_claim,
        }
    }
}

/// Result of applying one layer to one trial. `reinstatement_cost` sits on
/// the cost side of the trial and never feeds back into `recovery`.
/// `per_claim` holds the pre-aggregate per-claim recoveries; tower
/// composition subtracts them to form the residual claims for the next
/// layer up.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialOutcome {
    pub recovery: f64,
    pub reinstatement_cost: f64,
    pub reinstatements_used: usize,
    pub per_claim: Vec<f64>,
}

/// Apply an ordered tower of layers to one trial. Layer i+1 sees each claim
/// net of what layer i actually paid on it. The shipped parameter surface
/// drives a single active layer; multi-layer towers compose here without
/// touching the per-layer function.
pub fn apply_tower(layers: &[Layer], claims: &[f64]) -> Vec<TrialOutcome> {
    let mut residual: Vec<f64> = claims.to_vec();
    layers
        .iter()
        .map(|layer| {
            let outcome = layer.apply_trial(&residual);
            for (r, paid) in residual.iter_mut().zip(&outcome.per_claim) {
                *r -= paid;
            }
            outcome
        })
        .collect()
}

/// Per-trial totals after the whole tower: summed recovery and summed
/// reinstatement cost, one value per trial, in trial order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TowerResult {
    pub recoveries: RecoveryDistribution,
    pub reinstatement_costs: Vec<f64>,
}

/// Apply the tower to every trial and aggregate to one scalar recovery per
/// trial. Trial order is preserved; downstream consumers only need the
/// empirical distribution.
pub fn apply_to_loss_set(layers: &[Layer], losses: &LossSet) -> TowerResult {
    let per_trial: Vec<(f64, f64)> = losses
        .trials()
        .iter()
        .map(|trial| {
            let outcomes = apply_tower(layers, trial.claims());
            let recovery = outcomes.iter().map(|o| o.recovery).sum();
            let cost = outcomes.iter().map(|o| o.reinstatement_cost).sum();
            (recovery, cost)
        })
        .collect();
    split_totals(per_trial)
}

/// Rayon variant of `apply_to_loss_set`. The per-trial computation is pure,
/// so the result is identical to the serial path; only wall-clock differs.
pub fn apply_to_loss_set_parallel(layers: &[Layer], losses: &LossSet) -> TowerResult {
    let per_trial: Vec<(f64, f64)> = losses
        .trials()
        .par_iter()
        .map(|trial| {
            let outcomes = apply_tower(layers, trial.claims());
            let recovery = outcomes.iter().map(|o| o.recovery).sum();
            let cost = outcomes.iter().map(|o| o.reinstatement_cost).sum();
            (recovery, cost)
        })
        .collect();
    split_totals(per_trial)
}

fn split_totals(per_trial: Vec<(f64, f64)>) -> TowerResult {
    let (recoveries, reinstatement_costs) = per_trial.into_iter().unzip();
    TowerResult {
        recoveries: RecoveryDistribution(recoveries),
        reinstatement_costs,
    }
}
