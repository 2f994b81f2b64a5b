use std::sync::atomic::AtomicBool;

use serde::Serialize;

use crate::bins::{self, Band};
use crate::error::SimError;
use crate::layer;
use crate::losses::{self, FrequencySeverityModel};
use crate::params::SimulationParameters;
use crate::statistics::{self, StatsSummary};
use crate::sweep::{self, SensitivityCurves};
use crate::types::RecoveryDistribution;

/// Everything `simulate` hands back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationOutput {
    pub recoveries: RecoveryDistribution,
    /// Per-trial reinstatement costs — the premium side of the ledger,
    /// reported alongside but never folded into the recoveries.
    pub reinstatement_costs: Vec<f64>,
    pub statistics: StatsSummary,
    pub bins: Vec<Band>,
    pub sensitivity: SensitivityCurves,
}

/// Run one full simulation: validate, generate losses, cap at the policy
/// limit, apply the layer, then derive statistics, bins, and the two
/// sensitivity curves from the shared loss set.
///
/// Either completes fully or fails with a typed error before returning
/// anything; there is no partial output.
pub fn simulate(params: &SimulationParameters) -> Result<SimulationOutput, SimError> {
    simulate_with_cancel(params, &AtomicBool::new(false))
}

/// `simulate`, cancellable between sensitivity grid points. A raised flag
/// aborts the run with `SimError::Cancelled`.
pub fn simulate_with_cancel(
    params: &SimulationParameters,
    cancel: &AtomicBool,
) -> Result<SimulationOutput, SimError> {
    params.validate()?;

    let model = FrequencySeverityModel::new(params.frequency_model()?, params.severity_model()?);
    let raw_losses = if params.parallel {
        model.generate_parallel(params.n_trials, params.seed)
    } else {
        model.generate(params.n_trials, params.seed)
    };
    let capped = losses::apply_policy_cap(&raw_losses, params.policy_limit);
    drop(raw_losses);

    let tower = [params.active_layer()];
    let result = if params.parallel {
        layer::apply_to_loss_set_parallel(&tower, &capped)
    } else {
        layer::apply_to_loss_set(&tower, &capped)
    };

    if let Some(bad) = result.recoveries.values().iter().find(|v| !v.is_finite()) {
        return Err(SimError::NumericOverflow(format!("recovery value {bad}")));
    }

    let statistics = statistics::summarise(&result.recoveries)?;
    let bins = bins::bin_recoveries(&result.recoveries);

    let outcome = sweep::sweep(&tower[0], &capped, params.parallel, cancel);
    if outcome.cancelled {
        return Err(SimError::Cancelled);
    }

    Ok(SimulationOutput {
        recoveries: result.recoveries,
        reinstatement_costs: result.reinstatement_costs,
        statistics,
        bins,
        sensitivity: outcome.curves,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;

    use proptest::prelude::*;

    use super::*;
    use crate::layer::Layer;

    fn small_params() -> SimulationParameters {
        SimulationParameters {
            n_trials: 2_000,
            parallel: false,
            ..SimulationParameters::canonical()
        }
    }

    #[test]
    fn invalid_parameters_fail_before_sampling() {
        let mut p = small_params();
        p.aggregate_deductible = p.excess; // violates agg_ded > excess
        assert!(matches!(simulate(&p), Err(SimError::InvalidParameter(_))));

        let mut p = small_params();
        p.n_trials = 0;
        assert!(matches!(simulate(&p), Err(SimError::InvalidParameter(_))));

        let mut p = small_params();
        p.aggregate_limit = p.limit / 2.0;
        assert!(matches!(simulate(&p), Err(SimError::InvalidParameter(_))));

        let mut p = small_params();
        p.severity_scale = -1.0;
        assert!(matches!(simulate(&p), Err(SimError::InvalidParameter(_))));
    }

    /// Same seed and parameters → bit-identical recovery distribution.
    #[test]
    fn repeat_runs_are_bit_identical() {
        let p = small_params();
        let a = simulate(&p).unwrap();
        let b = simulate(&p).unwrap();
        assert_eq!(a.recoveries, b.recoveries);
        assert_eq!(a, b);
    }

    /// Serial and parallel modes must agree exactly, not just statistically.
    #[test]
    fn parallel_mode_matches_reference_mode() {
        let serial = simulate(&small_params()).unwrap();
        let parallel = simulate(&SimulationParameters {
            parallel: true,
            ..small_params()
        })
        .unwrap();
        assert_eq!(serial, parallel);
    }

    /// A policy that cannot attach produces an all-zero distribution, not an
    /// error.
    #[test]
    fn non_positive_policy_limit_gives_all_zero_recoveries() {
        let mut p = small_params();
        p.policy_limit = 0.0;
        let out = simulate(&p).unwrap();
        assert!(out.recoveries.values().iter().all(|&r| r == 0.0));
        assert_eq!(out.statistics.prob_positive, 0.0);
        assert_eq!(out.statistics.worst_case, 0.0);
        assert_eq!(out.bins.len(), 1); // only the zero band survives
    }

    #[test]
    fn degenerate_layer_gives_all_zero_recoveries() {
        let mut p = small_params();
        p.excess = p.limit; // zero-width band
        p.aggregate_deductible = p.excess + 1.0;
        p.aggregate_limit = p.limit;
        let out = simulate(&p).unwrap();
        assert!(out.recoveries.values().iter().all(|&r| r == 0.0));
    }

    /// The canonical scenario: mean recovery positive, recovery probability
    /// strictly between 0 and 1, worst case within the aggregate limit.
    #[test]
    fn canonical_scenario_headline_figures() {
        let p = SimulationParameters::canonical();
        let out = simulate(&p).unwrap();

        assert!(out.statistics.mean > 0.0);
        assert!(out.statistics.prob_positive > 0.0);
        assert!(out.statistics.prob_positive < 1.0);
        assert!(out.statistics.worst_case <= 20_000_000.0);
        for &r in out.recoveries.values() {
            assert!(r >= 0.0);
            assert!(r <= 20_000_000.0);
        }
        assert_eq!(out.recoveries.len(), p.n_trials);
        assert_eq!(out.reinstatement_costs.len(), p.n_trials);
    }

    /// Binning completeness on a real run: band counts plus the deliberately
    /// excluded (0, 1000] population equal the trial count.
    #[test]
    fn bins_account_for_every_trial() {
        let out = simulate(&small_params()).unwrap();
        let excluded = out
            .recoveries
            .values()
            .iter()
            .filter(|&&r| r > 0.0 && r <= 1_000.0)
            .count() as u64;
        let binned: u64 = out.bins.iter().map(|b| b.count).sum();
        assert_eq!(binned + excluded, out.recoveries.len() as u64);
    }

    #[test]
    fn cancellation_surfaces_as_typed_error() {
        let cancel = AtomicBool::new(true);
        let err = simulate_with_cancel(&small_params(), &cancel).unwrap_err();
        assert_eq!(err, SimError::Cancelled);
    }

    #[test]
    fn output_serializes_to_json() {
        let mut p = small_params();
        p.n_trials = 50;
        let out = simulate(&p).unwrap();
        let json = serde_json::to_value(&out).unwrap();
        assert!(json["statistics"]["mean"].is_number());
        assert!(json["sensitivity"]["limit_curve"].is_array());
        assert!(json["recoveries"].is_array());
    }

    fn claims_strategy() -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec(0.0_f64..20_000_000.0, 0..8)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        /// For fixed claims and excess, a wider limit never pays less.
        /// The schedule covers every claim so reinstatement exhaustion never
        /// blocks a draw; with blocking the comparison is only statistical.
        #[test]
        fn recovery_monotone_in_limit(
            claims in claims_strategy(),
            excess in 0.0_f64..5_000_000.0,
            lo in 0.0_f64..10_000_000.0,
            delta in 0.0_f64..10_000_000.0,
        ) {
            let layer_at = |limit: f64| Layer {
                excess,
                limit,
                aggregate_limit: None,
                aggregate_deductible: None,
                premium: 1_000.0,
                reinstatement_costs: vec![1.0; 8],
            };
            let narrow = layer_at(lo).apply_trial(&claims).recovery;
            let wide = layer_at(lo + delta).apply_trial(&claims).recovery;
            prop_assert!(wide >= narrow, "limit {lo} paid {narrow}, limit {} paid {wide}", lo + delta);
        }

        /// For fixed claims and limit, a higher attachment never pays more.
        #[test]
        fn recovery_antitone_in_excess(
            claims in claims_strategy(),
            limit in 0.0_f64..10_000_000.0,
            lo in 0.0_f64..5_000_000.0,
            delta in 0.0_f64..5_000_000.0,
        ) {
            let layer_at = |excess: f64| Layer {
                excess,
                limit,
                aggregate_limit: None,
                aggregate_deductible: None,
                premium: 1_000.0,
                reinstatement_costs: vec![1.0; 8],
            };
            let low = layer_at(lo).apply_trial(&claims).recovery;
            let high = layer_at(lo + delta).apply_trial(&claims).recovery;
            prop_assert!(high <= low, "excess {lo} paid {low}, excess {} paid {high}", lo + delta);
        }

        /// Conservation: no per-claim payment above the limit, no trial
        /// payment above the aggregate limit.
        #[test]
        fn recovery_conserves_limits(
            claims in claims_strategy(),
            excess in 0.0_f64..5_000_000.0,
            limit in 1.0_f64..10_000_000.0,
            aggregate in 1.0_f64..30_000_000.0,
        ) {
            let layer = Layer {
                excess,
                limit,
                aggregate_limit: Some(aggregate),
                aggregate_deductible: None,
                premium: 1_000.0,
                reinstatement_costs: vec![1.0, 1.0, 1.0],
            };
            let out = layer.apply_trial(&claims);
            for &r in &out.per_claim {
                prop_assert!(r <= limit);
            }
            prop_assert!(out.recovery <= aggregate);
        }
    }
}
