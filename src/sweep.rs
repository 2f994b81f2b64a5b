use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

use crate::layer::{self, Layer};
use crate::types::LossSet;

/// Grid resolution for both sweeps.
pub const SWEEP_POINTS: usize = 11;
/// Upper end of the limit sweep.
pub const LIMIT_SWEEP_MAX: f64 = 10_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub parameter: f64,
    pub mean_recovery: f64,
}

/// Mean-recovery-vs-parameter curves for the two swept contract terms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityCurves {
    pub limit_curve: Vec<CurvePoint>,
    pub excess_curve: Vec<CurvePoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepOutcome {
    pub curves: SensitivityCurves,
    /// True when the cancel flag stopped the sweep early; the curves hold
    /// the points completed before cancellation, uncorrupted.
    pub cancelled: bool,
}

fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![lo];
    }
    let step = (hi - lo) / (n - 1) as f64;
    // Pin the final point to hi; accumulated rounding must not shift the
    // top of the grid.
    (0..n)
        .map(|i| if i == n - 1 { hi } else { lo + step * i as f64 })
        .collect()
}

fn mean_recovery(layer: &Layer, losses: &LossSet, parallel: bool) -> f64 {
    let result = if parallel {
        layer::apply_to_loss_set_parallel(std::slice::from_ref(layer), losses)
    } else {
        layer::apply_to_loss_set(std::slice::from_ref(layer), losses)
    };
    let values = result.recoveries.values();
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sweep `limit` over [0, 10M] and `excess` over [0, max(limit − 1, 10M)],
/// 11 points each, holding the other term at its base value. Both sweeps
/// re-apply the layer to the *same* policy-capped loss set as the headline
/// run, so the curves are directly comparable to the main distribution.
///
/// The sweep layers carry no aggregate limit or deductible (only the
/// per-claim terms vary; premium and the reinstatement schedule carry over),
/// matching the calculator's effects display.
///
/// `cancel` is checked between grid points; a raised flag stops the sweep
/// without discarding the points already computed.
pub fn sweep(
    base: &Layer,
    capped_losses: &LossSet,
    parallel: bool,
    cancel: &AtomicBool,
) -> SweepOutcome {
    let base = base.without_aggregates();

    let mut limit_curve = Vec::with_capacity(SWEEP_POINTS);
    let mut excess_curve = Vec::with_capacity(SWEEP_POINTS);
    let mut cancelled = false;

    'outer: {
        for l in linspace(0.0, LIMIT_SWEEP_MAX, SWEEP_POINTS) {
            if cancel.load(Ordering::Relaxed) {
                cancelled = true;
                break 'outer;
            }
            let layer = Layer { limit: l, ..base.clone() };
            limit_curve.push(CurvePoint {
                parameter: l,
                mean_recovery: mean_recovery(&layer, capped_losses, parallel),
            });
        }

        let excess_hi = (base.limit - 1.0).max(LIMIT_SWEEP_MAX);
        for e in linspace(0.0, excess_hi, SWEEP_POINTS) {
            if cancel.load(Ordering::Relaxed) {
                cancelled = true;
                break 'outer;
            }
            let layer = Layer { excess: e, ..base.clone() };
            excess_curve.push(CurvePoint {
                parameter: e,
                mean_recovery: mean_recovery(&layer, capped_losses, parallel),
            });
        }
    }

    SweepOutcome {
        curves: SensitivityCurves { limit_curve, excess_curve },
        cancelled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Trial;

    fn base_layer() -> Layer {
        Layer {
            excess: 1_000_000.0,
            limit: 10_000_000.0,
            aggregate_limit: Some(20_000_000.0),
            aggregate_deductible: Some(2_000_000.0),
            premium: 5_000.0,
            reinstatement_costs: vec![1.0, 1.0, 1.0],
        }
    }

    fn losses() -> LossSet {
        LossSet(
            (0..200)
                .map(|i| Trial(vec![500_000.0 + 60_000.0 * i as f64]))
                .collect(),
        )
    }

    fn run() -> SweepOutcome {
        sweep(&base_layer(), &losses(), false, &AtomicBool::new(false))
    }

    #[test]
    fn eleven_points_per_curve_with_expected_ends() {
        let out = run();
        assert!(!out.cancelled);
        let lc = &out.curves.limit_curve;
        let ec = &out.curves.excess_curve;
        assert_eq!(lc.len(), SWEEP_POINTS);
        assert_eq!(ec.len(), SWEEP_POINTS);
        assert_eq!(lc[0].parameter, 0.0);
        assert_eq!(lc[10].parameter, 10_000_000.0);
        assert_eq!(ec[0].parameter, 0.0);
        // limit_base − 1 < 10M, so the excess grid tops out at 10M.
        assert_eq!(ec[10].parameter, 10_000_000.0);
    }

    /// Mean recovery is non-decreasing in limit and non-increasing in excess
    /// on a fixed loss set — exact, not statistical, because the losses are
    /// shared across grid points.
    #[test]
    fn curves_are_monotone() {
        let out = run();
        for pair in out.curves.limit_curve.windows(2) {
            assert!(
                pair[1].mean_recovery >= pair[0].mean_recovery,
                "limit curve decreased: {pair:?}"
            );
        }
        for pair in out.curves.excess_curve.windows(2) {
            assert!(
                pair[1].mean_recovery <= pair[0].mean_recovery,
                "excess curve increased: {pair:?}"
            );
        }
    }

    #[test]
    fn zero_limit_point_recovers_nothing() {
        let out = run();
        assert_eq!(out.curves.limit_curve[0].mean_recovery, 0.0);
    }

    /// A wide base limit stretches the excess grid to limit − 1.
    #[test]
    fn excess_grid_follows_large_base_limit() {
        let mut layer = base_layer();
        layer.limit = 50_000_000.0;
        let out = sweep(&layer, &losses(), false, &AtomicBool::new(false));
        assert_eq!(out.curves.excess_curve[10].parameter, 49_999_999.0);
    }

    /// A pre-raised cancel flag yields an empty, uncorrupted result.
    #[test]
    fn cancellation_stops_between_points() {
        let out = sweep(&base_layer(), &losses(), false, &AtomicBool::new(true));
        assert!(out.cancelled);
        assert!(out.curves.limit_curve.is_empty());
        assert!(out.curves.excess_curve.is_empty());
    }

    /// Sweep layers drop the aggregate terms: with a tiny aggregate limit on
    /// the base layer, sweep means must still reflect uncapped recoveries.
    #[test]
    fn sweep_ignores_base_aggregate_terms() {
        let mut tight = base_layer();
        tight.aggregate_limit = Some(tight.limit); // binding cap if applied
        tight.aggregate_deductible = Some(tight.excess + 1.0);
        let a = sweep(&tight, &losses(), false, &AtomicBool::new(false));
        let b = run();
        assert_eq!(a.curves, b.curves);
    }
}
