use serde::Serialize;

use crate::error::SimError;
use crate::types::RecoveryDistribution;

/// Headline statistics over one recovery distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    pub mean: f64,
    /// 50th percentile, linear interpolation between order statistics.
    pub median: f64,
    /// Midpoint of the most populated bin of a 100-bin equal-width histogram
    /// over [min, max]; ties break to the lowest bin.
    pub mode: f64,
    pub p1: f64,
    pub p25: f64,
    pub p75: f64,
    pub p99: f64,
    /// Fraction of trials with strictly positive recovery.
    pub prob_positive: f64,
    /// max(R) — the worst case for the reinsurer.
    pub worst_case: f64,
}

const MODE_BINS: usize = 100;

/// Summarise a recovery distribution. Fails with `EmptyDistribution` on zero
/// trials rather than returning undefined statistics.
pub fn summarise(recoveries: &RecoveryDistribution) -> Result<StatsSummary, SimError> {
    if recoveries.is_empty() {
        return Err(SimError::EmptyDistribution);
    }

    let mut sorted = recoveries.values().to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();

    let interp = |p: f64| -> f64 {
        let h = p * (n - 1) as f64;
        let lo = h.floor() as usize;
        let hi = (lo + 1).min(n - 1);
        let frac = h - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    };

    let mean = sorted.iter().sum::<f64>() / n as f64;
    let positive = sorted.iter().filter(|&&r| r > 0.0).count();

    Ok(StatsSummary {
        mean,
        median: interp(0.50),
        mode: histogram_mode(&sorted),
        p1: interp(0.01),
        p25: interp(0.25),
        p75: interp(0.75),
        p99: interp(0.99),
        prob_positive: positive as f64 / n as f64,
        worst_case: sorted[n - 1],
    })
}

/// Mode estimate from a fixed-width histogram over the sorted sample.
/// A degenerate sample (min == max) has that single value as its mode.
fn histogram_mode(sorted: &[f64]) -> f64 {
    let min = sorted[0];
    let max = sorted[sorted.len() - 1];
    if max <= min {
        return min;
    }
    let width = (max - min) / MODE_BINS as f64;

    let mut counts = [0u64; MODE_BINS];
    for &x in sorted {
        let idx = (((x - min) / width) as usize).min(MODE_BINS - 1);
        counts[idx] += 1;
    }

    let mut best = 0;
    for (i, &c) in counts.iter().enumerate() {
        if c > counts[best] {
            best = i;
        }
    }
    min + (best as f64 + 0.5) * width
}
