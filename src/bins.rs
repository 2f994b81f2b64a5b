use serde::Serialize;

use crate::types::RecoveryDistribution;

/// One magnitude band of the recovery distribution display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Band {
    pub label: &'static str,
    pub count: u64,
}

/// Non-uniform band edges, half-open on the left: a value v falls in the
/// band with lo < v ≤ hi. The zero band is handled separately (exact
/// equality), and the range (0, 1000] is deliberately unreported — the
/// display inherits the "= 0" vs "> 1000" boundary of the original
/// classification, so counts may sum to less than the trial count.
const BANDS: &[(&str, f64, f64)] = &[
    ("Recoveries = 0-10K", 1_000.0, 10_000.0),
    ("Recoveries = 10K-50K", 10_000.0, 50_000.0),
    ("Recoveries = 50K-100K", 50_000.0, 100_000.0),
    ("Recoveries = 100K-1M", 100_000.0, 1_000_000.0),
    ("Recoveries = 1M-10M", 1_000_000.0, 10_000_000.0),
    ("Recoveries = 10M-25M", 10_000_000.0, 25_000_000.0),
    ("Recoveries = 25M-50M", 25_000_000.0, 50_000_000.0),
    ("Recoveries = 50M-75M", 50_000_000.0, 75_000_000.0),
    ("Recoveries = 75M-100M", 75_000_000.0, 100_000_000.0),
    ("Recoveries = 100M-250M", 100_000_000.0, 250_000_000.0),
    ("Recoveries = 250M-500M", 250_000_000.0, 500_000_000.0),
    ("Recoveries = 500M-750M", 500_000_000.0, 750_000_000.0),
    ("Recoveries = 750M-1B", 750_000_000.0, 1_000_000_000.0),
    ("Recoveries = 1B-2.5B", 1_000_000_000.0, 2_500_000_000.0),
    ("Recoveries = 2.5B-5B", 2_500_000_000.0, 5_000_000_000.0),
    ("Recoveries = 5B-10B", 5_000_000_000.0, 10_000_000_000.0),
    ("Recoveries = 10B-25B", 10_000_000_000.0, 25_000_000_000.0),
    ("Recoveries = 25B-50B", 25_000_000_000.0, 50_000_000_000.0),
    ("Recoveries = 50B-75B", 50_000_000_000.0, 75_000_000_000.0),
    ("Recoveries = 75B-100B", 75_000_000_000.0, 100_000_000_000.0),
    ("Recoveries = 100B-250B", 100_000_000_000.0, 250_000_000_000.0),
    ("Recoveries = 250B-500B", 250_000_000_000.0, 500_000_000_000.0),
    ("Recoveries = 500B-750B", 500_000_000_000.0, 750_000_000_000.0),
    ("Recoveries = 750B-1T", 750_000_000_000.0, 1_000_000_000_000.0),
    ("Recoveries > 1T", 1_000_000_000_000.0, f64::INFINITY),
];

/// Classify recoveries into ordered magnitude bands. Bands with no
/// population are omitted outright, which also drops every band above the
/// sample maximum's magnitude.
pub fn bin_recoveries(recoveries: &RecoveryDistribution) -> Vec<Band> {
    let zero_count = recoveries.values().iter().filter(|&&r| r == 0.0).count() as u64;

    let mut out = Vec::new();
    if zero_count > 0 {
        out.push(Band { label: "Recoveries = 0", count: zero_count });
    }
    for &(label, lo, hi) in BANDS {
        let count =
            recoveries.values().iter().filter(|&&r| r > lo && r <= hi).count() as u64;
        if count > 0 {
            out.push(Band { label, count });
        }
    }
    out
}
