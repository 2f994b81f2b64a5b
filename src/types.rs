use serde::Serialize;

/// One simulated policy year: the ordered ground-up claim amounts drawn for
/// that year. An empty claim list is a valid year with no losses, not an
/// error. Trials are immutable once generated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trial(pub Vec<f64>);

impl Trial {
    pub fn claims(&self) -> &[f64] {
        &self.0
    }

    pub fn claim_count(&self) -> usize {
        self.0.len()
    }
}

/// All trials of one simulation run, in generation order. Created once per
/// run and consumed by the layer applier; the sensitivity sweep re-reads the
/// same set so its curves are comparable to the headline distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LossSet(pub Vec<Trial>);

impl LossSet {
    pub fn n_trials(&self) -> usize {
        self.0.len()
    }

    pub fn trials(&self) -> &[Trial] {
        &self.0
    }

    /// Total claim count across all trials.
    pub fn total_claims(&self) -> usize {
        self.0.iter().map(Trial::claim_count).sum()
    }
}

/// One scalar recovery per trial, in trial order. Sole input to the
/// statistics summary and the magnitude binner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecoveryDistribution(pub Vec<f64>);

impl RecoveryDistribution {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }
}
