use serde::Serialize;

use crate::distributions::{FrequencyModel, SeverityModel};
use crate::error::SimError;
use crate::layer::Layer;

/// Everything one simulation run needs, passed by value into `simulate`.
/// No process-wide mutable state: a run is reproducible from this struct
/// alone. All monetary amounts are in the same currency unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationParameters {
    /// Per-claim layer limit.
    pub limit: f64,
    /// Annual across-all-claims limit; must be ≥ `limit`.
    pub aggregate_limit: f64,
    /// Cap on each underlying claim before it reaches the layer.
    pub policy_limit: f64,
    /// Per-claim attachment point.
    pub excess: f64,
    /// Annual deductible; must be > `excess` (it spans a whole year).
    pub aggregate_deductible: f64,
    /// Price of the layer; reinstatement costs are fractions of this.
    pub premium: f64,
    /// Poisson λ: expected claims per year.
    pub mean_frequency: f64,
    /// GPD severity ξ, σ, μ.
    pub severity_shape: f64,
    pub severity_scale: f64,
    pub severity_location: f64,
    /// Per-reinstatement cost fractions of premium, in consumption order.
    pub reinstatement_costs: Vec<f64>,
    pub n_trials: usize,
    /// Base RNG seed; trial i draws from a stream seeded `seed + i`.
    pub seed: u64,
    /// Partition trials across rayon workers. Results are bit-identical to
    /// the single-threaded reference mode either way.
    pub parallel: bool,
}

impl SimulationParameters {
    /// The canonical parameter set of the recovery calculator this engine
    /// was built for.
    pub fn canonical() -> Self {
        SimulationParameters {
            limit: 10_000_000.0,
            aggregate_limit: 20_000_000.0,
            policy_limit: 5_000_000.0,
            excess: 1_000_000.0,
            aggregate_deductible: 2_000_000.0,
            premium: 5_000.0,
            mean_frequency: 2.0,
            severity_shape: 0.33,
            severity_scale: 100_000.0,
            severity_location: 1_000_000.0,
            reinstatement_costs: vec![1.0, 1.0, 1.0],
            n_trials: 100_000,
            seed: 42,
            parallel: true,
        }
    }

    /// Check every structural invariant. All validation happens here, before
    /// any sampling; violations are reported with the invariant spelled out,
    /// never silently corrected.
    pub fn validate(&self) -> Result<(), SimError> {
        let finite_fields = [
            ("limit", self.limit),
            ("aggregate_limit", self.aggregate_limit),
            ("policy_limit", self.policy_limit),
            ("excess", self.excess),
            ("aggregate_deductible", self.aggregate_deductible),
            ("premium", self.premium),
            ("mean_frequency", self.mean_frequency),
            ("severity_shape", self.severity_shape),
            ("severity_scale", self.severity_scale),
            ("severity_location", self.severity_location),
        ];
        for (name, value) in finite_fields {
            if !value.is_finite() {
                return Err(SimError::invalid(format!("{name} must be a finite number, got {value}")));
            }
        }
        for (i, &f) in self.reinstatement_costs.iter().enumerate() {
            if !f.is_finite() || f < 0.0 {
                return Err(SimError::invalid(format!(
                    "reinstatement_costs[{i}] must be finite and ≥ 0, got {f}"
                )));
            }
        }
        if self.n_trials < 1 {
            return Err(SimError::invalid("n_trials must be ≥ 1"));
        }
        if self.aggregate_limit < self.limit {
            return Err(SimError::invalid(format!(
                "aggregate_limit ({}) must be ≥ limit ({})",
                self.aggregate_limit, self.limit
            )));
        }
        if self.aggregate_deductible <= self.excess {
            return Err(SimError::invalid(format!(
                "aggregate_deductible ({}) must be > excess ({}): it covers a whole year, not one claim",
                self.aggregate_deductible, self.excess
            )));
        }
        if self.mean_frequency <= 0.0 {
            return Err(SimError::invalid(format!(
                "mean_frequency must be > 0, got {}",
                self.mean_frequency
            )));
        }
        if self.severity_scale <= 0.0 {
            return Err(SimError::invalid(format!(
                "severity_scale must be > 0, got {}",
                self.severity_scale
            )));
        }
        Ok(())
    }

    pub fn frequency_model(&self) -> Result<FrequencyModel, SimError> {
        FrequencyModel::poisson(self.mean_frequency)
    }

    pub fn severity_model(&self) -> Result<SeverityModel, SimError> {
        SeverityModel::gpd(self.severity_shape, self.severity_scale, self.severity_location)
    }

    /// The single active layer driven by this parameter surface. A zero
    /// aggregate term means "absent" (uncapped / no deductible), matching
    /// the calculator's input convention.
    pub fn active_layer(&self) -> Layer {
        let optional = |v: f64| if v > 0.0 { Some(v) } else { None };
        Layer {
            excess: self.excess,
            limit: self.limit,
            aggregate_limit: optional(self.aggregate_limit),
            aggregate_deductible: optional(self.aggregate_deductible),
            premium: self.premium,
            reinstatement_costs: self.reinstatement_costs.clone(),
        }
    }
}
