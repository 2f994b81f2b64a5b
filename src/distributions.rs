use rand::Rng;
use rand_distr::{Distribution, Poisson};

use crate::error::SimError;

/// Claim-count model. Draws are non-negative integers; the conversion from
/// the sampler's float output truncates toward zero, which for non-negative
/// draws equals `floor`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrequencyModel {
    /// Poisson frequency: `mean` = expected claims per year (λ > 0).
    Poisson { mean: f64 },
}

impl FrequencyModel {
    pub fn poisson(mean: f64) -> Result<Self, SimError> {
        if !mean.is_finite() || mean <= 0.0 {
            return Err(SimError::invalid(format!(
                "Poisson mean must be finite and > 0, got {mean}"
            )));
        }
        Ok(FrequencyModel::Poisson { mean })
    }

    pub fn sample_count(&self, rng: &mut impl Rng) -> u64 {
        match self {
            FrequencyModel::Poisson { mean } => {
                // λ validated at construction, so new() cannot fail here.
                let dist = Poisson::new(*mean).expect("validated Poisson mean");
                dist.sample(rng) as u64
            }
        }
    }
}

/// Claim-size model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeverityModel {
    /// Generalized Pareto severity: `shape` = ξ (tail index), `scale` = σ > 0,
    /// `loc` = μ (minimum claim size). Draws are ≥ μ; for ξ < 0 the support is
    /// additionally bounded above by μ − σ/ξ.
    Gpd { shape: f64, scale: f64, loc: f64 },
}

impl SeverityModel {
    pub fn gpd(shape: f64, scale: f64, loc: f64) -> Result<Self, SimError> {
        if !shape.is_finite() || !scale.is_finite() || !loc.is_finite() {
            return Err(SimError::invalid(format!(
                "GPD parameters must be finite, got shape={shape} scale={scale} loc={loc}"
            )));
        }
        if scale <= 0.0 {
            return Err(SimError::invalid(format!(
                "GPD scale must be > 0, got {scale}"
            )));
        }
        Ok(SeverityModel::Gpd { shape, scale, loc })
    }

    /// Upper bound of the support, when one exists (ξ < 0).
    pub fn upper_bound(&self) -> Option<f64> {
        match self {
            SeverityModel::Gpd { shape, scale, loc } => {
                if *shape < 0.0 {
                    Some(loc - scale / shape)
                } else {
                    None
                }
            }
        }
    }

    /// Inverse-CDF draw: x = μ + σ((1−u)^(−ξ) − 1)/ξ, with the ξ → 0
    /// exponential limit x = μ − σ·ln(1−u). `u` comes from [0, 1), so
    /// 1 − u ∈ (0, 1] and the transform is finite for every draw; the
    /// ξ < 0 upper bound μ − σ/ξ falls out of the formula directly.
    pub fn sample(&self, rng: &mut impl Rng) -> f64 {
        match self {
            SeverityModel::Gpd { shape, scale, loc } => {
                let u: f64 = rng.random();
                let tail = 1.0 - u;
                if shape.abs() < 1e-12 {
                    loc - scale * tail.ln()
                } else {
                    loc + scale * (tail.powf(-shape) - 1.0) / shape
                }
            }
        }
    }
}
