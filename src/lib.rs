//! Monte Carlo engine for excess-of-loss reinsurance recoveries.
//!
//! A run simulates a compound frequency-severity loss process (Poisson claim
//! counts, Generalized Pareto claim sizes), caps claims at a policy limit,
//! applies an XoL layer with aggregate terms and reinstatement mechanics, and
//! summarises the resulting per-trial recovery distribution: statistics,
//! magnitude bands, and limit/excess sensitivity curves over the same losses.

pub mod bins;
pub mod distributions;
pub mod error;
pub mod layer;
pub mod losses;
pub mod params;
pub mod simulation;
pub mod statistics;
pub mod sweep;
pub mod types;

pub use error::SimError;
pub use params::SimulationParameters;
pub use simulation::{SimulationOutput, simulate, simulate_with_cancel};
