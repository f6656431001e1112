//! Monte Carlo portfolio growth projections over historical market returns.
//!
//! This library provides:
//! - A validated table of historical stock and bond returns indexed by
//!   calendar year
//! - A seeded engine that resamples whole years to grow a contribution
//!   schedule across many independent runs
//! - Quartile selection over the final-balance-sorted ensemble
//! - An HTTP API and CLI for running projections against user-supplied
//!   return history files

pub mod api;
pub mod core;
pub mod data;

// Re-export commonly used types
pub use crate::core::{
    Ensemble, EngineError, HistoricalReturns, InvestorProfile, ProjectionSummary, QuartileOutcome,
    QuartileSelection, SimulationRun, YearSample, run_ensemble, run_projection,
};
