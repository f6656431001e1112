mod engine;
mod history;
mod types;

pub use engine::{
    Rng, YearSampler, quartile_selection, run_ensemble, run_projection, select_quartiles,
    update_balance,
};
pub use history::HistoricalReturns;
pub use types::{
    Ensemble, EngineError, InvestorProfile, ProjectionSummary, QuartileOutcome, QuartileSelection,
    SimulationRun, YearSample,
};
