use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid profile: {reason}")]
    Validation { reason: String },
    #[error("year {year} is outside the historical range {min_year}..={max_year}")]
    Range {
        year: u32,
        min_year: u32,
        max_year: u32,
    },
    #[error("bad return data: {reason}")]
    Data { reason: String },
}

#[derive(Debug, Clone)]
pub struct InvestorProfile {
    pub annual_contribution: f64,
    pub current_age: u32,
    pub retirement_age: u32,
    pub starting_balance: f64,
    pub stock_allocation: f64,
    pub simulations: u32,
}

impl InvestorProfile {
    pub fn horizon_years(&self) -> u32 {
        self.retirement_age.saturating_sub(self.current_age)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.retirement_age <= self.current_age {
            return Err(validation("retirement age must be greater than current age"));
        }
        if self.simulations == 0 {
            return Err(validation("simulation count must be at least 1"));
        }
        if !self.annual_contribution.is_finite() || self.annual_contribution < 0.0 {
            return Err(validation("annual contribution must be a finite amount >= 0"));
        }
        if !self.starting_balance.is_finite() || self.starting_balance < 0.0 {
            return Err(validation("starting balance must be a finite amount >= 0"));
        }
        if !self.stock_allocation.is_finite() || !(0.0..=1.0).contains(&self.stock_allocation) {
            return Err(validation("stock allocation must be a fraction between 0 and 1"));
        }
        Ok(())
    }
}

fn validation(reason: &str) -> EngineError {
    EngineError::Validation {
        reason: reason.to_string(),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct YearSample {
    pub stock_return: f64,
    pub bond_return: f64,
    pub stock_allocation: f64,
}

#[derive(Debug, Clone)]
pub struct SimulationRun {
    pub index: u32,
    pub trajectory: Vec<f64>,
    pub final_balance: f64,
}

#[derive(Debug)]
pub struct Ensemble {
    pub runs: Vec<SimulationRun>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct QuartileSelection {
    pub lower: usize,
    pub middle: usize,
    pub upper: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuartileOutcome {
    pub run_index: u32,
    pub final_balance: f64,
    pub display_balance: i64,
    pub trajectory: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    pub years_of_growth: u32,
    pub simulations: u32,
    pub lower_quartile: QuartileOutcome,
    pub middle_quartile: QuartileOutcome,
    pub upper_quartile: QuartileOutcome,
}
