use super::history::HistoricalReturns;
use super::types::{
    Ensemble, EngineError, InvestorProfile, ProjectionSummary, QuartileOutcome, QuartileSelection,
    SimulationRun, YearSample,
};

pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 0xA5A5_A5A5_A5A5_A5A5 } else { seed };
        Self { state }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    pub fn next_f64(&mut self) -> f64 {
        const DENOM: f64 = (1_u64 << 53) as f64;
        let v = self.next_u64() >> 11;
        ((v as f64) + 0.5) / DENOM
    }

    // next_f64 can round up to exactly 1.0 at the top of its range, which
    // would scale to bound itself; keep the draw inside [0, bound).
    pub fn next_index(&mut self, bound: u32) -> u32 {
        let scaled = (self.next_f64() * bound as f64) as u32;
        scaled.min(bound.saturating_sub(1))
    }
}

fn derive_seed(base_seed: u64, run_index: u32) -> u64 {
    let mixed = base_seed ^ run_index as u64;
    splitmix64(mixed)
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

pub struct YearSampler<'a> {
    history: &'a HistoricalReturns,
    stock_allocation: f64,
}

impl<'a> YearSampler<'a> {
    pub fn new(history: &'a HistoricalReturns, stock_allocation: f64) -> Self {
        Self {
            history,
            stock_allocation,
        }
    }

    pub fn sample(&self, rng: &mut Rng) -> Result<YearSample, EngineError> {
        let year = self.history.min_year() + rng.next_index(self.history.years());
        let (stock_return, bond_return) = self.history.lookup(year)?;
        Ok(YearSample {
            stock_return,
            bond_return,
            stock_allocation: self.stock_allocation,
        })
    }
}

// The year's contribution lands before that year's growth is applied.
pub fn update_balance(balance: f64, contribution: f64, sample: YearSample) -> f64 {
    let funded = balance + contribution;
    let stock_portion = funded * sample.stock_allocation;
    let bond_portion = funded * (1.0 - sample.stock_allocation);
    stock_portion * (1.0 + sample.stock_return) + bond_portion * (1.0 + sample.bond_return)
}

fn simulate_run(
    profile: &InvestorProfile,
    sampler: &YearSampler<'_>,
    index: u32,
    rng: &mut Rng,
) -> Result<SimulationRun, EngineError> {
    let mut trajectory = Vec::with_capacity(profile.horizon_years() as usize);
    let mut balance = profile.starting_balance;

    for _ in profile.current_age..profile.retirement_age {
        let sample = sampler.sample(rng)?;
        balance = update_balance(balance, profile.annual_contribution, sample);
        trajectory.push(balance);
    }

    Ok(SimulationRun {
        index,
        trajectory,
        final_balance: balance,
    })
}

pub fn run_ensemble(
    profile: &InvestorProfile,
    history: &HistoricalReturns,
    seed: u64,
) -> Result<Ensemble, EngineError> {
    profile.validate()?;

    let sampler = YearSampler::new(history, profile.stock_allocation);
    let mut runs = Vec::with_capacity(profile.simulations as usize);
    for run_index in 0..profile.simulations {
        let mut rng = Rng::new(derive_seed(seed, run_index));
        runs.push(simulate_run(profile, &sampler, run_index, &mut rng)?);
    }

    Ok(Ensemble { runs })
}

pub fn quartile_selection(simulations: u32) -> QuartileSelection {
    let step = (simulations as f64 / 100.0).round();
    QuartileSelection {
        lower: quartile_index(step, 25.0, simulations),
        middle: quartile_index(step, 50.0, simulations),
        upper: quartile_index(step, 75.0, simulations),
    }
}

// The scaled rank can round past the last run for small ensembles; clamp it
// to the run range.
fn quartile_index(step: f64, rank: f64, simulations: u32) -> usize {
    let index = (step * rank).round();
    let last = simulations.saturating_sub(1) as f64;
    index.min(last) as usize
}

pub fn select_quartiles<'a>(
    ensemble: &'a Ensemble,
    selection: QuartileSelection,
) -> (&'a SimulationRun, &'a SimulationRun, &'a SimulationRun) {
    let mut by_final_balance: Vec<&SimulationRun> = ensemble.runs.iter().collect();
    by_final_balance.sort_by(|a, b| {
        a.final_balance
            .total_cmp(&b.final_balance)
            .then_with(|| a.index.cmp(&b.index))
    });

    // A selection built for a different ensemble size could index past the
    // end; clamp to the last run instead of panicking.
    let last = by_final_balance.len() - 1;
    (
        by_final_balance[selection.lower.min(last)],
        by_final_balance[selection.middle.min(last)],
        by_final_balance[selection.upper.min(last)],
    )
}

pub fn run_projection(
    profile: &InvestorProfile,
    history: &HistoricalReturns,
    seed: u64,
) -> Result<ProjectionSummary, EngineError> {
    let ensemble = run_ensemble(profile, history, seed)?;
    let selection = quartile_selection(profile.simulations);
    let (lower, middle, upper) = select_quartiles(&ensemble, selection);

    Ok(ProjectionSummary {
        years_of_growth: profile.horizon_years(),
        simulations: profile.simulations,
        lower_quartile: quartile_outcome(lower),
        middle_quartile: quartile_outcome(middle),
        upper_quartile: quartile_outcome(upper),
    })
}

fn quartile_outcome(run: &SimulationRun) -> QuartileOutcome {
    QuartileOutcome {
        run_index: run.index,
        final_balance: run.final_balance,
        display_balance: run.final_balance.round() as i64,
        trajectory: run.trajectory.clone(),
    }
}
