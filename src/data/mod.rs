use std::fs;
use std::path::Path;

use log::info;

use crate::core::{EngineError, HistoricalReturns};

// One fractional return per line, oldest year first. Blank lines are
// ignored so trailing newlines do not shift the year mapping.
pub fn read_return_series(path: &Path) -> Result<Vec<f64>, EngineError> {
    let text = fs::read_to_string(path).map_err(|e| EngineError::Data {
        reason: format!("cannot read {}: {e}", path.display()),
    })?;

    let mut series = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let entry = line.trim();
        if entry.is_empty() {
            continue;
        }
        let value: f64 = entry.parse().map_err(|_| EngineError::Data {
            reason: format!(
                "{}:{}: not a return value: {entry:?}",
                path.display(),
                number + 1
            ),
        })?;
        series.push(value);
    }
    Ok(series)
}

pub fn load_history(
    stock_path: &Path,
    bond_path: &Path,
    base_year: u32,
) -> Result<HistoricalReturns, EngineError> {
    let stock_returns = read_return_series(stock_path)?;
    let bond_returns = read_return_series(bond_path)?;
    let history = HistoricalReturns::from_series(base_year, stock_returns, bond_returns)?;
    info!(
        "loaded {} years of returns covering {}..={}",
        history.years(),
        history.min_year(),
        history.max_year()
    );
    Ok(history)
}
