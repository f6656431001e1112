use super::types::EngineError;

// Row N holds the stock/bond return pair for calendar year base_year + N.
#[derive(Debug, Clone)]
pub struct HistoricalReturns {
    base_year: u32,
    returns: Vec<(f64, f64)>,
}

impl HistoricalReturns {
    pub fn from_series(
        base_year: u32,
        stock_returns: Vec<f64>,
        bond_returns: Vec<f64>,
    ) -> Result<Self, EngineError> {
        if stock_returns.is_empty() {
            return Err(data_error("stock return series is empty"));
        }
        if bond_returns.is_empty() {
            return Err(data_error("bond return series is empty"));
        }
        if stock_returns.len() != bond_returns.len() {
            return Err(EngineError::Data {
                reason: format!(
                    "stock series covers {} years but bond series covers {}",
                    stock_returns.len(),
                    bond_returns.len()
                ),
            });
        }

        let returns: Vec<(f64, f64)> = stock_returns.into_iter().zip(bond_returns).collect();
        for (offset, (stock, bond)) in returns.iter().enumerate() {
            if !stock.is_finite() || !bond.is_finite() {
                return Err(EngineError::Data {
                    reason: format!("non-finite return for year {}", base_year + offset as u32),
                });
            }
        }

        Ok(Self { base_year, returns })
    }

    pub fn min_year(&self) -> u32 {
        self.base_year
    }

    pub fn max_year(&self) -> u32 {
        self.base_year + self.returns.len() as u32 - 1
    }

    pub fn years(&self) -> u32 {
        self.returns.len() as u32
    }

    pub fn lookup(&self, year: u32) -> Result<(f64, f64), EngineError> {
        if year < self.min_year() || year > self.max_year() {
            return Err(EngineError::Range {
                year,
                min_year: self.min_year(),
                max_year: self.max_year(),
            });
        }
        Ok(self.returns[(year - self.base_year) as usize])
    }
}

fn data_error(reason: &str) -> EngineError {
    EngineError::Data {
        reason: reason.to_string(),
    }
}
