//! Input side of a projection request: the two uploaded statements and the
//! optional revenue goal. Validation happens here, before anything is sent
//! upstream.

use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, Result};

pub const DEFAULT_GOAL_TIMEFRAME_YEARS: u32 = 3;

/// An uploaded tabular statement, held fully in memory.
///
/// Only the filename suffix is checked; content is passed to the model as-is
/// with a `text/csv` media tag and never sniffed.
#[derive(Debug, Clone)]
pub struct CsvDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl CsvDocument {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    pub fn validate(&self, label: &str) -> Result<()> {
        if !self.filename.to_lowercase().ends_with(".csv") {
            return Err(ProjectionError::InvalidInput(format!(
                "{label} file must be a CSV (got '{}')",
                self.filename
            )));
        }
        if self.bytes.is_empty() {
            return Err(ProjectionError::InvalidInput(format!(
                "{label} file '{}' is empty",
                self.filename
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GoalParams {
    pub target_revenue: f64,
    pub timeframe_years: u32,
}

impl GoalParams {
    pub fn new(target_revenue: f64, timeframe_years: Option<u32>) -> Self {
        Self {
            target_revenue,
            timeframe_years: timeframe_years.unwrap_or(DEFAULT_GOAL_TIMEFRAME_YEARS),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.target_revenue.is_finite() || self.target_revenue <= 0.0 {
            return Err(ProjectionError::InvalidInput(format!(
                "goal target revenue must be a positive number (got {})",
                self.target_revenue
            )));
        }
        if self.timeframe_years == 0 {
            return Err(ProjectionError::InvalidInput(
                "goal timeframe must be at least one year".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ProjectionRequest {
    pub profit_loss: CsvDocument,
    pub balance_sheet: CsvDocument,
    pub goal: Option<GoalParams>,
}

impl ProjectionRequest {
    pub fn validate(&self) -> Result<()> {
        self.profit_loss.validate("Profit and Loss")?;
        self.balance_sheet.validate("Balance Sheet")?;
        if let Some(goal) = &self.goal {
            goal.validate()?;
        }
        Ok(())
    }
}
