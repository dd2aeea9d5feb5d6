//! Deterministic goal arithmetic. No external call is involved; this is the
//! one piece of the goal feature that does not go through the model.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GoalRequirements {
    #[schemars(
        description = "Compound annual growth rate required to reach the target, as a decimal rounded to four places (two decimal places as a percentage)."
    )]
    pub required_cagr: f64,

    #[schemars(
        description = "Equivalent compound monthly growth rate, as a decimal rounded to four places."
    )]
    pub required_monthly_growth: f64,

    #[schemars(description = "Target revenue divided by current revenue, rounded to two places.")]
    pub growth_multiple: f64,
}

/// Solve for the growth rates needed to move `current_revenue` to
/// `target_revenue` over `timeframe_years`.
pub fn calculate_goal_requirements(
    current_revenue: f64,
    target_revenue: f64,
    timeframe_years: u32,
) -> Result<GoalRequirements> {
    if !current_revenue.is_finite() || current_revenue <= 0.0 {
        return Err(ProjectionError::InvalidInput(format!(
            "current revenue must be positive (got {current_revenue})"
        )));
    }
    if !target_revenue.is_finite() || target_revenue <= 0.0 {
        return Err(ProjectionError::InvalidInput(format!(
            "target revenue must be positive (got {target_revenue})"
        )));
    }
    if timeframe_years == 0 {
        return Err(ProjectionError::InvalidInput(
            "timeframe must be at least one year".to_string(),
        ));
    }

    let multiple = target_revenue / current_revenue;
    let years = f64::from(timeframe_years);

    Ok(GoalRequirements {
        required_cagr: round_to(multiple.powf(1.0 / years) - 1.0, 4),
        required_monthly_growth: round_to(multiple.powf(1.0 / (years * 12.0)) - 1.0, 4),
        growth_multiple: round_to(multiple, 2),
    })
}

fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}
