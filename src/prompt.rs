//! Instruction text sent alongside the uploaded statements.
//!
//! Pure string assembly: a fixed base block, an optional goal block, and a
//! fixed closing quality-assurance checklist. The 12/36/20/10/15 point
//! counts and the cross-period arithmetic expectations live here and only
//! here; the response schema cannot express them.

use crate::request::GoalParams;

const BASE_INSTRUCTION: &str = r#"Use your full analytical depth to analyse both the attached Profit and Loss statement and Balance Sheet, and produce accurate, defensible financial projections.

## PROJECTION REQUIREMENTS
Provide detailed projections for Revenue, Net Profit, Gross Profit, and Expenses across these timeframes (commencing January of next year):
- 1 year: Monthly values (exactly 12 data points)
- 3 years: Monthly values (exactly 36 data points)
- 5 years: Quarterly values (exactly 20 data points)
- 10 years: Annual values (exactly 10 data points)
- 15 years: Annual values (exactly 15 data points)

## MATHEMATICAL CONSISTENCY
- Monthly figures must aggregate to the corresponding quarterly and annual figures.
- Revenue minus total expenses (excluding COGS already reflected in gross profit) must reconcile to net profit in every period.
- Gross profit must never exceed revenue; net profit must never exceed gross profit.

## ANALYSIS REQUIREMENTS
- Identify the projection drivers in the historical data (growth rates, seasonality, margin trends) and list them explicitly.
- State every material assumption you make.
- Flag anomalies in the source data rather than silently smoothing them.
- Document the forecasting techniques applied and the historical period they were applied to.
"#;

const QA_CHECKLIST: &str = r#"
## QUALITY ASSURANCE CHECKLIST
Before responding, verify:
1. Every required timeframe contains the exact number of data points requested.
2. All period labels follow the required formats (YYYY-MM for months, YYYY-QN for quarters, a bare year for annual figures).
3. Quality scores are precise decimals between 0.0 and 1.0, each with a one-sentence rationale.
4. The projections are realistic and defensible against the historical data provided.
5. Financial ratios are consistent with the projected figures.
"#;

fn goal_block(goal: &GoalParams) -> String {
    format!(
        r#"
## REVENUE GOAL ANALYSIS
The business wants to reach an annual revenue of ${target:.2} within {years} years. Work backwards from this target:
- Calculate the compound annual growth rate required to reach ${target:.2} in {years} years from current revenue.
- Produce a month-by-month pathway (36 months) showing the trajectory toward the target in the goal_adjusted_projections field.
- Assess feasibility against historical growth, and score it in goal_feasibility_score.
- List the concrete operational adjustments required to close any gap between the baseline projection and the target.
"#,
        target = goal.target_revenue,
        years = goal.timeframe_years,
    )
}

/// Assemble the full instruction. When no goal is supplied, the goal block
/// is absent entirely; the schema's goal fields are then expected to be
/// omitted by the model.
pub fn build_instruction(goal: Option<&GoalParams>) -> String {
    let mut instruction = String::from(BASE_INSTRUCTION);
    if let Some(goal) = goal {
        instruction.push_str(&goal_block(goal));
    }
    instruction.push_str(QA_CHECKLIST);
    instruction
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_without_goal_has_no_goal_section() {
        let instruction = build_instruction(None);
        assert!(!instruction.contains("REVENUE GOAL ANALYSIS"));
        assert!(!instruction.contains("goal_adjusted_projections"));
        assert!(instruction.contains("exactly 36 data points"));
        assert!(instruction.contains("QUALITY ASSURANCE CHECKLIST"));
    }

    #[test]
    fn test_instruction_with_goal_embeds_target_and_timeframe() {
        let goal = GoalParams::new(750_000.0, Some(5));
        let instruction = build_instruction(Some(&goal));
        assert!(instruction.contains("$750000.00"));
        assert!(instruction.contains("within 5 years"));
        assert!(instruction.contains("goal_feasibility_score"));
    }

    #[test]
    fn test_instruction_is_deterministic() {
        let goal = GoalParams::new(1_000_000.0, Some(3));
        assert_eq!(
            build_instruction(Some(&goal)),
            build_instruction(Some(&goal))
        );
    }

    #[test]
    fn test_goal_block_follows_base_and_precedes_checklist() {
        let goal = GoalParams::new(250_000.0, Some(2));
        let instruction = build_instruction(Some(&goal));
        let base = instruction.find("PROJECTION REQUIREMENTS").unwrap();
        let goal_pos = instruction.find("REVENUE GOAL ANALYSIS").unwrap();
        let checklist = instruction.find("QUALITY ASSURANCE CHECKLIST").unwrap();
        assert!(base < goal_pos && goal_pos < checklist);
    }
}
