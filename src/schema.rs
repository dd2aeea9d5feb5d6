//! The structured-output contract for the projection service.
//!
//! These types are handed to Gemini as a response schema (via the generated
//! JSON Schema) and used again on the way back to parse and validate the
//! model's output. Field descriptions double as instructions to the model,
//! so they are written for it, not for us.
//!
//! Scope of validation: numeric bounds and period-label formats are
//! enforced; the documented list cardinalities (12/36/20/10/15) and
//! cross-period arithmetic consistency are communicated through the
//! instruction text only and are NOT checked here. Unknown fields in the
//! raw payload are tolerated.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QualityScore {
    #[schemars(
        description = "Quality score from 0.0 to 1.0 where 1.0 represents highest quality/confidence. Use precise decimal values (e.g., 0.85, not 0.8 or 0.9)."
    )]
    pub score: f64,

    #[schemars(
        description = "Single, comprehensive sentence explaining the specific factors that influenced this score, including data quality, completeness, and analytical confidence."
    )]
    pub rationale: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GrowthAssumptions {
    #[schemars(
        description = "Revenue compound annual growth rate as a decimal (e.g., 0.15 for 15% CAGR). Should reflect industry benchmarks, historical performance, and market conditions."
    )]
    pub revenue_cagr: f64,

    #[schemars(
        description = "Annual expense inflation rate as a decimal (e.g., 0.03 for 3%). Consider cost-push factors, wage inflation, and operational cost trends."
    )]
    pub expense_inflation: f64,

    #[schemars(
        description = "Target net profit margin as a decimal (e.g., 0.12 for 12%). Should be achievable based on industry standards and operational efficiency improvements."
    )]
    pub profit_margin_target: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FinancialRatios {
    #[schemars(
        description = "Gross profit margin as a decimal (Revenue - COGS)/Revenue. Indicates pricing power and cost control effectiveness."
    )]
    pub gross_margin: f64,

    #[schemars(
        description = "Net profit margin as a decimal (Net Income/Revenue). Reflects overall operational efficiency and profitability after all expenses."
    )]
    pub net_margin: f64,

    #[schemars(
        description = "Current assets divided by current liabilities. Values above 1.0 indicate good short-term liquidity. Industry benchmark typically 1.2-2.0."
    )]
    pub current_ratio: f64,

    #[schemars(
        description = "Total debt divided by total shareholders' equity. Lower ratios indicate less financial risk. Optimal range varies by industry."
    )]
    pub debt_to_equity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MonthlyProjection {
    #[schemars(
        description = "Month in YYYY-MM format (e.g., '2027-01', '2027-02'). Ensure chronological ordering starting from next January."
    )]
    pub month: String,

    #[schemars(
        description = "Total monthly revenue in base currency. Consider seasonal patterns, market cycles, and growth trajectories."
    )]
    pub revenue: f64,

    #[schemars(
        description = "Monthly net profit after all expenses, taxes, and deductions. Should align with projected profit margins."
    )]
    pub net_profit: f64,

    #[schemars(
        description = "Monthly gross profit (Revenue - Cost of Goods Sold). Must be mathematically consistent with revenue and expense projections."
    )]
    pub gross_profit: f64,

    #[schemars(
        description = "Total monthly operating expenses including COGS, SG&A, interest, and taxes. Factor in inflation and scale effects."
    )]
    pub expenses: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QuarterlyProjection {
    #[schemars(
        description = "Quarter in YYYY-QN format (e.g., '2027-Q1', '2027-Q2'). Aggregate monthly data appropriately for quarterly reporting."
    )]
    pub quarter: String,

    #[schemars(
        description = "Total quarterly revenue aggregated from monthly projections. Ensure consistency with seasonal business patterns."
    )]
    pub revenue: f64,

    #[schemars(
        description = "Quarterly net profit reflecting operational performance and one-time adjustments if applicable."
    )]
    pub net_profit: f64,

    #[schemars(
        description = "Quarterly gross profit demonstrating core business profitability before operating expenses."
    )]
    pub gross_profit: f64,

    #[schemars(
        description = "Total quarterly expenses including both fixed and variable costs, scaled appropriately for business growth."
    )]
    pub expenses: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnnualProjection {
    #[schemars(
        description = "Calendar year for the projection (e.g., 2027, 2028). Should follow logical progression from base year."
    )]
    pub year: i32,

    #[schemars(
        description = "Annual revenue reflecting cumulative growth, market expansion, and business development initiatives."
    )]
    pub revenue: f64,

    #[schemars(
        description = "Annual net profit incorporating full-year operational results, tax implications, and strategic investments."
    )]
    pub net_profit: f64,

    #[schemars(
        description = "Annual gross profit demonstrating core business unit economics and scale efficiencies."
    )]
    pub gross_profit: f64,

    #[schemars(
        description = "Total annual expenses including operational costs, capital expenditures, and growth investments."
    )]
    pub expenses: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProjectionSet {
    #[schemars(
        description = "Exactly 12 months of detailed monthly projections starting from January of next year. Critical for cash flow management and short-term planning."
    )]
    pub one_year_monthly: Vec<MonthlyProjection>,

    #[schemars(
        description = "Exactly 36 months of monthly projections covering three full years. Essential for medium-term strategic planning and investor presentations."
    )]
    pub three_years_monthly: Vec<MonthlyProjection>,

    #[schemars(
        description = "Exactly 20 quarters (5 years) of quarterly projections. Standard timeframe for business plan financial modeling and loan applications."
    )]
    pub five_years_quarterly: Vec<QuarterlyProjection>,

    #[schemars(
        description = "Exactly 10 years of annual projections for long-term strategic planning. Consider major market shifts and competitive dynamics."
    )]
    pub ten_years_annual: Vec<AnnualProjection>,

    #[schemars(
        description = "Exactly 15 years of annual projections for comprehensive long-term analysis. Factor in industry lifecycle and technological disruption potential."
    )]
    pub fifteen_years_annual: Vec<AnnualProjection>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MethodologyReport {
    #[schemars(
        description = "List of specific forecasting techniques applied (e.g., 'Trend Analysis', 'Regression Modeling', 'Seasonal Decomposition', 'Monte Carlo Simulation')."
    )]
    pub forecasting_methods_used: Vec<String>,

    #[schemars(
        description = "Whether seasonal patterns were identified and incorporated into projections. Critical for businesses with cyclical revenue patterns."
    )]
    pub seasonal_adjustments_applied: bool,

    #[schemars(
        description = "Time period used for historical trend analysis (e.g., '3 years', '5 years'). Longer periods provide more stability but may miss recent shifts."
    )]
    pub trend_analysis_period: String,

    #[schemars(
        description = "Detailed assumptions about growth rates and economic factors driving the projections."
    )]
    pub growth_rate_assumptions: GrowthAssumptions,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GoalProjection {
    #[schemars(
        description = "Exactly 36 months of goal-adjusted monthly projections showing the pathway from current performance to the target revenue."
    )]
    pub goal_adjusted_projections: Vec<MonthlyProjection>,

    #[schemars(
        description = "Narrative summary of whether and how the revenue goal can be achieved within the requested timeframe."
    )]
    pub goal_achievement_summary: String,

    #[schemars(
        description = "Specific operational or financial adjustments required to reach the target (e.g., 'Increase marketing spend by 20%', 'Expand sales team')."
    )]
    pub required_adjustments: Vec<String>,

    #[schemars(
        description = "Assessment of how realistic the goal is given historical performance, required growth rates, and market conditions."
    )]
    pub feasibility_assessment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProjectionResponse {
    #[schemars(
        description = "Concise 2-3 sentence summary highlighting key financial trends, growth trajectory, and critical insights from the projection analysis."
    )]
    pub executive_summary: String,

    #[schemars(
        description = "Full legal or operating name of the business entity as identified from the financial statements."
    )]
    pub business_name: String,

    #[schemars(
        description = "Assessment of how completely all required projection elements were generated according to specifications."
    )]
    pub completion_score: QualityScore,

    #[schemars(
        description = "Evaluation of the underlying financial data quality, completeness, consistency, and reliability for projection purposes."
    )]
    pub data_quality_score: QualityScore,

    #[schemars(
        description = "Overall confidence level in the accuracy and reliability of the generated financial projections based on data quality and methodology."
    )]
    pub projection_confidence_score: QualityScore,

    #[schemars(
        description = "Specific financial metrics, ratios, or business factors that drove the projection calculations (e.g., 'Historical revenue growth rate of 15%', 'Seasonal Q4 revenue spike')."
    )]
    pub projection_drivers_found: Vec<String>,

    #[schemars(
        description = "Critical business and economic assumptions underlying the projections (e.g., 'Market conditions remain stable', 'Inflation rate of 3% annually')."
    )]
    pub assumptions_made: Vec<String>,

    #[schemars(
        description = "Unusual patterns, outliers, or inconsistencies discovered in the historical data that may impact projection reliability (e.g., 'Spike in expenses Q3 2023')."
    )]
    pub anomalies_found: Vec<String>,

    #[schemars(
        description = "Detailed documentation of the analytical approach and mathematical methods used to generate the projections."
    )]
    pub methodology: MethodologyReport,

    #[schemars(
        description = "Complete set of financial projections across all required timeframes with mathematical consistency between periods."
    )]
    pub projections_data: ProjectionSet,

    #[schemars(
        description = "Goal-based projection pathway. Only present when a target revenue goal was supplied with the request; omit entirely otherwise."
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_projection: Option<GoalProjection>,

    #[schemars(
        description = "Feasibility score for the supplied revenue goal. Only present when a target revenue goal was supplied with the request; omit entirely otherwise."
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_feasibility_score: Option<QualityScore>,

    #[schemars(
        description = "Critical financial health metrics calculated from projections to assess business performance and sustainability."
    )]
    pub key_financial_ratios: FinancialRatios,

    #[schemars(
        description = "Identified financial, operational, or market risks that could materially impact the projected financial performance."
    )]
    pub risk_factors: Vec<String>,

    #[schemars(
        description = "Actionable strategic recommendations based on projection analysis to optimize financial performance and mitigate identified risks."
    )]
    pub recommendations: Vec<String>,
}

impl ProjectionResponse {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ProjectionResponse)
    }

    /// The schema handed to the generation call as a structural constraint.
    ///
    /// Gemini's `responseSchema` field takes an OpenAPI-style schema object
    /// and rejects `$ref`, `$schema`, and `definitions`, so the schemars
    /// output is flattened before it goes on the wire: every reference is
    /// inlined and `Option` unions collapse to `nullable`.
    pub fn response_schema() -> Result<serde_json::Value> {
        let root = serde_json::to_value(Self::generate_json_schema())?;
        Ok(to_gemini_schema(root))
    }

    /// Parse raw model output and check field-level constraints.
    ///
    /// Enforced: quality scores in [0.0, 1.0], month labels as YYYY-MM,
    /// quarter labels as YYYY-QN. Not enforced: list cardinalities and
    /// cross-period arithmetic, which only the instruction text promises.
    pub fn validate(raw: &str) -> Result<Self> {
        let response: Self = serde_json::from_str(raw)
            .map_err(|e| ProjectionError::SchemaViolation(e.to_string()))?;

        check_score("completion_score", &response.completion_score)?;
        check_score("data_quality_score", &response.data_quality_score)?;
        check_score(
            "projection_confidence_score",
            &response.projection_confidence_score,
        )?;
        if let Some(score) = &response.goal_feasibility_score {
            check_score("goal_feasibility_score", score)?;
        }

        check_monthly("one_year_monthly", &response.projections_data.one_year_monthly)?;
        check_monthly(
            "three_years_monthly",
            &response.projections_data.three_years_monthly,
        )?;
        check_quarterly(
            "five_years_quarterly",
            &response.projections_data.five_years_quarterly,
        )?;
        if let Some(goal) = &response.goal_projection {
            check_monthly("goal_adjusted_projections", &goal.goal_adjusted_projections)?;
        }

        Ok(response)
    }
}

fn check_score(field: &str, score: &QualityScore) -> Result<()> {
    if !score.score.is_finite() || !(0.0..=1.0).contains(&score.score) {
        return Err(ProjectionError::SchemaViolation(format!(
            "{field}: score {} is outside the range 0.0 to 1.0",
            score.score
        )));
    }
    Ok(())
}

fn check_monthly(field: &str, projections: &[MonthlyProjection]) -> Result<()> {
    for projection in projections {
        if !is_month_label(&projection.month) {
            return Err(ProjectionError::SchemaViolation(format!(
                "{field}: month label '{}' is not in YYYY-MM format",
                projection.month
            )));
        }
    }
    Ok(())
}

fn check_quarterly(field: &str, projections: &[QuarterlyProjection]) -> Result<()> {
    for projection in projections {
        if !is_quarter_label(&projection.quarter) {
            return Err(ProjectionError::SchemaViolation(format!(
                "{field}: quarter label '{}' is not in YYYY-QN format",
                projection.quarter
            )));
        }
    }
    Ok(())
}

fn is_month_label(label: &str) -> bool {
    let Some((year, month)) = label.split_once('-') else {
        return false;
    };
    year.len() == 4
        && year.chars().all(|c| c.is_ascii_digit())
        && matches!(month.parse::<u32>(), Ok(m) if (1..=12).contains(&m) && month.len() == 2)
}

fn to_gemini_schema(mut root: serde_json::Value) -> serde_json::Value {
    let definitions = root
        .as_object_mut()
        .and_then(|obj| {
            obj.remove("$schema");
            obj.remove("definitions")
        })
        .and_then(|defs| match defs {
            serde_json::Value::Object(map) => Some(map),
            _ => None,
        })
        .unwrap_or_default();
    inline_definitions(&mut root, &definitions);
    root
}

fn inline_definitions(
    node: &mut serde_json::Value,
    definitions: &serde_json::Map<String, serde_json::Value>,
) {
    match node {
        serde_json::Value::Object(obj) => {
            // Each rewrite can surface another wrapped schema into this
            // object (a flattened allOf may expose a $ref, a resolved $ref
            // may expose an anyOf), so rewrite until a fixed point.
            let mut changed = true;
            while changed {
                changed = flatten_single_all_of(obj)
                    | resolve_definition_ref(obj, definitions)
                    | collapse_nullable_any_of(obj);
            }
            for value in obj.values_mut() {
                inline_definitions(value, definitions);
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                inline_definitions(item, definitions);
            }
        }
        _ => {}
    }
}

/// schemars wraps referenced types in a single-entry `allOf` when the field
/// carries metadata such as a description; merge the entry into the parent.
fn flatten_single_all_of(obj: &mut serde_json::Map<String, serde_json::Value>) -> bool {
    let is_single = matches!(
        obj.get("allOf"),
        Some(serde_json::Value::Array(entries)) if entries.len() == 1
    );
    if !is_single {
        return false;
    }
    if let Some(serde_json::Value::Array(mut entries)) = obj.remove("allOf") {
        if let Some(serde_json::Value::Object(entry)) = entries.pop() {
            for (key, value) in entry {
                obj.entry(key).or_insert(value);
            }
        }
    }
    true
}

fn resolve_definition_ref(
    obj: &mut serde_json::Map<String, serde_json::Value>,
    definitions: &serde_json::Map<String, serde_json::Value>,
) -> bool {
    let Some(name) = obj
        .get("$ref")
        .and_then(serde_json::Value::as_str)
        .and_then(|reference| reference.strip_prefix("#/definitions/"))
        .map(str::to_string)
    else {
        return false;
    };
    obj.remove("$ref");
    if let Some(serde_json::Value::Object(definition)) = definitions.get(&name) {
        for (key, value) in definition {
            obj.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }
    true
}

/// `Option` fields come out of schemars as a two-branch `anyOf` with a null
/// variant; Gemini expects the plain schema plus `nullable: true`.
fn collapse_nullable_any_of(obj: &mut serde_json::Map<String, serde_json::Value>) -> bool {
    let null_position = match obj.get("anyOf") {
        Some(serde_json::Value::Array(variants)) if variants.len() == 2 => variants
            .iter()
            .position(|v| v.get("type").and_then(serde_json::Value::as_str) == Some("null")),
        _ => None,
    };
    let Some(null_position) = null_position else {
        return false;
    };
    if let Some(serde_json::Value::Array(mut variants)) = obj.remove("anyOf") {
        variants.remove(null_position);
        if let Some(serde_json::Value::Object(variant)) = variants.pop() {
            for (key, value) in variant {
                obj.entry(key).or_insert(value);
            }
        }
        obj.insert("nullable".to_string(), serde_json::Value::Bool(true));
    }
    true
}

fn is_quarter_label(label: &str) -> bool {
    let Some((year, quarter)) = label.split_once("-Q") else {
        return false;
    };
    year.len() == 4
        && year.chars().all(|c| c.is_ascii_digit())
        && matches!(quarter.parse::<u32>(), Ok(q) if (1..=4).contains(&q) && quarter.len() == 1)
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_generation_includes_required_fields() {
        let schema = serde_json::to_string(&ProjectionResponse::generate_json_schema()).unwrap();
        assert!(schema.contains("business_name"));
        assert!(schema.contains("projections_data"));
        assert!(schema.contains("goal_projection"));
        assert!(schema.contains("fifteen_years_annual"));
    }

    #[test]
    fn test_response_schema_is_flattened_for_gemini() {
        let schema = ProjectionResponse::response_schema().unwrap();
        let raw = schema.to_string();

        // The generateContent responseSchema field rejects JSON Schema
        // reference machinery; everything must arrive inlined.
        assert!(!raw.contains("$ref"));
        assert!(!raw.contains("$schema"));
        assert!(!raw.contains("\"definitions\""));
        assert!(!raw.contains("allOf"));
        assert!(!raw.contains("anyOf"));

        // Referenced types are expanded in place, at every nesting depth.
        let completion = &schema["properties"]["completion_score"];
        assert_eq!(completion["type"], "object");
        assert!(completion["properties"]["score"].is_object());

        let monthly = &schema["properties"]["projections_data"]["properties"]["one_year_monthly"];
        assert_eq!(monthly["type"], "array");
        assert!(monthly["items"]["properties"]["month"].is_object());

        // Optional sections collapse to nullable rather than a null union.
        let goal = &schema["properties"]["goal_projection"];
        assert_eq!(goal["nullable"], true);
        assert!(goal["properties"]["goal_adjusted_projections"].is_object());
    }

    #[test]
    fn test_validate_accepts_valid_payload() {
        let raw = valid_response_json().to_string();
        let response = ProjectionResponse::validate(&raw).unwrap();
        assert_eq!(response.business_name, "Acme Trading Ltd");
        assert!(response.goal_projection.is_none());
        assert!(response.goal_feasibility_score.is_none());
    }

    #[test]
    fn test_validate_accepts_goal_fields() {
        let mut payload = valid_response_json();
        payload["goal_projection"] = json!({
            "goal_adjusted_projections": [month("2027-01")],
            "goal_achievement_summary": "Achievable with sustained 2% monthly growth.",
            "required_adjustments": ["Increase marketing spend by 20%"],
            "feasibility_assessment": "Realistic given historical performance.",
        });
        payload["goal_feasibility_score"] = quality_score(0.7);

        let response = ProjectionResponse::validate(&payload.to_string()).unwrap();
        let goal = response.goal_projection.unwrap();
        assert_eq!(goal.required_adjustments.len(), 1);
        assert_eq!(response.goal_feasibility_score.unwrap().score, 0.7);
    }

    #[test]
    fn test_validate_rejects_missing_business_name() {
        let mut payload = valid_response_json();
        payload.as_object_mut().unwrap().remove("business_name");
        let err = ProjectionResponse::validate(&payload.to_string()).unwrap_err();
        assert!(matches!(err, ProjectionError::SchemaViolation(_)));
    }

    #[test]
    fn test_validate_rejects_score_above_one() {
        let mut payload = valid_response_json();
        payload["completion_score"] = quality_score(1.5);
        let err = ProjectionResponse::validate(&payload.to_string()).unwrap_err();
        assert!(err.to_string().contains("completion_score"));
    }

    #[test]
    fn test_validate_rejects_negative_score() {
        let mut payload = valid_response_json();
        payload["data_quality_score"] = quality_score(-0.1);
        let err = ProjectionResponse::validate(&payload.to_string()).unwrap_err();
        assert!(matches!(err, ProjectionError::SchemaViolation(_)));
    }

    #[test]
    fn test_validate_rejects_bad_month_label() {
        let mut payload = valid_response_json();
        payload["projections_data"]["one_year_monthly"] = json!([month("January 2027")]);
        let err = ProjectionResponse::validate(&payload.to_string()).unwrap_err();
        assert!(err.to_string().contains("YYYY-MM"));
    }

    #[test]
    fn test_validate_rejects_bad_quarter_label() {
        let mut payload = valid_response_json();
        payload["projections_data"]["five_years_quarterly"] = json!([quarter("2027-Q5")]);
        let err = ProjectionResponse::validate(&payload.to_string()).unwrap_err();
        assert!(err.to_string().contains("YYYY-QN"));
    }

    #[test]
    fn test_validate_tolerates_unknown_fields() {
        let mut payload = valid_response_json();
        payload["currency"] = json!("NZD");
        assert!(ProjectionResponse::validate(&payload.to_string()).is_ok());
    }

    #[test]
    fn test_validate_does_not_enforce_cardinality() {
        // 12/36/20/10/15 is promised by the instruction text, not the schema.
        let raw = valid_response_json().to_string();
        let response = ProjectionResponse::validate(&raw).unwrap();
        assert_eq!(response.projections_data.one_year_monthly.len(), 2);
    }
}
