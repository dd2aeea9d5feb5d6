//! Drives one generation round trip: validate inputs, build the
//! instruction, call the model with the schema attached, then parse and
//! validate what comes back. One best-effort call per request; no retries,
//! no timeout override beyond the transport default, no partial results.

use std::sync::Arc;

use log::{info, warn};

use crate::error::{ProjectionError, Result};
use crate::llm::{GenerationRequest, GenerativeModel, InlineDocument};
use crate::prompt;
use crate::request::ProjectionRequest;
use crate::schema::ProjectionResponse;

pub struct ProjectionEngine {
    model: Arc<dyn GenerativeModel>,
}

impl ProjectionEngine {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    pub async fn generate_projection(
        &self,
        request: ProjectionRequest,
    ) -> Result<ProjectionResponse> {
        request.validate()?;

        info!(
            "Generating projection from '{}' and '{}'{}",
            request.profit_loss.filename,
            request.balance_sheet.filename,
            match &request.goal {
                Some(goal) => format!(
                    " with goal ${:.2} over {} years",
                    goal.target_revenue, goal.timeframe_years
                ),
                None => String::new(),
            }
        );

        let instruction = prompt::build_instruction(request.goal.as_ref());
        let response_schema = ProjectionResponse::response_schema()?;

        let outcome = self
            .model
            .generate(GenerationRequest {
                documents: vec![
                    InlineDocument::csv(request.profit_loss.bytes),
                    InlineDocument::csv(request.balance_sheet.bytes),
                ],
                instruction,
                response_schema,
            })
            .await?;

        match outcome.usage {
            Some(usage) => info!(
                "Tokens - Input: {} | Output: {} | Reasoning: {} | Total: {}",
                usage.input_tokens, usage.output_tokens, usage.reasoning_tokens, usage.total_tokens
            ),
            None => warn!("No token usage metadata in upstream response"),
        }

        if outcome.text.trim().is_empty() {
            return Err(ProjectionError::EmptyUpstreamResponse);
        }

        let response = ProjectionResponse::validate(&outcome.text)?;
        info!(
            "Validated projection for business '{}'",
            response.business_name
        );
        Ok(response)
    }
}
