use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use log::debug;
use reqwest::Client;

use crate::error::{ProjectionError, Result};
use crate::llm::types::*;
use crate::llm::GenerativeModel;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// Fixed sampling configuration for projection generation. Low temperature
// keeps the numeric output stable; the large thinking budget gives the
// model room to work through the multi-horizon arithmetic.
const TEMPERATURE: f64 = 0.1;
const TOP_P: f64 = 0.8;
const TOP_K: u32 = 40;
const THINKING_BUDGET: u32 = 32_768;

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: GEMINI_BASE_URL.to_string(),
            model: model.into(),
        }
    }
}

#[async_trait::async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationOutcome> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let mut parts: Vec<Part> = request
            .documents
            .iter()
            .map(|doc| {
                Part::InlineData(Blob {
                    mime_type: doc.mime_type.clone(),
                    data: BASE64.encode(&doc.bytes),
                })
            })
            .collect();
        parts.push(Part::Text(request.instruction));

        let payload = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: request.response_schema,
                temperature: TEMPERATURE,
                top_p: TOP_P,
                top_k: TOP_K,
                thinking_config: ThinkingConfig {
                    thinking_budget: THINKING_BUDGET,
                },
            },
        };

        debug!("Calling Gemini model {}", self.model);
        let res = self.client.post(&url).json(&payload).send().await?;
        let status = res.status();

        if !status.is_success() {
            let err_text = res.text().await.unwrap_or_default();
            return Err(ProjectionError::UpstreamTransport(format!(
                "Gemini API error (status {status}): {err_text}"
            )));
        }

        let body: GenerateContentResponse = res.json().await?;
        let usage = body.usage_metadata.map(TokenUsage::from);

        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| {
                content.parts.into_iter().find_map(|part| match part {
                    Part::Text(text) => Some(text),
                    Part::InlineData(_) => None,
                })
            })
            .ok_or(ProjectionError::EmptyUpstreamResponse)?;

        Ok(GenerationOutcome { text, usage })
    }
}
