//! Wire types for the Gemini `generateContent` REST API, plus the
//! transport-agnostic request/outcome types the engine works with.

use serde::{Deserialize, Serialize};

/// A document attached to a generation request, sent inline rather than via
/// the file upload API. Payloads here are small tabular statements, well
/// under the inline size limit.
#[derive(Debug, Clone)]
pub struct InlineDocument {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl InlineDocument {
    pub fn csv(bytes: Vec<u8>) -> Self {
        Self {
            mime_type: "text/csv".to_string(),
            bytes,
        }
    }
}

/// What the engine asks of a generative model: documents, the instruction,
/// and the structural output constraint.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub documents: Vec<InlineDocument>,
    pub instruction: String,
    pub response_schema: serde_json::Value,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub reasoning_tokens: u64,
    pub total_tokens: u64,
}

#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

// --- Gemini REST payloads ------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum Part {
    Text(String),
    InlineData(Blob),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Blob {
    pub mime_type: String,
    /// Base64-encoded payload.
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: serde_json::Value,
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub thinking_config: ThinkingConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ThinkingConfig {
    pub thinking_budget: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    pub content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u64,
    #[serde(default)]
    pub candidates_token_count: u64,
    #[serde(default)]
    pub thoughts_token_count: u64,
    #[serde(default)]
    pub total_token_count: u64,
}

impl From<UsageMetadata> for TokenUsage {
    fn from(meta: UsageMetadata) -> Self {
        Self {
            input_tokens: meta.prompt_token_count,
            output_tokens: meta.candidates_token_count,
            reasoning_tokens: meta.thoughts_token_count,
            total_tokens: meta.total_token_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_serializes_with_gemini_field_names() {
        let text = serde_json::to_value(Part::Text("hello".to_string())).unwrap();
        assert_eq!(text["text"], "hello");

        let blob = serde_json::to_value(Part::InlineData(Blob {
            mime_type: "text/csv".to_string(),
            data: "aGk=".to_string(),
        }))
        .unwrap();
        assert_eq!(blob["inlineData"]["mimeType"], "text/csv");
        assert_eq!(blob["inlineData"]["data"], "aGk=");
    }

    #[test]
    fn test_response_decodes_usage_metadata() {
        let raw = serde_json::json!({
            "candidates": [
                { "content": { "role": "model", "parts": [ { "text": "{}" } ] } }
            ],
            "usageMetadata": {
                "promptTokenCount": 1200,
                "candidatesTokenCount": 3400,
                "thoughtsTokenCount": 8000,
                "totalTokenCount": 12600
            }
        });

        let decoded: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        let usage = TokenUsage::from(decoded.usage_metadata.unwrap());
        assert_eq!(usage.input_tokens, 1200);
        assert_eq!(usage.reasoning_tokens, 8000);
        assert_eq!(usage.total_tokens, 12600);
    }

    #[test]
    fn test_response_tolerates_missing_candidates() {
        let decoded: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(decoded.candidates.is_empty());
        assert!(decoded.usage_metadata.is_none());
    }
}
