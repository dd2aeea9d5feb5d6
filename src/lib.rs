//! # Financial Projection API
//!
//! An HTTP service that turns two uploaded accounting statements (a
//! profit-and-loss statement and a balance sheet, both CSV) into a
//! strictly-typed, multi-horizon financial projection document.
//!
//! The forecasting itself is delegated to Google Gemini: the service sends
//! both files, a detailed natural-language instruction, and a JSON Schema
//! structural constraint, then parses and validates the model's output
//! against that schema. What lives here is the contract and the pipeline
//! around it:
//!
//! - **[`schema`]**: the response contract, with field descriptions that
//!   double as model instructions, plus parse-and-validate.
//! - **[`prompt`]**: deterministic assembly of the instruction text,
//!   including the optional goal-based addendum.
//! - **[`engine`]**: one validated round trip per request, with no retries
//!   and no partial results.
//! - **[`goal`]**: the one deterministic calculation (required growth rate
//!   to hit a revenue target) that needs no model call.
//! - **[`api`]**: the axum boundary (`/predict`, `/predict-with-goal`,
//!   `/calculate-goal-requirements`).
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use financial_projection_api::engine::ProjectionEngine;
//! use financial_projection_api::llm::GeminiClient;
//! use financial_projection_api::request::{CsvDocument, ProjectionRequest};
//!
//! let client = GeminiClient::new(api_key, "gemini-2.5-pro");
//! let engine = ProjectionEngine::new(Arc::new(client));
//! let response = engine
//!     .generate_projection(ProjectionRequest {
//!         profit_loss: CsvDocument::new("pl.csv", pl_bytes),
//!         balance_sheet: CsvDocument::new("bs.csv", bs_bytes),
//!         goal: None,
//!     })
//!     .await?;
//! println!("{}", response.executive_summary);
//! ```

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod goal;
pub mod llm;
pub mod prompt;
pub mod request;
pub mod schema;

pub use engine::ProjectionEngine;
pub use error::{ProjectionError, Result};
pub use goal::{calculate_goal_requirements, GoalRequirements};
pub use request::{CsvDocument, GoalParams, ProjectionRequest};
pub use schema::ProjectionResponse;
