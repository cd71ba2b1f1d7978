//! Interview Service
//!
//! Adaptive Excel skills interview driven by a completion gateway.
//!
//! ## Architecture
//! - `engine.rs` - State machine: create, start, respond, status, report, cleanup
//! - `evaluator.rs` - Scores answers, keyword fallback on generation failure
//! - `generator.rs` - Introduction transition, follow-ups, next questions, closing
//! - `report.rs` - Deterministic aggregation plus optional generated narrative
//! - `generation.rs` - Gateway calls under a timeout, failure classification
//! - `extractor.rs` - Recovers a JSON object from free-form text
//! - `schemas.rs` - Typed, lenient payloads for each structured call
//! - `fallback.rs` - Canned questions, messages and keyword scoring
//! - `prompts.rs` - Interviewer texts and prompt builders
//! - `locks.rs` - Per-session serialization

pub mod engine;
pub mod evaluator;
pub mod extractor;
pub mod fallback;
pub mod generation;
pub mod generator;
pub mod locks;
pub mod prompts;
pub mod report;
pub mod schemas;

pub use engine::{EngineSettings, InterviewEngine};
pub use extractor::{extract, Extraction};
pub use fallback::FailureReason;
pub use generation::{GenerationClient, GenerationError};
