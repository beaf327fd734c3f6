//! Research, extraction, and scoring pipeline for leadscout.
//!
//! The engine turns a company name into a durable, scored record in five
//! stages: gather evidence ([`aggregator`]), detect outreach signals
//! ([`detector`]), extract structured fields via the completion API
//! ([`extractor`]), merge knowledge into the company store ([`reconcile`]),
//! and score/grade the result ([`scorer`], [`grader`]). The [`service`]
//! module orchestrates the stages and owns the cache gate.

pub mod aggregator;
pub mod detector;
mod error;
pub mod extractor;
pub mod grader;
pub mod reconcile;
pub mod scorer;
pub mod service;

pub use error::EngineError;
pub use service::{BatchScoreItem, Engine, EngineConfig, ResearchOutcome, ScoreOutcome};
