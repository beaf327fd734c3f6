//! Core domain types and configuration for leadscout.
//!
//! Everything here is plain data: signal vocabulary, evidence items,
//! extraction payloads, the ICP ruleset, grading attributes, and the
//! env-driven application config. No I/O beyond reading the ruleset file.

use thiserror::Error;

pub mod app_config;
pub mod company;
pub mod config;
pub mod grading;
pub mod icp;
pub mod research;
pub mod ruleset;
pub mod signals;

pub use app_config::{AppConfig, Environment};
pub use company::{is_unknown_value, normalize_company_name};
pub use config::{load_app_config, load_app_config_from_env};
pub use grading::{CriterionRow, Grade, GradingResult, LeadAttributes};
pub use icp::{BreakdownRow, CompanyAttributes, IcpRuleset, RuleEntry, ScoreResult, SizeBand, Tier};
pub use research::{EvidenceItem, ExtractedInfo, FitAssessment, KeyPerson, ResearchCorpus};
pub use ruleset::load_ruleset_file;
pub use signals::{Signal, SignalCategory, SignalCounts, SignalPriority, SignalSnapshot};

/// Errors produced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read ruleset file {path}: {reason}")]
    RulesetFile { path: String, reason: String },
}
