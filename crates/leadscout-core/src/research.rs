//! Evidence corpus and extraction payload types.

use serde::{Deserialize, Serialize};

/// One deduplicated search result used as extraction input.
///
/// Ephemeral: never persisted standalone, only folded into the company's
/// extracted info and signal snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub title: String,
    pub content: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
}

/// The bounded, URL-deduplicated evidence set for one research run.
///
/// A run with zero usable results is still a valid (empty) corpus; the
/// warnings record which queries failed and why.
#[derive(Debug, Clone, Default)]
pub struct ResearchCorpus {
    pub items: Vec<EvidenceItem>,
    pub warnings: Vec<String>,
}

/// A key person surfaced by extraction. Only C-level/founder/VP/director
/// roles are retained, ordered by seniority descending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPerson {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
}

/// The model's own ICP-fit assessment, recovered defensively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitAssessment {
    /// 0–100. Defaults to the neutral midpoint when extraction fails.
    #[serde(default = "FitAssessment::neutral_score")]
    pub score: u8,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub concerns: Vec<String>,
}

impl FitAssessment {
    pub(crate) fn neutral_score() -> u8 {
        50
    }
}

impl Default for FitAssessment {
    fn default() -> Self {
        Self {
            score: Self::neutral_score(),
            reasons: Vec::new(),
            concerns: Vec::new(),
        }
    }
}

/// Research-derived fields for a company. Every field is optional on the
/// wire; missing or mistyped fields coerce to their defaults here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedInfo {
    pub description: String,
    pub industry: String,
    pub employee_count: String,
    pub headquarters: String,
    /// Free-text founding info; reduced to a 4-digit year by the reconciler.
    pub founded: String,
    pub funding_stage: String,
    pub funding_amount: String,
    pub tech_stack: Vec<String>,
    pub competitors: Vec<String>,
    pub key_people: Vec<KeyPerson>,
    pub pain_points: Vec<String>,
    pub outreach_angles: Vec<String>,
    pub recent_news: Vec<String>,
    pub fit: FitAssessment,
}

impl ExtractedInfo {
    /// The documented fallback when extraction fails entirely: all fields
    /// empty, fit score at the neutral midpoint, one concern explaining why.
    #[must_use]
    pub fn empty_with_concern(concern: &str) -> Self {
        Self {
            fit: FitAssessment {
                score: FitAssessment::neutral_score(),
                reasons: Vec::new(),
                concerns: vec![concern.to_owned()],
            },
            ..Self::default()
        }
    }
}
