//! ICP ruleset configuration and score result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One weighted rule entry: a label matched against a company attribute.
///
/// Entries are kept in an ordered list; iteration order is preserved so
/// "maximum match wins" tie-breaks are deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEntry {
    pub label: String,
    /// Positive for regular categories, negative for negative signals.
    pub points: i32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// A company-size band matched by numeric range containment, not substring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeBand {
    /// Display label, e.g. `"51-200"`.
    pub label: String,
    pub min: u32,
    /// `None` means unbounded above.
    #[serde(default)]
    pub max: Option<u32>,
    pub points: i32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl SizeBand {
    #[must_use]
    pub fn contains(&self, employees: u32) -> bool {
        employees >= self.min && self.max.is_none_or(|max| employees <= max)
    }
}

/// The configurable weighted ruleset behind the ICP fit score.
///
/// Owned by the tenant, versioned implicitly by overwrite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IcpRuleset {
    pub industries: Vec<RuleEntry>,
    pub company_sizes: Vec<SizeBand>,
    pub funding_stages: Vec<RuleEntry>,
    pub geographies: Vec<RuleEntry>,
    pub tech_stack: Vec<RuleEntry>,
    pub buying_signals: Vec<RuleEntry>,
    /// Entries here carry negative `points` and subtract from the total.
    pub negative_signals: Vec<RuleEntry>,
}

/// Fit tier derived from the normalized score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    High,
    Medium,
    Low,
}

impl Tier {
    #[must_use]
    pub fn from_score(score: u8) -> Self {
        match score {
            70..=u8::MAX => Tier::High,
            40..=69 => Tier::Medium,
            _ => Tier::Low,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::High => "high",
            Tier::Medium => "medium",
            Tier::Low => "low",
        }
    }
}

/// One explainability row: every scored category gets exactly one, plus
/// one extra row per triggered negative signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownRow {
    pub category: String,
    /// The rule label that matched, or `None` for unmatched categories.
    pub matched: Option<String>,
    pub points: i32,
    pub max_points: i32,
}

/// The ICP fit score for one company against one ruleset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Normalized 0–100.
    pub score: u8,
    pub tier: Tier,
    pub total: i32,
    pub max: i32,
    pub breakdown: Vec<BreakdownRow>,
    pub scored_at: DateTime<Utc>,
}

/// The company attributes the fit scorer reads. Assembled from the durable
/// record plus its signal snapshot.
#[derive(Debug, Clone, Default)]
pub struct CompanyAttributes {
    pub name: String,
    pub industry: Option<String>,
    /// Free text; the scorer extracts the first integer run.
    pub employee_count: Option<String>,
    pub funding_stage: Option<String>,
    pub country: Option<String>,
    pub tech_stack: Vec<String>,
    /// Concatenated signal detail text for buying/negative signal matching.
    pub signals_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_thresholds() {
        assert_eq!(Tier::from_score(100), Tier::High);
        assert_eq!(Tier::from_score(70), Tier::High);
        assert_eq!(Tier::from_score(69), Tier::Medium);
        assert_eq!(Tier::from_score(40), Tier::Medium);
        assert_eq!(Tier::from_score(39), Tier::Low);
        assert_eq!(Tier::from_score(0), Tier::Low);
    }

    #[test]
    fn size_band_containment() {
        let band = SizeBand {
            label: "51-200".to_owned(),
            min: 51,
            max: Some(200),
            points: 10,
            enabled: true,
        };
        assert!(band.contains(51));
        assert!(band.contains(120));
        assert!(band.contains(200));
        assert!(!band.contains(50));
        assert!(!band.contains(201));
    }

    #[test]
    fn unbounded_band_contains_large_counts() {
        let band = SizeBand {
            label: "1000+".to_owned(),
            min: 1000,
            max: None,
            points: 5,
            enabled: true,
        };
        assert!(band.contains(50_000));
        assert!(!band.contains(999));
    }

    #[test]
    fn rule_entry_enabled_defaults_to_true() {
        let entry: RuleEntry =
            serde_json::from_str(r#"{"label":"SaaS","points":10}"#).expect("deserialize");
        assert!(entry.enabled);
    }
}
