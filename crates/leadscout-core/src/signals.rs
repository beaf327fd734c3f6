//! Signal vocabulary: categories, priorities, and the per-company snapshot.

use serde::{Deserialize, Serialize};

/// The fixed set of signal categories the detector can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalCategory {
    Funding,
    Hiring,
    Leadership,
    Expansion,
    Acquisition,
    TechStack,
    Awards,
    Product,
    Partnership,
    News,
}

impl SignalCategory {
    /// All categories, in detection order.
    pub const ALL: [SignalCategory; 10] = [
        SignalCategory::Funding,
        SignalCategory::Hiring,
        SignalCategory::Leadership,
        SignalCategory::Expansion,
        SignalCategory::Acquisition,
        SignalCategory::TechStack,
        SignalCategory::Awards,
        SignalCategory::Product,
        SignalCategory::Partnership,
        SignalCategory::News,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SignalCategory::Funding => "funding",
            SignalCategory::Hiring => "hiring",
            SignalCategory::Leadership => "leadership",
            SignalCategory::Expansion => "expansion",
            SignalCategory::Acquisition => "acquisition",
            SignalCategory::TechStack => "tech_stack",
            SignalCategory::Awards => "awards",
            SignalCategory::Product => "product",
            SignalCategory::Partnership => "partnership",
            SignalCategory::News => "news",
        }
    }

    /// Fixed priority per category. Funding, leadership changes, and
    /// acquisitions are the strongest outreach triggers.
    #[must_use]
    pub fn priority(self) -> SignalPriority {
        match self {
            SignalCategory::Funding
            | SignalCategory::Leadership
            | SignalCategory::Acquisition => SignalPriority::High,
            SignalCategory::Hiring
            | SignalCategory::Expansion
            | SignalCategory::Product
            | SignalCategory::Partnership => SignalPriority::Medium,
            SignalCategory::TechStack | SignalCategory::Awards | SignalCategory::News => {
                SignalPriority::Low
            }
        }
    }
}

/// Signal priority with an explicit total order: `High > Medium > Low`.
///
/// Deduplication tie-breaks sort on this enum, never on priority strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalPriority {
    Low,
    Medium,
    High,
}

impl SignalPriority {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SignalPriority::High => "high",
            SignalPriority::Medium => "medium",
            SignalPriority::Low => "low",
        }
    }
}

/// A single detected fact about a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub category: SignalCategory,
    pub priority: SignalPriority,
    /// Human-readable detail, e.g. `"Series A - $5M"` or `"New CTO"`.
    pub detail: String,
    pub source_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
}

/// Aggregate counts derived from a snapshot. Never stored independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SignalCounts {
    pub total: usize,
    pub high_priority: usize,
    pub medium_priority: usize,
}

/// A company's retained signals: at most one per category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalSnapshot {
    pub signals: Vec<Signal>,
}

impl SignalSnapshot {
    #[must_use]
    pub fn counts(&self) -> SignalCounts {
        SignalCounts {
            total: self.signals.len(),
            high_priority: self
                .signals
                .iter()
                .filter(|s| s.priority == SignalPriority::High)
                .count(),
            medium_priority: self
                .signals
                .iter()
                .filter(|s| s.priority == SignalPriority::Medium)
                .count(),
        }
    }

    /// Concatenated detail text, used for buying/negative signal matching
    /// in the ICP scorer.
    #[must_use]
    pub fn combined_text(&self) -> String {
        self.signals
            .iter()
            .map(|s| s.detail.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_order_is_high_over_medium_over_low() {
        assert!(SignalPriority::High > SignalPriority::Medium);
        assert!(SignalPriority::Medium > SignalPriority::Low);
    }

    #[test]
    fn category_priorities_are_fixed() {
        assert_eq!(SignalCategory::Funding.priority(), SignalPriority::High);
        assert_eq!(SignalCategory::Hiring.priority(), SignalPriority::Medium);
        assert_eq!(SignalCategory::News.priority(), SignalPriority::Low);
    }

    #[test]
    fn snapshot_counts_are_derived() {
        let snapshot = SignalSnapshot {
            signals: vec![
                Signal {
                    category: SignalCategory::Funding,
                    priority: SignalPriority::High,
                    detail: "Series A - $5M".to_owned(),
                    source_url: "https://example.com/a".to_owned(),
                    published_date: None,
                },
                Signal {
                    category: SignalCategory::Hiring,
                    priority: SignalPriority::Medium,
                    detail: "Hiring 12 roles".to_owned(),
                    source_url: "https://example.com/b".to_owned(),
                    published_date: None,
                },
            ],
        };
        let counts = snapshot.counts();
        assert_eq!(counts.total, 2);
        assert_eq!(counts.high_priority, 1);
        assert_eq!(counts.medium_priority, 1);
    }

    #[test]
    fn category_serializes_as_snake_case() {
        let json = serde_json::to_string(&SignalCategory::TechStack).expect("serialize");
        assert_eq!(json, "\"tech_stack\"");
    }
}
