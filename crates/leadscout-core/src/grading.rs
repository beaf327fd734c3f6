//! Lead-grading attribute set and result types.
//!
//! Unlike the ICP ruleset, grading criteria are fixed constants with three
//! weight tiers (3/2/1); only the lookup tables behind each criterion
//! exist, and those live in the engine's grader.

use serde::{Deserialize, Serialize};

/// The flat attribute set the lead grader reads. All fields are free text
/// and optional; absent/unknown criteria are excluded from the grade
/// entirely rather than counted as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadAttributes {
    /// `"high"` / `"medium"` / `"low"`.
    pub buyer_intent: Option<String>,
    /// Open role count, or `"yes"`-style flags.
    pub hiring: Option<String>,
    /// Months since the last funding round.
    pub funding_months_ago: Option<String>,
    pub funding_stage: Option<String>,
    pub funding_amount: Option<String>,
    pub revenue: Option<String>,
    pub title: Option<String>,
    pub country: Option<String>,
    pub employee_count: Option<String>,
    pub industry: Option<String>,
    /// LinkedIn-style connection count.
    pub connections: Option<String>,
}

/// Letter grade bands: `>=81 A, >=61 B, >=41 C, >=21 D, else E`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
}

impl Grade {
    #[must_use]
    pub fn from_percentage(pct: u8) -> Self {
        match pct {
            81..=u8::MAX => Grade::A,
            61..=80 => Grade::B,
            41..=60 => Grade::C,
            21..=40 => Grade::D,
            _ => Grade::E,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::E => "E",
        }
    }
}

/// One graded criterion: points earned and the maximum it could have
/// earned, both already multiplied by the tier weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionRow {
    pub criterion: String,
    pub tier_weight: i32,
    pub points: i32,
    pub max_points: i32,
}

/// The lead grade for one attribute set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingResult {
    /// `round(100 * total / max)`, or 0 when no criteria had data.
    pub percentage: u8,
    pub grade: Grade,
    pub total: i32,
    pub max: i32,
    /// Only criteria that had data appear here.
    pub breakdown: Vec<CriterionRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_bands() {
        assert_eq!(Grade::from_percentage(100), Grade::A);
        assert_eq!(Grade::from_percentage(81), Grade::A);
        assert_eq!(Grade::from_percentage(80), Grade::B);
        assert_eq!(Grade::from_percentage(61), Grade::B);
        assert_eq!(Grade::from_percentage(60), Grade::C);
        assert_eq!(Grade::from_percentage(41), Grade::C);
        assert_eq!(Grade::from_percentage(40), Grade::D);
        assert_eq!(Grade::from_percentage(21), Grade::D);
        assert_eq!(Grade::from_percentage(20), Grade::E);
        assert_eq!(Grade::from_percentage(0), Grade::E);
    }

    #[test]
    fn lead_attributes_deserialize_from_empty_object() {
        let attrs: LeadAttributes = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(attrs, LeadAttributes::default());
    }
}
