//! ICP Fit Scorer: weighted ruleset scoring with an explainable breakdown.
//!
//! Deterministic and pure: no network, no clock beyond the `scored_at`
//! stamp. Categories with no enabled rules are excluded from both the
//! total and the maximum, so the normalized score only reflects what the
//! ruleset actually asks about. When several rules in one category match,
//! the highest-weight match wins.

use chrono::Utc;
use leadscout_core::{BreakdownRow, CompanyAttributes, IcpRuleset, RuleEntry, ScoreResult, Tier};

/// Scores one company against one ruleset.
#[must_use]
pub fn score(attrs: &CompanyAttributes, ruleset: &IcpRuleset) -> ScoreResult {
    let mut total = 0i32;
    let mut max = 0i32;
    let mut breakdown = Vec::new();

    let label_categories: [(&str, &[RuleEntry], Option<&str>); 4] = [
        ("industries", &ruleset.industries, attrs.industry.as_deref()),
        (
            "funding_stages",
            &ruleset.funding_stages,
            attrs.funding_stage.as_deref(),
        ),
        ("geographies", &ruleset.geographies, attrs.country.as_deref()),
        (
            "buying_signals",
            &ruleset.buying_signals,
            Some(attrs.signals_text.as_str()),
        ),
    ];

    for (category, entries, attr) in label_categories {
        let enabled: Vec<&RuleEntry> = entries.iter().filter(|e| e.enabled).collect();
        if enabled.is_empty() {
            continue;
        }
        let category_max = enabled.iter().map(|e| e.points).max().unwrap_or(0);

        let matched = match category {
            "buying_signals" => best_word_match(attr.unwrap_or(""), &enabled),
            _ => attr.and_then(|value| best_label_match(value, &enabled)),
        };

        max += category_max;
        push_row(&mut breakdown, &mut total, category, matched, category_max);
    }

    // Company size: numeric band containment, not substring matching.
    let enabled_bands: Vec<_> = ruleset.company_sizes.iter().filter(|b| b.enabled).collect();
    if !enabled_bands.is_empty() {
        let band_max = enabled_bands.iter().map(|b| b.points).max().unwrap_or(0);
        let matched = attrs
            .employee_count
            .as_deref()
            .and_then(first_integer_run)
            .and_then(|employees| {
                enabled_bands
                    .iter()
                    .filter(|band| band.contains(employees))
                    .max_by_key(|band| band.points)
                    .map(|band| (band.label.clone(), band.points))
            });
        max += band_max;
        push_row(&mut breakdown, &mut total, "company_sizes", matched, band_max);
    }

    // Tech stack: any company technology containing the rule label matches.
    let enabled_tech: Vec<&RuleEntry> = ruleset.tech_stack.iter().filter(|e| e.enabled).collect();
    if !enabled_tech.is_empty() {
        let tech_max = enabled_tech.iter().map(|e| e.points).max().unwrap_or(0);
        let joined = attrs.tech_stack.join(" ");
        let matched = best_label_match(&joined, &enabled_tech);
        max += tech_max;
        push_row(&mut breakdown, &mut total, "tech_stack", matched, tech_max);
    }

    // Negative signals subtract after positives; they never raise the max.
    for entry in ruleset.negative_signals.iter().filter(|e| e.enabled) {
        if word_matches(&attrs.signals_text, &entry.label) {
            total += entry.points;
            breakdown.push(BreakdownRow {
                category: "negative_signals".to_owned(),
                matched: Some(entry.label.clone()),
                points: entry.points,
                max_points: 0,
            });
        }
    }

    let total = total.max(0);
    let normalized = if max > 0 {
        normalize_score(total, max)
    } else {
        0
    };

    ScoreResult {
        score: normalized,
        tier: Tier::from_score(normalized),
        total,
        max,
        breakdown,
        scored_at: Utc::now(),
    }
}

fn push_row(
    breakdown: &mut Vec<BreakdownRow>,
    total: &mut i32,
    category: &str,
    matched: Option<(String, i32)>,
    category_max: i32,
) {
    match matched {
        Some((label, points)) => {
            *total += points;
            breakdown.push(BreakdownRow {
                category: category.to_owned(),
                matched: Some(label),
                points,
                max_points: category_max,
            });
        }
        None => breakdown.push(BreakdownRow {
            category: category.to_owned(),
            matched: None,
            points: 0,
            max_points: category_max,
        }),
    }
}

/// Case/punctuation-insensitive substring match: the company attribute
/// must contain the rule label. Highest-weight match wins ties.
fn best_label_match(value: &str, entries: &[&RuleEntry]) -> Option<(String, i32)> {
    let haystack = normalize(value);
    if haystack.is_empty() {
        return None;
    }
    entries
        .iter()
        .filter(|entry| {
            let needle = normalize(&entry.label);
            !needle.is_empty() && haystack.contains(&needle)
        })
        .max_by_key(|entry| entry.points)
        .map(|entry| (entry.label.clone(), entry.points))
}

/// Buying-signal match: the rule fires if any word of its label appears in
/// the concatenated signal text.
fn best_word_match(signals_text: &str, entries: &[&RuleEntry]) -> Option<(String, i32)> {
    entries
        .iter()
        .filter(|entry| word_matches(signals_text, &entry.label))
        .max_by_key(|entry| entry.points)
        .map(|entry| (entry.label.clone(), entry.points))
}

fn word_matches(signals_text: &str, label: &str) -> bool {
    let text = signals_text.to_lowercase();
    label
        .split_whitespace()
        .any(|word| text.contains(&word.to_lowercase()))
}

/// Lowercase alphanumeric form used for label containment.
fn normalize(value: &str) -> String {
    value
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_lowercase()
}

/// First run of ASCII digits in free text, e.g. `"~120 employees"` -> 120.
fn first_integer_run(text: &str) -> Option<u32> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

// total <= max and both are small positive integers.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn normalize_score(total: i32, max: i32) -> u8 {
    let pct = (100.0 * f64::from(total) / f64::from(max)).round();
    pct.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadscout_core::SizeBand;

    fn entry(label: &str, points: i32) -> RuleEntry {
        RuleEntry {
            label: label.to_owned(),
            points,
            enabled: true,
        }
    }

    fn band(label: &str, min: u32, max: Option<u32>, points: i32) -> SizeBand {
        SizeBand {
            label: label.to_owned(),
            min,
            max,
            points,
            enabled: true,
        }
    }

    #[test]
    fn two_enabled_categories_both_matching_score_one_hundred() {
        let ruleset = IcpRuleset {
            industries: vec![entry("SaaS", 10)],
            company_sizes: vec![band("51-200", 51, Some(200), 10)],
            ..IcpRuleset::default()
        };
        let attrs = CompanyAttributes {
            name: "Acme".to_owned(),
            industry: Some("B2B SaaS".to_owned()),
            employee_count: Some("120".to_owned()),
            ..CompanyAttributes::default()
        };

        let result = score(&attrs, &ruleset);
        assert_eq!(result.score, 100);
        assert_eq!(result.tier, Tier::High);
        assert_eq!(result.total, 20);
        assert_eq!(result.max, 20);
        assert_eq!(result.breakdown.len(), 2);
    }

    #[test]
    fn disabled_and_empty_categories_are_excluded_from_max() {
        let ruleset = IcpRuleset {
            industries: vec![entry("SaaS", 10)],
            funding_stages: vec![RuleEntry {
                enabled: false,
                ..entry("Series A", 10)
            }],
            ..IcpRuleset::default()
        };
        let attrs = CompanyAttributes {
            industry: Some("SaaS".to_owned()),
            ..CompanyAttributes::default()
        };

        let result = score(&attrs, &ruleset);
        assert_eq!(result.max, 10, "disabled category contributes nothing");
        assert_eq!(result.score, 100);
        assert_eq!(result.breakdown.len(), 1);
    }

    #[test]
    fn unmatched_category_still_gets_a_breakdown_row() {
        let ruleset = IcpRuleset {
            industries: vec![entry("SaaS", 10)],
            geographies: vec![entry("United States", 10)],
            ..IcpRuleset::default()
        };
        let attrs = CompanyAttributes {
            industry: Some("SaaS".to_owned()),
            country: None,
            ..CompanyAttributes::default()
        };

        let result = score(&attrs, &ruleset);
        assert_eq!(result.score, 50);
        assert_eq!(result.tier, Tier::Medium);
        let geo = result
            .breakdown
            .iter()
            .find(|row| row.category == "geographies")
            .expect("row for unmatched category");
        assert_eq!(geo.matched, None);
        assert_eq!(geo.points, 0);
        assert_eq!(geo.max_points, 10);
    }

    #[test]
    fn highest_weight_match_wins_within_a_category() {
        let ruleset = IcpRuleset {
            industries: vec![entry("Tech", 4), entry("Fintech", 8)],
            ..IcpRuleset::default()
        };
        let attrs = CompanyAttributes {
            // Contains both labels; "Fintech" carries more weight.
            industry: Some("Fintech".to_owned()),
            ..CompanyAttributes::default()
        };

        let result = score(&attrs, &ruleset);
        assert_eq!(result.total, 8);
        assert_eq!(
            result.breakdown[0].matched.as_deref(),
            Some("Fintech")
        );
    }

    #[test]
    fn size_band_uses_numeric_containment() {
        let ruleset = IcpRuleset {
            company_sizes: vec![
                band("11-50", 11, Some(50), 7),
                band("51-200", 51, Some(200), 10),
            ],
            ..IcpRuleset::default()
        };
        let attrs = CompanyAttributes {
            employee_count: Some("about 120 employees".to_owned()),
            ..CompanyAttributes::default()
        };

        let result = score(&attrs, &ruleset);
        assert_eq!(result.total, 10);
        assert_eq!(result.breakdown[0].matched.as_deref(), Some("51-200"));
    }

    #[test]
    fn buying_signal_matches_any_word_of_the_label() {
        let ruleset = IcpRuleset {
            buying_signals: vec![entry("funding hiring expansion", 10)],
            ..IcpRuleset::default()
        };
        let attrs = CompanyAttributes {
            signals_text: "Series A - $5M Hiring 12 roles".to_owned(),
            ..CompanyAttributes::default()
        };

        let result = score(&attrs, &ruleset);
        assert_eq!(result.score, 100);
    }

    #[test]
    fn negative_signals_subtract_and_floor_at_zero() {
        let ruleset = IcpRuleset {
            industries: vec![entry("SaaS", 10)],
            negative_signals: vec![entry("layoffs downsizing", -15)],
            ..IcpRuleset::default()
        };
        let attrs = CompanyAttributes {
            industry: Some("SaaS".to_owned()),
            signals_text: "Acme announces layoffs across sales".to_owned(),
            ..CompanyAttributes::default()
        };

        let result = score(&attrs, &ruleset);
        assert_eq!(result.total, 0, "10 - 15 floors at zero");
        assert_eq!(result.score, 0);
        assert_eq!(result.max, 10, "negatives never raise the max");
        let negative = result
            .breakdown
            .iter()
            .find(|row| row.category == "negative_signals")
            .expect("negative row is recorded");
        assert_eq!(negative.points, -15);
    }

    #[test]
    fn empty_ruleset_scores_zero() {
        let result = score(&CompanyAttributes::default(), &IcpRuleset::default());
        assert_eq!(result.score, 0);
        assert_eq!(result.max, 0);
        assert!(result.breakdown.is_empty());
        assert_eq!(result.tier, Tier::Low);
    }
}
