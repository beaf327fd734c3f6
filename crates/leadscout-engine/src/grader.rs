//! Lead Grader: fixed-criteria letter grading of a lead attribute set.
//!
//! Eleven criteria in three weight tiers (3/2/1). Each criterion maps its
//! free-text attribute to 0-10 points through a fixed lookup table; a
//! criterion with no data is excluded from both the total and the maximum
//! rather than counted as zero, so sparse leads are not punished for what
//! nobody knows yet.

use leadscout_core::{is_unknown_value, CriterionRow, Grade, GradingResult, LeadAttributes};

struct Criterion {
    name: &'static str,
    weight: i32,
    points: fn(&str) -> i32,
}

const CRITERIA: [Criterion; 11] = [
    // Tier 1: strongest buying evidence.
    Criterion { name: "buyer_intent", weight: 3, points: buyer_intent_points },
    Criterion { name: "hiring", weight: 3, points: hiring_points },
    Criterion { name: "funding_recency", weight: 3, points: funding_recency_points },
    // Tier 2: company momentum.
    Criterion { name: "funding_stage", weight: 2, points: funding_stage_points },
    Criterion { name: "funding_amount", weight: 2, points: funding_amount_points },
    Criterion { name: "revenue", weight: 2, points: revenue_points },
    Criterion { name: "title", weight: 2, points: title_points },
    // Tier 3: firmographics.
    Criterion { name: "geography", weight: 1, points: geography_points },
    Criterion { name: "company_size", weight: 1, points: company_size_points },
    Criterion { name: "industry", weight: 1, points: industry_points },
    Criterion { name: "connections", weight: 1, points: connections_points },
];

/// Grades one lead. Pure; the result is reproducible for the same input.
#[must_use]
pub fn grade(attrs: &LeadAttributes) -> GradingResult {
    let values: [&Option<String>; 11] = [
        &attrs.buyer_intent,
        &attrs.hiring,
        &attrs.funding_months_ago,
        &attrs.funding_stage,
        &attrs.funding_amount,
        &attrs.revenue,
        &attrs.title,
        &attrs.country,
        &attrs.employee_count,
        &attrs.industry,
        &attrs.connections,
    ];

    let mut total = 0i32;
    let mut max = 0i32;
    let mut breakdown = Vec::new();

    for (criterion, value) in CRITERIA.iter().zip(values) {
        let Some(value) = value.as_deref().filter(|v| !is_unknown_value(v)) else {
            continue;
        };
        let points = (criterion.points)(value) * criterion.weight;
        let max_points = 10 * criterion.weight;
        total += points;
        max += max_points;
        breakdown.push(CriterionRow {
            criterion: criterion.name.to_owned(),
            tier_weight: criterion.weight,
            points,
            max_points,
        });
    }

    let percentage = if max > 0 { percentage_of(total, max) } else { 0 };

    GradingResult {
        percentage,
        grade: Grade::from_percentage(percentage),
        total,
        max,
        breakdown,
    }
}

// total <= max, both small positive integers.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percentage_of(total: i32, max: i32) -> u8 {
    let pct = (100.0 * f64::from(total) / f64::from(max)).round();
    pct.clamp(0.0, 100.0) as u8
}

// ---------------------------------------------------------------------------
// Per-criterion lookup tables. All values are even so a single known
// criterion always lands on a 20%-multiple percentage.
// ---------------------------------------------------------------------------

fn buyer_intent_points(value: &str) -> i32 {
    let value = value.to_lowercase();
    if value.contains("high") {
        10
    } else if value.contains("medium") {
        6
    } else if value.contains("low") {
        2
    } else {
        2
    }
}

fn hiring_points(value: &str) -> i32 {
    if let Some(count) = first_integer(value) {
        return match count {
            10.. => 10,
            3..=9 => 8,
            1..=2 => 6,
            _ => 0,
        };
    }
    let value = value.to_lowercase();
    if ["yes", "true", "active", "actively", "hiring"]
        .iter()
        .any(|flag| value.contains(flag))
    {
        6
    } else if ["no", "false"].iter().any(|flag| value.contains(flag)) {
        0
    } else {
        2
    }
}

fn funding_recency_points(value: &str) -> i32 {
    match first_integer(value) {
        Some(months) => match months {
            0..=3 => 10,
            4..=6 => 8,
            7..=12 => 6,
            13..=24 => 4,
            _ => 2,
        },
        None => 2,
    }
}

fn funding_stage_points(value: &str) -> i32 {
    let value = value.to_lowercase();
    if value.contains("series a") || value.contains("series b") {
        10
    } else if value.contains("seed") {
        8
    } else if value.contains("series c") {
        6
    } else if value.contains("series d") || value.contains("series e") {
        4
    } else {
        2
    }
}

fn funding_amount_points(value: &str) -> i32 {
    match parse_money_millions(value) {
        Some(millions) if millions >= 50.0 => 10,
        Some(millions) if millions >= 10.0 => 8,
        Some(millions) if millions >= 5.0 => 6,
        Some(millions) if millions >= 1.0 => 4,
        _ => 2,
    }
}

fn revenue_points(value: &str) -> i32 {
    match parse_money_millions(value) {
        Some(millions) if millions >= 100.0 => 10,
        Some(millions) if millions >= 10.0 => 8,
        Some(millions) if millions >= 1.0 => 6,
        _ => 2,
    }
}

fn title_points(value: &str) -> i32 {
    let value = value.to_lowercase();
    if value.contains("founder")
        || value.contains("chief")
        || has_word(&value, &["ceo", "cto", "cfo", "coo", "cro", "cmo"])
    {
        10
    } else if value.contains("vp") || value.contains("vice president") {
        8
    } else if value.contains("head of") || value.contains("director") {
        6
    } else if value.contains("manager") {
        4
    } else {
        2
    }
}

fn geography_points(value: &str) -> i32 {
    let value = value.trim().to_lowercase();
    if ["us", "usa"].contains(&value.as_str())
        || value.contains("united states")
        || value.contains("america")
    {
        10
    } else if value == "uk"
        || ["canada", "united kingdom", "germany", "australia"]
            .iter()
            .any(|c| value.contains(c))
    {
        8
    } else if [
        "france", "netherlands", "sweden", "denmark", "norway", "finland", "ireland",
        "spain", "italy", "belgium", "switzerland", "austria",
    ]
    .iter()
    .any(|c| value.contains(c))
    {
        6
    } else {
        4
    }
}

fn company_size_points(value: &str) -> i32 {
    match first_integer(value) {
        Some(employees) => match employees {
            51..=200 => 10,
            11..=50 | 201..=500 => 8,
            501..=1000 => 6,
            _ => 4,
        },
        None => 2,
    }
}

fn industry_points(value: &str) -> i32 {
    let value = value.to_lowercase();
    if value.contains("saas") || value.contains("software") {
        10
    } else if value.contains("fintech") || value.contains("commerce") {
        8
    } else if value.contains("health") || value.contains("tech") {
        6
    } else {
        2
    }
}

fn connections_points(value: &str) -> i32 {
    match first_integer(value) {
        Some(connections) => match connections {
            500.. => 10,
            200..=499 => 8,
            50..=199 => 6,
            10..=49 => 4,
            _ => 2,
        },
        None => 2,
    }
}

// ---------------------------------------------------------------------------
// Free-text parsing helpers
// ---------------------------------------------------------------------------

/// Whole-word membership test. Abbreviations like "cto" must match a
/// standalone token, not a substring ("Director" contains "cto").
fn has_word(text: &str, words: &[&str]) -> bool {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .any(|token| words.contains(&token))
}

/// First run of digits, thousands separators stripped: `"1,200+"` -> 1200.
fn first_integer(text: &str) -> Option<i64> {
    let cleaned = text.replace(',', "");
    let digits: String = cleaned
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Parses money text into millions of dollars: `"$5M"`, `"$5 million"`,
/// `"2.3B"`, or a raw dollar figure like `"12000000"`.
fn parse_money_millions(text: &str) -> Option<f64> {
    let cleaned = text.replace([',', '$'], "");
    let lower = cleaned.to_lowercase();
    let number: String = lower
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let value: f64 = number.parse().ok()?;

    let rest = &lower[lower.find(&number).map_or(0, |i| i + number.len())..];
    let rest = rest.trim_start();
    if rest.starts_with('b') {
        Some(value * 1_000.0)
    } else if rest.starts_with('m') {
        Some(value)
    } else if rest.starts_with('k') {
        Some(value / 1_000.0)
    } else if value > 100_000.0 {
        // A bare figure that large is dollars, not millions.
        Some(value / 1_000_000.0)
    } else {
        Some(value)
    }
}
