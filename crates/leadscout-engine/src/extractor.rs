//! Structured Extractor: turns the evidence corpus into [`ExtractedInfo`]
//! via one completion call.
//!
//! The model is asked for JSON only, but the parser assumes it will get
//! prose anyway: it recovers the first balanced JSON object from the
//! response, coerces fields defensively, and falls back to an empty
//! extraction with an explanatory concern when nothing is usable.

use leadscout_core::{EvidenceItem, ExtractedInfo, FitAssessment, KeyPerson};
use leadscout_llm::CompletionClient;

pub const EXTRACTION_SYSTEM_PROMPT: &str = "\
You are a B2B sales research analyst. You will receive web research snippets \
about one company. Extract what the snippets support into a single JSON object \
with exactly these keys:\n\
{\n\
  \"description\": string (one-sentence summary),\n\
  \"industry\": string,\n\
  \"employee_count\": string,\n\
  \"headquarters\": string,\n\
  \"founded\": string,\n\
  \"funding_stage\": string,\n\
  \"funding_amount\": string,\n\
  \"tech_stack\": [string],\n\
  \"competitors\": [string],\n\
  \"key_people\": [{\"name\": string, \"role\": string}],\n\
  \"pain_points\": [string],\n\
  \"outreach_angles\": [string],\n\
  \"recent_news\": [string],\n\
  \"fit\": {\"score\": number 0-100, \"reasons\": [string], \"concerns\": [string]}\n\
}\n\
Rules: use \"\" for anything the snippets do not support; never invent facts. \
key_people must only contain C-level, founder, VP, or director roles, ordered \
most senior first. Respond with the JSON object only, no prose and no code fences.";

/// Builds the user prompt: company name plus numbered snippets, each
/// truncated to `snippet_max_chars` characters.
#[must_use]
pub fn build_user_prompt(
    company_name: &str,
    items: &[EvidenceItem],
    snippet_max_chars: usize,
) -> String {
    let mut prompt = format!("Company: {company_name}\n\nResearch snippets:\n");
    for (index, item) in items.iter().enumerate() {
        let snippet: String = item.content.chars().take(snippet_max_chars).collect();
        prompt.push_str(&format!(
            "\n[{n}] {title}\nURL: {url}\n{snippet}\n",
            n = index + 1,
            title = item.title,
            url = item.url,
        ));
    }
    prompt
}

/// Runs the extraction stage. Failures never propagate: the second element
/// is a warning describing any degradation.
pub async fn extract(
    llm: &CompletionClient,
    company_name: &str,
    items: &[EvidenceItem],
    snippet_max_chars: usize,
) -> (ExtractedInfo, Option<String>) {
    if items.is_empty() {
        return (
            ExtractedInfo::empty_with_concern("no research evidence collected"),
            None,
        );
    }
    if !llm.is_configured() {
        let warning = "completion API key not configured; extraction skipped".to_owned();
        return (ExtractedInfo::empty_with_concern(&warning), Some(warning));
    }

    let user_prompt = build_user_prompt(company_name, items, snippet_max_chars);
    match llm.complete(EXTRACTION_SYSTEM_PROMPT, &user_prompt).await {
        Ok(raw) => (parse_extraction(&raw), None),
        Err(err) => {
            tracing::warn!(company = company_name, error = %err, "extraction call failed");
            let warning = format!("extraction unavailable: {err}");
            (ExtractedInfo::empty_with_concern(&warning), Some(warning))
        }
    }
}

/// Parses a model response into [`ExtractedInfo`].
///
/// Recovery order: first balanced JSON object in the text, then the whole
/// text as JSON, then the documented empty fallback.
#[must_use]
pub fn parse_extraction(raw: &str) -> ExtractedInfo {
    let candidate = first_balanced_object(raw).unwrap_or(raw);
    let Ok(value) = serde_json::from_str::<serde_json::Value>(candidate)
        .or_else(|_| serde_json::from_str::<serde_json::Value>(raw))
    else {
        return ExtractedInfo::empty_with_concern(
            "model response was not valid JSON; insufficient data to assess fit",
        );
    };
    coerce_extraction(&value)
}

/// Finds the first balanced `{...}` object, honoring JSON string literals
/// and escapes. Models love to wrap JSON in prose or code fences.
fn first_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Field-by-field coercion: wrong-typed fields become their defaults
/// instead of failing the whole extraction.
fn coerce_extraction(value: &serde_json::Value) -> ExtractedInfo {
    ExtractedInfo {
        description: string_field(value, "description"),
        industry: string_field(value, "industry"),
        employee_count: string_field(value, "employee_count"),
        headquarters: string_field(value, "headquarters"),
        founded: string_field(value, "founded"),
        funding_stage: string_field(value, "funding_stage"),
        funding_amount: string_field(value, "funding_amount"),
        tech_stack: string_list(value, "tech_stack"),
        competitors: string_list(value, "competitors"),
        key_people: key_people(value),
        pain_points: string_list(value, "pain_points"),
        outreach_angles: string_list(value, "outreach_angles"),
        recent_news: string_list(value, "recent_news"),
        fit: fit_assessment(value),
    }
}

fn string_field(value: &serde_json::Value, key: &str) -> String {
    match value.get(key) {
        Some(serde_json::Value::String(s)) => s.trim().to_owned(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn string_list(value: &serde_json::Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(serde_json::Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(serde_json::Value::as_str)
                .map(|s| s.trim().to_owned())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn key_people(value: &serde_json::Value) -> Vec<KeyPerson> {
    let Some(entries) = value.get("key_people").and_then(serde_json::Value::as_array) else {
        return Vec::new();
    };

    let mut people: Vec<KeyPerson> = entries
        .iter()
        .filter_map(|entry| {
            let name = entry.get("name").and_then(serde_json::Value::as_str)?;
            let role = entry
                .get("role")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default();
            let name = name.trim();
            if name.is_empty() || !is_senior_role(role) {
                return None;
            }
            Some(KeyPerson {
                name: name.to_owned(),
                role: role.trim().to_owned(),
            })
        })
        .collect();

    // Stable: preserves model order within a seniority rank.
    people.sort_by_key(|p| seniority_rank(&p.role));
    people
}

/// The retention filter: only C-level/founder, president, VP, and
/// director/head-of roles survive extraction.
fn is_senior_role(role: &str) -> bool {
    seniority_rank(role) < 4
}

fn seniority_rank(role: &str) -> u8 {
    let role = role.to_lowercase();
    // Abbreviations compare against whole tokens; "Director" contains the
    // substring "cto" and must not rank as C-level.
    let c_abbrev = role
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|token| ["ceo", "cto", "cfo", "coo", "cro", "cmo"].contains(&token));
    if role.contains("founder") || role.contains("chief") || c_abbrev {
        0
    } else if role.contains("vp") || role.contains("vice president") {
        2
    } else if role.contains("president") {
        1
    } else if role.contains("director") || role.contains("head of") {
        3
    } else {
        4
    }
}

fn fit_assessment(value: &serde_json::Value) -> FitAssessment {
    let Some(fit) = value.get("fit") else {
        return FitAssessment::default();
    };
    let score = fit
        .get("score")
        .and_then(serde_json::Value::as_f64)
        .map_or(FitAssessment::default().score, clamp_score);
    FitAssessment {
        score,
        reasons: string_list(fit, "reasons"),
        concerns: string_list(fit, "concerns"),
    }
}

// Value is in [0, 100] after clamping.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_score(raw: f64) -> u8 {
    raw.clamp(0.0, 100.0).round() as u8
}
