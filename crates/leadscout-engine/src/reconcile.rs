//! Company Reconciler: monotonic-knowledge merge of extracted fields.
//!
//! The merge rule is one-directional: a known stored value is never
//! replaced by an unknown incoming one. The Rust side maps unknown values
//! to `None`; the storage layer's `COALESCE` updates enforce the same rule
//! at the SQL seam, so re-running research is idempotent on fields.

use leadscout_core::{is_unknown_value, ExtractedInfo};
use leadscout_db::CompanyPatch;
use regex::Regex;
use std::sync::LazyLock;

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})\b").expect("static year pattern must compile"));

/// Returns the value only if it carries knowledge.
#[must_use]
pub fn known(value: &str) -> Option<&str> {
    if is_unknown_value(value) {
        None
    } else {
        Some(value.trim())
    }
}

/// Pure form of the merge rule: known old value wins over unknown new one;
/// a known new value overwrites.
#[must_use]
pub fn merge_field(stored: Option<&str>, incoming: Option<&str>) -> Option<String> {
    match incoming.and_then(known) {
        Some(new_value) => Some(new_value.to_owned()),
        None => stored.and_then(known).map(ToOwned::to_owned),
    }
}

/// Reduces free-text founding info to a plausible 4-digit year, or `None`
/// if no 4-digit run in range appears.
#[must_use]
pub fn extract_founded_year(text: &str) -> Option<i32> {
    YEAR_RE
        .captures_iter(text)
        .filter_map(|c| c[1].parse::<i32>().ok())
        .find(|year| (1800..=2100).contains(year))
}

/// Maps an extraction onto a storage patch: unknown fields become `None`
/// so `COALESCE` keeps whatever the store already knows.
#[must_use]
pub fn patch_from_extracted(info: &ExtractedInfo) -> CompanyPatch<'_> {
    CompanyPatch {
        industry: known(&info.industry),
        employee_count: known(&info.employee_count),
        country: known(&info.headquarters),
        founded_year: extract_founded_year(&info.founded),
        funding_stage: known(&info.funding_stage),
        funding_amount: known(&info.funding_amount),
        description: known(&info.description),
        notes: None,
    }
}
