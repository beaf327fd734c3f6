//! Company identity helpers.

/// Normalizes a company name for identity lookup: lowercased, trimmed,
/// internal whitespace collapsed to single spaces.
///
/// The normalized form is the unique key of the company store.
#[must_use]
pub fn normalize_company_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Returns `true` for values the merge policy treats as "not knowledge":
/// empty/whitespace strings and the usual unknown placeholders.
#[must_use]
pub fn is_unknown_value(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("unknown")
        || trimmed.eq_ignore_ascii_case("n/a")
        || trimmed.eq_ignore_ascii_case("none")
        || trimmed.eq_ignore_ascii_case("null")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_and_collapses_whitespace() {
        assert_eq!(normalize_company_name("  Acme   Corp "), "acme corp");
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize_company_name("Acme Corp");
        assert_eq!(normalize_company_name(&once), once);
    }

    #[test]
    fn unknown_vocabulary() {
        assert!(is_unknown_value(""));
        assert!(is_unknown_value("  "));
        assert!(is_unknown_value("Unknown"));
        assert!(is_unknown_value("N/A"));
        assert!(!is_unknown_value("Fintech"));
    }
}
