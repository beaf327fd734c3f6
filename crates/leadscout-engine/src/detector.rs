//! Signal Detector: pure keyword/regex classification of evidence text.
//!
//! Each evidence item is matched against a fixed rule table, one rule per
//! category. A cheap lowercase keyword prefilter runs before any regex; a
//! category fires at most once per item, on the first matching pattern.
//! Detection never calls the network or the database.

use std::collections::HashSet;
use std::sync::LazyLock;

use leadscout_core::{EvidenceItem, Signal, SignalCategory, SignalSnapshot};
use regex::Regex;

struct CategoryRule {
    category: SignalCategory,
    /// Lowercase keywords; at least one must appear before patterns run.
    keywords: &'static [&'static str],
    patterns: Vec<Regex>,
}

fn rx(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static detector pattern must compile")
}

static RULES: LazyLock<Vec<CategoryRule>> = LazyLock::new(|| {
    vec![
        CategoryRule {
            category: SignalCategory::Funding,
            keywords: &["funding", "raise", "raised", "series", "seed", "investment", "round"],
            patterns: vec![
                rx(r"(?i)\brais(?:es|ed|ing)\b"),
                rx(r"(?i)\bseries\s+[a-e]\b"),
                rx(r"(?i)\bseed\s+(?:round|funding)\b"),
                rx(r"(?i)\bfunding\s+round\b"),
                rx(r"(?i)\binvestment\s+(?:round|of)\b"),
            ],
        },
        CategoryRule {
            category: SignalCategory::Hiring,
            keywords: &["hiring", "hire", "recruit", "open role", "open position", "job opening", "careers", "openings"],
            patterns: vec![
                rx(r"(?i)\b(?:is|are|now|actively)\s+hiring\b"),
                rx(r"(?i)\bhir(?:es|ed|ing)\b"),
                rx(r"(?i)\b\d+\s+open\s+(?:roles|positions|jobs)\b"),
                rx(r"(?i)\bjob\s+openings?\b"),
                rx(r"(?i)\brecruit(?:s|ed|ing|ment)\b"),
            ],
        },
        CategoryRule {
            category: SignalCategory::Leadership,
            keywords: &["ceo", "cto", "cfo", "coo", "chief", "president", "appoints", "appointed", "joins", "names", "named", "vp "],
            patterns: vec![
                rx(r"(?i)\bappoint(?:s|ed)\b"),
                rx(r"(?i)\b(?:new|names?|named|welcomes?)\s+(?:ceo|cto|cfo|coo|cro|cmo|chief|president|vp|vice\s+president)\b"),
                rx(r"(?i)\bjoins?\s+(?:as|the\s+company\s+as)\b"),
                rx(r"(?i)\b(?:ceo|cto|cfo|coo|cro|cmo)\b.*\b(?:steps?\s+down|departs?|resigns?)\b"),
            ],
        },
        CategoryRule {
            category: SignalCategory::Expansion,
            keywords: &["expand", "expansion", "new office", "new market", "opens", "launch in", "launches in"],
            patterns: vec![
                rx(r"(?i)\bexpand(?:s|ed|ing)?\b"),
                rx(r"(?i)\bnew\s+(?:office|offices|market|markets|headquarters)\b"),
                rx(r"(?i)\bopens?\s+(?:a\s+)?(?:new\s+)?office\b"),
                rx(r"(?i)\blaunch(?:es|ed|ing)?\s+in\b"),
            ],
        },
        CategoryRule {
            category: SignalCategory::Acquisition,
            keywords: &["acquire", "acquisition", "merger", "merges", "buys", "acquired"],
            patterns: vec![
                rx(r"(?i)\bacquir(?:es|ed|ing)\b"),
                rx(r"(?i)\bacquisition\s+of\b"),
                rx(r"(?i)\bmerg(?:es|ed|er)\b"),
                rx(r"(?i)\bbuys\b"),
            ],
        },
        CategoryRule {
            category: SignalCategory::TechStack,
            keywords: &["built with", "powered by", "migrates to", "migrated to", "adopts", "tech stack", "technology stack", "infrastructure"],
            patterns: vec![
                rx(r"(?i)\b(?:built\s+with|powered\s+by)\b"),
                rx(r"(?i)\bmigrat(?:es|ed|ing)\s+to\b"),
                rx(r"(?i)\badopt(?:s|ed|ing)\b"),
                rx(r"(?i)\b(?:tech|technology)\s+stack\b"),
            ],
        },
        CategoryRule {
            category: SignalCategory::Awards,
            keywords: &["award", "recognized", "recognised", "winner", "best places to work", "top 100", "ranked"],
            patterns: vec![
                rx(r"(?i)\bawards?\b"),
                rx(r"(?i)\brecogni[sz]ed\s+(?:as|by|for)\b"),
                rx(r"(?i)\bwinner\b"),
                rx(r"(?i)\brank(?:s|ed)\s+(?:#?\d+|among|in\s+the\s+top)\b"),
            ],
        },
        CategoryRule {
            category: SignalCategory::Product,
            keywords: &["launches", "launched", "unveils", "releases", "announces", "new product", "new feature", "general availability", "beta"],
            patterns: vec![
                rx(r"(?i)\blaunch(?:es|ed)\s+(?:its|their|a|the|new)\b"),
                rx(r"(?i)\bunveil(?:s|ed)\b"),
                rx(r"(?i)\breleas(?:es|ed)\s+(?:its|their|a|the|new)\b"),
                rx(r"(?i)\bannounc(?:es|ed)\s+(?:the\s+)?(?:launch|general\s+availability|new\s+(?:product|feature))\b"),
                rx(r"(?i)\bnow\s+generally\s+available\b"),
            ],
        },
        CategoryRule {
            category: SignalCategory::Partnership,
            keywords: &["partner", "partnership", "teams up", "collaboration", "collaborates", "integration with", "alliance"],
            patterns: vec![
                rx(r"(?i)\bpartner(?:s|ed|ing)?\s+with\b"),
                rx(r"(?i)\bpartnership\b"),
                rx(r"(?i)\bteams?\s+up\s+with\b"),
                rx(r"(?i)\bcollaborat(?:es|ed|ion)\b"),
                rx(r"(?i)\bintegration\s+with\b"),
            ],
        },
        CategoryRule {
            category: SignalCategory::News,
            keywords: &["announces", "announced", "reports", "revealed", "press release", "featured"],
            patterns: vec![
                rx(r"(?i)\bannounc(?:es|ed)\b"),
                rx(r"(?i)\breports?\b"),
                rx(r"(?i)\bpress\s+release\b"),
                rx(r"(?i)\bfeatured\s+(?:in|on|by)\b"),
            ],
        },
    ]
});

static AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| rx(r"(?i)\$\d+(?:\.\d+)?\s*(?:million|billion|[mbk])?\b"));
static SERIES_RE: LazyLock<Regex> = LazyLock::new(|| rx(r"(?i)\bseries\s+([a-e])\b"));
static OPENINGS_RE: LazyLock<Regex> =
    LazyLock::new(|| rx(r"(?i)\b(\d+)\s+(?:open\s+)?(?:roles|positions|jobs|openings)\b"));
static ROLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    rx(r"(?i)\b(ceo|cto|cfo|coo|cro|cmo|chief\s+\w+\s+officer|vice\s+president|vp|president)\b")
});
static EXPANSION_TO_RE: LazyLock<Regex> =
    LazyLock::new(|| rx(r"(?i)\bexpand(?:s|ed|ing)?\s+(?:into|to)\s+([A-Z][A-Za-z ]{2,30})"));
static ACQUIRED_RE: LazyLock<Regex> =
    LazyLock::new(|| rx(r"\bacquir(?:es|ed|ing)\s+([A-Z][A-Za-z0-9&. -]{2,40})"));
static PARTNER_RE: LazyLock<Regex> =
    LazyLock::new(|| rx(r"(?i)\bpartner(?:s|ed|ing)?\s+with\s+([A-Z][A-Za-z0-9&. ]{2,40})"));
static TECH_RE: LazyLock<Regex> = LazyLock::new(|| {
    rx(r"(?i)\b(?:built\s+with|powered\s+by|migrat(?:es|ed|ing)\s+to|adopt(?:s|ed|ing))\s+([A-Za-z0-9.+#/ ]{2,30})")
});

/// Runs the rule table against one evidence item. At most one signal per
/// category; the keyword prefilter keeps regex work off unrelated text.
#[must_use]
pub fn detect_signals(item: &EvidenceItem) -> Vec<Signal> {
    let text = format!("{} {}", item.title, item.content);
    let lower = text.to_lowercase();

    let mut signals = Vec::new();
    for rule in RULES.iter() {
        if !rule.keywords.iter().any(|k| lower.contains(k)) {
            continue;
        }
        if rule.patterns.iter().any(|p| p.is_match(&text)) {
            signals.push(Signal {
                category: rule.category,
                priority: rule.category.priority(),
                detail: extract_detail(rule.category, &text),
                source_url: item.url.clone(),
                published_date: item.published_date.clone(),
            });
        }
    }
    signals
}

/// Collapses per-item signals into a per-company snapshot: one signal per
/// category, first occurrence wins within priority order.
#[must_use]
pub fn aggregate_signals(mut signals: Vec<Signal>) -> SignalSnapshot {
    // Stable sort: earlier evidence keeps precedence within a priority.
    signals.sort_by(|a, b| b.priority.cmp(&a.priority));

    let mut seen = HashSet::new();
    let mut kept = Vec::new();
    for signal in signals {
        if seen.insert(signal.category) {
            kept.push(signal);
        }
    }
    SignalSnapshot { signals: kept }
}

fn extract_detail(category: SignalCategory, text: &str) -> String {
    match category {
        SignalCategory::Funding => funding_detail(text),
        SignalCategory::Hiring => hiring_detail(text),
        SignalCategory::Leadership => leadership_detail(text),
        SignalCategory::Expansion => expansion_detail(text),
        SignalCategory::Acquisition => acquisition_detail(text),
        SignalCategory::TechStack => tech_stack_detail(text),
        SignalCategory::Awards => "Award or recognition".to_owned(),
        SignalCategory::Product => "Product launch".to_owned(),
        SignalCategory::Partnership => partnership_detail(text),
        SignalCategory::News => "Company news".to_owned(),
    }
}

fn funding_detail(text: &str) -> String {
    let amount = AMOUNT_RE.find(text).map(|m| m.as_str().trim().to_owned());
    let stage = SERIES_RE
        .captures(text)
        .map(|c| format!("Series {}", c[1].to_uppercase()))
        .or_else(|| {
            let lower = text.to_lowercase();
            (lower.contains("seed round") || lower.contains("seed funding"))
                .then(|| "Seed".to_owned())
        });

    match (stage, amount) {
        (Some(stage), Some(amount)) => format!("{stage} - {amount}"),
        (Some(stage), None) => stage,
        (None, Some(amount)) => format!("Raised {amount}"),
        (None, None) => "Funding announcement".to_owned(),
    }
}

fn hiring_detail(text: &str) -> String {
    OPENINGS_RE
        .captures(text)
        .map_or_else(|| "Actively hiring".to_owned(), |c| format!("Hiring {} roles", &c[1]))
}

fn leadership_detail(text: &str) -> String {
    ROLE_RE.find(text).map_or_else(
        || "Leadership change".to_owned(),
        |m| format!("New {}", format_role(m.as_str())),
    )
}

fn format_role(role: &str) -> String {
    if role.len() <= 3 {
        return role.to_uppercase();
    }
    role.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn expansion_detail(text: &str) -> String {
    EXPANSION_TO_RE.captures(text).map_or_else(
        || "Expansion announced".to_owned(),
        |c| format!("Expanding to {}", c[1].trim()),
    )
}

fn acquisition_detail(text: &str) -> String {
    ACQUIRED_RE.captures(text).map_or_else(
        || "M&A activity".to_owned(),
        |c| format!("Acquired {}", c[1].trim().trim_end_matches(['.', ','])),
    )
}

fn tech_stack_detail(text: &str) -> String {
    TECH_RE.captures(text).map_or_else(
        || "Tech stack mention".to_owned(),
        |c| format!("Tech stack: {}", c[1].trim()),
    )
}

fn partnership_detail(text: &str) -> String {
    PARTNER_RE.captures(text).map_or_else(
        || "Partnership announced".to_owned(),
        |c| format!("Partnership with {}", c[1].trim().trim_end_matches(['.', ','])),
    )
}
