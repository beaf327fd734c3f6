//! Research Aggregator: runs the query battery and assembles the evidence
//! corpus for one company.
//!
//! Queries run sequentially with a fixed inter-query delay (upstream rate
//! hygiene). Per-query failures degrade into warnings; the corpus that
//! comes back is URL-deduplicated (first occurrence wins) and capped.

use std::collections::HashSet;
use std::time::Duration;

use leadscout_core::ResearchCorpus;
use leadscout_search::SearchClient;

/// Builds the fixed query battery for a company. Hints append targeted
/// queries but never replace the base set.
#[must_use]
pub fn query_battery(name: &str, industry_hint: Option<&str>) -> Vec<String> {
    let mut queries = vec![
        format!("{name} company overview"),
        format!("{name} funding investment round"),
        format!("{name} news announcements"),
        format!("{name} leadership team executives"),
        format!("{name} technology stack engineering"),
        format!("{name} hiring open roles"),
    ];
    if let Some(industry) = industry_hint {
        queries.push(format!("{name} {industry} market"));
    }
    queries
}

/// Runs the battery and returns the bounded, deduplicated corpus.
///
/// Never fails as a whole: a run where every query errors out returns an
/// empty corpus whose warnings explain what happened.
pub async fn gather(
    search: &SearchClient,
    name: &str,
    industry_hint: Option<&str>,
    per_query_results: usize,
    max_evidence: usize,
    inter_query_delay_ms: u64,
) -> ResearchCorpus {
    let mut corpus = ResearchCorpus::default();
    let mut seen_urls = HashSet::new();

    for (index, query) in query_battery(name, industry_hint).iter().enumerate() {
        if index > 0 && inter_query_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(inter_query_delay_ms)).await;
        }

        match search.search(query, per_query_results).await {
            Ok(outcome) => {
                if let Some(note) = outcome.note {
                    corpus.warnings.push(note);
                }
                for item in outcome.items {
                    if corpus.items.len() >= max_evidence {
                        break;
                    }
                    if seen_urls.insert(item.url.clone()) {
                        corpus.items.push(item);
                    }
                }
            }
            Err(err) => {
                tracing::warn!(%query, error = %err, "search query failed");
                corpus.warnings.push(format!("query \"{query}\" failed: {err}"));
            }
        }
    }

    corpus
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn battery_has_base_queries_and_optional_industry() {
        let base = query_battery("Acme Corp", None);
        assert_eq!(base.len(), 6);
        assert!(base.iter().all(|q| q.starts_with("Acme Corp")));

        let hinted = query_battery("Acme Corp", Some("Fintech"));
        assert_eq!(hinted.len(), 7);
        assert!(hinted.last().is_some_and(|q| q.contains("Fintech")));
    }
}
