//! End-to-end pipeline tests against a migrated database and mocked
//! search/completion APIs.

use leadscout_core::{CompanyAttributes, IcpRuleset, RuleEntry, SignalCategory, SizeBand, Tier};
use leadscout_engine::{scorer, Engine, EngineConfig};
use leadscout_llm::CompletionClient;
use leadscout_search::{SearchClient, UsageTracker};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_engine(search_url: &str, llm_url: &str, llm_key: Option<&str>) -> Engine {
    let search = SearchClient::with_base_url(
        Some("test-search-key"),
        5,
        "leadscout-test",
        UsageTracker::new(),
        search_url,
    )
    .expect("search client")
    .with_retry_policy(0, 1);
    let llm =
        CompletionClient::with_base_url(llm_key, "gpt-test", 5, llm_url).expect("llm client");
    let config = EngineConfig {
        inter_query_delay_ms: 0,
        ..EngineConfig::default()
    };
    Engine::new(search, llm, config)
}

async fn mock_search_result(server: &MockServer, title: &str, content: &str, url: &str) {
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{"title": title, "content": content, "url": url}]
        })))
        .mount(server)
        .await;
}

async fn mock_extraction(server: &MockServer, extraction: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": extraction.to_string()}}]
        })))
        .mount(server)
        .await;
}

#[sqlx::test(migrations = "../../migrations")]
async fn research_detects_funding_and_persists_reconciled_fields(pool: sqlx::PgPool) {
    let search_server = MockServer::start().await;
    let llm_server = MockServer::start().await;

    mock_search_result(
        &search_server,
        "Acme Corp raises $5M Series A",
        "Acme Corp announced today it has raised $5M in a Series A round led by Example Ventures.",
        "https://news.example.com/acme-series-a",
    )
    .await;
    mock_extraction(
        &llm_server,
        serde_json::json!({
            "description": "Acme Corp builds workflow software.",
            "industry": "SaaS",
            "employee_count": "120",
            "headquarters": "United States",
            "founded": "2019",
            "funding_stage": "Series A",
            "funding_amount": "$5M",
            "tech_stack": ["AWS"],
            "key_people": [{"name": "Kim Lee", "role": "CEO"}],
            "fit": {"score": 80, "reasons": ["recent funding"], "concerns": []}
        }),
    )
    .await;

    let engine = test_engine(&search_server.uri(), &llm_server.uri(), Some("test-llm-key"));
    let outcome = engine
        .research(&pool, "Acme Corp", false)
        .await
        .expect("research");

    assert!(!outcome.cached);
    assert_eq!(outcome.evidence.len(), 1, "same URL deduplicates across queries");
    let funding = outcome
        .snapshot
        .signals
        .iter()
        .find(|s| s.category == SignalCategory::Funding)
        .expect("funding signal detected");
    assert_eq!(funding.detail, "Series A - $5M");

    let row = leadscout_db::get_company_by_normalized_name(&pool, "acme corp")
        .await
        .expect("lookup")
        .expect("company persisted");
    assert_eq!(Some(row.id), outcome.company_id);
    assert_eq!(row.funding_stage.as_deref(), Some("Series A"));
    assert_eq!(row.funding_amount.as_deref(), Some("$5M"));
    assert_eq!(row.industry.as_deref(), Some("SaaS"));
    assert_eq!(row.founded_year, Some(2019));
    assert!(row.last_scanned_at.is_some());
    assert!(row.signal_snapshot.is_some());
}

#[sqlx::test(migrations = "../../migrations")]
async fn second_research_within_ttl_replays_from_cache(pool: sqlx::PgPool) {
    let search_server = MockServer::start().await;
    let llm_server = MockServer::start().await;

    mock_search_result(
        &search_server,
        "Acme Corp raises $5M Series A",
        "Raised $5M in a Series A round.",
        "https://news.example.com/acme",
    )
    .await;
    mock_extraction(&llm_server, serde_json::json!({"industry": "SaaS"})).await;

    let engine = test_engine(&search_server.uri(), &llm_server.uri(), Some("test-llm-key"));
    let first = engine
        .research(&pool, "Acme Corp", false)
        .await
        .expect("first run");
    assert!(!first.cached);

    let second = engine
        .research(&pool, "Acme Corp", false)
        .await
        .expect("second run");
    assert!(second.cached, "fresh research must replay from the store");
    assert_eq!(second.company_id, first.company_id);
    assert_eq!(second.snapshot, first.snapshot);
    assert_eq!(second.evidence, first.evidence);

    let forced = engine
        .research(&pool, "Acme Corp", true)
        .await
        .expect("forced run");
    assert!(!forced.cached, "force_refresh bypasses the cache gate");
}

#[sqlx::test(migrations = "../../migrations")]
async fn failed_search_degrades_to_warnings_not_errors(pool: sqlx::PgPool) {
    let search_server = MockServer::start().await;
    let llm_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&search_server)
        .await;

    let engine = test_engine(&search_server.uri(), &llm_server.uri(), None);
    let outcome = engine
        .research(&pool, "Ghost Startup", false)
        .await
        .expect("degraded run still succeeds");

    assert!(outcome.evidence.is_empty());
    assert!(outcome.snapshot.signals.is_empty());
    assert!(!outcome.warnings.is_empty(), "query failures become warnings");
    assert_eq!(
        outcome.extracted.fit.concerns,
        vec!["no research evidence collected"]
    );

    // The company record still exists for later enrichment.
    let row = leadscout_db::get_company_by_normalized_name(&pool, "ghost startup")
        .await
        .expect("lookup")
        .expect("row persisted despite empty corpus");
    assert_eq!(Some(row.id), outcome.company_id);
}

#[sqlx::test(migrations = "../../migrations")]
async fn empty_company_name_is_rejected(pool: sqlx::PgPool) {
    let search_server = MockServer::start().await;
    let llm_server = MockServer::start().await;
    let engine = test_engine(&search_server.uri(), &llm_server.uri(), None);

    let result = engine.research(&pool, "   ", false).await;
    assert!(matches!(
        result,
        Err(leadscout_engine::EngineError::InvalidInput(_))
    ));
}

#[sqlx::test(migrations = "../../migrations")]
async fn scoring_reads_the_stored_record_and_persists(pool: sqlx::PgPool) {
    let search_server = MockServer::start().await;
    let llm_server = MockServer::start().await;

    mock_search_result(
        &search_server,
        "Acme Corp raises $5M Series A",
        "Raised $5M in a Series A round.",
        "https://news.example.com/acme",
    )
    .await;
    mock_extraction(
        &llm_server,
        serde_json::json!({"industry": "B2B SaaS", "employee_count": "120"}),
    )
    .await;

    let engine = test_engine(&search_server.uri(), &llm_server.uri(), Some("test-llm-key"));
    engine
        .research(&pool, "Acme Corp", false)
        .await
        .expect("research");

    let ruleset = IcpRuleset {
        industries: vec![RuleEntry {
            label: "SaaS".to_owned(),
            points: 10,
            enabled: true,
        }],
        company_sizes: vec![SizeBand {
            label: "51-200".to_owned(),
            min: 51,
            max: Some(200),
            points: 10,
            enabled: true,
        }],
        ..IcpRuleset::default()
    };

    let outcome = engine
        .score_company(&pool, "Acme Corp", &ruleset, true)
        .await
        .expect("score");
    assert_eq!(outcome.result.score, 100);
    assert_eq!(outcome.result.tier, Tier::High);
    assert!(outcome.warning.is_none());

    let row = leadscout_db::get_company_by_normalized_name(&pool, "acme corp")
        .await
        .expect("lookup")
        .expect("exists");
    assert_eq!(row.icp_score, Some(100));
    assert_eq!(row.icp_tier.as_deref(), Some("high"));
    assert!(row.icp_scored_at.is_some());
}

#[sqlx::test(migrations = "../../migrations")]
async fn scoring_an_unknown_company_is_not_found(pool: sqlx::PgPool) {
    let search_server = MockServer::start().await;
    let llm_server = MockServer::start().await;
    let engine = test_engine(&search_server.uri(), &llm_server.uri(), None);

    let result = engine
        .score_company(&pool, "Never Researched", &IcpRuleset::default(), false)
        .await;
    assert!(matches!(
        result,
        Err(leadscout_engine::EngineError::NotFound(_))
    ));
}

#[sqlx::test(migrations = "../../migrations")]
async fn batch_scoring_captures_per_company_failures(pool: sqlx::PgPool) {
    let search_server = MockServer::start().await;
    let llm_server = MockServer::start().await;

    mock_search_result(
        &search_server,
        "Acme Corp overview",
        "Acme builds software.",
        "https://example.com/acme",
    )
    .await;
    mock_extraction(&llm_server, serde_json::json!({"industry": "SaaS"})).await;

    let engine = test_engine(&search_server.uri(), &llm_server.uri(), Some("test-llm-key"));
    engine
        .research(&pool, "Acme Corp", false)
        .await
        .expect("research");

    let ruleset = IcpRuleset {
        industries: vec![RuleEntry {
            label: "SaaS".to_owned(),
            points: 10,
            enabled: true,
        }],
        ..IcpRuleset::default()
    };
    let names = vec!["Acme Corp".to_owned(), "Missing Inc".to_owned()];
    let items = engine.batch_score(&pool, &names, &ruleset, false).await;

    assert_eq!(items.len(), 2);
    assert!(items[0].result.is_some());
    assert!(items[0].error.is_none());
    assert!(items[1].result.is_none());
    assert!(items[1].error.is_some(), "missing company recorded, batch continues");
}

#[sqlx::test(migrations = "../../migrations")]
async fn grading_backfills_from_the_stored_company(pool: sqlx::PgPool) {
    let search_server = MockServer::start().await;
    let llm_server = MockServer::start().await;

    mock_search_result(
        &search_server,
        "Acme Corp overview",
        "Acme builds software.",
        "https://example.com/acme",
    )
    .await;
    mock_extraction(
        &llm_server,
        serde_json::json!({"industry": "SaaS", "headquarters": "United States"}),
    )
    .await;

    let engine = test_engine(&search_server.uri(), &llm_server.uri(), Some("test-llm-key"));
    engine
        .research(&pool, "Acme Corp", false)
        .await
        .expect("research");

    let attrs = leadscout_core::LeadAttributes {
        title: Some("CEO".to_owned()),
        ..leadscout_core::LeadAttributes::default()
    };
    let (result, warning) = engine
        .grade_lead(&pool, "Acme Corp", attrs, true)
        .await
        .expect("grade");
    assert!(warning.is_none());

    // title (caller) plus industry and geography (backfilled).
    let criteria: Vec<&str> = result.breakdown.iter().map(|r| r.criterion.as_str()).collect();
    assert!(criteria.contains(&"title"));
    assert!(criteria.contains(&"industry"));
    assert!(criteria.contains(&"geography"));

    let row = leadscout_db::get_company_by_normalized_name(&pool, "acme corp")
        .await
        .expect("lookup")
        .expect("exists");
    assert_eq!(row.lead_grade.as_deref(), Some(result.grade.as_str()));
    assert_eq!(row.lead_score, Some(i32::from(result.percentage)));
}

#[sqlx::test(migrations = "../../migrations")]
async fn grading_without_persist_writes_nothing(pool: sqlx::PgPool) {
    let search_server = MockServer::start().await;
    let llm_server = MockServer::start().await;

    mock_search_result(
        &search_server,
        "Acme Corp overview",
        "Acme builds software.",
        "https://example.com/acme",
    )
    .await;
    mock_extraction(&llm_server, serde_json::json!({"industry": "SaaS"})).await;

    let engine = test_engine(&search_server.uri(), &llm_server.uri(), Some("test-llm-key"));
    engine
        .research(&pool, "Acme Corp", false)
        .await
        .expect("research");

    let attrs = leadscout_core::LeadAttributes {
        title: Some("CEO".to_owned()),
        ..leadscout_core::LeadAttributes::default()
    };
    let (result, warning) = engine
        .grade_lead(&pool, "Acme Corp", attrs, false)
        .await
        .expect("grade");
    assert!(warning.is_none());
    assert_eq!(result.grade.as_str(), "A");

    let row = leadscout_db::get_company_by_normalized_name(&pool, "acme corp")
        .await
        .expect("lookup")
        .expect("exists");
    assert!(row.lead_grade.is_none(), "read-only grading leaves the row alone");
    assert!(row.lead_score.is_none());
}

// The scorer is pure; spot-check it here with attributes shaped like a
// stored record to pin the end-to-end contract.
#[test]
fn scorer_contract_on_reconciled_attributes() {
    let ruleset = IcpRuleset {
        industries: vec![RuleEntry {
            label: "SaaS".to_owned(),
            points: 10,
            enabled: true,
        }],
        company_sizes: vec![SizeBand {
            label: "51-200".to_owned(),
            min: 51,
            max: Some(200),
            points: 10,
            enabled: true,
        }],
        ..IcpRuleset::default()
    };
    let attrs = CompanyAttributes {
        name: "Acme Corp".to_owned(),
        industry: Some("B2B SaaS".to_owned()),
        employee_count: Some("120".to_owned()),
        ..CompanyAttributes::default()
    };
    let result = scorer::score(&attrs, &ruleset);
    assert_eq!(result.score, 100);
    assert_eq!(result.tier, Tier::High);
}
