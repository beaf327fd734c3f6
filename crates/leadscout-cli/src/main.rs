use clap::{Parser, Subcommand};
use leadscout_core::{AppConfig, IcpRuleset, LeadAttributes};
use leadscout_engine::{Engine, EngineConfig};
use leadscout_llm::CompletionClient;
use leadscout_search::{SearchClient, UsageTracker};
use sqlx::PgPool;

#[derive(Debug, Parser)]
#[command(name = "leadscout-cli")]
#[command(about = "Leadscout research and scoring command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the research pipeline for one company.
    Research {
        company_name: String,
        /// Re-run research even if a fresh result is stored.
        #[arg(long)]
        force_refresh: bool,
    },
    /// Score a researched company against the ICP ruleset.
    Score {
        company_name: String,
        /// Write the score onto the stored company record.
        #[arg(long)]
        persist: bool,
    },
    /// Score several companies in one run.
    Batch {
        company_names: Vec<String>,
        #[arg(long)]
        persist: bool,
    },
    /// Grade a lead by its attributes (JSON object).
    Grade {
        company_name: String,
        /// e.g. '{"title": "CEO", "buyer_intent": "high"}'
        #[arg(long, default_value = "{}")]
        attributes: String,
        /// Write the grade onto the stored company record.
        #[arg(long)]
        persist: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = leadscout_core::load_app_config()?;
    let pool = leadscout_db::connect_pool(
        &config.database_url,
        leadscout_db::PoolConfig::from_app_config(&config),
    )
    .await?;
    leadscout_db::run_migrations(&pool).await?;

    let usage = UsageTracker::new();
    let engine = build_engine(&config, usage.clone())?;

    match cli.command {
        Commands::Research {
            company_name,
            force_refresh,
        } => research(&engine, &pool, &company_name, force_refresh, &usage).await?,
        Commands::Score {
            company_name,
            persist,
        } => score(&engine, &pool, &config, &company_name, persist).await?,
        Commands::Batch {
            company_names,
            persist,
        } => batch(&engine, &pool, &config, &company_names, persist).await?,
        Commands::Grade {
            company_name,
            attributes,
            persist,
        } => grade(&engine, &pool, &company_name, &attributes, persist).await?,
    }

    Ok(())
}

fn build_engine(config: &AppConfig, usage: UsageTracker) -> anyhow::Result<Engine> {
    let search = SearchClient::with_base_url(
        config.search_api_key.as_deref(),
        config.research_request_timeout_secs,
        &config.research_user_agent,
        usage,
        &config.search_api_url,
    )?
    .with_retry_policy(
        config.search_max_retries,
        config.search_retry_backoff_base_ms,
    );
    let llm = CompletionClient::with_base_url(
        config.llm_api_key.as_deref(),
        &config.llm_model,
        config.research_request_timeout_secs,
        &config.llm_api_url,
    )?;
    Ok(Engine::new(search, llm, EngineConfig::from_app_config(config)))
}

async fn load_ruleset(pool: &PgPool, config: &AppConfig) -> IcpRuleset {
    if let Ok(Some(payload)) = leadscout_db::get_ruleset_payload(pool, "default").await {
        if let Ok(ruleset) = serde_json::from_value(payload) {
            return ruleset;
        }
    }
    leadscout_core::load_ruleset_file(&config.ruleset_path).unwrap_or_default()
}

async fn research(
    engine: &Engine,
    pool: &PgPool,
    company_name: &str,
    force_refresh: bool,
    usage: &UsageTracker,
) -> anyhow::Result<()> {
    let outcome = engine.research(pool, company_name, force_refresh).await?;
    println!(
        "{} ({} evidence items{})",
        outcome.company_name,
        outcome.evidence.len(),
        if outcome.cached { ", cached" } else { "" }
    );
    for signal in &outcome.snapshot.signals {
        println!(
            "  [{}] {}: {}",
            signal.priority.as_str(),
            signal.category.as_str(),
            signal.detail
        );
    }
    if !outcome.extracted.description.is_empty() {
        println!("  {}", outcome.extracted.description);
    }
    for warning in &outcome.warnings {
        eprintln!("warning: {warning}");
    }
    if !outcome.cached {
        let snapshot = usage.snapshot();
        println!(
            "search queries: {} issued, {} failed",
            snapshot.queries_issued, snapshot.queries_failed
        );
        if let Some(note) = snapshot.last_limit_note {
            eprintln!("search limit note: {note}");
        }
    }
    Ok(())
}

async fn score(
    engine: &Engine,
    pool: &PgPool,
    config: &AppConfig,
    company_name: &str,
    persist: bool,
) -> anyhow::Result<()> {
    let ruleset = load_ruleset(pool, config).await;
    let outcome = engine
        .score_company(pool, company_name, &ruleset, persist)
        .await?;
    println!(
        "{company_name}: {} ({}) -> {}/{}",
        outcome.result.score,
        outcome.result.tier.as_str(),
        outcome.result.total,
        outcome.result.max
    );
    for row in &outcome.result.breakdown {
        println!(
            "  {}: {} ({}/{})",
            row.category,
            row.matched.as_deref().unwrap_or("-"),
            row.points,
            row.max_points
        );
    }
    if let Some(warning) = outcome.warning {
        eprintln!("warning: {warning}");
    }
    Ok(())
}

async fn batch(
    engine: &Engine,
    pool: &PgPool,
    config: &AppConfig,
    company_names: &[String],
    persist: bool,
) -> anyhow::Result<()> {
    let ruleset = load_ruleset(pool, config).await;
    let items = engine.batch_score(pool, company_names, &ruleset, persist).await;
    for item in items {
        match (item.result, item.error) {
            (Some(result), _) => println!(
                "{}: {} ({})",
                item.company_name,
                result.score,
                result.tier.as_str()
            ),
            (None, Some(error)) => println!("{}: failed -> {error}", item.company_name),
            (None, None) => {}
        }
    }
    Ok(())
}

async fn grade(
    engine: &Engine,
    pool: &PgPool,
    company_name: &str,
    attributes_json: &str,
    persist: bool,
) -> anyhow::Result<()> {
    let attributes: LeadAttributes = serde_json::from_str(attributes_json)?;
    let (result, warning) = engine
        .grade_lead(pool, company_name, attributes, persist)
        .await?;
    println!(
        "{company_name}: {} ({}%)",
        result.grade.as_str(),
        result.percentage
    );
    for row in &result.breakdown {
        println!(
            "  {} (x{}): {}/{}",
            row.criterion, row.tier_weight, row.points, row.max_points
        );
    }
    if let Some(warning) = warning {
        eprintln!("warning: {warning}");
    }
    Ok(())
}
