//! Pipeline orchestration: research runs, the cache gate, scoring, and
//! grading against the company store.

use chrono::{Duration, Utc};
use leadscout_core::{
    normalize_company_name, AppConfig, CompanyAttributes, EvidenceItem, ExtractedInfo,
    GradingResult, IcpRuleset, LeadAttributes, ScoreResult, SignalSnapshot,
};
use leadscout_db::{CompanyPatch, CompanyRow};
use leadscout_llm::CompletionClient;
use leadscout_search::SearchClient;
use sqlx::PgPool;

use crate::{aggregator, detector, extractor, grader, reconcile, scorer, EngineError};

/// Tunables for the research pipeline.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Research results younger than this replay from the store.
    pub cache_ttl_days: i64,
    pub per_query_results: usize,
    pub max_evidence: usize,
    pub inter_query_delay_ms: u64,
    pub snippet_max_chars: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_ttl_days: 7,
            per_query_results: 8,
            max_evidence: 20,
            inter_query_delay_ms: 250,
            snippet_max_chars: 700,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            cache_ttl_days: config.research_cache_ttl_days,
            per_query_results: config.research_per_query_results,
            max_evidence: config.research_max_evidence,
            inter_query_delay_ms: config.research_inter_query_delay_ms,
            snippet_max_chars: config.research_snippet_max_chars,
        }
    }
}

/// One finished research run. Upstream degradation shows up in `warnings`,
/// not as errors; `company_id` is `None` only if persistence failed.
#[derive(Debug)]
pub struct ResearchOutcome {
    pub company_id: Option<i64>,
    pub company_name: String,
    pub snapshot: SignalSnapshot,
    pub extracted: ExtractedInfo,
    pub evidence: Vec<EvidenceItem>,
    /// True when the run was served from the store without new queries.
    pub cached: bool,
    pub warnings: Vec<String>,
}

/// A scoring result plus an optional persistence warning.
#[derive(Debug)]
pub struct ScoreOutcome {
    pub company_id: i64,
    pub result: ScoreResult,
    pub warning: Option<String>,
}

/// One entry of a batch scoring run.
#[derive(Debug)]
pub struct BatchScoreItem {
    pub company_name: String,
    pub result: Option<ScoreResult>,
    pub error: Option<String>,
}

/// The research-and-scoring engine. Owns the outbound clients; storage is
/// passed per call so the same engine serves every request.
pub struct Engine {
    search: SearchClient,
    llm: CompletionClient,
    config: EngineConfig,
}

impl Engine {
    #[must_use]
    pub fn new(search: SearchClient, llm: CompletionClient, config: EngineConfig) -> Self {
        Self { search, llm, config }
    }

    /// Runs the full research pipeline for one company: cache gate, query
    /// battery, signal detection, extraction, and the reconciled write.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidInput`] for an empty company name.
    /// - [`EngineError::Db`] if the initial store lookup fails. Search,
    ///   extraction, and persistence failures degrade into warnings.
    pub async fn research(
        &self,
        pool: &PgPool,
        name: &str,
        force_refresh: bool,
    ) -> Result<ResearchOutcome, EngineError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidInput(
                "company name must not be empty".to_owned(),
            ));
        }
        let normalized = normalize_company_name(name);
        let existing = leadscout_db::get_company_by_normalized_name(pool, &normalized).await?;

        if !force_refresh {
            if let Some(row) = &existing {
                if self.is_fresh(row) {
                    tracing::info!(company = name, "research served from cache");
                    return Ok(cached_outcome(row));
                }
            }
        }

        let industry_hint = existing.as_ref().and_then(|row| row.industry.clone());
        let corpus = aggregator::gather(
            &self.search,
            name,
            industry_hint.as_deref(),
            self.config.per_query_results,
            self.config.max_evidence,
            self.config.inter_query_delay_ms,
        )
        .await;
        let mut warnings = corpus.warnings;

        let per_item: Vec<_> = corpus.items.iter().flat_map(detector::detect_signals).collect();
        let snapshot = detector::aggregate_signals(per_item);

        let (extracted, extraction_warning) =
            extractor::extract(&self.llm, name, &corpus.items, self.config.snippet_max_chars)
                .await;
        if let Some(warning) = extraction_warning {
            warnings.push(warning);
        }

        let patch = reconcile::patch_from_extracted(&extracted);
        let mut company_id = existing.as_ref().map(|row| row.id);
        if company_id.is_none() {
            match leadscout_db::insert_company(pool, name, &normalized, CompanyPatch::default())
                .await
            {
                Ok(row) => company_id = Some(row.id),
                Err(err) => {
                    tracing::error!(company = name, error = %err, "failed to create company");
                    warnings.push(format!("failed to create company record: {err}"));
                }
            }
        }

        if let Some(id) = company_id {
            let snapshot_value = serde_json::to_value(&snapshot).unwrap_or_default();
            let extracted_value = serde_json::to_value(&extracted).unwrap_or_default();
            let evidence_value = serde_json::to_value(&corpus.items).unwrap_or_default();
            if let Err(err) = leadscout_db::apply_research(
                pool,
                id,
                patch,
                &snapshot_value,
                &extracted_value,
                &evidence_value,
            )
            .await
            {
                tracing::error!(company = name, error = %err, "failed to persist research");
                warnings.push(format!("failed to persist research: {err}"));
            }
        }

        Ok(ResearchOutcome {
            company_id,
            company_name: name.to_owned(),
            snapshot,
            extracted,
            evidence: corpus.items,
            cached: false,
            warnings,
        })
    }

    fn is_fresh(&self, row: &CompanyRow) -> bool {
        row.signal_snapshot.is_some()
            && row.last_scanned_at.is_some_and(|scanned| {
                Utc::now().signed_duration_since(scanned)
                    < Duration::days(self.config.cache_ttl_days)
            })
    }

    /// Scores a stored company against a ruleset, optionally persisting
    /// the result onto the row.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidInput`] for an empty company name.
    /// - [`EngineError::NotFound`] if the company has never been stored.
    /// - [`EngineError::Db`] if the lookup fails.
    pub async fn score_company(
        &self,
        pool: &PgPool,
        name: &str,
        ruleset: &IcpRuleset,
        persist: bool,
    ) -> Result<ScoreOutcome, EngineError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidInput(
                "company name must not be empty".to_owned(),
            ));
        }
        let normalized = normalize_company_name(name);
        let row = leadscout_db::get_company_by_normalized_name(pool, &normalized)
            .await?
            .ok_or_else(|| EngineError::NotFound(name.to_owned()))?;

        let attrs = company_attributes(&row);
        let result = scorer::score(&attrs, ruleset);

        let mut warning = None;
        if persist {
            let breakdown = serde_json::to_value(&result.breakdown).unwrap_or_default();
            if let Err(err) = leadscout_db::update_icp_score(
                pool,
                row.id,
                i32::from(result.score),
                result.tier.as_str(),
                &breakdown,
            )
            .await
            {
                tracing::error!(company = name, error = %err, "failed to persist score");
                warning = Some(format!("failed to persist score: {err}"));
            }
        }

        Ok(ScoreOutcome {
            company_id: row.id,
            result,
            warning,
        })
    }

    /// Scores a list of companies sequentially. Per-company failures are
    /// captured in the returned entries instead of aborting the batch.
    pub async fn batch_score(
        &self,
        pool: &PgPool,
        names: &[String],
        ruleset: &IcpRuleset,
        persist: bool,
    ) -> Vec<BatchScoreItem> {
        let mut items = Vec::with_capacity(names.len());
        for name in names {
            match self.score_company(pool, name, ruleset, persist).await {
                Ok(outcome) => items.push(BatchScoreItem {
                    company_name: name.clone(),
                    result: Some(outcome.result),
                    error: outcome.warning,
                }),
                Err(err) => items.push(BatchScoreItem {
                    company_name: name.clone(),
                    result: None,
                    error: Some(err.to_string()),
                }),
            }
        }
        items
    }

    /// Grades a lead. Attributes the caller left blank are backfilled from
    /// the stored company record when one exists. Side-effect free unless
    /// `persist` is set, in which case the grade is written onto the row.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidInput`] for an empty company name.
    /// - [`EngineError::Db`] if the lookup fails.
    pub async fn grade_lead(
        &self,
        pool: &PgPool,
        name: &str,
        attrs: LeadAttributes,
        persist: bool,
    ) -> Result<(GradingResult, Option<String>), EngineError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidInput(
                "company name must not be empty".to_owned(),
            ));
        }
        let normalized = normalize_company_name(name);
        let row = leadscout_db::get_company_by_normalized_name(pool, &normalized).await?;

        let attrs = match &row {
            Some(row) => backfill_from_row(attrs, row),
            None => attrs,
        };
        let result = grader::grade(&attrs);

        let mut warning = None;
        if persist {
            if let Some(row) = &row {
                if let Err(err) = leadscout_db::update_lead_grade(
                    pool,
                    row.id,
                    result.grade.as_str(),
                    i32::from(result.percentage),
                )
                .await
                {
                    tracing::error!(company = name, error = %err, "failed to persist grade");
                    warning = Some(format!("failed to persist grade: {err}"));
                }
            }
        }

        Ok((result, warning))
    }
}

fn cached_outcome(row: &CompanyRow) -> ResearchOutcome {
    let snapshot = row
        .signal_snapshot
        .clone()
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default();
    let extracted = row
        .extracted_info
        .clone()
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default();
    let evidence = row
        .evidence
        .clone()
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default();

    ResearchOutcome {
        company_id: Some(row.id),
        company_name: row.name.clone(),
        snapshot,
        extracted,
        evidence,
        cached: true,
        warnings: Vec::new(),
    }
}

/// Assembles scorer input from the durable record plus its snapshot.
fn company_attributes(row: &CompanyRow) -> CompanyAttributes {
    let extracted: ExtractedInfo = row
        .extracted_info
        .clone()
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default();
    let snapshot: SignalSnapshot = row
        .signal_snapshot
        .clone()
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default();

    CompanyAttributes {
        name: row.name.clone(),
        industry: row.industry.clone(),
        employee_count: row.employee_count.clone(),
        funding_stage: row.funding_stage.clone(),
        country: row.country.clone(),
        tech_stack: extracted.tech_stack,
        signals_text: snapshot.combined_text(),
    }
}

fn backfill_from_row(mut attrs: LeadAttributes, row: &CompanyRow) -> LeadAttributes {
    if attrs.funding_stage.is_none() {
        attrs.funding_stage = row.funding_stage.clone();
    }
    if attrs.funding_amount.is_none() {
        attrs.funding_amount = row.funding_amount.clone();
    }
    if attrs.country.is_none() {
        attrs.country = row.country.clone();
    }
    if attrs.employee_count.is_none() {
        attrs.employee_count = row.employee_count.clone();
    }
    if attrs.industry.is_none() {
        attrs.industry = row.industry.clone();
    }
    attrs
}
