use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub ruleset_path: PathBuf,
    pub search_api_url: String,
    pub search_api_key: Option<String>,
    pub llm_api_url: String,
    pub llm_api_key: Option<String>,
    pub llm_model: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub research_request_timeout_secs: u64,
    pub research_user_agent: String,
    pub research_per_query_results: usize,
    pub research_max_evidence: usize,
    pub research_inter_query_delay_ms: u64,
    pub research_cache_ttl_days: i64,
    pub research_snippet_max_chars: usize,
    pub search_max_retries: u32,
    pub search_retry_backoff_base_ms: u64,
    /// Accepted bearer tokens. Empty disables auth (development only).
    pub api_keys: Vec<String>,
    pub rate_limit_max_requests: usize,
    pub rate_limit_window_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("ruleset_path", &self.ruleset_path)
            .field("database_url", &"[redacted]")
            .field("search_api_url", &self.search_api_url)
            .field(
                "search_api_key",
                &self.search_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("llm_api_url", &self.llm_api_url)
            .field(
                "llm_api_key",
                &self.llm_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("llm_model", &self.llm_model)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "research_request_timeout_secs",
                &self.research_request_timeout_secs,
            )
            .field("research_user_agent", &self.research_user_agent)
            .field(
                "research_per_query_results",
                &self.research_per_query_results,
            )
            .field("research_max_evidence", &self.research_max_evidence)
            .field(
                "research_inter_query_delay_ms",
                &self.research_inter_query_delay_ms,
            )
            .field("research_cache_ttl_days", &self.research_cache_ttl_days)
            .field(
                "research_snippet_max_chars",
                &self.research_snippet_max_chars,
            )
            .field("search_max_retries", &self.search_max_retries)
            .field(
                "search_retry_backoff_base_ms",
                &self.search_retry_backoff_base_ms,
            )
            .field("api_keys", &format!("[{} redacted]", self.api_keys.len()))
            .field("rate_limit_max_requests", &self.rate_limit_max_requests)
            .field("rate_limit_window_secs", &self.rate_limit_window_secs)
            .finish()
    }
}
