//! Stage configuration: a validated object with the recognized options
//! from the external-interfaces section of the spec. Unknown options are
//! rejected at startup (`deny_unknown_fields`), so a typo in an operator's
//! TOML file or environment surfaces immediately instead of silently
//! being ignored.
//!
//! Layering, low to high precedence: `config/default.toml` <
//! `config/<env>.toml` (selected by `APP_ENV`, default `development`) <
//! environment variables prefixed `ALERTMESH_` (double-underscore
//! separated, e.g. `ALERTMESH_DATABASE_URL`).

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StageConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default)]
    pub redis_url: Option<String>,
    #[serde(default = "default_rabbitmq_url")]
    pub rabbitmq_url: String,
    #[serde(default)]
    pub jwt_secret_key: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_prefetch_count")]
    pub prefetch_count: u16,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff_base_seconds")]
    pub retry_backoff_base_seconds: u64,
    #[serde(default = "default_rate_limit_per_minute")]
    pub rate_limit_per_minute: u32,
    #[serde(default = "default_dedup_cache_size")]
    pub dedup_cache_size: usize,
    #[serde(default = "default_dedup_cache_ttl_seconds")]
    pub dedup_cache_ttl_seconds: u64,
    #[serde(default = "default_context_cache_ttl_seconds")]
    pub context_cache_ttl_seconds: u64,
    #[serde(default = "default_threat_intel_cache_ttl_seconds")]
    pub threat_intel_cache_ttl_seconds: u64,
    #[serde(default = "default_llm_default_model")]
    pub llm_default_model: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,
    #[serde(default = "default_similarity_top_k")]
    pub similarity_top_k: usize,
    #[serde(default = "default_drain_timeout_seconds")]
    pub drain_timeout_seconds: u64,
    #[serde(default = "default_clock_skew_seconds")]
    pub clock_skew_seconds: i64,
}

fn default_database_url() -> String {
    "sqlite://alertmesh.db".to_string()
}
fn default_rabbitmq_url() -> String {
    "amqp://localhost:5672/%2f".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_prefetch_count() -> u16 {
    10
}
fn default_max_retries() -> u32 {
    3
}
fn default_retry_backoff_base_seconds() -> u64 {
    1
}
fn default_rate_limit_per_minute() -> u32 {
    100
}
fn default_dedup_cache_size() -> usize {
    10_000
}
fn default_dedup_cache_ttl_seconds() -> u64 {
    3600
}
fn default_context_cache_ttl_seconds() -> u64 {
    3600
}
fn default_threat_intel_cache_ttl_seconds() -> u64 {
    86_400
}
fn default_llm_default_model() -> String {
    "triage-general-v1".to_string()
}
fn default_embedding_model() -> String {
    "alert-embed-v1".to_string()
}
fn default_similarity_threshold() -> f32 {
    0.75
}
fn default_similarity_top_k() -> usize {
    5
}
fn default_drain_timeout_seconds() -> u64 {
    30
}
fn default_clock_skew_seconds() -> i64 {
    60
}

impl StageConfig {
    /// Loads configuration for `stage_name` from `config/default.toml`,
    /// `config/<APP_ENV>.toml` and `ALERTMESH_*` environment variables, in
    /// that ascending order of precedence. `.env` is loaded first (if
    /// present) so local development can set environment variables in a
    /// file instead of the shell.
    pub fn load(stage_name: &str) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::File::with_name(&format!("config/{stage_name}")).required(false),
            )
            .add_source(config::Environment::with_prefix("ALERTMESH").separator("__"));

        let built = builder.build()?;
        let cfg: StageConfig = built.try_deserialize()?;
        Ok(cfg)
    }
}
