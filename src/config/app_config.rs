use std::time::Duration;

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use crate::domain::cache::{CacheConfig, EvictionPolicy};
use crate::domain::resilience::ResilienceProfile;
use crate::domain::storage::{DEFAULT_DISCRIMINATING_KEYS, DEFAULT_VERSION_HISTORY_LIMIT};
use crate::domain::CoreError;
use crate::infrastructure::observability::MetricsConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub caches: CachesConfig,
    #[serde(default)]
    pub retry: RetryProfilesConfig,
    #[serde(default)]
    pub coordinator: CoordinatorConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Settings for one named cache
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CacheSettings {
    pub max_size: usize,
    /// Entry lifetime in seconds, absent for no expiry
    #[serde(default)]
    pub ttl_seconds: Option<u64>,
    #[serde(default)]
    pub eviction_policy: EvictionPolicy,
}

impl CacheSettings {
    pub fn to_cache_config(&self) -> CacheConfig {
        let config = CacheConfig::new(self.max_size).with_eviction_policy(self.eviction_policy);

        match self.ttl_seconds {
            Some(seconds) => config.with_ttl(Duration::from_secs(seconds)),
            None => config,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CachesConfig {
    /// Store outcomes keyed by fingerprint
    #[serde(default = "default_outcome_cache")]
    pub outcome: CacheSettings,
    /// Items read through from the primary backend
    #[serde(default = "default_read_cache")]
    pub read: CacheSettings,
}

fn default_outcome_cache() -> CacheSettings {
    CacheSettings {
        max_size: 10_000,
        ttl_seconds: Some(3600),
        eviction_policy: EvictionPolicy::TtlLru,
    }
}

fn default_read_cache() -> CacheSettings {
    CacheSettings {
        max_size: 1_000,
        ttl_seconds: Some(300),
        eviction_policy: EvictionPolicy::Lru,
    }
}

impl Default for CachesConfig {
    fn default() -> Self {
        Self {
            outcome: default_outcome_cache(),
            read: default_read_cache(),
        }
    }
}

/// Overrides applied on top of a built-in resilience profile
///
/// Absent fields keep the built-in value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProfileSettings {
    pub max_attempts: Option<u32>,
    pub base_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
    pub exponential_base: Option<f64>,
    pub jitter_enabled: Option<bool>,
    pub attempt_timeout_ms: Option<u64>,
    pub failure_threshold: Option<u32>,
    pub success_threshold: Option<u32>,
    pub recovery_timeout_secs: Option<u64>,
    pub concurrency_limit: Option<usize>,
}

impl ProfileSettings {
    pub fn apply(&self, mut profile: ResilienceProfile) -> ResilienceProfile {
        let retry = &mut profile.retry;

        if let Some(max_attempts) = self.max_attempts {
            retry.max_attempts = max_attempts;
        }
        if let Some(ms) = self.base_delay_ms {
            retry.base_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = self.max_delay_ms {
            retry.max_delay = Duration::from_millis(ms);
        }
        if let Some(base) = self.exponential_base {
            retry.exponential_base = base;
        }
        if let Some(enabled) = self.jitter_enabled {
            retry.jitter_enabled = enabled;
        }
        if let Some(ms) = self.attempt_timeout_ms {
            retry.attempt_timeout = Some(Duration::from_millis(ms));
        }

        let breaker = &mut profile.breaker;

        if let Some(threshold) = self.failure_threshold {
            breaker.failure_threshold = threshold;
        }
        if let Some(threshold) = self.success_threshold {
            breaker.success_threshold = threshold;
        }
        if let Some(secs) = self.recovery_timeout_secs {
            breaker.recovery_timeout = Duration::from_secs(secs);
        }

        if let Some(limit) = self.concurrency_limit {
            profile.concurrency_limit = Some(limit);
        }

        profile
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetryProfilesConfig {
    #[serde(default)]
    pub storage: ProfileSettings,
    #[serde(default)]
    pub external_api: ProfileSettings,
}

impl RetryProfilesConfig {
    /// Resolves a profile by name, `external-api` and `external_api` are equivalent
    pub fn profile(&self, name: &str) -> Option<ResilienceProfile> {
        match name {
            "storage" => Some(self.storage.apply(ResilienceProfile::storage())),
            "external_api" | "external-api" => {
                Some(self.external_api.apply(ResilienceProfile::external_api()))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoordinatorConfig {
    #[serde(default = "default_profile_name")]
    pub primary_profile: String,
    #[serde(default = "default_profile_name")]
    pub secondary_profile: String,
    #[serde(default = "default_version_history_limit")]
    pub version_history_limit: usize,
    #[serde(default = "default_discriminating_keys")]
    pub discriminating_keys: Vec<String>,
}

fn default_profile_name() -> String {
    "storage".to_string()
}

fn default_version_history_limit() -> usize {
    DEFAULT_VERSION_HISTORY_LIMIT
}

fn default_discriminating_keys() -> Vec<String> {
    DEFAULT_DISCRIMINATING_KEYS.iter().map(|key| key.to_string()).collect()
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            primary_profile: default_profile_name(),
            secondary_profile: default_profile_name(),
            version_history_limit: default_version_history_limit(),
            discriminating_keys: default_discriminating_keys(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Resolves a named resilience profile, failing for unknown names
    pub fn profile(&self, name: &str) -> Result<ResilienceProfile, CoreError> {
        self.retry
            .profile(name)
            .ok_or_else(|| CoreError::configuration(format!("Unknown resilience profile: {}", name)))
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        EnvFilter::try_new(&self.logging.level).map_err(|e| {
            CoreError::configuration(format!("Invalid log level '{}': {}", self.logging.level, e))
        })?;

        self.caches.outcome.to_cache_config().validate()?;
        self.caches.read.to_cache_config().validate()?;

        self.retry
            .storage
            .apply(ResilienceProfile::storage())
            .validate()?;
        self.retry
            .external_api
            .apply(ResilienceProfile::external_api())
            .validate()?;

        self.profile(&self.coordinator.primary_profile)?;
        self.profile(&self.coordinator.secondary_profile)?;

        if self.coordinator.version_history_limit == 0 {
            return Err(CoreError::configuration(
                "coordinator version_history_limit must be greater than zero",
            ));
        }

        Ok(())
    }
}
