//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, CacheSettings, CachesConfig, CoordinatorConfig, LogFormat, LoggingConfig,
    ProfileSettings, RetryProfilesConfig,
};
