//! Configuration
//!
//! Thresholds, weights, and rule tables for every analyzer, loaded from
//! defaults, TOML, and environment.

pub mod loader;
pub mod types;

pub use loader::{CONFIG_FILE_NAME, default_path, load, load_from_file, to_toml};
pub use types::{
    AnalyticsConfig, BucketConfig, CategoryRule, Comparison, CrossFunctionalConfig,
    FragmentationConfig, HealthWeights, ManagerConfig, MeetingConfig, MetricKey,
    MonitoringWeights, Priority, RateTable, RecommendationRule, RecommendationTable,
    SentimentLists, TextConfig,
};
