//! Configuration Loading
//!
//! Layered configuration: built-in defaults, then an optional TOML file,
//! then `ORGLENS_*` environment variables. Later layers override earlier
//! ones field by field, and the merged result is validated before it is
//! handed to any analyzer.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::types::AnalyticsConfig;
use crate::types::error::{OrgLensError, Result};

/// Default config file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "orglens.toml";

/// Environment variable prefix. Sections nest with a double underscore,
/// e.g. `ORGLENS_MANAGER__AT_RISK_WINDOW_DAYS=28`.
const ENV_PREFIX: &str = "ORGLENS_";

/// Load configuration from the default file location (if present) plus
/// the environment.
pub fn load() -> Result<AnalyticsConfig> {
    load_from_file(Path::new(CONFIG_FILE_NAME))
}

/// Load configuration with an explicit TOML path. A missing file is not
/// an error; defaults and environment still apply.
pub fn load_from_file(path: &Path) -> Result<AnalyticsConfig> {
    if path.exists() {
        debug!(path = %path.display(), "loading config file");
    }
    let config: AnalyticsConfig = Figment::new()
        .merge(Serialized::defaults(AnalyticsConfig::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true))
        .extract()
        .map_err(|e| OrgLensError::config(format!("failed to load configuration: {e}")))?;
    config.validate()?;
    Ok(config)
}

/// Resolved path of the default config file.
pub fn default_path() -> PathBuf {
    PathBuf::from(CONFIG_FILE_NAME)
}

/// Serialize a config back to TOML, for `config show` and `config init`.
pub fn to_toml(config: &AnalyticsConfig) -> Result<String> {
    toml::to_string_pretty(config)
        .map_err(|e| OrgLensError::config(format!("failed to render configuration: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_from_file(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.buckets.size_small_max, 2);
        assert_eq!(config.manager.at_risk_window_days, 21);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[manager]\nat_risk_window_days = 28").unwrap();

        let config = load_from_file(&path).unwrap();
        assert_eq!(config.manager.at_risk_window_days, 28);
        // untouched sections keep their defaults
        assert_eq!(config.buckets.duration_short_max, 30);
    }

    #[test]
    fn test_invalid_file_value_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[buckets]\nduration_short_max = 120").unwrap();

        let err = load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("monotonic"));
    }

    #[test]
    fn test_round_trips_through_toml() {
        let rendered = to_toml(&AnalyticsConfig::default()).unwrap();
        let parsed: AnalyticsConfig = toml::from_str(&rendered).unwrap();
        parsed.validate().unwrap();
    }
}
