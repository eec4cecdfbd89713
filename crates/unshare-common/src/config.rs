//! Module configuration model.
//!
//! The module works with no configuration at all; an `unshare.json` in the
//! module directory may override the uid layout and the log filter.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    AID_APP_END, AID_APP_START, AID_ISOLATED_END, AID_ISOLATED_START, AID_USER_OFFSET,
    CONFIG_FILE_NAME, DEFAULT_LOG_FILTER,
};
use crate::error::{Result, UnshareError};
use crate::types::UidRange;

/// Root configuration for the module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModuleConfig {
    /// Number of uids per Android user.
    pub per_user_offset: u32,
    /// App id window of ordinary applications.
    pub app_range: UidRange,
    /// App id window of isolated processes.
    pub isolated_range: UidRange,
    /// `tracing` filter directive used by the module runtime.
    pub log_filter: String,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            per_user_offset: AID_USER_OFFSET,
            app_range: UidRange::new(AID_APP_START, AID_APP_END),
            isolated_range: UidRange::new(AID_ISOLATED_START, AID_ISOLATED_END),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ModuleConfig {
    /// Loads `unshare.json` from the module directory.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, parsed, or
    /// fails validation.
    pub fn load(module_dir: &Path) -> Result<Self> {
        let path = module_dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::from_file(&path)
    }

    /// Reads and validates a configuration file at an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| UnshareError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Checks that the uid layout is coherent.
    ///
    /// # Errors
    ///
    /// Returns an error if the offset is zero, or a window is inverted or
    /// does not fit below the offset.
    pub fn validate(&self) -> Result<()> {
        if self.per_user_offset == 0 {
            return Err(UnshareError::Config {
                message: "per_user_offset must be non-zero".into(),
            });
        }
        for (name, range) in [("app_range", self.app_range), ("isolated_range", self.isolated_range)] {
            if range.start > range.end {
                return Err(UnshareError::Config {
                    message: format!("{name} {range} is inverted"),
                });
            }
            if range.end >= self.per_user_offset {
                return Err(UnshareError::Config {
                    message: format!(
                        "{name} {range} does not fit below per_user_offset {}",
                        self.per_user_offset
                    ),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_android_layout() {
        let config = ModuleConfig::default();
        assert_eq!(config.per_user_offset, 100_000);
        assert_eq!(config.app_range, UidRange::new(10_000, 19_999));
        assert_eq!(config.isolated_range, UidRange::new(90_000, 99_999));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = ModuleConfig::load(dir.path()).expect("should load");
        assert_eq!(config, ModuleConfig::default());
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "log_filter": "debug" }"#,
        )
        .expect("write");
        let config = ModuleConfig::load(dir.path()).expect("should load");
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.per_user_offset, AID_USER_OFFSET);
    }

    #[test]
    fn malformed_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "{ not json").expect("write");
        let err = ModuleConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, UnshareError::Serialization { .. }));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), r#"{ "policy": 1 }"#).expect("write");
        assert!(ModuleConfig::load(dir.path()).is_err());
    }

    #[test]
    fn zero_offset_is_rejected() {
        let config = ModuleConfig {
            per_user_offset: 0,
            ..ModuleConfig::default()
        };
        assert!(matches!(config.validate(), Err(UnshareError::Config { .. })));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let config = ModuleConfig {
            app_range: UidRange::new(20_000, 10_000),
            ..ModuleConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn range_beyond_offset_is_rejected() {
        let config = ModuleConfig {
            isolated_range: UidRange::new(90_000, 100_000),
            ..ModuleConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
