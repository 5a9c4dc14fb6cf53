//! Database configuration.
//!
//! ```toml
//! [route_guide]
//! enable = true
//! control_file = "guides/control.txt"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// An error loading a configuration file.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path:?}")]
    Io {
        /// The configuration file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration is not valid TOML or has the wrong shape.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level database configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CirDbConfig {
    /// Routing guide settings.
    pub route_guide: RouteGuideConfig,
}

/// Routing guide settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RouteGuideConfig {
    /// Whether routing guide costs are applied.
    pub enable: bool,
    /// A guide control file to read on startup.
    ///
    /// Relative paths are resolved against the working directory.
    pub control_file: Option<PathBuf>,
}

impl Default for RouteGuideConfig {
    fn default() -> Self {
        Self {
            enable: true,
            control_file: None,
        }
    }
}

impl CirDbConfig {
    /// Parses a configuration from TOML source.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Reads and parses a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_use_defaults() {
        let config = CirDbConfig::from_toml_str("").unwrap();
        assert_eq!(config, CirDbConfig::default());
        assert!(config.route_guide.enable);
        assert!(config.route_guide.control_file.is_none());

        let config = CirDbConfig::from_toml_str("[route_guide]\nenable = false\n").unwrap();
        assert!(!config.route_guide.enable);
    }

    #[test]
    fn reads_control_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cirdb.toml");
        std::fs::write(
            &path,
            "[route_guide]\ncontrol_file = \"guides/control.txt\"\n",
        )
        .unwrap();
        let config = CirDbConfig::from_file(&path).unwrap();
        assert_eq!(
            config.route_guide.control_file.as_deref(),
            Some(Path::new("guides/control.txt"))
        );
        assert!(config.route_guide.enable);
    }

    #[test]
    fn reports_bad_input() {
        assert!(matches!(
            CirDbConfig::from_toml_str("[route_guide]\nenable = 3\n"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            CirDbConfig::from_file("/nonexistent/cirdb.toml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
