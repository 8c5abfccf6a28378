//! Tool configuration.
//!
//! Optional YAML file with `${VAR}` / `${VAR:-default}` substitution:
//!
//! ```yaml
//! schemas_dir: ${AC1_SCHEMAS:-/etc/ac1/schemas}
//! output_dir: ./out
//! log_format: pretty
//! report_format: json
//! ```
//!
//! Command-line options take precedence over every field.

use std::fs;
use std::path::{Path, PathBuf};

use ac1_common::expand_env_vars;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Schema directory; built-in schemas when unset
    pub schemas_dir: Option<PathBuf>,
    /// Default output directory of `convert`
    pub output_dir: Option<PathBuf>,
    pub log_format: LogFormat,
    pub report_format: ReportFormat,
}

impl ToolConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to load config file: {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let expanded = expand_env_vars(content).context("Failed to substitute variables")?;
        if expanded.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&expanded).context("Failed to parse config YAML")
    }

    /// The file at `path` when given, defaults otherwise.
    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_empty_file() {
        let config = ToolConfig::from_yaml("").unwrap();
        assert_eq!(config, ToolConfig::default());
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.report_format, ReportFormat::Text);
    }

    #[test]
    fn test_env_default_substitution() {
        let config = ToolConfig::from_yaml(
            "schemas_dir: ${AC1_TOOL_TEST_UNSET_SCHEMAS:-/srv/schemas}\nreport_format: json\n",
        )
        .unwrap();
        assert_eq!(config.schemas_dir, Some(PathBuf::from("/srv/schemas")));
        assert_eq!(config.report_format, ReportFormat::Json);
        assert!(config.output_dir.is_none());
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(ToolConfig::from_yaml("log_format: xml\n").is_err());
        assert!(ToolConfig::from_yaml("schemas_dir: ${AC1_TOOL_TEST_UNSET_REQUIRED}\n").is_err());
    }
}
