//! Declarative rename rules.
//!
//! A rename configuration lists rules in order; each rule has one or more
//! patterns and the key they rename to:
//!
//! ```yaml
//! rules:
//!   - patterns: ["{ren1,sub/*/ren1}"]
//!     to: new1
//!   - pattern: "{Ren2,sub/ren2}"
//!     to: new2
//! ```
//!
//! The same shape is accepted as JSON or TOML (`[[rules]]` tables).

use crate::error::{Error, Result};
use crate::pattern::RenameRule;
use crate::renamer::KeyRenamer;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// Pick a format from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(ConfigFormat::Json),
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "toml" => Some(ConfigFormat::Toml),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "JSON",
            ConfigFormat::Yaml => "YAML",
            ConfigFormat::Toml => "TOML",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamerConfig {
    #[serde(default)]
    pub rules: Vec<RenameRuleConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameRuleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<String>,
    pub to: String,
}

impl RenameRuleConfig {
    /// `pattern` first, then `patterns`, in declaration order.
    pub fn all_patterns(&self) -> Vec<&str> {
        self.pattern
            .iter()
            .chain(self.patterns.iter())
            .map(String::as_str)
            .collect()
    }
}

impl RenamerConfig {
    /// Parse a configuration document.
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        Self::parse_at(content, format, None)
    }

    fn parse_at(content: &str, format: ConfigFormat, path: Option<&Path>) -> Result<Self> {
        let origin = || path.map(|p| p.display().to_string());

        match format {
            ConfigFormat::Json => serde_json::from_str(content)
                .map_err(|e| Error::config_parse(format.as_str(), origin(), e.to_string())),
            ConfigFormat::Yaml => serde_yml::from_str(content)
                .map_err(|e| Error::config_parse(format.as_str(), origin(), e.to_string())),
            ConfigFormat::Toml => toml::from_str(content)
                .map_err(|e| Error::config_parse(format.as_str(), origin(), e.to_string())),
        }
    }

    /// Compile every rule, in order.
    pub fn build(&self) -> Result<KeyRenamer> {
        let rules = self
            .rules
            .iter()
            .enumerate()
            .map(|(index, rule)| {
                let patterns = rule.all_patterns();
                if patterns.is_empty() {
                    return Err(Error::config_invalid_value(
                        format!("rules[{}]", index),
                        Some(rule.to.clone()),
                        "Rule needs 'pattern' or 'patterns'",
                    ));
                }
                RenameRule::compile(&rule.to, patterns.as_slice())
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(KeyRenamer::from_rules(rules))
    }
}

/// Read and compile a rename configuration file.
///
/// The format comes from the file extension (`.json`, `.yaml`/`.yml`, `.toml`).
pub fn load_renamer(path: impl AsRef<Path>) -> Result<KeyRenamer> {
    let path = path.as_ref();

    let format = ConfigFormat::from_path(path).ok_or_else(|| {
        Error::config_invalid_value(
            "path",
            Some(path.display().to_string()),
            "Unknown config extension",
        )
        .with_hint("Use a .json, .yaml, .yml or .toml file")
    })?;

    let content = fs::read_to_string(path).map_err(|e| {
        Error::internal_io(
            e.to_string(),
            Some(format!("read rename config '{}'", path.display())),
        )
    })?;

    let renamer = RenamerConfig::parse_at(&content, format, Some(path))?.build()?;
    log_status!(
        "config",
        "Loaded {} rename rule(s) from {}",
        renamer.rules().len(),
        path.display()
    );

    Ok(renamer)
}
