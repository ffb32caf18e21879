//! Configuration settings
//!
//! Settings are read from a TOML file. Every section and field is optional;
//! missing values fall back to the defaults below.
//!
//! ```toml
//! [subjects]
//! default_title_subjects = ["TOANTHPT", "KHTN"]
//! specialized_prefixes = ["TINHOC"]
//!
//! [render]
//! table_class = "table-material-question"
//! align_containers = true
//!
//! [output]
//! pretty = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading settings
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The settings file could not be read
    #[error("cannot read settings: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid TOML for [`Settings`]
    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level settings structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Subject routing
    pub subjects: SubjectSettings,
    /// Markup rendering
    pub render: RenderSettings,
    /// XML output
    pub output: OutputSettings,
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load settings from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&text)?)
    }
}

/// Subject lists steering classification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SubjectSettings {
    /// Subjects whose fill-in questions always get a default title
    pub default_title_subjects: Vec<String>,
    /// Subject prefixes routed to the specialized classifier
    pub specialized_prefixes: Vec<String>,
}

impl Default for SubjectSettings {
    fn default() -> Self {
        Self {
            default_title_subjects: [
                "TOANTHPT",
                "VATLITHPT2",
                "HOATHPT2",
                "SINHTHPT2",
                "LICHSUTHPT",
                "DIALITHPT",
                "GDCDTHPT2",
                "NGUVANTHPT",
                "TOANTHCS2",
                "KHTN",
                "KHXHTHCS",
                "GDCDTHCS2",
                "NGUVANTHCS2",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            specialized_prefixes: ["TINHOC", "TINHOCTHCS", "TINHOCTHPT", "TINHOC3"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl SubjectSettings {
    /// Whether fill-in questions of this subject use a default title
    pub fn uses_default_title(&self, subject: &str) -> bool {
        self.default_title_subjects.iter().any(|s| s == subject)
    }

    /// Whether the subject belongs to the specialized family
    pub fn is_specialized(&self, subject: &str) -> bool {
        self.specialized_prefixes
            .iter()
            .any(|prefix| subject.starts_with(prefix.as_str()))
    }
}

/// Markup rendering options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderSettings {
    /// Class attribute of emitted tables
    pub table_class: String,
    /// Wrap aligned paragraph runs in `text-align` containers
    pub align_containers: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            table_class: "table-material-question".to_string(),
            align_containers: true,
        }
    }
}

/// XML output options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputSettings {
    /// Indent the XML with two spaces per level
    pub pretty: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self { pretty: true }
    }
}
