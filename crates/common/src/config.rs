//! Tool configuration loading from YAML files
//!
//! The language table (where each language keeps its examples and READMEs)
//! is loaded once into an immutable [`ToolConfig`] and handed to the scanner,
//! renderer and summarizer.

use crate::{DocGenError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const DEFAULT_GITHUB_URL: &str = "https://github.com/awsdocs/aws-doc-sdk-examples/tree/main";

/// Root structure of a docgen configuration file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ToolConfig {
    /// Base URL used for links into the repository
    #[serde(default = "default_github_url")]
    pub github_url: String,
    /// Folder names the summarizer never descends into
    #[serde(default = "default_summary_ignore")]
    pub summary_ignore: Vec<String>,
    /// Extra entity expansions applied when rendering
    #[serde(default = "default_entities")]
    pub entities: BTreeMap<String, String>,
    /// Language name → SDK major version → layout
    #[serde(default)]
    pub languages: BTreeMap<String, BTreeMap<u32, LanguageConfig>>,
}

/// Layout of one language version in the repository
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LanguageConfig {
    /// Top-level folder of the language, e.g. "python"
    pub base_folder: String,
    /// Folder holding one service's examples; `{service}` is substituted
    pub service_folder: String,
    /// README file name inside the service folder
    #[serde(default = "default_readme")]
    pub readme: String,
}

fn default_github_url() -> String {
    DEFAULT_GITHUB_URL.to_string()
}

fn default_readme() -> String {
    "README.md".to_string()
}

fn default_entities() -> BTreeMap<String, String> {
    BTreeMap::from([("&AWS;".to_string(), "AWS".to_string())])
}

fn default_summary_ignore() -> Vec<String> {
    [".git", ".github", ".tools", ".doc_gen", "node_modules", "target", "venv"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl LanguageConfig {
    fn new(base_folder: &str, service_folder: &str) -> Self {
        Self {
            base_folder: base_folder.to_string(),
            service_folder: service_folder.to_string(),
            readme: default_readme(),
        }
    }

    /// Folder of `service`, relative to the repository root
    pub fn service_folder(&self, service: &str) -> String {
        self.service_folder.replace("{service}", service)
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        let table: &[(&str, u32, &str, &str)] = &[
            ("C++", 1, "cpp", "cpp/example_code/{service}"),
            (".NET", 3, "dotnetv3", "dotnetv3/{service}"),
            ("Go", 2, "gov2", "gov2/{service}"),
            ("Java", 2, "javav2", "javav2/example_code/{service}"),
            ("JavaScript", 3, "javascriptv3", "javascriptv3/example_code/{service}"),
            ("Kotlin", 1, "kotlin", "kotlin/services/{service}"),
            ("PHP", 3, "php", "php/example_code/{service}"),
            ("Python", 3, "python", "python/example_code/{service}"),
            ("Ruby", 3, "ruby", "ruby/example_code/{service}"),
            ("Rust", 1, "rustv1", "rustv1/examples/{service}"),
            ("Swift", 1, "swift", "swift/example_code/{service}"),
        ];

        let mut languages: BTreeMap<String, BTreeMap<u32, LanguageConfig>> = BTreeMap::new();
        for (name, version, base, service) in table {
            languages
                .entry(name.to_string())
                .or_default()
                .insert(*version, LanguageConfig::new(base, service));
        }

        Self {
            github_url: default_github_url(),
            summary_ignore: default_summary_ignore(),
            entities: default_entities(),
            languages,
        }
    }
}

impl ToolConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            DocGenError::Parse(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        Self::from_yaml(&content).map_err(|e| {
            DocGenError::Parse(format!("Failed to parse config YAML from {:?}: {}", path, e))
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Layout for one language version, if configured
    pub fn language(&self, name: &str, sdk_version: u32) -> Option<&LanguageConfig> {
        self.languages.get(name)?.get(&sdk_version)
    }

    /// All configured (language, version) pairs in sorted order
    pub fn language_versions(&self) -> impl Iterator<Item = (&str, u32, &LanguageConfig)> {
        self.languages.iter().flat_map(|(name, versions)| {
            versions
                .iter()
                .map(move |(version, config)| (name.as_str(), *version, config))
        })
    }
}
