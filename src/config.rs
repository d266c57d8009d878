use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Ok, Result};
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = ".harvestrc.json";

/// Per-grammar overrides merged over the built-in grammar defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrammarOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callee_object_names: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callee_property_names: Option<Vec<String>>,
    /// Extra callee names whose arguments are never wrapped.
    #[serde(default)]
    pub exclude_callees: Vec<String>,
    /// Extra child slots that are never descended into while wrapping.
    #[serde(default)]
    pub exclude_properties: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub ignores: Vec<String>,
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default = "default_source_root")]
    pub source_root: String,
    #[serde(default = "default_catalog_dir")]
    pub catalog_dir: String,
    #[serde(default)]
    pub catalog_base_name: String,
    #[serde(default = "default_locales")]
    pub locales: Vec<String>,
    #[serde(default = "default_translator")]
    pub translator: String,
    #[serde(default = "default_translator_message")]
    pub translator_message: String,
    #[serde(default = "default_translator_require")]
    pub translator_require: String,
    #[serde(default = "default_wrap_target_pattern")]
    pub wrap_target_pattern: String,
    #[serde(default = "default_bound_exclude_chars")]
    pub bound_exclude_chars: String,
    /// Literals matching any of these regexes are never wrapped.
    #[serde(default)]
    pub ignore_texts: Vec<String>,
    #[serde(default = "default_merge_program")]
    pub merge_program: String,
    #[serde(default)]
    pub js: GrammarOverride,
    #[serde(default)]
    pub lua: GrammarOverride,
    #[serde(default)]
    pub template: GrammarOverride,
}

fn default_source_root() -> String {
    "./".to_string()
}

fn default_catalog_dir() -> String {
    "./i18n".to_string()
}

fn default_locales() -> Vec<String> {
    vec!["en".to_string()]
}

fn default_translator() -> String {
    "translator".to_string()
}

fn default_translator_message() -> String {
    "message".to_string()
}

fn default_translator_require() -> String {
    "translator".to_string()
}

fn default_wrap_target_pattern() -> String {
    "(?i)[№а-яё]".to_string()
}

fn default_bound_exclude_chars() -> String {
    "a-zA-Zа-яА-ЯёЁ0-9_".to_string()
}

fn default_merge_program() -> String {
    "msgmerge".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignores: Vec::new(),
            includes: Vec::new(),
            source_root: default_source_root(),
            catalog_dir: default_catalog_dir(),
            catalog_base_name: String::new(),
            locales: default_locales(),
            translator: default_translator(),
            translator_message: default_translator_message(),
            translator_require: default_translator_require(),
            wrap_target_pattern: default_wrap_target_pattern(),
            bound_exclude_chars: default_bound_exclude_chars(),
            ignore_texts: Vec::new(),
            merge_program: default_merge_program(),
            js: GrammarOverride::default(),
            lua: GrammarOverride::default(),
            template: GrammarOverride::default(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error if any glob pattern or regex is invalid.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        // Patterns without wildcards are literal directory paths.
        for pattern in &self.includes {
            if pattern.contains('*') || pattern.contains('?') {
                Pattern::new(pattern).with_context(|| {
                    format!("Invalid glob pattern in 'includes': \"{}\"", pattern)
                })?;
            }
        }

        Regex::new(&self.wrap_target_pattern).with_context(|| {
            format!(
                "Invalid regex in 'wrapTargetPattern': \"{}\"",
                self.wrap_target_pattern
            )
        })?;

        Regex::new(&format!("[^{}]", self.bound_exclude_chars)).with_context(|| {
            format!(
                "Invalid character class in 'boundExcludeChars': \"{}\"",
                self.bound_exclude_chars
            )
        })?;

        for pattern in &self.ignore_texts {
            Regex::new(pattern)
                .with_context(|| format!("Invalid regex in 'ignoreTexts': \"{}\"", pattern))?;
        }

        Ok(())
    }

    /// Compiled `ignoreTexts` patterns.
    pub fn ignore_text_regexes(&self) -> Result<Vec<Regex>> {
        self.ignore_texts
            .iter()
            .map(|p| Regex::new(p).with_context(|| format!("Invalid regex: \"{}\"", p)))
            .collect()
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}
