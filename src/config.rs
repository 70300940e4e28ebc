//! File exclusion configuration.
//!
//! Filters narrow down which matching files are moved. They are loaded from a
//! TOML file given explicitly on the command line; without one, every file
//! whose name matches the search text is a candidate.
//!
//! # Configuration File Format
//!
//! ```toml
//! [filters]
//! enable_hidden_files = true
//!
//! [filters.exclude]
//! filenames = ["Thumbs.db", ".DS_Store"]
//! patterns = ["*.part"]
//! extensions = ["tmp"]
//! regex = ["^~\\$"]
//! ```
//!
//! Patterns and regexes are matched against the file name only, since
//! candidates always live directly inside the scanned directory.

use glob::Pattern;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during configuration loading and compiling.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
    /// Invalid glob pattern provided.
    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidGlobPattern { pattern: String, reason: String },
    /// Invalid regex pattern provided.
    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },
    /// IO error while reading configuration.
    #[error("IO error reading configuration: {0}")]
    IoError(String),
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub filters: FilterRules,
}

/// The `[filters]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterRules {
    /// Whether names starting with "." can be moved. Defaults to true.
    #[serde(default = "default_enable_hidden_files")]
    pub enable_hidden_files: bool,

    /// Rules for excluding files.
    #[serde(default)]
    pub exclude: ExcludeRules,
}

fn default_enable_hidden_files() -> bool {
    true
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            enable_hidden_files: default_enable_hidden_files(),
            exclude: ExcludeRules::default(),
        }
    }
}

/// Rules for excluding files from the move.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExcludeRules {
    /// Exact filenames to exclude (e.g., ".DS_Store", "Thumbs.db").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns to exclude (e.g., "*.part").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// File extensions to exclude, without the dot. Compared case-insensitively.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns to exclude.
    #[serde(default)]
    pub regex: Vec<String>,
}

impl FilterConfig {
    /// Loads configuration from `config_path`, or returns the defaults when none is given.
    ///
    /// No other location is searched.
    ///
    /// # Errors
    ///
    /// Returns an error if the given file is missing, unreadable, or not valid TOML.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml_str(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Compiles the configuration into filters ready for matching.
    ///
    /// # Errors
    ///
    /// Returns an error if any regex or glob pattern is invalid.
    pub fn compile(self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(self.filters)
    }
}

/// Pre-compiled filters.
pub struct CompiledFilters {
    enable_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
}

impl Default for CompiledFilters {
    fn default() -> Self {
        Self {
            enable_hidden_files: true,
            exclude_filenames: HashSet::new(),
            exclude_extensions: HashSet::new(),
            exclude_patterns: Vec::new(),
            exclude_regexes: Vec::new(),
        }
    }
}

impl CompiledFilters {
    fn new(rules: FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = rules
            .exclude
            .patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|e| ConfigError::InvalidGlobPattern {
                    pattern: pattern.clone(),
                    reason: e.msg.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            enable_hidden_files: rules.enable_hidden_files,
            exclude_filenames: rules.exclude.filenames.into_iter().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_patterns,
            exclude_regexes,
        })
    }

    /// Returns true if the file at `file_path` may be moved.
    ///
    /// Checks run in this order and stop at the first exclusion:
    /// 1. Hidden file, when hidden files are disabled
    /// 2. Exact filename
    /// 3. Extension
    /// 4. Glob pattern
    /// 5. Regex pattern
    pub fn should_include(&self, file_path: &Path) -> bool {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if !self.enable_hidden_files && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name.as_ref()) {
            return false;
        }

        if let Some(ext) = file_path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            if self.exclude_extensions.contains(&ext_lower) {
                return false;
            }
        }

        if self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches(&file_name))
        {
            return false;
        }

        !self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(&file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(exclude: ExcludeRules) -> CompiledFilters {
        FilterConfig {
            filters: FilterRules {
                enable_hidden_files: true,
                exclude,
            },
        }
        .compile()
        .unwrap()
    }

    #[test]
    fn test_default_config_includes_everything() {
        let compiled = FilterConfig::default().compile().unwrap();

        assert!(compiled.should_include(Path::new(".DS_Store")));
        assert!(compiled.should_include(Path::new("scan_front.png")));
    }

    #[test]
    fn test_load_without_path_uses_defaults() {
        let config = FilterConfig::load(None).unwrap();
        assert!(config.filters.enable_hidden_files);
        assert!(config.filters.exclude.filenames.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let result = FilterConfig::load(Some(Path::new("/non/existent/filegroup.toml")));
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("filegroup.toml");
        std::fs::write(
            &path,
            r#"
            [filters]
            enable_hidden_files = false

            [filters.exclude]
            filenames = ["Thumbs.db"]
            "#,
        )
        .expect("Failed to write config");

        let config = FilterConfig::load(Some(&path)).unwrap();

        assert!(!config.filters.enable_hidden_files);
        assert_eq!(config.filters.exclude.filenames, vec!["Thumbs.db".to_string()]);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = FilterConfig::from_toml_str(
            r#"
            [filters.exclude]
            extensions = ["tmp"]
            "#,
        )
        .unwrap();

        assert!(config.filters.enable_hidden_files);
        assert_eq!(config.filters.exclude.extensions, vec!["tmp".to_string()]);
    }

    #[test]
    fn test_parse_empty_toml() {
        let config = FilterConfig::from_toml_str("").unwrap();
        assert!(config.filters.enable_hidden_files);
    }

    #[test]
    fn test_parse_invalid_toml() {
        let result = FilterConfig::from_toml_str("[filters\nbroken");
        assert!(matches!(result, Err(ConfigError::ConfigInvalid(_))));
    }

    #[test]
    fn test_hidden_files_can_be_disabled() {
        let compiled = FilterConfig::from_toml_str("[filters]\nenable_hidden_files = false")
            .unwrap()
            .compile()
            .unwrap();

        assert!(!compiled.should_include(Path::new(".front.png")));
        assert!(compiled.should_include(Path::new("front.png")));
    }

    #[test]
    fn test_exclude_exact_filename() {
        let compiled = compile(ExcludeRules {
            filenames: vec!["Thumbs.db".to_string()],
            ..Default::default()
        });

        assert!(!compiled.should_include(Path::new("Thumbs.db")));
        assert!(compiled.should_include(Path::new("image.jpg")));
    }

    #[test]
    fn test_exclude_extensions() {
        let compiled = compile(ExcludeRules {
            extensions: vec!["bak".to_string(), ".tmp".to_string()],
            ..Default::default()
        });

        assert!(!compiled.should_include(Path::new("file.bak")));
        assert!(!compiled.should_include(Path::new("file.tmp")));
        assert!(!compiled.should_include(Path::new("file.BAK")));
        assert!(compiled.should_include(Path::new("file.txt")));
    }

    #[test]
    fn test_exclude_glob_matches_file_name() {
        let compiled = compile(ExcludeRules {
            patterns: vec!["*.part".to_string(), "draft_?.txt".to_string()],
            ..Default::default()
        });

        assert!(!compiled.should_include(Path::new("/some/dir/front.part")));
        assert!(!compiled.should_include(Path::new("draft_1.txt")));
        assert!(compiled.should_include(Path::new("draft_12.txt")));
        assert!(compiled.should_include(Path::new("front.png")));
    }

    #[test]
    fn test_exclude_regex() {
        let compiled = compile(ExcludeRules {
            regex: vec![r"^~\$".to_string()],
            ..Default::default()
        });

        assert!(!compiled.should_include(Path::new("~$front.docx")));
        assert!(compiled.should_include(Path::new("front.docx")));
    }

    #[test]
    fn test_invalid_regex_returns_error() {
        let result = FilterConfig {
            filters: FilterRules {
                enable_hidden_files: true,
                exclude: ExcludeRules {
                    regex: vec!["[invalid(".to_string()],
                    ..Default::default()
                },
            },
        }
        .compile();

        assert!(matches!(
            result,
            Err(ConfigError::InvalidRegexPattern { .. })
        ));
    }

    #[test]
    fn test_invalid_glob_returns_error() {
        let result = FilterConfig {
            filters: FilterRules {
                enable_hidden_files: true,
                exclude: ExcludeRules {
                    patterns: vec!["[invalid".to_string()],
                    ..Default::default()
                },
            },
        }
        .compile();

        assert!(matches!(result, Err(ConfigError::InvalidGlobPattern { .. })));
    }
}
