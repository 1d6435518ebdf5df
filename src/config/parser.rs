use crate::config::types::{ArchiveConfig, Config, SearchReplace};
use crate::config::validation::validate;
use crate::ConfigError;
use regex::RegexBuilder;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(ArchiveConfig)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use mailman_mirror::config::load_config;
///
/// let config = load_config(Path::new("mailman-mirror.toml")).unwrap();
/// println!("Mirroring list: {}", config.mailman.list_name);
/// ```
pub fn load_config(path: &Path) -> Result<ArchiveConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses configuration text and resolves it into an [`ArchiveConfig`]
///
/// The `head-html` path, when set, is read relative to the working directory.
pub fn parse_config(content: &str) -> Result<ArchiveConfig, ConfigError> {
    let config: Config = toml::from_str(content)?;

    validate(&config)?;

    let search_replace = parse_search_replace(&config.conversion.search_replace)?;

    let head_html = if config.conversion.head_html.is_empty() {
        None
    } else {
        Some(std::fs::read_to_string(&config.conversion.head_html)?)
    };

    Ok(ArchiveConfig {
        mailman: config.mailman,
        conversion: config.conversion,
        rss: config.rss,
        local: config.local,
        head_html,
        search_replace,
    })
}

/// Parses newline-separated `pattern//replacement` pairs
///
/// Blank lines are ignored. Every other line must contain exactly one `//`
/// separator and a pattern that compiles as a regular expression.
pub fn parse_search_replace(spec: &str) -> Result<Vec<SearchReplace>, ConfigError> {
    let mut rules = Vec::new();

    for line in spec.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let parts: Vec<&str> = line.split("//").collect();
        if parts.len() != 2 {
            return Err(ConfigError::Validation(format!(
                "'{}' is not a valid search_replace string",
                line
            )));
        }

        let (pattern, replacement) = (parts[0], parts[1]);
        if pattern.is_empty() {
            return Err(ConfigError::Validation(format!(
                "'{}' has an empty search pattern",
                line
            )));
        }

        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))?;

        rules.push(SearchReplace {
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
        });
    }

    Ok(rules)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so a published mirror can be traced back to the
/// configuration that produced it.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(ArchiveConfig, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
