use crate::config::types::{Config, ConversionConfig, LocalConfig, MailmanConfig, RssConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_mailman_config(&config.mailman)?;
    validate_conversion_config(&config.conversion)?;
    validate_rss_config(&config.rss)?;
    validate_local_config(&config.local)?;
    Ok(())
}

/// Validates the Mailman section
fn validate_mailman_config(config: &MailmanConfig) -> Result<(), ConfigError> {
    if config.domain.is_empty() {
        return Err(ConfigError::Validation("domain cannot be empty".to_string()));
    }

    if config.domain.contains('/') || config.domain.chars().any(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "domain must be a bare host name, got '{}'",
            config.domain
        )));
    }

    if config.list_name.is_empty() {
        return Err(ConfigError::Validation(
            "list_name cannot be empty".to_string(),
        ));
    }

    if config.protocol != "http" && config.protocol != "https" {
        return Err(ConfigError::Validation(format!(
            "protocol must be 'http' or 'https', got '{}'",
            config.protocol
        )));
    }

    if !config.email.is_empty() && config.password.is_empty() {
        return Err(ConfigError::Validation(
            "password is required when email is set".to_string(),
        ));
    }

    Ok(())
}

/// Validates the Conversion section
fn validate_conversion_config(config: &ConversionConfig) -> Result<(), ConfigError> {
    if !config.list_info_url.is_empty() {
        Url::parse(&config.list_info_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid list_info_url: {}", e)))?;
    }

    Ok(())
}

/// Validates the RSS section
fn validate_rss_config(config: &RssConfig) -> Result<(), ConfigError> {
    if !config.rss_file.is_empty() && config.items_for_rss < 1 {
        return Err(ConfigError::Validation(format!(
            "items_for_rss must be >= 1 when rss_file is set, got {}",
            config.items_for_rss
        )));
    }

    Ok(())
}

/// Validates the Local section
fn validate_local_config(config: &LocalConfig) -> Result<(), ConfigError> {
    if config.publish_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "publish_dir cannot be empty".to_string(),
        ));
    }

    Url::parse(&config.publish_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid publish_url: {}", e)))?;

    Ok(())
}
