use crate::config::types::{Config, CrawlerConfig, OutputConfig, SourceConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_source_config(&config.source)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_items < 1 {
        return Err(ConfigError::Validation(format!(
            "max_items must be >= 1, got {}",
            config.max_items
        )));
    }

    if config.seed.trim().is_empty() {
        return Err(ConfigError::Validation("seed cannot be empty".to_string()));
    }

    if config.max_safety_depth < 1 {
        return Err(ConfigError::Validation(format!(
            "max_safety_depth must be >= 1, got {}",
            config.max_safety_depth
        )));
    }

    if !config.process_all_links && config.max_links_per_item < 1 {
        return Err(ConfigError::Validation(format!(
            "max_links_per_item must be >= 1 when process_all_links is off, got {}",
            config.max_links_per_item
        )));
    }

    Ok(())
}

/// Validates the source base URL
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base_url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    // Validate contact URL
    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    // Validate contact email (basic validation)
    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.data_dir.is_empty() {
        return Err(ConfigError::Validation(
            "data_dir cannot be empty".to_string(),
        ));
    }

    if config.history_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "history_limit must be >= 1, got {}",
            config.history_limit
        )));
    }

    Ok(())
}

/// Basic email validation: one '@' with non-empty local part and a dotted domain
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "contact_email is not a valid email address: '{}'",
            email
        )));
    }
    Ok(())
}
