use crate::config::types::{Config, DocsConfig, GitHubConfig, StorageConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_user_agent_config(&config.user_agent)?;
    validate_docs_config(&config.docs)?;
    validate_github_config(&config.github)?;
    validate_storage_config(&config.storage)?;
    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
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

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    Ok(())
}

/// Validates documentation crawl configuration
pub(crate) fn validate_docs_config(config: &DocsConfig) -> Result<(), ConfigError> {
    let start = Url::parse(&config.start_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid start_url '{}': {}", config.start_url, e))
    })?;

    if start.scheme() != "http" && start.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "start_url '{}' must use http or https",
            config.start_url
        )));
    }

    if config.allowed_host.is_empty() {
        return Err(ConfigError::Validation(
            "allowed_host cannot be empty".to_string(),
        ));
    }

    if config.allowed_path_prefixes.is_empty() {
        return Err(ConfigError::Validation(
            "allowed_path_prefixes must contain at least one prefix".to_string(),
        ));
    }

    if let Some(bad) = config
        .allowed_path_prefixes
        .iter()
        .find(|p| !p.starts_with('/'))
    {
        return Err(ConfigError::Validation(format!(
            "allowed path prefix '{}' must start with '/'",
            bad
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.checkpoint_interval < 1 {
        return Err(ConfigError::Validation(
            "checkpoint_interval must be >= 1".to_string(),
        ));
    }

    if config.max_consecutive_failures < 1 {
        return Err(ConfigError::Validation(
            "max_consecutive_failures must be >= 1".to_string(),
        ));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates repository walk configuration
fn validate_github_config(config: &GitHubConfig) -> Result<(), ConfigError> {
    Url::parse(&config.api_base_url).map_err(|e| {
        ConfigError::InvalidUrl(format!(
            "Invalid api_base_url '{}': {}",
            config.api_base_url, e
        ))
    })?;

    if config.max_content_size < config.min_content_length {
        return Err(ConfigError::Validation(format!(
            "max_content_size ({}) must be >= min_content_length ({})",
            config.max_content_size, config.min_content_length
        )));
    }

    if config.extensions.is_empty() {
        return Err(ConfigError::Validation(
            "extensions must contain at least one entry".to_string(),
        ));
    }

    for entry in &config.repositories {
        if entry.owner.is_empty() || entry.repo.is_empty() {
            return Err(ConfigError::Validation(format!(
                "repository entry '{}' needs both owner and repo",
                entry.full_name()
            )));
        }
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.data_dir.is_empty() {
        return Err(ConfigError::Validation(
            "data_dir cannot be empty".to_string(),
        ));
    }
    Ok(())
}
