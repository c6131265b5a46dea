//! Configuration file loading and environment variable resolution.

use std::env;
use std::fs;
use std::path::Path;

use regex::Regex;

use crate::errors::{RouterError, RouterResult};
use crate::router::compression::CompressionStrategy;
use crate::router::strategies::RotationStrategy;
use super::types::Config;

/// Load and parse a TOML configuration file.
///
/// # Example
/// ```no_run
/// use relayllm::config::load_config;
///
/// let config = load_config("relayllm.toml").unwrap();
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> RouterResult<Config> {
    let path = path.as_ref();

    let content = fs::read_to_string(path).map_err(|e| {
        RouterError::Config(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&content)
}

/// Parse a TOML configuration string, resolving `${VAR}` environment
/// variable references in credential secrets.
pub fn parse_config(content: &str) -> RouterResult<Config> {
    let mut config: Config = toml::from_str(content)
        .map_err(|e| RouterError::Config(format!("Failed to parse TOML: {}", e)))?;

    resolve_env_vars(&mut config)?;
    validate_config(&config)?;

    Ok(config)
}

/// Resolve environment variable references in the configuration.
///
/// Variables use the `${VAR_NAME}` syntax. A missing variable is an error
/// with a hint naming the credential entry it was referenced from.
fn resolve_env_vars(config: &mut Config) -> RouterResult<()> {
    let env_var_pattern = Regex::new(r"\$\{([^}]+)\}").unwrap();

    for (idx, credential) in config.credentials.iter_mut().enumerate() {
        match resolve_env_var_string(&credential.secret, &env_var_pattern) {
            Ok(Some(resolved)) => credential.secret = resolved,
            Ok(None) => {}
            Err(RouterError::Config(msg)) => {
                return Err(RouterError::Config(format!(
                    "{}\n  → Referenced in credentials[{}].secret",
                    msg, idx
                )));
            }
            Err(other) => return Err(other),
        }
    }

    Ok(())
}

/// Resolve environment variables in a single string.
/// Returns None if no env vars are present, Some(resolved) if all resolved
/// successfully.
fn resolve_env_var_string(s: &str, pattern: &Regex) -> RouterResult<Option<String>> {
    if !pattern.is_match(s) {
        return Ok(None);
    }

    let mut result = s.to_string();

    for caps in pattern.captures_iter(s) {
        let full_match = caps.get(0).unwrap().as_str();
        let var_name = caps.get(1).unwrap().as_str();

        match env::var(var_name) {
            Ok(value) => {
                result = result.replace(full_match, &value);
            }
            Err(_) => {
                return Err(RouterError::Config(format!(
                    "Environment variable '{}' not found\n  \
                     → Set it with: export {}=\"your-value\"",
                    var_name, var_name
                )));
            }
        }
    }

    Ok(Some(result))
}

/// Validate the configuration for consistency.
fn validate_config(config: &Config) -> RouterResult<()> {
    config.settings.strategy.parse::<RotationStrategy>()?;
    config
        .compression
        .strategy
        .parse::<CompressionStrategy>()?;

    for (idx, credential) in config.credentials.iter().enumerate() {
        if credential.provider.is_empty() || credential.model.is_empty() {
            return Err(RouterError::Config(format!(
                "credentials[{}] must name both a provider and a model",
                idx
            )));
        }
    }

    Ok(())
}
