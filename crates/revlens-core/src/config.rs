use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every setting has a default; the only failure mode is a value that does not
/// parse or violates a bound (zero chunk size, zero concurrency).
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be greater than zero".to_string()));
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("REVLENS_ENV", "development"))?;

    let bind_addr = or_default("REVLENS_BIND_ADDR", "127.0.0.1:8501")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("REVLENS_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("REVLENS_LOG_LEVEL", "info");

    let llm_base_url = or_default("REVLENS_LLM_BASE_URL", "https://api.openai.com/v1");
    let llm_model = or_default("REVLENS_LLM_MODEL", "gpt-4o");
    let llm_timeout_secs = parse_u64("REVLENS_LLM_TIMEOUT_SECS", "120")?;
    let llm_max_retries = parse_u32("REVLENS_LLM_MAX_RETRIES", "2")?;
    let llm_retry_backoff_base_ms = parse_u64("REVLENS_LLM_RETRY_BACKOFF_BASE_MS", "1000")?;

    let chunk_size = parse_positive_usize("REVLENS_CHUNK_SIZE", "3000")?;
    let chunk_concurrency = parse_positive_usize("REVLENS_CHUNK_CONCURRENCY", "1")?;

    let scratch_dir = lookup("REVLENS_SCRATCH_DIR").map_or_else(|_| std::env::temp_dir(), PathBuf::from);
    let openai_api_key = lookup("OPENAI_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty());

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        llm_base_url,
        llm_model,
        llm_timeout_secs,
        llm_max_retries,
        llm_retry_backoff_base_ms,
        chunk_size,
        chunk_concurrency,
        scratch_dir,
        openai_api_key,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "REVLENS_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
