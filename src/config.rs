
use crate::entities::FilterRule;
use std::env::VarError;
use std::str::FromStr;
use std::time::Duration;

// Sized for the default 3 s Lambda timeout; attempts are further bounded by
// the invocation deadline at runtime.
const DEFAULT_START_TIMEOUT_MS: u64 = 1000;
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_INITIAL_BACKOFF_MS: u64 = 100;
const DEFAULT_MAX_BACKOFF_MS: u64 = 400;

#[derive(Debug)]
pub enum ConfigError {
    MissingVariable(String),
    InvalidValue(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff: Duration::from_millis(DEFAULT_INITIAL_BACKOFF_MS),
            max_backoff: Duration::from_millis(DEFAULT_MAX_BACKOFF_MS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub state_machine_arn: String,
    pub filter_rule: FilterRule,
    pub start_timeout: Duration,
    pub retry_policy: RetryPolicy,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        Self::from_lookup(|name| std::env::var(name))
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let state_machine_arn = lookup("STEP_FUNCTIONS_ARN")
            .ok()
            .filter(|arn| !arn.trim().is_empty())
            .ok_or_else(|| {
                ConfigError::MissingVariable(String::from("Env var STEP_FUNCTIONS_ARN undefined."))
            })?;
        let filter_rule = FilterRule {
            prefix: lookup("TRIGGER_S3_PREFIX").unwrap_or_default(),
            suffix: lookup("TRIGGER_S3_SUFFIX").unwrap_or_default(),
        };
        let start_timeout = Duration::from_millis(_parse_or(
            &lookup,
            "START_EXECUTION_TIMEOUT_MS",
            DEFAULT_START_TIMEOUT_MS,
        )?);
        let max_attempts = _parse_or(&lookup, "DISPATCH_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?;
        if max_attempts == 0 {
            return Err(ConfigError::InvalidValue(String::from(
                "DISPATCH_MAX_ATTEMPTS must be at least 1.",
            )));
        }
        let retry_policy = RetryPolicy {
            max_attempts,
            initial_backoff: Duration::from_millis(_parse_or(
                &lookup,
                "DISPATCH_INITIAL_BACKOFF_MS",
                DEFAULT_INITIAL_BACKOFF_MS,
            )?),
            max_backoff: Duration::from_millis(_parse_or(
                &lookup,
                "DISPATCH_MAX_BACKOFF_MS",
                DEFAULT_MAX_BACKOFF_MS,
            )?),
        };
        if retry_policy.initial_backoff > retry_policy.max_backoff {
            return Err(ConfigError::InvalidValue(format!(
                "DISPATCH_INITIAL_BACKOFF_MS ({} ms) exceeds DISPATCH_MAX_BACKOFF_MS ({} ms).",
                retry_policy.initial_backoff.as_millis(),
                retry_policy.max_backoff.as_millis()
            )));
        }
        Ok(Config {
            state_machine_arn,
            filter_rule,
            start_timeout,
            retry_policy,
        })
    }
}

fn _parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
    T: FromStr,
    T::Err: std::fmt::Debug,
{
    match lookup(name) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|e| {
            ConfigError::InvalidValue(format!(
                "Env var {} has invalid value {:?}:\n{:?}",
                name, raw, e
            ))
        }),
        Err(_) => Ok(default),
    }
}
