//! Server Configuration
//!
//! Everything is read from the environment once at startup (after `.env`
//! has been loaded). Parsing goes through a lookup function so tests can
//! supply their own variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use agent_core::AgentError;
use agent_runtime::{ModelSelection, OllamaConfig};
use thiserror::Error;

/// Longest accepted model-call or request timeout: one day
const MAX_TIMEOUT_SECS: u64 = 24 * 60 * 60;

/// Startup configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got '{value}'")]
    Invalid {
        key: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error(transparent)]
    Runtime(#[from] AgentError),
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Model runtime connection
    pub ollama: OllamaConfig,

    /// Primary/fallback model choice and pull policy
    pub models: ModelSelection,

    /// Upper bound for one model call
    pub model_timeout: Duration,

    /// Upper bound for one `/chat` reasoning run
    pub request_timeout: Duration,

    /// Tool dispatches per question
    pub max_iterations: usize,

    pub bind_addr: SocketAddr,

    /// Directory holding the chat page
    pub static_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let ollama = OllamaConfig::from_lookup(&lookup)?;

        let temperature: f32 = parse(&lookup, "MODEL_TEMPERATURE", 0.7, "a number")?;
        if !temperature.is_finite() || temperature < 0.0 {
            return Err(ConfigError::Invalid {
                key: "MODEL_TEMPERATURE",
                value: temperature.to_string(),
                expected: "a non-negative number",
            });
        }

        let models = ModelSelection {
            primary: text(&lookup, "MODEL_NAME", "llama2"),
            fallback: text(&lookup, "FALLBACK_MODEL", "phi"),
            auto_pull: flag(&lookup, "AUTO_PULL")?,
            temperature,
        };

        let max_iterations: usize = parse(&lookup, "MAX_ITERATIONS", 5, "a positive integer")?;
        if max_iterations == 0 {
            return Err(ConfigError::Invalid {
                key: "MAX_ITERATIONS",
                value: "0".into(),
                expected: "a positive integer",
            });
        }

        let model_timeout = timeout("MODEL_TIMEOUT_SECS", ollama.timeout_secs)?;
        let request_timeout = timeout(
            "REQUEST_TIMEOUT_SECS",
            parse(&lookup, "REQUEST_TIMEOUT_SECS", 300, TIMEOUT_EXPECTED)?,
        )?;

        Ok(Self {
            model_timeout,
            request_timeout,
            max_iterations,
            bind_addr: parse(
                &lookup,
                "BIND_ADDR",
                SocketAddr::from(([0, 0, 0, 0], 8000)),
                "a socket address such as 0.0.0.0:8000",
            )?,
            static_dir: PathBuf::from(text(&lookup, "STATIC_DIR", "static")),
            ollama,
            models,
        })
    }
}

const TIMEOUT_EXPECTED: &str = "a whole number of seconds between 1 and 86400";

fn timeout(key: &'static str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 || secs > MAX_TIMEOUT_SECS {
        return Err(ConfigError::Invalid {
            key,
            value: secs.to_string(),
            expected: TIMEOUT_EXPECTED,
        });
    }
    Ok(Duration::from_secs(secs))
}

fn text<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse<F, T>(
    lookup: &F,
    key: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key,
                value: raw,
                expected,
            })
        }
        _ => Ok(default),
    }
}

fn flag<F>(lookup: &F, key: &'static str) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(false);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => Ok(false),
        "1" | "true" | "yes" | "on" => Ok(true),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw,
            expected: "true or false",
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<&str, &str> = pairs.iter().copied().collect();
        AppConfig::from_lookup(|key| vars.get(key).map(|v| (*v).to_string()))
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();

        assert_eq!(config.ollama.base_url, "http://localhost:11434");
        assert_eq!(config.models.primary, "llama2");
        assert_eq!(config.models.fallback, "phi");
        assert!(!config.models.auto_pull);
        assert!((config.models.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.model_timeout, Duration::from_secs(120));
        assert_eq!(config.request_timeout, Duration::from_secs(300));
        assert_eq!(config.max_iterations, 5);
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:8000");
        assert_eq!(config.static_dir, PathBuf::from("static"));
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("OLLAMA_HOST", "http://ollama:11434"),
            ("MODEL_NAME", "mistral"),
            ("FALLBACK_MODEL", "tinyllama"),
            ("MODEL_TEMPERATURE", "0.2"),
            ("MODEL_TIMEOUT_SECS", "10"),
            ("REQUEST_TIMEOUT_SECS", "60"),
            ("MAX_ITERATIONS", "3"),
            ("AUTO_PULL", "TRUE"),
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("STATIC_DIR", "/srv/ui"),
        ])
        .unwrap();

        assert_eq!(config.ollama.base_url, "http://ollama:11434");
        assert_eq!(config.models.primary, "mistral");
        assert_eq!(config.models.fallback, "tinyllama");
        assert!(config.models.auto_pull);
        assert_eq!(config.model_timeout, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.max_iterations, 3);
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.static_dir, PathBuf::from("/srv/ui"));
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            ("MAX_ITERATIONS", "0"),
            ("MAX_ITERATIONS", "five"),
            ("MODEL_TEMPERATURE", "-1"),
            ("REQUEST_TIMEOUT_SECS", "1.5"),
            ("AUTO_PULL", "maybe"),
            ("BIND_ADDR", "localhost"),
        ] {
            let err = config(&[(key, value)]).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { key: k, .. } if k == key),
                "{key}={value} gave {err}"
            );
        }

        let err = config(&[("MODEL_TIMEOUT_SECS", "x")]).unwrap_err();
        assert!(matches!(err, ConfigError::Runtime(AgentError::Config(_))));
    }

    #[test]
    fn test_timeout_bounds() {
        for key in ["MODEL_TIMEOUT_SECS", "REQUEST_TIMEOUT_SECS"] {
            for value in ["0", "86401", "18446744073709551615"] {
                let err = config(&[(key, value)]).unwrap_err();
                assert!(
                    matches!(err, ConfigError::Invalid { key: k, .. } if k == key),
                    "{key}={value} gave {err}"
                );
            }
        }

        let config = config(&[("MODEL_TIMEOUT_SECS", "1"), ("REQUEST_TIMEOUT_SECS", "86400")])
            .unwrap();
        assert_eq!(config.model_timeout, Duration::from_secs(1));
        assert_eq!(config.request_timeout, Duration::from_secs(86_400));
    }
}
