use std::env;
use std::fmt;

use thiserror::Error;

pub const URL_VAR: &str = "SUPABASE_URL";
pub const SERVICE_KEY_VAR: &str = "SUPABASE_SERVICE_KEY";

/// Credentials for the hosted backend.
pub struct Config {
    pub url: String,
    pub service_key: String,
}

#[derive(Debug, Error, PartialEq)]
#[error("missing required variables: {}", .missing.join(", "))]
pub struct ConfigError {
    pub missing: Vec<&'static str>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("url", &self.url)
            .field("service_key", &"<redacted>")
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        Config::from_lookup(|name| env::var(name).ok())
    }

    /// Reads both variables through `lookup`. Unset, empty and blank values
    /// are all reported as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let url = read(URL_VAR);
        let service_key = read(SERVICE_KEY_VAR);

        match (url, service_key) {
            (Some(url), Some(service_key)) => Ok(Config { url, service_key }),
            (url, service_key) => {
                let mut missing = Vec::new();
                if url.is_none() {
                    missing.push(URL_VAR);
                }
                if service_key.is_none() {
                    missing.push(SERVICE_KEY_VAR);
                }
                Err(ConfigError { missing })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn reads_both_variables() {
        let config = Config::from_lookup(lookup(&[
            (URL_VAR, "https://project.supabase.co"),
            (SERVICE_KEY_VAR, "secret"),
        ]))
        .unwrap();
        assert_eq!(config.url, "https://project.supabase.co");
        assert_eq!(config.service_key, "secret");
    }

    #[test]
    fn reports_every_missing_variable() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err.missing, vec![URL_VAR, SERVICE_KEY_VAR]);
    }

    #[test]
    fn empty_values_count_as_missing() {
        let err = Config::from_lookup(lookup(&[
            (URL_VAR, "https://project.supabase.co"),
            (SERVICE_KEY_VAR, "  "),
        ]))
        .unwrap_err();
        assert_eq!(err.missing, vec![SERVICE_KEY_VAR]);
        assert_eq!(
            err.to_string(),
            "missing required variables: SUPABASE_SERVICE_KEY"
        );
    }

    #[test]
    fn config_error_is_a_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(ConfigError {
            missing: vec![URL_VAR, SERVICE_KEY_VAR],
        });
        assert_eq!(
            err.to_string(),
            "missing required variables: SUPABASE_URL, SUPABASE_SERVICE_KEY"
        );
    }

    #[test]
    fn debug_hides_service_key() {
        let config = Config {
            url: "https://project.supabase.co".to_string(),
            service_key: "secret".to_string(),
        };
        let printed = format!("{:?}", config);
        assert!(!printed.contains("secret"));
        assert!(printed.contains("<redacted>"));
    }
}
