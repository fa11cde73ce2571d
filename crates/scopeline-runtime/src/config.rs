use std::error::Error;
use std::fmt;

pub const ENV_NAME: &str = "SCOPELINE_NAME";
pub const ENV_ENABLED: &str = "SCOPELINE_ENABLED";

const DEFAULT_NAME: &str = "scopeline";

/// Construction-time settings for a [`ScopeManager`](crate::ScopeManager).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Name reported in logs and snapshots.
    pub name: String,
    /// Enable the manager as soon as it is built.
    pub start_enabled: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_owned(),
            start_enabled: false,
        }
    }
}

impl ManagerConfig {
    /// Reads `SCOPELINE_NAME` and `SCOPELINE_ENABLED` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(name) = lookup(ENV_NAME) {
            let name = name.trim();
            if name.is_empty() {
                return Err(ConfigError::EmptyName { key: ENV_NAME });
            }
            config.name = name.to_owned();
        }

        if let Some(raw) = lookup(ENV_ENABLED) {
            config.start_enabled = parse_flag(ENV_ENABLED, &raw)?;
        }

        Ok(config)
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn enabled_on_start(mut self, enabled: bool) -> Self {
        self.start_enabled = enabled;
        self
    }
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            key,
            value: raw.to_owned(),
        }),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidFlag { key: &'static str, value: String },
    EmptyName { key: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFlag { key, value } => {
                write!(f, "{key} must be one of 1/0, true/false, yes/no, on/off; got {value:?}")
            }
            Self::EmptyName { key } => write!(f, "{key} must be non-empty"),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn unset_keys_keep_defaults() {
        let config = ManagerConfig::from_lookup(lookup_from(&[])).expect("empty env is valid");
        assert_eq!(config, ManagerConfig::default());
        assert_eq!(config.name, "scopeline");
        assert!(!config.start_enabled);
    }

    #[test]
    fn reads_name_and_flag() {
        let config = ManagerConfig::from_lookup(lookup_from(&[
            (ENV_NAME, " checkout-service "),
            (ENV_ENABLED, "On"),
        ]))
        .expect("valid env");
        assert_eq!(config.name, "checkout-service");
        assert!(config.start_enabled);
    }

    #[test]
    fn rejects_unknown_flag_values() {
        let err = ManagerConfig::from_lookup(lookup_from(&[(ENV_ENABLED, "maybe")]))
            .expect_err("unknown flag must fail");
        assert!(matches!(
            err,
            ConfigError::InvalidFlag { key: ENV_ENABLED, ref value } if value == "maybe"
        ));
        assert!(err.to_string().contains("SCOPELINE_ENABLED"));
    }

    #[test]
    fn rejects_blank_name() {
        let err = ManagerConfig::from_lookup(lookup_from(&[(ENV_NAME, "   ")]))
            .expect_err("blank name must fail");
        assert_eq!(err, ConfigError::EmptyName { key: ENV_NAME });
    }
}
