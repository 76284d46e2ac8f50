//! Host configuration.
//!
//! Values come from the environment with defaults; the CLI may override them.
//! Read-model stream names are fixed and not configurable.

use thiserror::Error;

pub const BATCH_SIZE_VAR: &str = "STOCKFOLD_BATCH_SIZE";
pub const CHECKPOINT_EVERY_VAR: &str = "STOCKFOLD_CHECKPOINT_EVERY";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}={value:?} is not a positive integer")]
    NotPositive { key: &'static str, value: String },
}

/// Tuning for [`ProjectionHost`](crate::projections::ProjectionHost).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostConfig {
    /// Events read from the store per round trip.
    pub batch_size: usize,
    /// Save a checkpoint after this many newly folded events.
    pub checkpoint_every: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            batch_size: 500,
            checkpoint_every: 100,
        }
    }
}

impl HostConfig {
    /// Read `STOCKFOLD_BATCH_SIZE` / `STOCKFOLD_CHECKPOINT_EVERY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            batch_size: positive(&lookup, BATCH_SIZE_VAR)?.unwrap_or(defaults.batch_size),
            checkpoint_every: positive(&lookup, CHECKPOINT_EVERY_VAR)?
                .unwrap_or(defaults.checkpoint_every),
        })
    }
}

fn positive(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<usize>, ConfigError> {
    let Some(value) = lookup(key) else {
        return Ok(None);
    };
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => Err(ConfigError::NotPositive { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = HostConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, HostConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let config = HostConfig::from_lookup(lookup(&[
            (BATCH_SIZE_VAR, "25"),
            (CHECKPOINT_EVERY_VAR, " 5 "),
        ]))
        .unwrap();
        assert_eq!(config.batch_size, 25);
        assert_eq!(config.checkpoint_every, 5);
    }

    #[test]
    fn rejects_zero_and_garbage() {
        let err = HostConfig::from_lookup(lookup(&[(BATCH_SIZE_VAR, "0")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::NotPositive {
                key: BATCH_SIZE_VAR,
                value: "0".to_string()
            }
        );
        assert!(HostConfig::from_lookup(lookup(&[(CHECKPOINT_EVERY_VAR, "lots")])).is_err());
    }
}
