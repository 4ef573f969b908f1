// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registry configuration.
//!
//! Defaults cover the common case; the environment can override them:
//!
//! - `DTREG_INITIAL_CAPACITY`: number of cache slots reserved up front (default: 32)
//! - `DTREG_RELEASE_ON_DROP`: free cached datatypes when a cache is dropped
//!   ("1"/"true" or "0"/"false", default: true)
//! - `DTREG_LOG_LEVEL`: suggested max log level (off, error, warn, info, debug,
//!   trace). Unset by default. Nothing applies it implicitly; the host calls
//!   [`RegistryConfig::apply_log_level`] if it wants the registry to set it.
//!
//! # Example
//!
//! ```bash
//! export DTREG_INITIAL_CAPACITY=128
//! export DTREG_LOG_LEVEL=debug
//! ```

use crate::error::{Error, Result};
use log::LevelFilter;
use std::env;
use std::str::FromStr;

/// Environment variable names
pub const ENV_INITIAL_CAPACITY: &str = "DTREG_INITIAL_CAPACITY";
pub const ENV_RELEASE_ON_DROP: &str = "DTREG_RELEASE_ON_DROP";
pub const ENV_LOG_LEVEL: &str = "DTREG_LOG_LEVEL";

/// Default number of cache slots reserved at construction.
pub const DEFAULT_INITIAL_CAPACITY: usize = 32;

/// Runtime configuration for a [`DatatypeCache`](crate::DatatypeCache) and the
/// process-wide registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Slots reserved in the cache map up front.
    pub initial_capacity: usize,

    /// Release every cached datatype when the cache is dropped.
    pub release_on_drop: bool,

    /// Suggested max log level. Only [`RegistryConfig::apply_log_level`]
    /// acts on it; `init_global` leaves the logger alone.
    pub log_level: Option<LevelFilter>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            release_on_drop: true,
            log_level: None,
        }
    }
}

impl RegistryConfig {
    /// Load configuration from the process environment.
    ///
    /// Unset or empty variables keep their defaults; malformed values are
    /// rejected with [`Error::InvalidConfig`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|s| !s.trim().is_empty());
        let mut config = Self::default();

        if let Some(raw) = get(ENV_INITIAL_CAPACITY) {
            config.initial_capacity = raw.trim().parse::<usize>().map_err(|_| {
                Error::InvalidConfig(format!("{}={:?} is not a count", ENV_INITIAL_CAPACITY, raw))
            })?;
        }

        if let Some(raw) = get(ENV_RELEASE_ON_DROP) {
            config.release_on_drop = parse_bool(ENV_RELEASE_ON_DROP, &raw)?;
        }

        if let Some(raw) = get(ENV_LOG_LEVEL) {
            let level = LevelFilter::from_str(raw.trim()).map_err(|_| {
                Error::InvalidConfig(format!("{}={:?} is not a log level", ENV_LOG_LEVEL, raw))
            })?;
            config.log_level = Some(level);
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_release_on_drop(mut self, release: bool) -> Self {
        self.release_on_drop = release;
        self
    }

    #[must_use]
    pub fn with_log_level(mut self, level: LevelFilter) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Set the `log` facade's max level to `log_level`, if configured.
    ///
    /// The max level is process-wide logger state; call this only from the
    /// application that owns the logger. Returns whether a level was applied.
    pub fn apply_log_level(&self) -> bool {
        match self.log_level {
            Some(level) => {
                log::set_max_level(level);
                true
            }
            None => false,
        }
    }

    /// Check if any value differs from the defaults
    #[must_use]
    pub fn is_custom(&self) -> bool {
        *self != Self::default()
    }
}

fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    let value = raw.trim();
    if value == "1" || value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value == "0" || value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(Error::InvalidConfig(format!(
            "{}={:?} is not a boolean",
            name, raw
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = RegistryConfig::from_lookup(|_| None).expect("defaults");
        assert_eq!(config, RegistryConfig::default());
        assert_eq!(config.initial_capacity, DEFAULT_INITIAL_CAPACITY);
        assert!(config.release_on_drop);
        assert!(config.log_level.is_none());
        assert!(!config.is_custom());
    }

    #[test]
    fn reads_all_variables() {
        let config = RegistryConfig::from_lookup(lookup_from(&[
            (ENV_INITIAL_CAPACITY, "128"),
            (ENV_RELEASE_ON_DROP, "false"),
            (ENV_LOG_LEVEL, "debug"),
        ]))
        .expect("valid config");

        assert_eq!(config.initial_capacity, 128);
        assert!(!config.release_on_drop);
        assert_eq!(config.log_level, Some(LevelFilter::Debug));
        assert!(config.is_custom());
    }

    #[test]
    fn empty_values_keep_defaults() {
        let config = RegistryConfig::from_lookup(lookup_from(&[
            (ENV_INITIAL_CAPACITY, ""),
            (ENV_RELEASE_ON_DROP, "  "),
        ]))
        .expect("empty values ignored");
        assert_eq!(config, RegistryConfig::default());
    }

    #[test]
    fn rejects_malformed_values() {
        let err = RegistryConfig::from_lookup(lookup_from(&[(ENV_INITIAL_CAPACITY, "lots")]))
            .expect_err("non-numeric capacity");
        assert!(matches!(err, Error::InvalidConfig(_)));

        let err = RegistryConfig::from_lookup(lookup_from(&[(ENV_RELEASE_ON_DROP, "maybe")]))
            .expect_err("non-boolean flag");
        assert!(matches!(err, Error::InvalidConfig(_)));

        let err = RegistryConfig::from_lookup(lookup_from(&[(ENV_LOG_LEVEL, "loud")]))
            .expect_err("unknown level");
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn unset_log_level_is_not_applied() {
        assert!(!RegistryConfig::default().apply_log_level());
    }

    #[test]
    fn builder_setters() {
        let config = RegistryConfig::default()
            .with_initial_capacity(4)
            .with_release_on_drop(false)
            .with_log_level(LevelFilter::Warn);
        assert_eq!(config.initial_capacity, 4);
        assert!(!config.release_on_drop);
        assert_eq!(config.log_level, Some(LevelFilter::Warn));
    }
}
