//! Runtime configuration loaded from the process environment.
//!
//! Unset or unparsable values fall back to their defaults.

use std::env;
use std::str::FromStr;

/// Snapshot of configuration values consumed by the core.
#[derive(Clone, Debug, PartialEq)]
pub struct AppCfg {
    /// `tracing` filter directive, e.g. `info` or `datalens=debug`.
    pub log_filter: String,
    /// Session used by front ends that do not pick one.
    pub default_session: String,
    /// Seed for the train/test shuffle.
    pub split_seed: u64,
    /// Fraction of rows held out for scoring, in (0, 1).
    pub test_fraction: f64,
    /// Attempts made against the analysis assistant before giving up.
    pub assistant_attempts: u32,
    /// Initial backoff between assistant attempts.
    pub assistant_delay_ms: u64,
}

impl Default for AppCfg {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            default_session: "12345".to_string(),
            split_seed: 42,
            test_fraction: 0.2,
            assistant_attempts: 5,
            assistant_delay_ms: 1000,
        }
    }
}

impl AppCfg {
    /// Create a configuration snapshot from the process environment.
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a snapshot from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: FromStr>(raw: Option<String>, default: T) -> T {
            raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
        }

        let defaults = Self::default();

        let test_fraction = parsed(lookup("DATALENS_TEST_FRACTION"), defaults.test_fraction);
        let test_fraction = if test_fraction > 0.0 && test_fraction < 1.0 {
            test_fraction
        } else {
            defaults.test_fraction
        };

        Self {
            log_filter: lookup("DATALENS_LOG").unwrap_or(defaults.log_filter),
            default_session: lookup("DATALENS_SESSION")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.default_session),
            split_seed: parsed(lookup("DATALENS_SPLIT_SEED"), defaults.split_seed),
            test_fraction,
            assistant_attempts: parsed(
                lookup("DATALENS_ASSISTANT_ATTEMPTS"),
                defaults.assistant_attempts,
            )
            .max(1),
            assistant_delay_ms: parsed(
                lookup("DATALENS_ASSISTANT_DELAY_MS"),
                defaults.assistant_delay_ms,
            ),
        }
    }
}
