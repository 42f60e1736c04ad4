//! Configuration utility functions
//!
//! Environment overrides for [`ToolPaths`](super::ToolPaths) and the reap
//! grace period. Unset variables fall back to the default; malformed values
//! are logged and fall back as well.

use log::warn;
use std::path::PathBuf;
use std::time::Duration;

/// Path from an environment variable, or `default` when unset or empty.
pub fn get_env_path(key: &str, default: PathBuf) -> PathBuf {
    match std::env::var_os(key) {
        Some(val) if !val.is_empty() => PathBuf::from(val),
        _ => default,
    }
}

/// Whole seconds from an environment variable, or `default`.
pub fn get_env_secs(key: &str, default: Duration) -> Duration {
    secs_or_default(key, std::env::var(key).ok().as_deref(), default)
}

fn secs_or_default(key: &str, raw: Option<&str>, default: Duration) -> Duration {
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse::<u64>() {
        Ok(secs) => Duration::from_secs(secs),
        Err(e) => {
            warn!("Ignoring {key}='{raw}' ({e}), using {}s", default.as_secs());
            default
        }
    }
}
