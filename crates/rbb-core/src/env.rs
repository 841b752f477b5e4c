//! Environment variable helpers
//!
//! Typed lookups with defaults, used by logging setup and by runtime
//! configuration (`RBB_CAPACITY`, `RBB_MAX_BLOCKS`, ...).
//!
//! ```ignore
//! use rbb_core::env::{env_get, env_get_bool};
//!
//! let capacity: usize = env_get("RBB_CAPACITY", 64 * 1024);
//! let flush = env_get_bool("RBB_FLUSH_EPRINT", false);
//! ```

use std::str::FromStr;

/// Variable parsed as `T`, or `default` if unset or unparsable
#[inline]
pub fn env_get<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    env_get_opt(key).unwrap_or(default)
}

/// Variable parsed as `T`, if set and parsable
#[inline]
pub fn env_get_opt<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Boolean flag
///
/// "1", "true", "yes" and "on" (any case) are true; any other value is
/// false. Unset returns `default`.
#[inline]
pub fn env_get_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => matches!(val.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

/// Whether the variable is set at all
#[inline]
pub fn env_is_set(key: &str) -> bool {
    std::env::var_os(key).is_some()
}
