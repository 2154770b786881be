//! Environment helpers shared by the configuration loaders.

use std::str::FromStr;

use regex::Regex;

use crate::error::{Error, Result};

/// Replace `${VAR}` placeholders with environment values.
///
/// Unset variables are left untouched so validation can report them.
pub fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| Error::Internal(format!("env placeholder pattern: {}", e)))?;
    Ok(re
        .replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string())
}

/// Parse an environment variable, `None` when unset.
///
/// A set but unparseable value is a configuration error.
pub fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} has an invalid value: '{}'", name, raw))),
        Err(_) => Ok(None),
    }
}

/// Read a boolean flag (`1`, `true`, `yes`, `on`).
pub fn flag(name: &str) -> Option<bool> {
    std::env::var(name).ok().map(|v| {
        matches!(
            v.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}
