//! Per-lookup options.

use std::collections::BTreeMap;

use crate::errors::ConfigError;

/// Options accepted by a cached lookup.
///
/// `disable_cache` bypasses the entire cache path and hands the request
/// straight to the provider. Everything in `extra` is forwarded to the
/// provider unchanged (transport toggles, a coordinate system, ...) after
/// validation against the orchestrator's whitelist; unknown keys are
/// rejected at the call boundary rather than silently forwarded.
#[derive(Debug, Clone, Default)]
pub struct LookupOptions {
    /// Bypass caching entirely for this lookup.
    pub disable_cache: bool,
    /// Pass-through options forwarded to the provider.
    pub extra: BTreeMap<String, String>,
}

impl LookupOptions {
    /// Default options: cache enabled, nothing forwarded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cache bypass flag.
    pub fn with_disable_cache(mut self, disable_cache: bool) -> Self {
        self.disable_cache = disable_cache;
        self
    }

    /// Adds a pass-through option.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Rejects pass-through keys not present in `allowed`.
    pub(crate) fn validate_extra(&self, allowed: &[String]) -> Result<(), ConfigError> {
        for key in self.extra.keys() {
            if !allowed.iter().any(|name| name == key) {
                return Err(ConfigError::unknown_option(key, allowed));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_extra_always_validates() {
        let options = LookupOptions::new();
        assert!(options.validate_extra(&[]).is_ok());
    }

    #[test]
    fn whitelisted_key_passes() {
        let options = LookupOptions::new().with_extra("coordinate_system", "gse");
        let allowed = vec!["coordinate_system".to_string()];
        assert!(options.validate_extra(&allowed).is_ok());
    }

    #[test]
    fn unknown_key_is_rejected() {
        let options = LookupOptions::new().with_extra("coordinate_systme", "gse");
        let allowed = vec!["coordinate_system".to_string()];
        let err = options.validate_extra(&allowed).unwrap_err();
        assert!(err.to_string().contains("coordinate_systme"));
        assert!(err.to_string().contains("coordinate_system"));
    }
}
