//! Errors for lookup option validation.

/// Invalid lookup options, rejected at the call boundary.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A pass-through option key not present in the orchestrator's whitelist.
    #[error("unknown option '{name}', allowed options are: {allowed}")]
    UnknownOption {
        /// The rejected option key
        name: String,
        /// Comma-separated whitelist, for the error message
        allowed: String,
    },

    /// The per-product fragment granularity function returned zero.
    #[error("fragment_hours must be at least 1, got 0 for product '{product}'")]
    InvalidFragmentHours {
        /// Product whose granularity was invalid
        product: String,
    },
}

impl ConfigError {
    /// Create an `UnknownOption` error for `name` against a whitelist.
    pub fn unknown_option(name: impl Into<String>, allowed: &[String]) -> Self {
        ConfigError::UnknownOption {
            name: name.into(),
            allowed: if allowed.is_empty() {
                "(none)".to_string()
            } else {
                allowed.join(", ")
            },
        }
    }

    /// Create an `InvalidFragmentHours` error for `product`.
    pub fn invalid_fragment_hours(product: impl Into<String>) -> Self {
        ConfigError::InvalidFragmentHours {
            product: product.into(),
        }
    }
}
