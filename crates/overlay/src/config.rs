//! Configuration for one overlay engine instance.
//!
//! Values can be loaded from environment variables or constructed programmatically.

use core::time::Duration;
use std::env;

/// Quiescence delay before newly inserted content is adjusted.
pub const DEFAULT_RECONCILE_DEBOUNCE_MS: u64 = 100;

/// Float deltas closer to zero than this count as "no adjustment".
pub const DEFAULT_IDENTITY_EPSILON: f64 = 0.01;

/// Runtime configuration for an [`crate::OverlayEngine`].
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayConfig {
    /// Reconciliation debounce in milliseconds (minimum 1ms)
    pub reconcile_debounce_ms: u64,
    /// Threshold below which line-height and letter-spacing deltas are treated as zero
    pub identity_epsilon: f64,
    /// Additional lowercase tag names treated as adjustment candidates
    pub extension_tags: Vec<String>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            reconcile_debounce_ms: DEFAULT_RECONCILE_DEBOUNCE_MS,
            identity_epsilon: DEFAULT_IDENTITY_EPSILON,
            extension_tags: Vec::new(),
        }
    }
}

impl OverlayConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `LITE_READ_RECONCILE_DEBOUNCE_MS`: reconciliation delay in milliseconds (default: 100)
    /// - `LITE_READ_IDENTITY_EPSILON`: identity threshold for float deltas (default: 0.01)
    /// - `LITE_READ_EXTRA_TAGS`: comma-separated extra candidate tags (default: none)
    #[inline]
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let reconcile_debounce_ms = lookup("LITE_READ_RECONCILE_DEBOUNCE_MS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_RECONCILE_DEBOUNCE_MS)
            .max(1);
        let identity_epsilon = lookup("LITE_READ_IDENTITY_EPSILON")
            .and_then(|val| val.trim().parse::<f64>().ok())
            .filter(|epsilon| epsilon.is_finite() && *epsilon >= 0.0)
            .unwrap_or(DEFAULT_IDENTITY_EPSILON);
        let extension_tags = lookup("LITE_READ_EXTRA_TAGS")
            .map(|val| {
                val.split(',')
                    .map(|tag| tag.trim().to_ascii_lowercase())
                    .filter(|tag| !tag.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        Self {
            reconcile_debounce_ms,
            identity_epsilon,
            extension_tags,
        }
    }

    /// Get the reconciliation debounce as a `Duration`.
    #[inline]
    #[must_use]
    pub const fn reconcile_debounce(&self) -> Duration {
        Duration::from_millis(self.reconcile_debounce_ms)
    }
}
