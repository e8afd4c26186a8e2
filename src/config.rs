//! Configuration for filekit.
//!
//! This module provides runtime configuration for the global file cache.
//! Use [`ConfigBuilder`] at application (or test binary) startup, before the
//! first cache access, to force or disable bypass mode.

use std::sync::OnceLock;

use crate::file::DEFAULT_MAX_LINE_LEN;
use crate::test_detection::running_as_test;

/// Global configuration, initialized via [`ConfigBuilder::init`].
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Runtime configuration for filekit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Whether the global cache skips its table entirely.
    ///
    /// `None` means "bypass when running under a test harness".
    pub bypass_cache: Option<bool>,
    /// Longest line (in bytes) the line scanner accepts.
    pub max_line_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bypass_cache: None,
            max_line_len: DEFAULT_MAX_LINE_LEN,
        }
    }
}

impl Config {
    /// Resolve the effective bypass setting.
    pub fn bypass(&self) -> bool {
        self.bypass_cache.unwrap_or_else(running_as_test)
    }
}

/// Configuration builder for fluent API.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    bypass_cache: Option<bool>,
    max_line_len: Option<usize>,
}

impl ConfigBuilder {
    /// Create a new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Force bypass mode on or off, ignoring test detection.
    ///
    /// # Example
    ///
    /// ```
    /// use filekit::config::ConfigBuilder;
    ///
    /// ConfigBuilder::new()
    ///     .bypass_cache(false)
    ///     .init();
    /// ```
    pub fn bypass_cache(mut self, bypass: bool) -> Self {
        self.bypass_cache = Some(bypass);
        self
    }

    /// Set the longest line the scanner accepts.
    ///
    /// Default: 64 KiB
    pub fn max_line_len(mut self, max: usize) -> Self {
        self.max_line_len = Some(max);
        self
    }

    /// Build the configuration without installing it.
    pub fn build(self) -> Config {
        Config {
            bypass_cache: self.bypass_cache,
            max_line_len: self.max_line_len.unwrap_or(DEFAULT_MAX_LINE_LEN),
        }
    }

    /// Build and initialize the global configuration.
    ///
    /// This can only be called once. Subsequent calls are ignored.
    /// Returns `true` if configuration was set, `false` if already initialized.
    pub fn init(self) -> bool {
        CONFIG.set(self.build()).is_ok()
    }
}

/// Get the current configuration, or default if not initialized.
pub fn get() -> &'static Config {
    CONFIG.get_or_init(Config::default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.bypass_cache, None);
        assert_eq!(config.max_line_len, DEFAULT_MAX_LINE_LEN);
        // Unit tests always count as a test harness.
        assert!(config.bypass());
    }

    #[test]
    fn test_builder() {
        let config = ConfigBuilder::new()
            .bypass_cache(false)
            .max_line_len(16)
            .build();
        assert_eq!(config.bypass_cache, Some(false));
        assert_eq!(config.max_line_len, 16);
        assert!(!config.bypass());
    }
}
