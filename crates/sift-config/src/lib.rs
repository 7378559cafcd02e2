//! Sift configuration system
//!
//! This crate provides centralized configuration management for Sift,
//! loading animation and layout settings from `sift.toml` with environment
//! variable overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was read but is not valid TOML for [`SiftConfig`].
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Main configuration structure for Sift
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SiftConfig {
    /// Transition timing and effects
    pub animation: AnimationConfig,
    /// Container layout settings
    pub layout: LayoutConfig,
    /// Demo driver settings
    pub demo: DemoConfig,
}

/// Vendor prefix used for the transform/transition properties and the
/// transition-end event name. Detection happens outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VendorPrefix {
    /// Standard, unprefixed properties (`transform`, `transitionend`).
    #[default]
    None,
    /// WebKit-prefixed properties (`-webkit-transform`, `webkitTransitionEnd`).
    Webkit,
}

impl VendorPrefix {
    /// Parse a prefix name, accepting an empty string as "none".
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Some(Self::None),
            "webkit" => Some(Self::Webkit),
            _ => None,
        }
    }
}

/// Animation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Animate at all; when false every target is placed without transition
    pub enable: bool,
    /// Transition duration in milliseconds
    pub duration_ms: u32,
    /// CSS easing curve (e.g. "ease", "cubic-bezier(0.4, 0, 0.2, 1)")
    pub easing: String,
    /// Effects applied to both showing and hiding targets (e.g. "fade scale")
    pub effects: String,
    /// Effects for showing targets, overriding `effects`
    pub effects_in: Option<String>,
    /// Effects for hiding targets, overriding `effects`
    pub effects_out: Option<String>,
    /// Negate translate/rotate/skew effects for hiding targets
    pub reverse_out: bool,
    /// Apply translation after hide transforms ("nudge") rather than before
    pub nudge: bool,
    /// Transition width, height and margins of targets that change size
    pub animate_resize_targets: bool,
    /// Stagger step in milliseconds, overriding any `stagger()` effect
    pub stagger_duration_ms: Option<u32>,
    /// Vendor prefix for transition/transform properties
    pub vendor_prefix: VendorPrefix,
}

/// Layout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Display value written to targets when they are shown
    pub display: String,
}

/// Demo driver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Number of simulated targets
    pub targets: usize,
    /// Simulated frame interval in milliseconds
    pub frame_ms: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enable: true,
            duration_ms: 600,
            easing: "ease".to_string(),
            effects: "fade scale".to_string(),
            effects_in: None,
            effects_out: None,
            reverse_out: false,
            nudge: true,
            animate_resize_targets: false,
            stagger_duration_ms: None,
            vendor_prefix: VendorPrefix::None,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            display: "inline-block".to_string(),
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            targets: 6,
            frame_ms: 16.0,
        }
    }
}

fn parse_flag(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}

impl SiftConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from the default location (sift.toml in the current directory)
    /// or return default configuration if file doesn't exist
    pub fn load_or_default() -> Self {
        Self::load_from_file("sift.toml").unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        self.merge_with(|key| std::env::var(key).ok());
    }

    /// Merge overrides from an arbitrary key lookup.
    ///
    /// Unparseable numeric values are ignored and leave the current value.
    pub fn merge_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("SIFT_ENABLE") {
            self.animation.enable = parse_flag(&val);
        }
        if let Some(val) = lookup("SIFT_DURATION") {
            if let Ok(duration) = val.parse::<u32>() {
                self.animation.duration_ms = duration;
            }
        }
        if let Some(easing) = lookup("SIFT_EASING") {
            self.animation.easing = easing;
        }
        if let Some(effects) = lookup("SIFT_EFFECTS") {
            self.animation.effects = effects;
        }
        if let Some(val) = lookup("SIFT_NUDGE") {
            self.animation.nudge = parse_flag(&val);
        }
        if let Some(val) = lookup("SIFT_RESIZE") {
            self.animation.animate_resize_targets = parse_flag(&val);
        }
        if let Some(val) = lookup("SIFT_STAGGER") {
            if let Ok(step) = val.parse::<u32>() {
                self.animation.stagger_duration_ms = Some(step);
            }
        }
        if let Some(val) = lookup("SIFT_PREFIX") {
            if let Some(prefix) = VendorPrefix::from_name(&val) {
                self.animation.vendor_prefix = prefix;
            }
        }
        if let Some(display) = lookup("SIFT_DISPLAY") {
            self.layout.display = display;
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from sift.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = SiftConfig::default();
        assert!(config.animation.enable);
        assert_eq!(config.animation.duration_ms, 600);
        assert_eq!(config.animation.easing, "ease");
        assert!(config.animation.nudge);
        assert!(!config.animation.animate_resize_targets);
        assert_eq!(config.layout.display, "inline-block");
    }

    #[test]
    fn test_toml_serialization() {
        let config = SiftConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: SiftConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.animation.duration_ms, 600);
        assert_eq!(parsed.animation.vendor_prefix, VendorPrefix::None);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let parsed: SiftConfig = toml::from_str(
            r#"
            [animation]
            duration_ms = 250
            vendor_prefix = "webkit"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.animation.duration_ms, 250);
        assert_eq!(parsed.animation.vendor_prefix, VendorPrefix::Webkit);
        assert_eq!(parsed.animation.effects, "fade scale");
        assert_eq!(parsed.layout.display, "inline-block");
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = SiftConfig::load_from_file("does/not/exist/sift.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_or_default() {
        // Should not panic even if sift.toml doesn't exist
        let config = SiftConfig::load_or_default();
        assert!(config.animation.duration_ms > 0);
    }

    #[test]
    fn test_merge_overrides() {
        let vars: HashMap<&str, &str> = [
            ("SIFT_DURATION", "120"),
            ("SIFT_EASING", "linear"),
            ("SIFT_NUDGE", "false"),
            ("SIFT_RESIZE", "1"),
            ("SIFT_PREFIX", "webkit"),
            ("SIFT_STAGGER", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = SiftConfig::default();
        config.merge_with(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.animation.duration_ms, 120);
        assert_eq!(config.animation.easing, "linear");
        assert!(!config.animation.nudge);
        assert!(config.animation.animate_resize_targets);
        assert_eq!(config.animation.vendor_prefix, VendorPrefix::Webkit);
        assert_eq!(config.animation.stagger_duration_ms, None);
    }

    #[test]
    fn test_merge_with_env() {
        unsafe {
            std::env::set_var("SIFT_DISPLAY", "block");
        }

        let mut config = SiftConfig::default();
        config.merge_with_env();

        assert_eq!(config.layout.display, "block");

        unsafe {
            std::env::remove_var("SIFT_DISPLAY");
        }
    }
}
