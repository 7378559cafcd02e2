//! Runtime animation settings derived from [`sift_config`].

use sift_config::{AnimationConfig, LayoutConfig, VendorPrefix};

use crate::easing::EasingFunction;
use crate::effects::{Effects, TRANSFORM_FUNCTIONS};
use crate::error::Result;
use crate::style::TransformValue;

/// Parsed, ready-to-use animation settings shared by every target of a stage.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionSettings {
    /// When false, moves place targets without transitioning.
    pub enable: bool,
    pub duration_ms: u32,
    pub easing: EasingFunction,
    pub animate_resize_targets: bool,
    /// Translate after hide transforms instead of before them.
    pub nudge: bool,
    /// Display value used when showing a target.
    pub layout_display: String,
    pub effects_in: Effects,
    pub effects_out: Effects,
    /// Stagger step; `0` disables staggering.
    pub stagger_ms: u32,
    pub prefix: VendorPrefix,
}

impl Default for MotionSettings {
    fn default() -> Self {
        let fade_scale = Effects {
            opacity: Some(0.0),
            transforms: vec![("scale".to_string(), TransformValue::new(0.01, ""))],
            stagger_ms: None,
        };

        Self {
            enable: true,
            duration_ms: 600,
            easing: EasingFunction::Ease,
            animate_resize_targets: false,
            nudge: true,
            layout_display: "inline-block".to_string(),
            effects_in: fade_scale.clone(),
            effects_out: fade_scale,
            stagger_ms: 0,
            prefix: VendorPrefix::None,
        }
    }
}

impl MotionSettings {
    /// Parse the raw configuration strings.
    ///
    /// `effects_in`/`effects_out` override the shared `effects`; the stagger
    /// step comes from `stagger_duration_ms` or else a `stagger()` effect.
    pub fn from_config(animation: &AnimationConfig, layout: &LayoutConfig) -> Result<Self> {
        let shared = &animation.effects;
        let effects_in = Effects::parse(animation.effects_in.as_deref().unwrap_or(shared))?;
        let mut effects_out = Effects::parse(animation.effects_out.as_deref().unwrap_or(shared))?;
        if animation.reverse_out {
            effects_out = effects_out.reversed();
        }

        let stagger_ms = animation
            .stagger_duration_ms
            .or(effects_in.stagger_ms)
            .or(effects_out.stagger_ms)
            .unwrap_or(0);

        Ok(Self {
            enable: animation.enable,
            duration_ms: animation.duration_ms,
            easing: animation.easing.parse()?,
            animate_resize_targets: animation.animate_resize_targets,
            nudge: animation.nudge,
            layout_display: layout.display.clone(),
            effects_in,
            effects_out,
            stagger_ms,
            prefix: animation.vendor_prefix,
        })
    }

    /// Inline style property holding transforms.
    pub fn transform_property(&self) -> &'static str {
        match self.prefix {
            VendorPrefix::None => "transform",
            VendorPrefix::Webkit => "-webkit-transform",
        }
    }

    /// Inline style property holding the transition declaration.
    pub fn transition_property(&self) -> &'static str {
        match self.prefix {
            VendorPrefix::None => "transition",
            VendorPrefix::Webkit => "-webkit-transition",
        }
    }

    /// Property name written into the transform transition rule.
    pub fn transform_rule(&self) -> &'static str {
        self.transform_property()
    }

    /// Transform functions interpolated by tweens, in declaration order.
    pub fn tweenable_transforms(&self) -> impl Iterator<Item = &'static str> {
        TRANSFORM_FUNCTIONS.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MotionError;

    #[test]
    fn test_defaults_match_default_config() {
        let parsed =
            MotionSettings::from_config(&AnimationConfig::default(), &LayoutConfig::default())
                .unwrap();
        assert_eq!(parsed, MotionSettings::default());
    }

    #[test]
    fn test_split_effects_and_reverse_out() {
        let animation = AnimationConfig {
            effects: "fade".to_string(),
            effects_out: Some("translateY(-40px) stagger(25ms)".to_string()),
            reverse_out: true,
            ..AnimationConfig::default()
        };

        let settings = MotionSettings::from_config(&animation, &LayoutConfig::default()).unwrap();
        assert_eq!(settings.effects_in.opacity, Some(0.0));
        assert!(settings.effects_in.transforms.is_empty());
        assert_eq!(settings.effects_out.opacity, None);
        assert_eq!(settings.effects_out.transform_terms(), vec!["translateY(40px)"]);
        assert_eq!(settings.stagger_ms, 25);
    }

    #[test]
    fn test_explicit_stagger_wins() {
        let animation = AnimationConfig {
            effects: "fade stagger(25ms)".to_string(),
            stagger_duration_ms: Some(80),
            ..AnimationConfig::default()
        };
        let settings = MotionSettings::from_config(&animation, &LayoutConfig::default()).unwrap();
        assert_eq!(settings.stagger_ms, 80);
    }

    #[test]
    fn test_prefixed_properties() {
        let settings = MotionSettings {
            prefix: VendorPrefix::Webkit,
            ..MotionSettings::default()
        };
        assert_eq!(settings.transform_property(), "-webkit-transform");
        assert_eq!(settings.transition_property(), "-webkit-transition");
        assert_eq!(MotionSettings::default().transform_rule(), "transform");
    }

    #[test]
    fn test_invalid_easing_is_reported() {
        let animation = AnimationConfig {
            easing: "springy".to_string(),
            ..AnimationConfig::default()
        };
        assert_eq!(
            MotionSettings::from_config(&animation, &LayoutConfig::default()),
            Err(MotionError::InvalidEasing("springy".to_string()))
        );
    }
}
