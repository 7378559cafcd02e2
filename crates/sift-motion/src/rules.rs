//! Transition rule synthesis.
//!
//! Produces `transition` declarations such as
//! `transform 600ms 30ms ease, opacity 600ms 30ms linear`.

use crate::easing::EasingFunction;
use crate::settings::MotionSettings;
use crate::target::Reveal;

/// One rule: `"<property> <duration>ms <delay>ms <easing>"`.
///
/// Opacity always uses linear easing.
pub fn write_rule(
    property: &str,
    duration_ms: u32,
    delay_ms: u32,
    easing: &EasingFunction,
) -> String {
    let easing = if property == "opacity" {
        EasingFunction::Linear
    } else {
        *easing
    };
    format!("{} {}ms {}ms {}", property, duration_ms, delay_ms, easing)
}

/// Inputs for one target's end-style pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RulePlan {
    pub reveal: Option<Reveal>,
    /// Whether the end snapshot is displayed.
    pub end_visible: bool,
    /// Per-move duration for opacity and resize rules.
    pub duration_ms: Option<u32>,
    pub delay_ms: u32,
}

/// Rules for every property bundle the move animates.
///
/// The transform rule always uses the configured duration; the opacity rule is
/// added when showing or hiding; width, height and margin rules when resize
/// animation is on and the target ends up visible.
pub fn synthesize(settings: &MotionSettings, plan: &RulePlan) -> Vec<String> {
    let duration = plan.duration_ms.unwrap_or(settings.duration_ms);
    let mut rules = vec![write_rule(
        settings.transform_rule(),
        settings.duration_ms,
        plan.delay_ms,
        &settings.easing,
    )];

    if plan.reveal.is_some() {
        rules.push(write_rule("opacity", duration, plan.delay_ms, &settings.easing));
    }

    if settings.animate_resize_targets && plan.end_visible {
        for property in ["width", "height", "margin"] {
            rules.push(write_rule(property, duration, plan.delay_ms, &settings.easing));
        }
    }

    rules
}

/// Join rules into a single `transition` value.
pub fn declaration(rules: &[String]) -> String {
    rules.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_config::VendorPrefix;

    fn plan() -> RulePlan {
        RulePlan {
            reveal: None,
            end_visible: true,
            duration_ms: None,
            delay_ms: 0,
        }
    }

    #[test]
    fn test_write_rule() {
        assert_eq!(
            write_rule("transform", 600, 90, &EasingFunction::EaseOut),
            "transform 600ms 90ms ease-out"
        );
    }

    #[test]
    fn test_opacity_is_always_linear() {
        let easing = EasingFunction::CubicBezier {
            x1: 0.4,
            y1: 0.0,
            x2: 0.2,
            y2: 1.0,
        };
        assert_eq!(write_rule("opacity", 300, 0, &easing), "opacity 300ms 0ms linear");
    }

    #[test]
    fn test_move_only_gets_transform_rule() {
        let rules = synthesize(&MotionSettings::default(), &plan());
        assert_eq!(declaration(&rules), "transform 600ms 0ms ease");
    }

    #[test]
    fn test_reveal_adds_opacity_with_override() {
        let plan = RulePlan {
            reveal: Some(Reveal::Show),
            duration_ms: Some(250),
            delay_ms: 60,
            ..plan()
        };
        let rules = synthesize(&MotionSettings::default(), &plan);
        assert_eq!(
            declaration(&rules),
            "transform 600ms 60ms ease, opacity 250ms 60ms linear"
        );
    }

    #[test]
    fn test_resize_rules_need_visible_end() {
        let settings = MotionSettings {
            animate_resize_targets: true,
            prefix: VendorPrefix::Webkit,
            ..MotionSettings::default()
        };

        let rules = synthesize(&settings, &plan());
        assert_eq!(
            rules,
            vec![
                "-webkit-transform 600ms 0ms ease",
                "width 600ms 0ms ease",
                "height 600ms 0ms ease",
                "margin 600ms 0ms ease",
            ]
        );

        let hidden = RulePlan {
            end_visible: false,
            ..plan()
        };
        assert_eq!(synthesize(&settings, &hidden).len(), 1);
    }
}
