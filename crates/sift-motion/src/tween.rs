//! Tween interpolation.
//!
//! Computes the in-between state `start + delta * multiplier` for a target
//! that must jump straight to an intermediate point of its transition (a
//! showing target starting part-way in, or an interrupted re-entry).

use crate::settings::MotionSettings;
use crate::style::{Display, StyleData, TransformValue, TweenData};

/// Display change a tween asks of its element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibilityChange {
    Keep,
    /// Write this inline display value.
    Show(String),
    /// Clear the inline display.
    Hide,
}

/// Result of one interpolation, ready to be written to an element.
#[derive(Debug, Clone, PartialEq)]
pub struct TweenFrame {
    /// Interpolated values of every tracked property.
    pub values: StyleData,
    pub visibility: VisibilityChange,
    /// Inline (non-transform, non-display) properties to write.
    pub styles: Vec<(&'static str, String)>,
    /// Full transform declaration, translate first.
    pub transform: String,
}

/// Interpolate `pos_in` towards `pos_in + tween` by `multiplier`.
///
/// Properties absent from `tween`, or with a zero delta, keep their start
/// value and are not written. `has_inline_display` reports whether the
/// element currently carries an inline display value.
pub fn interpolate(
    settings: &MotionSettings,
    pos_in: &StyleData,
    tween: &TweenData,
    multiplier: f64,
    has_inline_display: bool,
) -> TweenFrame {
    let mut values = StyleData::at(pos_in.x, pos_in.y);
    let mut styles = Vec::new();

    let visibility = if multiplier == 0.0 {
        values.display = Display::None;
        if pos_in.display == Display::None {
            VisibilityChange::Hide
        } else {
            VisibilityChange::Keep
        }
    } else {
        values.display = Display::Shown(settings.layout_display.clone());
        if has_inline_display {
            VisibilityChange::Keep
        } else {
            VisibilityChange::Show(settings.layout_display.clone())
        }
    };

    let step = |start: Option<f64>, delta: Option<f64>| match (start, delta) {
        (Some(start), Some(delta)) if delta != 0.0 => Some(start + delta * multiplier),
        _ => None,
    };

    if let Some(opacity) = step(pos_in.opacity, tween.opacity) {
        values.opacity = Some(opacity);
        styles.push(("opacity", opacity.to_string()));
    }

    let dimensions = [
        ("width", pos_in.width, tween.width),
        ("height", pos_in.height, tween.height),
        ("margin-right", pos_in.margin_right, tween.margin_right),
        ("margin-bottom", pos_in.margin_bottom, tween.margin_bottom),
    ];
    for (property, start, delta) in dimensions {
        let Some(value) = step(start, delta) else {
            continue;
        };
        match property {
            "width" => values.width = Some(value),
            "height" => values.height = Some(value),
            "margin-right" => values.margin_right = Some(value),
            _ => values.margin_bottom = Some(value),
        }
        styles.push((property, format!("{}px", value)));
    }

    if let Some(x) = step(Some(pos_in.x), tween.x) {
        values.x = x;
    }
    if let Some(y) = step(Some(pos_in.y), tween.y) {
        values.y = y;
    }

    let mut terms = vec![format!("translate({}px, {}px)", values.x, values.y)];
    for function in settings.tweenable_transforms() {
        let Some(delta) = tween.transforms.get(function) else {
            continue;
        };
        if delta.value == 0.0 {
            continue;
        }
        let start = pos_in.transforms.get(function).map_or(0.0, |v| v.value);
        let current = TransformValue::new(start + delta.value * multiplier, delta.unit.clone());
        terms.push(current.term(function));
        values.transforms.insert(function.to_string(), current);
    }

    TweenFrame {
        values,
        visibility,
        styles,
        transform: terms.join(" "),
    }
}
