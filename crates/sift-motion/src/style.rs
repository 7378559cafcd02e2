//! Geometry and style values exchanged between the layout owner and targets.
//!
//! - `StyleData`: an immutable snapshot of one element's position and style
//! - `TweenData`: per-property deltas between two snapshots
//! - `TransformValue`: a transform-function argument (`{value, unit}`)
//! - `Display`: the element's display state

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Argument of a CSS transform function, e.g. `20px` in `translateX(20px)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformValue {
    pub value: f64,
    pub unit: String,
}

impl TransformValue {
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }

    /// Format as a transform term, e.g. `scale(0.5)`.
    pub fn term(&self, function: &str) -> String {
        format!("{}({}{})", function, self.value, self.unit)
    }

    pub fn negated(&self) -> Self {
        Self::new(-self.value, self.unit.clone())
    }
}

/// Display state of an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Display {
    /// Not displayed (`display: none`, or no inline display set).
    #[default]
    None,
    /// Displayed with the given CSS display value.
    Shown(String),
}

impl Display {
    /// Interpret an inline display value; empty or `none` means hidden.
    pub fn from_inline(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some("none") => Self::None,
            Some(other) => Self::Shown(other.to_string()),
        }
    }

    pub fn is_visible(&self) -> bool {
        matches!(self, Self::Shown(_))
    }

    pub fn as_css(&self) -> &str {
        match self {
            Self::None => "none",
            Self::Shown(value) => value,
        }
    }
}

/// Snapshot of an element's position and animatable style.
///
/// Snapshots are values: builders consume and return a new snapshot, nothing
/// mutates a captured one in place.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StyleData {
    /// Left offset relative to the container, in pixels.
    pub x: f64,
    /// Top offset relative to the container, in pixels.
    pub y: f64,
    /// Only captured when resize animation is enabled.
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub margin_right: Option<f64>,
    pub margin_bottom: Option<f64>,
    /// `None` means "no fade".
    pub opacity: Option<f64>,
    pub display: Display,
    /// Transform function name → argument (e.g. `scale` → `0.01`).
    pub transforms: BTreeMap<String, TransformValue>,
}

impl StyleData {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_margins(mut self, right: f64, bottom: f64) -> Self {
        self.margin_right = Some(right);
        self.margin_bottom = Some(bottom);
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn with_display(mut self, display: Display) -> Self {
        self.display = display;
        self
    }

    pub fn with_transform(mut self, function: impl Into<String>, value: TransformValue) -> Self {
        self.transforms.insert(function.into(), value);
        self
    }
}

/// Per-property deltas between a start and an end snapshot.
///
/// Any property may be absent; consumers skip absent entries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TweenData {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub margin_right: Option<f64>,
    pub margin_bottom: Option<f64>,
    pub opacity: Option<f64>,
    pub transforms: BTreeMap<String, TransformValue>,
}

fn diff(start: Option<f64>, end: Option<f64>) -> Option<f64> {
    Some(end? - start?)
}

impl TweenData {
    /// Deltas taking `start` to `end` (`end - start` per property).
    ///
    /// Scalar properties missing from either side produce no delta. A
    /// transform missing from `start` is treated as starting at zero in the
    /// end value's unit.
    pub fn between(start: &StyleData, end: &StyleData) -> Self {
        let transforms = end
            .transforms
            .iter()
            .map(|(name, to)| {
                let from = start.transforms.get(name).map_or(0.0, |v| v.value);
                (name.clone(), TransformValue::new(to.value - from, to.unit.clone()))
            })
            .collect();

        Self {
            x: Some(end.x - start.x),
            y: Some(end.y - start.y),
            width: diff(start.width, end.width),
            height: diff(start.height, end.height),
            margin_right: diff(start.margin_right, end.margin_right),
            margin_bottom: diff(start.margin_bottom, end.margin_bottom),
            opacity: diff(start.opacity, end.opacity),
            transforms,
        }
    }
}
