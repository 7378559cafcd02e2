//! Host element capability.
//!
//! Targets never touch a DOM directly; they read geometry and write inline
//! styles through [`Element`]. A browser binding implements it over a real
//! node, [`crate::sim::SimElement`] implements it in memory.

use serde::{Deserialize, Serialize};

/// Inline-style and geometry access for one animated element.
///
/// Style properties use CSS names (`transform`, `margin-right`, ...). An empty
/// inline value is reported as `None`.
pub trait Element {
    /// `(left, top)` offset relative to the container, in pixels.
    fn offset(&self) -> (f64, f64);

    /// `(width, height)` of the bounding box, in pixels.
    fn bounding_size(&self) -> (f64, f64);

    /// Computed `(margin-right, margin-bottom)`, in pixels.
    fn computed_margins(&self) -> (f64, f64);

    fn style(&self, property: &str) -> Option<String>;

    fn set_style(&mut self, property: &str, value: &str);

    /// Reset an inline property so the stylesheet applies again.
    fn remove_style(&mut self, property: &str);

    fn attribute(&self, name: &str) -> Option<String>;

    fn add_event_listener(&mut self, event: &str);

    fn remove_event_listener(&mut self, event: &str);
}

/// A native event delivered to a target's element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeEvent {
    /// Event type, e.g. `transitionend`.
    pub kind: String,
    /// CSS property whose transition finished.
    pub property_name: String,
    /// Whether the element that originated the event is itself a target
    /// (transition events bubble up from descendants).
    pub from_target: bool,
}

impl NativeEvent {
    pub fn new(kind: impl Into<String>, property_name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            property_name: property_name.into(),
            from_target: true,
        }
    }

    /// Mark the event as bubbled from a non-target descendant.
    pub fn from_descendant(mut self) -> Self {
        self.from_target = false;
        self
    }
}
