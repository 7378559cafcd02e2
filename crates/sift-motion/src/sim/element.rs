//! In-memory element.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::element::Element;

/// One inline-style write observed on a [`SimElement`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleChange {
    pub property: String,
    /// New value, `None` when the property was removed.
    pub value: Option<String>,
}

/// An [`Element`] with explicit geometry and a log of style changes.
///
/// Builder methods set up initial state without logging; trait writes log a
/// change only when the value actually differs, like a browser that does not
/// restart a transition for an identical value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimElement {
    offset: (f64, f64),
    size: (f64, f64),
    margins: (f64, f64),
    styles: BTreeMap<String, String>,
    attributes: BTreeMap<String, String>,
    listeners: BTreeSet<String>,
    changes: Vec<StyleChange>,
}

impl SimElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.offset = (x, y);
        self
    }

    pub fn sized(mut self, width: f64, height: f64) -> Self {
        self.size = (width, height);
        self
    }

    pub fn with_margins(mut self, right: f64, bottom: f64) -> Self {
        self.margins = (right, bottom);
        self
    }

    pub fn with_style(mut self, property: &str, value: &str) -> Self {
        self.styles.insert(property.to_string(), value.to_string());
        self
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    /// Move the element's layout box, as a reflow would.
    pub fn set_offset(&mut self, x: f64, y: f64) {
        self.offset = (x, y);
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    pub fn is_listening(&self, event: &str) -> bool {
        self.listeners.contains(event)
    }

    /// All inline styles, sorted by property name.
    pub fn styles(&self) -> &BTreeMap<String, String> {
        &self.styles
    }

    /// Changes since the last call, oldest first.
    pub fn take_changes(&mut self) -> Vec<StyleChange> {
        std::mem::take(&mut self.changes)
    }
}

impl Element for SimElement {
    fn offset(&self) -> (f64, f64) {
        self.offset
    }

    fn bounding_size(&self) -> (f64, f64) {
        self.size
    }

    fn computed_margins(&self) -> (f64, f64) {
        self.margins
    }

    fn style(&self, property: &str) -> Option<String> {
        self.styles
            .get(property)
            .filter(|value| !value.is_empty())
            .cloned()
    }

    fn set_style(&mut self, property: &str, value: &str) {
        if value.is_empty() {
            self.remove_style(property);
            return;
        }
        if self.styles.get(property).map(String::as_str) == Some(value) {
            return;
        }
        self.styles.insert(property.to_string(), value.to_string());
        self.changes.push(StyleChange {
            property: property.to_string(),
            value: Some(value.to_string()),
        });
    }

    fn remove_style(&mut self, property: &str) {
        if self.styles.remove(property).is_some() {
            self.changes.push(StyleChange {
                property: property.to_string(),
                value: None,
            });
        }
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }

    fn add_event_listener(&mut self, event: &str) {
        self.listeners.insert(event.to_string());
    }

    fn remove_event_listener(&mut self, event: &str) {
        self.listeners.remove(event);
    }
}
