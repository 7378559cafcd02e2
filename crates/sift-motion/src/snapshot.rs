//! Position snapshot capture.

use crate::element::Element;
use crate::settings::MotionSettings;
use crate::style::{Display, StyleData};

/// Read an element's current, unanimated position and style.
///
/// Size and margins are only read when resize animation is enabled. Elements
/// without transitions simply report where they are now.
pub fn capture<E: Element>(element: &E, settings: &MotionSettings) -> StyleData {
    let (x, y) = element.offset();
    let display = Display::from_inline(element.style("display").as_deref());
    let snapshot = StyleData::at(x, y).with_display(display);

    if !settings.animate_resize_targets {
        return snapshot;
    }

    let (width, height) = element.bounding_size();
    let (right, bottom) = element.computed_margins();
    snapshot.with_size(width, height).with_margins(right, bottom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimElement;

    #[test]
    fn test_capture_position_only() {
        let element = SimElement::new().at(12.0, 40.0).sized(100.0, 80.0);
        let snapshot = capture(&element, &MotionSettings::default());

        assert_eq!(snapshot.x, 12.0);
        assert_eq!(snapshot.y, 40.0);
        assert_eq!(snapshot.width, None);
        assert_eq!(snapshot.margin_bottom, None);
        assert_eq!(snapshot.display, Display::None);
    }

    #[test]
    fn test_capture_with_resize() {
        let element = SimElement::new()
            .at(0.0, 0.0)
            .sized(100.0, 80.0)
            .with_margins(10.0, 5.0)
            .with_style("display", "block");
        let settings = MotionSettings {
            animate_resize_targets: true,
            ..MotionSettings::default()
        };

        let snapshot = capture(&element, &settings);
        assert_eq!(snapshot.width, Some(100.0));
        assert_eq!(snapshot.height, Some(80.0));
        assert_eq!(snapshot.margin_right, Some(10.0));
        assert_eq!(snapshot.margin_bottom, Some(5.0));
        assert_eq!(snapshot.display, Display::Shown("block".to_string()));
    }

    #[test]
    fn test_capture_does_not_touch_element() {
        let mut element = SimElement::new().at(3.0, 4.0);
        let _ = capture(&element, &MotionSettings::default());
        assert!(element.take_changes().is_empty());
    }
}
