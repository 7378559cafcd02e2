//! Transition-end event bridge.
//!
//! Binds the native transition-completion event on a target's element and
//! narrows incoming events down to completed-transition notifications.

use sift_config::VendorPrefix;

use crate::element::{Element, NativeEvent};

pub const TRANSITION_END: &str = "transitionend";
pub const WEBKIT_TRANSITION_END: &str = "webkitTransitionEnd";

/// A completed transition reported by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionEnd<'a> {
    pub property_name: &'a str,
    pub from_target: bool,
}

/// Event name choice is made once per stage from the vendor prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionEndBridge {
    event_name: &'static str,
}

impl TransitionEndBridge {
    pub fn new(prefix: VendorPrefix) -> Self {
        let event_name = match prefix {
            VendorPrefix::None => TRANSITION_END,
            VendorPrefix::Webkit => WEBKIT_TRANSITION_END,
        };
        Self { event_name }
    }

    pub fn event_name(&self) -> &'static str {
        self.event_name
    }

    pub fn bind<E: Element>(&self, element: &mut E) {
        element.add_event_listener(self.event_name);
    }

    /// Remove both the prefixed and unprefixed listeners.
    pub fn unbind<E: Element>(&self, element: &mut E) {
        element.remove_event_listener(WEBKIT_TRANSITION_END);
        element.remove_event_listener(TRANSITION_END);
    }

    /// Pass through transition-end events of either flavour, drop the rest.
    pub fn accept<'a>(&self, event: &'a NativeEvent) -> Option<TransitionEnd<'a>> {
        match event.kind.as_str() {
            TRANSITION_END | WEBKIT_TRANSITION_END => Some(TransitionEnd {
                property_name: &event.property_name,
                from_target: event.from_target,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimElement;

    #[test]
    fn test_event_name_follows_prefix() {
        assert_eq!(TransitionEndBridge::new(VendorPrefix::None).event_name(), "transitionend");
        assert_eq!(
            TransitionEndBridge::new(VendorPrefix::Webkit).event_name(),
            "webkitTransitionEnd"
        );
    }

    #[test]
    fn test_bind_and_unbind() {
        let bridge = TransitionEndBridge::new(VendorPrefix::Webkit);
        let mut element = SimElement::new();

        bridge.bind(&mut element);
        assert!(element.is_listening(WEBKIT_TRANSITION_END));
        assert!(!element.is_listening(TRANSITION_END));

        element.add_event_listener(TRANSITION_END);
        bridge.unbind(&mut element);
        assert!(!element.is_listening(WEBKIT_TRANSITION_END));
        assert!(!element.is_listening(TRANSITION_END));
    }

    #[test]
    fn test_accept_filters_event_kind() {
        let bridge = TransitionEndBridge::new(VendorPrefix::None);

        let end = NativeEvent::new(TRANSITION_END, "opacity");
        assert_eq!(
            bridge.accept(&end),
            Some(TransitionEnd {
                property_name: "opacity",
                from_target: true
            })
        );

        let prefixed =
            NativeEvent::new(WEBKIT_TRANSITION_END, "-webkit-transform").from_descendant();
        assert_eq!(bridge.accept(&prefixed).map(|e| e.from_target), Some(false));

        assert_eq!(bridge.accept(&NativeEvent::new("transitionstart", "opacity")), None);
    }
}
