//! Simulated host.
//!
//! Stands in for a browser: [`SimElement`] keeps inline styles in memory and
//! [`Compositor`] runs the transitions those styles declare, emitting
//! transition-end events when they finish.
//!
//! A typical frame loop:
//!
//! ```
//! use sift_motion::sim::{Compositor, SimElement};
//! use sift_motion::{MotionSettings, MoveRequest, Stage, StyleData};
//!
//! let settings = MotionSettings::default();
//! let mut stage = Stage::new(settings.clone());
//! let mut compositor = Compositor::new(&settings);
//! let id = stage.add_target(SimElement::new());
//!
//! let operation = stage.begin_operation(|report| assert_eq!(report.moved, 1));
//! let request = MoveRequest::new(StyleData::at(0.0, 0.0), StyleData::at(80.0, 0.0))
//!     .on_settled(|_, _| {});
//! stage.move_target(operation, id, request).unwrap();
//!
//! compositor.observe(&mut stage);
//! stage.flush_frame();
//! compositor.observe(&mut stage);
//! while compositor.is_animating() {
//!     compositor.update(16.0);
//!     compositor.deliver(&mut stage);
//! }
//! assert!(!stage.is_active(operation));
//! ```

mod compositor;
mod element;
mod events;

pub use compositor::{
    ActiveTransition, Compositor, TransitionId, TransitionRule, TransitionSample, TransitionState,
};
pub use element::{SimElement, StyleChange};
pub use events::{EventQueue, TransitionEvent};
