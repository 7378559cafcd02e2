//! Per-element transition orchestration for filter and sort operations.
//!
//! An operation moves many targets at once. Each [`Target`] applies start
//! styles, waits one paint frame, applies end styles with synthesized
//! transition rules and then waits for its element's transition-end event.
//! A [`CompletionBarrier`] per operation tells the [`Stage`] when every
//! target has either settled or reported that it never moves.
//!
//! The [`sim`] module provides an in-memory host for tests and demos.

pub mod barrier;
pub mod bridge;
pub mod easing;
pub mod effects;
pub mod element;
pub mod error;
pub mod rules;
pub mod settings;
pub mod sim;
pub mod snapshot;
pub mod stage;
pub mod stagger;
pub mod style;
pub mod target;
pub mod tween;

pub use barrier::{CompletionBarrier, OperationId, Settlement};
pub use bridge::{TransitionEnd, TransitionEndBridge};
pub use easing::EasingFunction;
pub use effects::Effects;
pub use element::{Element, NativeEvent};
pub use error::{MotionError, Result};
pub use settings::MotionSettings;
pub use stage::{CompletionHook, OperationReport, Stage};
pub use stagger::{Stagger, StaggerState};
pub use style::{Display, StyleData, TransformValue, TweenData};
pub use target::{MoveCallback, MoveRequest, Reveal, SortKey, Target, TargetId, TargetPhase};
pub use tween::{TweenFrame, VisibilityChange};

// Callbacks are plain boxed closures; a stage lives on its host's UI thread.
static_assertions::assert_not_impl_any!(Stage<sim::SimElement>: Send, Sync);
static_assertions::assert_impl_all!(sim::Compositor: Send);
