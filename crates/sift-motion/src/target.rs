//! Element transition controller.
//!
//! A `Target` owns one element for as long as it belongs to the collection.
//! For each operation that moves it, the target:
//!
//! 1. applies start styles synchronously (`move_to`)
//! 2. on the next paint frame, synthesizes transition rules and either
//!    reports itself immovable or binds a completion callback and applies
//!    the end styles (`apply_styles_out`)
//! 3. on a qualifying transition-end event, fires the callback exactly once
//!    (`handle_transition_end`)
//!
//! ```text
//! Idle ──move_to──▶ AwaitingFrame ──apply_styles_out──▶ Bound ──event──▶ Idle
//!                                        └──(no callback)──▶ Idle
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::mem;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::barrier::{CompletionBarrier, OperationId, Settlement};
use crate::bridge::TransitionEnd;
use crate::element::Element;
use crate::rules::{self, RulePlan};
use crate::settings::MotionSettings;
use crate::snapshot;
use crate::style::{StyleData, TweenData};
use crate::tween::{self, VisibilityChange};

/// Index of a target within its stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub usize);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target-{}", self.0)
    }
}

/// Invoked once when a bound target's wait ends.
pub type MoveCallback = Box<dyn FnOnce(OperationId, Settlement)>;

/// Whether a move also shows or hides the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reveal {
    Show,
    Hide,
}

/// Everything one target needs to perform one move.
pub struct MoveRequest {
    pub pos_in: StyleData,
    pub pos_out: StyleData,
    pub reveal: Option<Reveal>,
    pub stagger_index: usize,
    /// Overrides the configured duration for opacity and resize rules.
    pub duration_ms: Option<u32>,
    /// `None` marks the target as statically placed (immovable).
    pub callback: Option<MoveCallback>,
}

impl MoveRequest {
    pub fn new(pos_in: StyleData, pos_out: StyleData) -> Self {
        Self {
            pos_in,
            pos_out,
            reveal: None,
            stagger_index: 0,
            duration_ms: None,
            callback: None,
        }
    }

    pub fn showing(mut self) -> Self {
        self.reveal = Some(Reveal::Show);
        self
    }

    pub fn hiding(mut self) -> Self {
        self.reveal = Some(Reveal::Hide);
        self
    }

    pub fn stagger_index(mut self, index: usize) -> Self {
        self.stagger_index = index;
        self
    }

    pub fn duration_ms(mut self, duration_ms: u32) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn on_settled<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(OperationId, Settlement) + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for MoveRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoveRequest")
            .field("pos_in", &self.pos_in)
            .field("pos_out", &self.pos_out)
            .field("reveal", &self.reveal)
            .field("stagger_index", &self.stagger_index)
            .field("duration_ms", &self.duration_ms)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// Value used by the external sort comparator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SortKey {
    Number(f64),
    Text(String),
}

impl SortKey {
    /// Numeric attribute values sort as numbers, anything else as lowercase
    /// text. A missing or blank attribute reads as `0`.
    ///
    /// Only finite decimal literals count as numbers: `"Infinity"`, `"NaN"`
    /// and hex strings such as `"0x10"` sort as text, unlike a browser's
    /// `value * 1` coercion.
    pub fn parse(value: Option<&str>) -> Self {
        let raw = value.unwrap_or("").trim();
        if raw.is_empty() {
            return Self::Number(0.0);
        }
        match raw.parse::<f64>() {
            Ok(number) if number.is_finite() => Self::Number(number),
            _ => Self::Text(raw.to_lowercase()),
        }
    }
}

impl SortKey {
    /// Ascending order: numbers numerically and before any text.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
        }
    }
}

impl Default for SortKey {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

/// Observable lifecycle phase of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetPhase {
    Idle,
    /// Start styles applied, end styles waiting for the next frame.
    AwaitingFrame,
    /// Transition running, callback armed.
    Bound,
}

enum Binding {
    Idle,
    Bound {
        callback: MoveCallback,
        operation: OperationId,
        /// Excluded targets bind without counting toward the barrier.
        counted: bool,
    },
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("Idle"),
            Self::Bound {
                operation, counted, ..
            } => f
                .debug_struct("Bound")
                .field("operation", operation)
                .field("counted", counted)
                .finish_non_exhaustive(),
        }
    }
}

/// A finished wait that the owning operation must be told about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Release {
    pub operation: OperationId,
    pub settlement: Settlement,
    pub counted: bool,
}

/// Outcome of the end-style pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StylesOut {
    /// An older wait on this target that the new move replaced.
    pub displaced: Option<Release>,
    /// The target was immovable and its report completed the operation.
    pub completes: bool,
}

fn translate(pos: &StyleData) -> String {
    format!("translate({}px, {}px)", pos.x, pos.y)
}

/// Property names whose transition end completes a bound target.
pub fn tracks_property(property_name: &str, animate_resize: bool) -> bool {
    property_name.contains("transform")
        || property_name.contains("opacity")
        || (animate_resize
            && ["height", "width", "margin"]
                .iter()
                .any(|p| property_name.contains(p)))
}

/// Transition controller for one element.
#[derive(Debug)]
pub struct Target<E> {
    element: E,
    sort_key: SortKey,
    is_shown: bool,
    is_excluded: bool,
    binding: Binding,
    pending_frames: usize,
    /// Most recent operation to move the target.
    last_operation: Option<OperationId>,
}

impl<E: Element> Target<E> {
    /// Wrap an element. It counts as shown if it carries an inline display.
    pub fn new(element: E) -> Self {
        let is_shown = element.style("display").is_some();
        Self {
            element,
            sort_key: SortKey::default(),
            is_shown,
            is_excluded: false,
            binding: Binding::Idle,
            pending_frames: 0,
            last_operation: None,
        }
    }

    pub fn element(&self) -> &E {
        &self.element
    }

    pub fn element_mut(&mut self) -> &mut E {
        &mut self.element
    }

    pub fn into_element(self) -> E {
        self.element
    }

    pub fn sort_key(&self) -> &SortKey {
        &self.sort_key
    }

    /// Re-read the sort key from the `data-<attribute>` attribute.
    pub fn refresh_sort_key(&mut self, attribute: &str) {
        let value = self.element.attribute(&format!("data-{}", attribute));
        self.sort_key = SortKey::parse(value.as_deref());
    }

    pub fn is_shown(&self) -> bool {
        self.is_shown
    }

    pub fn is_excluded(&self) -> bool {
        self.is_excluded
    }

    /// Excluded targets are styled like any other but never count toward an
    /// operation's barrier.
    pub fn set_excluded(&mut self, excluded: bool) {
        self.is_excluded = excluded;
    }

    pub fn is_bound(&self) -> bool {
        matches!(self.binding, Binding::Bound { .. })
    }

    /// Operation whose callback is currently armed.
    pub fn bound_operation(&self) -> Option<OperationId> {
        match self.binding {
            Binding::Bound { operation, .. } => Some(operation),
            Binding::Idle => None,
        }
    }

    /// Operation that moved the target last, even if it has since completed.
    pub fn last_operation(&self) -> Option<OperationId> {
        self.last_operation
    }

    pub fn phase(&self) -> TargetPhase {
        if self.is_bound() {
            TargetPhase::Bound
        } else if self.pending_frames > 0 {
            TargetPhase::AwaitingFrame
        } else {
            TargetPhase::Idle
        }
    }

    /// Current position and style of the element.
    pub fn pos_data(&self, settings: &MotionSettings) -> StyleData {
        snapshot::capture(&self.element, settings)
    }

    pub fn show(&mut self, display: &str) {
        if self.element.style("display").as_deref() != Some(display) {
            self.element.set_style("display", display);
        }
        self.is_shown = true;
    }

    pub fn hide(&mut self) {
        self.element.remove_style("display");
        self.is_shown = false;
    }

    /// Jump straight to `pos_in + tween * multiplier`.
    pub fn apply_tween(
        &mut self,
        settings: &MotionSettings,
        pos_in: &StyleData,
        tween: &TweenData,
        multiplier: f64,
    ) {
        let has_display = self.element.style("display").is_some();
        let frame = tween::interpolate(settings, pos_in, tween, multiplier, has_display);

        match &frame.visibility {
            VisibilityChange::Keep => {}
            VisibilityChange::Show(display) => self.show(display),
            VisibilityChange::Hide => self.hide(),
        }
        for (property, value) in &frame.styles {
            self.element.set_style(property, value);
        }
        self.element
            .set_style(settings.transform_property(), &frame.transform);
    }

    /// Start a move: count it, cancel any older wait and apply start styles.
    ///
    /// The caller must run [`Target::apply_styles_out`] on the next frame.
    pub(crate) fn move_to(
        &mut self,
        settings: &MotionSettings,
        operation: OperationId,
        request: &MoveRequest,
        barrier: &mut CompletionBarrier,
    ) -> Option<Release> {
        if !self.is_excluded {
            barrier.record_moved();
        }
        self.last_operation = Some(operation);

        let displaced = self.supersede();
        self.apply_styles_in(settings, &request.pos_in, request.reveal);
        self.pending_frames += 1;

        displaced
    }

    fn apply_styles_in(
        &mut self,
        settings: &MotionSettings,
        pos_in: &StyleData,
        reveal: Option<Reveal>,
    ) {
        let mut transform = vec![translate(pos_in)];

        if reveal.is_none() && settings.animate_resize_targets {
            self.write_geometry(pos_in);
        }

        if settings.effects_in.opacity != Some(1.0) {
            if let Some(opacity) = pos_in.opacity {
                self.element.set_style("opacity", &opacity.to_string());
            }
        }

        if reveal == Some(Reveal::Show) {
            transform.extend(settings.effects_in.transform_terms());
        }

        self.element
            .set_style(settings.transform_property(), &transform.join(" "));
    }

    /// End-style pass, run one paint frame after [`Target::move_to`].
    pub(crate) fn apply_styles_out(
        &mut self,
        settings: &MotionSettings,
        operation: OperationId,
        request: MoveRequest,
        delay_ms: u32,
        barrier: &mut CompletionBarrier,
    ) -> StylesOut {
        self.pending_frames = self.pending_frames.saturating_sub(1);
        let displaced = self.supersede();

        let pos_out = &request.pos_out;
        let end_visible = pos_out.display.is_visible();
        let transition_rules = rules::synthesize(
            settings,
            &RulePlan {
                reveal: request.reveal,
                end_visible,
                duration_ms: request.duration_ms,
                delay_ms,
            },
        );

        let Some(callback) = request.callback else {
            let completes = !self.is_excluded && barrier.record_immovable();
            debug!("{operation}: target immovable (completes: {completes})");
            return StylesOut {
                displaced,
                completes,
            };
        };

        let counted = !self.is_excluded;
        if counted {
            barrier.record_bound();
        }
        self.binding = Binding::Bound {
            callback,
            operation,
            counted,
        };

        self.element.set_style(
            settings.transition_property(),
            &rules::declaration(&transition_rules),
        );

        if settings.animate_resize_targets && end_visible {
            self.write_geometry(pos_out);
        }

        let hiding = request.reveal == Some(Reveal::Hide);
        let mut transform = Vec::new();

        // Without nudging, translate first so hide transforms don't shift the
        // target sideways.
        if !settings.nudge && hiding {
            transform.push(translate(pos_out));
        }

        let fading = settings.effects_in.is_fading();
        match request.reveal {
            Some(Reveal::Hide) => {
                if let (true, Some(opacity)) = (fading, settings.effects_out.opacity) {
                    self.element.set_style("opacity", &opacity.to_string());
                }
                transform.extend(settings.effects_out.transform_terms());
            }
            Some(Reveal::Show) if fading => self.element.set_style("opacity", "1"),
            _ => {}
        }

        if settings.nudge || !hiding {
            transform.push(translate(pos_out));
        }

        self.element
            .set_style(settings.transform_property(), &transform.join(" "));

        debug!("{operation}: target bound with delay {delay_ms}ms");

        StylesOut {
            displaced,
            completes: false,
        }
    }

    /// Handle a transition-end event forwarded by the bridge.
    ///
    /// Fires the armed callback on the first qualifying event; later events,
    /// events from descendants and untracked properties are ignored.
    pub(crate) fn handle_transition_end(
        &mut self,
        settings: &MotionSettings,
        end: TransitionEnd<'_>,
    ) -> Option<Release> {
        let tracked = tracks_property(end.property_name, settings.animate_resize_targets);
        if !end.from_target || !tracked {
            trace!("ignoring transition end for {:?}", end.property_name);
            return None;
        }

        self.release(Settlement::Finished)
    }

    /// Drop any armed wait and queued pass before the target leaves its stage.
    pub(crate) fn detach(&mut self) -> Option<Release> {
        self.pending_frames = 0;
        self.supersede()
    }

    /// Cancel an armed wait because a newer move replaced it.
    fn supersede(&mut self) -> Option<Release> {
        let release = self.release(Settlement::Superseded);
        if let Some(release) = &release {
            debug!("{}: wait superseded by a newer move", release.operation);
        }
        release
    }

    fn release(&mut self, settlement: Settlement) -> Option<Release> {
        match mem::replace(&mut self.binding, Binding::Idle) {
            Binding::Bound {
                callback,
                operation,
                counted,
            } => {
                callback(operation, settlement);
                Some(Release {
                    operation,
                    settlement,
                    counted,
                })
            }
            Binding::Idle => None,
        }
    }

    fn write_geometry(&mut self, pos: &StyleData) {
        let dimensions = [
            ("width", pos.width),
            ("height", pos.height),
            ("margin-right", pos.margin_right),
            ("margin-bottom", pos.margin_bottom),
        ];
        for (property, value) in dimensions {
            if let Some(value) = value {
                self.element.set_style(property, &format!("{}px", value));
            }
        }
    }

    /// Drop inline transition styles so the stylesheet applies again.
    pub fn clean_up(&mut self, settings: &MotionSettings) {
        self.element.remove_style(settings.transform_property());
        self.element.remove_style(settings.transition_property());
        self.element.remove_style("opacity");

        if settings.animate_resize_targets {
            for property in ["width", "height", "margin-right", "margin-bottom"] {
                self.element.remove_style(property);
            }
        }
    }
}
