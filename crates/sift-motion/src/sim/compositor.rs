//! Simulated transition compositor.
//!
//! Reads each element's `transition` declaration and the inline style
//! changes made since the last observation, starts a timed transition for
//! every changed property the declaration covers, and reports ends as native
//! transition-end events.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use super::element::SimElement;
use super::events::{EventQueue, TransitionEvent};
use crate::bridge::TransitionEndBridge;
use crate::easing::EasingFunction;
use crate::element::{Element, NativeEvent};
use crate::settings::MotionSettings;
use crate::stage::Stage;
use crate::target::TargetId;

/// Unique identifier for one simulated transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransitionId(pub u64);

impl TransitionId {
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for TransitionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// One entry of a parsed transition declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRule {
    pub property: String,
    pub duration_ms: f32,
    pub delay_ms: f32,
    pub easing: EasingFunction,
}

impl TransitionRule {
    /// Parse a full declaration such as
    /// `transform 600ms 30ms ease, opacity 600ms 30ms linear`.
    ///
    /// Unparseable entries are skipped.
    pub fn parse_declaration(declaration: &str) -> Vec<Self> {
        split_top_level(declaration)
            .into_iter()
            .filter_map(Self::parse)
            .collect()
    }

    fn parse(entry: &str) -> Option<Self> {
        let mut tokens = entry.split_whitespace();
        let property = tokens.next()?.to_string();

        let mut times = Vec::new();
        let mut easing = Vec::new();
        for token in tokens {
            match parse_time(token) {
                Some(ms) if easing.is_empty() && times.len() < 2 => times.push(ms),
                _ => easing.push(token),
            }
        }

        let easing = if easing.is_empty() {
            EasingFunction::Ease
        } else {
            easing.join(" ").parse().unwrap_or(EasingFunction::Ease)
        };

        Some(Self {
            property,
            duration_ms: times.first().copied().unwrap_or(0.0),
            delay_ms: times.get(1).copied().unwrap_or(0.0),
            easing,
        })
    }

    /// Whether this rule animates `property`. `margin` covers `margin-right`.
    pub fn covers(&self, property: &str) -> bool {
        self.property == "all"
            || self.property == property
            || property
                .strip_prefix(self.property.as_str())
                .is_some_and(|rest| rest.starts_with('-'))
    }
}

fn parse_time(token: &str) -> Option<f32> {
    if let Some(ms) = token.strip_suffix("ms") {
        return ms.parse().ok();
    }
    token.strip_suffix('s')?.parse::<f32>().ok().map(|s| s * 1000.0)
}

/// Split on commas outside parentheses.
fn split_top_level(declaration: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in declaration.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                entries.push(declaration[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    entries.push(declaration[start..].trim());
    entries.retain(|e| !e.is_empty());
    entries
}

/// Lifecycle state of a simulated transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionState {
    /// Waiting out its delay.
    Pending,
    Running,
    Finished,
    Cancelled,
}

/// A transition in progress on one property of one target.
#[derive(Debug, Clone)]
pub struct ActiveTransition {
    pub id: TransitionId,
    pub target: TargetId,
    pub property: String,
    pub duration_ms: f32,
    pub delay_ms: f32,
    pub elapsed_ms: f32,
    pub easing: EasingFunction,
    pub state: TransitionState,
}

impl ActiveTransition {
    pub fn new(target: TargetId, property: &str, rule: &TransitionRule) -> Self {
        Self {
            id: TransitionId::new(),
            target,
            property: property.to_string(),
            duration_ms: rule.duration_ms,
            delay_ms: rule.delay_ms,
            elapsed_ms: 0.0,
            easing: rule.easing,
            state: if rule.delay_ms > 0.0 {
                TransitionState::Pending
            } else {
                TransitionState::Running
            },
        }
    }

    /// Eased progress in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        match self.state {
            TransitionState::Pending | TransitionState::Cancelled => 0.0,
            TransitionState::Finished => 1.0,
            TransitionState::Running => {
                let active = (self.elapsed_ms - self.delay_ms).max(0.0);
                let linear = if self.duration_ms > 0.0 {
                    (active / self.duration_ms).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                self.easing.evaluate(linear)
            }
        }
    }

    /// Advance time. Returns `true` while the transition is still active.
    pub fn update(&mut self, delta_ms: f32) -> bool {
        match self.state {
            TransitionState::Finished | TransitionState::Cancelled => false,
            TransitionState::Pending => {
                self.elapsed_ms += delta_ms;
                if self.elapsed_ms >= self.delay_ms {
                    self.state = TransitionState::Running;
                    // The overshoot counts toward the running phase.
                    return self.check_finished();
                }
                true
            }
            TransitionState::Running => {
                self.elapsed_ms += delta_ms;
                self.check_finished()
            }
        }
    }

    fn check_finished(&mut self) -> bool {
        if self.elapsed_ms - self.delay_ms >= self.duration_ms {
            self.state = TransitionState::Finished;
            false
        } else {
            true
        }
    }

    pub fn cancel(&mut self) {
        self.state = TransitionState::Cancelled;
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, TransitionState::Pending | TransitionState::Running)
    }
}

/// Eased progress of one in-flight transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionSample {
    pub target: TargetId,
    pub property: String,
    pub state: TransitionState,
    /// `0.0` while delayed, `1.0` once finished.
    pub progress: f32,
}

/// Runs the transitions declared on a stage's [`SimElement`]s.
#[derive(Debug)]
pub struct Compositor {
    bridge: TransitionEndBridge,
    transition_property: &'static str,
    transitions: HashMap<TransitionId, ActiveTransition>,
    /// Only one transition per (target, property) pair.
    index: HashMap<(TargetId, String), TransitionId>,
    events: EventQueue,
}

impl Compositor {
    pub fn new(settings: &MotionSettings) -> Self {
        Self {
            bridge: TransitionEndBridge::new(settings.prefix),
            transition_property: settings.transition_property(),
            transitions: HashMap::new(),
            index: HashMap::new(),
            events: EventQueue::new(),
        }
    }

    /// Pick up style changes on every element of `stage`.
    ///
    /// Call after each batch of style writes, i.e. after moves and after
    /// [`Stage::flush_frame`].
    pub fn observe(&mut self, stage: &mut Stage<SimElement>) {
        for id in stage.target_ids() {
            if let Some(target) = stage.target_mut(id) {
                self.observe_element(id, target.element_mut());
            }
        }
    }

    /// Pick up style changes on one element.
    pub fn observe_element(&mut self, id: TargetId, element: &mut SimElement) {
        let changes = element.take_changes();
        if changes.is_empty() {
            return;
        }

        let Some(declaration) = element.style(self.transition_property) else {
            // No declaration left: whatever was running stops without an end.
            self.cancel_target(id);
            return;
        };
        let rules = TransitionRule::parse_declaration(&declaration);

        for change in changes {
            if change.property == self.transition_property {
                continue;
            }
            let Some(rule) = rules.iter().rev().find(|r| r.covers(&change.property)) else {
                continue;
            };
            self.start(id, &change.property, rule);
        }
    }

    fn start(&mut self, target: TargetId, property: &str, rule: &TransitionRule) {
        let key = (target, property.to_string());
        if let Some(previous) = self.index.remove(&key) {
            self.finish(previous, true);
        }

        // Zero-length transitions complete instantly without an event.
        if rule.duration_ms <= 0.0 {
            trace!("{target}: {property} changed without a transition");
            return;
        }

        let transition = ActiveTransition::new(target, property, rule);
        let id = transition.id;
        debug!(
            "{target}: {property} transitions over {}ms after {}ms ({id})",
            rule.duration_ms, rule.delay_ms
        );

        self.events.push(TransitionEvent::Started {
            transition_id: id,
            target,
            property: property.to_string(),
        });
        self.transitions.insert(id, transition);
        self.index.insert(key, id);
    }

    /// Advance every running transition by `delta_ms`.
    pub fn update(&mut self, delta_ms: f32) {
        let finished: Vec<TransitionId> = self
            .transitions
            .iter_mut()
            .filter_map(|(id, transition)| (!transition.update(delta_ms)).then_some(*id))
            .collect();

        let mut finished: Vec<(f32, TransitionId)> = finished
            .into_iter()
            .filter_map(|id| {
                self.transitions
                    .get(&id)
                    .map(|t| (t.elapsed_ms - t.delay_ms - t.duration_ms, id))
            })
            .collect();
        // Largest overshoot ended earliest within this step.
        finished.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.0.cmp(&b.1.0)));

        for (_, id) in finished {
            self.finish(id, false);
        }
    }

    fn finish(&mut self, id: TransitionId, cancelled: bool) {
        let Some(mut transition) = self.transitions.remove(&id) else {
            return;
        };
        self.index.remove(&(transition.target, transition.property.clone()));

        let event = if cancelled || transition.state == TransitionState::Cancelled {
            transition.cancel();
            TransitionEvent::Cancelled {
                transition_id: id,
                target: transition.target,
                property: transition.property,
            }
        } else {
            TransitionEvent::Ended {
                transition_id: id,
                target: transition.target,
                property: transition.property,
            }
        };
        self.events.push(event);
    }

    /// Cancel every transition running on `target`.
    pub fn cancel_target(&mut self, target: TargetId) {
        let ids: Vec<TransitionId> = self
            .transitions
            .values()
            .filter(|t| t.target == target)
            .map(|t| t.id)
            .collect();
        for id in ids {
            self.finish(id, true);
        }
    }

    /// Deliver queued ends to `stage` as native transition-end events.
    ///
    /// Returns the number of events the stage acted on.
    pub fn deliver(&mut self, stage: &mut Stage<SimElement>) -> usize {
        let event_name = self.bridge.event_name();
        let events: Vec<TransitionEvent> = self.events.drain().collect();

        let mut handled = 0;
        for event in &events {
            match event {
                TransitionEvent::Ended { .. } => {
                    let native = NativeEvent::new(event_name, event.property());
                    if stage.dispatch_event(event.target(), &native) {
                        handled += 1;
                    }
                }
                // Browsers emit nothing the stage listens for on these.
                TransitionEvent::Started { transition_id, .. }
                | TransitionEvent::Cancelled { transition_id, .. } => {
                    trace!("{}: {} {transition_id}", event.target(), event.property());
                }
            }
        }
        handled
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = TransitionEvent> + '_ {
        self.events.drain()
    }

    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }

    pub fn is_animating(&self) -> bool {
        self.transitions.values().any(ActiveTransition::is_active)
    }

    pub fn active_count(&self) -> usize {
        self.transitions.len()
    }

    /// Eased progress of every transition still in flight, ordered by target.
    pub fn samples(&self) -> Vec<TransitionSample> {
        let mut samples: Vec<TransitionSample> = self
            .transitions
            .values()
            .map(|transition| TransitionSample {
                target: transition.target,
                property: transition.property.clone(),
                state: transition.state,
                progress: transition.progress(),
            })
            .collect();
        samples.sort_by(|a, b| {
            a.target
                .0
                .cmp(&b.target.0)
                .then_with(|| a.property.cmp(&b.property))
        });
        samples
    }

    /// The transition running on `(target, property)`, if any.
    pub fn transition(&self, target: TargetId, property: &str) -> Option<&ActiveTransition> {
        self.index
            .get(&(target, property.to_string()))
            .and_then(|id| self.transitions.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_declaration() {
        let rules = TransitionRule::parse_declaration(
            "transform 600ms 30ms cubic-bezier(0.4, 0, 0.2, 1), opacity 0.3s linear",
        );
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].property, "transform");
        assert_eq!(rules[0].duration_ms, 600.0);
        assert_eq!(rules[0].delay_ms, 30.0);
        assert!(matches!(rules[0].easing, EasingFunction::CubicBezier { .. }));
        assert_eq!(rules[1].duration_ms, 300.0);
        assert_eq!(rules[1].delay_ms, 0.0);
        assert_eq!(rules[1].easing, EasingFunction::Linear);
    }

    #[test]
    fn test_rule_coverage() {
        let margin = TransitionRule::parse_declaration("margin 100ms").remove(0);
        assert!(margin.covers("margin-right"));
        assert!(margin.covers("margin"));
        assert!(!margin.covers("margins"));

        let transform = TransitionRule::parse_declaration("transform 100ms").remove(0);
        assert!(!transform.covers("-webkit-transform"));
    }

    #[test]
    fn test_delay_then_run() {
        let rule = TransitionRule::parse_declaration("opacity 100ms 50ms").remove(0);
        let mut transition = ActiveTransition::new(TargetId(0), "opacity", &rule);
        assert_eq!(transition.state, TransitionState::Pending);

        assert!(transition.update(40.0));
        assert_eq!(transition.state, TransitionState::Pending);
        assert!(transition.update(20.0));
        assert_eq!(transition.state, TransitionState::Running);
        assert!(!transition.update(100.0));
        assert_eq!(transition.state, TransitionState::Finished);
        assert_eq!(transition.progress(), 1.0);
    }

    #[test]
    fn test_changes_start_covered_transitions() {
        let mut compositor = Compositor::new(&MotionSettings::default());
        let mut element = SimElement::new();
        element.set_style("transition", "transform 200ms 0ms ease");
        element.set_style("transform", "translate(10px, 0px)");
        element.set_style("opacity", "0");

        compositor.observe_element(TargetId(1), &mut element);

        assert!(compositor.transition(TargetId(1), "transform").is_some());
        assert!(compositor.transition(TargetId(1), "opacity").is_none());
        assert_eq!(compositor.active_count(), 1);

        compositor.update(250.0);
        let events: Vec<_> = compositor.drain_events().collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], TransitionEvent::Started { .. }));
        assert!(events[1].is_ended());
        assert!(!compositor.is_animating());
    }

    #[test]
    fn test_samples_follow_easing() {
        let mut compositor = Compositor::new(&MotionSettings::default());
        let mut element = SimElement::new();
        element.set_style(
            "transition",
            "transform 100ms 0ms ease-in, opacity 100ms 0ms linear, width 100ms 50ms ease",
        );
        element.set_style("transform", "translate(10px, 0px)");
        element.set_style("opacity", "0");
        element.set_style("width", "20px");
        compositor.observe_element(TargetId(2), &mut element);

        compositor.update(50.0);
        let samples = compositor.samples();
        let properties: Vec<&str> = samples.iter().map(|s| s.property.as_str()).collect();
        assert_eq!(properties, ["opacity", "transform", "width"]);

        assert!((samples[0].progress - 0.5).abs() < 1e-4);
        // ease-in lags behind linear at the midpoint.
        assert!(samples[1].progress < 0.4);
        assert_eq!(samples[2].progress, 0.0);
        assert_eq!(samples[2].state, TransitionState::Running);

        compositor.update(60.0);
        let samples = compositor.samples();
        assert_eq!(samples.len(), 1);
        assert!(samples[0].progress > 0.0 && samples[0].progress < 1.0);
    }

    #[test]
    fn test_zero_duration_never_fires() {
        let mut compositor = Compositor::new(&MotionSettings::default());
        let mut element = SimElement::new();
        element.set_style("transition", "transform 0ms 0ms ease");
        element.set_style("transform", "translate(10px, 0px)");

        compositor.observe_element(TargetId(0), &mut element);
        compositor.update(100.0);

        assert!(!compositor.has_pending_events());
    }

    #[test]
    fn test_restart_cancels_previous() {
        let mut compositor = Compositor::new(&MotionSettings::default());
        let mut element = SimElement::new();
        element.set_style("transition", "transform 200ms 0ms ease");
        element.set_style("transform", "translate(10px, 0px)");
        compositor.observe_element(TargetId(0), &mut element);
        compositor.update(100.0);

        element.set_style("transform", "translate(20px, 0px)");
        compositor.observe_element(TargetId(0), &mut element);

        let events: Vec<_> = compositor.drain_events().collect();
        assert!(matches!(events[1], TransitionEvent::Cancelled { .. }));
        assert!(matches!(events[2], TransitionEvent::Started { .. }));
        assert_eq!(compositor.active_count(), 1);
    }

    #[test]
    fn test_removed_declaration_cancels() {
        let mut compositor = Compositor::new(&MotionSettings::default());
        let mut element = SimElement::new();
        element.set_style("transition", "opacity 200ms 0ms linear");
        element.set_style("opacity", "1");
        compositor.observe_element(TargetId(0), &mut element);

        element.remove_style("transition");
        compositor.observe_element(TargetId(0), &mut element);

        assert_eq!(compositor.active_count(), 0);
        assert!(compositor.drain_events().last().is_some_and(|e| !e.is_ended()));
    }
}
