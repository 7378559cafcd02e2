//! Transition lifecycle events emitted by the compositor.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::compositor::TransitionId;
use crate::target::TargetId;

/// Event emitted when a simulated transition changes state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransitionEvent {
    Started {
        transition_id: TransitionId,
        target: TargetId,
        property: String,
    },
    /// Completed normally; becomes a native transition-end event.
    Ended {
        transition_id: TransitionId,
        target: TargetId,
        property: String,
    },
    /// Replaced by a newer value or dropped with its declaration.
    Cancelled {
        transition_id: TransitionId,
        target: TargetId,
        property: String,
    },
}

impl TransitionEvent {
    pub fn target(&self) -> TargetId {
        match self {
            Self::Started { target, .. }
            | Self::Ended { target, .. }
            | Self::Cancelled { target, .. } => *target,
        }
    }

    pub fn property(&self) -> &str {
        match self {
            Self::Started { property, .. }
            | Self::Ended { property, .. }
            | Self::Cancelled { property, .. } => property,
        }
    }

    pub fn is_ended(&self) -> bool {
        matches!(self, Self::Ended { .. })
    }
}

/// FIFO of events produced during updates.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<TransitionEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: TransitionEvent) {
        self.events.push_back(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = TransitionEvent> + '_ {
        self.events.drain(..)
    }
}
