//! Stagger delay calculation.

use std::fmt;

/// Collection state handed to a custom stagger sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StaggerState {
    /// Number of targets registered on the stage.
    pub target_count: usize,
}

/// Remaps a target's sequence index, e.g. to stagger column-major in a grid.
pub type StaggerSequence = Box<dyn Fn(usize, &StaggerState) -> usize>;

/// Maps a sequence index to a transition delay: `index * step_ms`.
pub struct Stagger {
    step_ms: u32,
    sequence: Option<StaggerSequence>,
}

impl Stagger {
    pub fn new(step_ms: u32) -> Self {
        Self {
            step_ms,
            sequence: None,
        }
    }

    pub fn with_sequence<F>(mut self, sequence: F) -> Self
    where
        F: Fn(usize, &StaggerState) -> usize + 'static,
    {
        self.sequence = Some(Box::new(sequence));
        self
    }

    pub fn set_sequence(&mut self, sequence: Option<StaggerSequence>) {
        self.sequence = sequence;
    }

    pub fn step_ms(&self) -> u32 {
        self.step_ms
    }

    /// Delay in milliseconds for the target at `index`.
    pub fn delay(&self, index: usize, state: &StaggerState) -> u32 {
        if self.step_ms == 0 {
            return 0;
        }

        let index = match &self.sequence {
            Some(sequence) => sequence(index, state),
            None => index,
        };

        u32::try_from(index)
            .unwrap_or(u32::MAX)
            .saturating_mul(self.step_ms)
    }
}

impl fmt::Debug for Stagger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stagger")
            .field("step_ms", &self.step_ms)
            .field("sequence", &self.sequence.is_some())
            .finish()
    }
}
