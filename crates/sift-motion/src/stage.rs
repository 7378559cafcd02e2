//! Operation stage.
//!
//! `Stage` owns the targets of one collection and the contexts of the
//! operations in flight over them. A host drives it with three calls:
//!
//! - [`Stage::move_target`] for each target an operation moves,
//! - [`Stage::flush_frame`] from its next paint-frame hook,
//! - [`Stage::dispatch_event`] for every native event on a target's element.
//!
//! Each operation's completion hook runs exactly once, synchronously inside
//! whichever of those calls satisfied its barrier. Targets the operation
//! moved are cleaned up just before the hook runs.

use std::collections::HashMap;
use std::fmt;
use std::mem;

use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};

use crate::barrier::{CompletionBarrier, OperationId, Settlement};
use crate::bridge::TransitionEndBridge;
use crate::element::{Element, NativeEvent};
use crate::error::{MotionError, Result};
use crate::settings::MotionSettings;
use crate::stagger::{Stagger, StaggerState};
use crate::style::StyleData;
use crate::target::{MoveRequest, Release, Target, TargetId, TargetPhase};

/// Final counters of a completed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationReport {
    pub operation: OperationId,
    pub moved: usize,
    pub immovable: usize,
    pub bound: usize,
    pub settled: usize,
    pub superseded: usize,
}

impl OperationReport {
    fn new(operation: OperationId, barrier: &CompletionBarrier) -> Self {
        Self {
            operation,
            moved: barrier.moved(),
            immovable: barrier.immovable(),
            bound: barrier.bound(),
            settled: barrier.settled(),
            superseded: barrier.superseded(),
        }
    }
}

/// Runs once when an operation completes.
pub type CompletionHook = Box<dyn FnOnce(&OperationReport)>;

struct OperationContext {
    barrier: CompletionBarrier,
    participants: Vec<TargetId>,
    on_complete: Option<CompletionHook>,
}

/// An end-style pass waiting for the next paint frame.
struct FrameJob {
    target: TargetId,
    operation: OperationId,
    request: MoveRequest,
}

/// Owner of a collection of targets and the operations running over them.
pub struct Stage<E> {
    settings: MotionSettings,
    bridge: TransitionEndBridge,
    stagger: Stagger,
    targets: Vec<Option<Target<E>>>,
    operations: HashMap<OperationId, OperationContext>,
    frame_queue: Vec<FrameJob>,
}

impl<E: Element> Stage<E> {
    pub fn new(settings: MotionSettings) -> Self {
        Self {
            bridge: TransitionEndBridge::new(settings.prefix),
            stagger: Stagger::new(settings.stagger_ms),
            settings,
            targets: Vec::new(),
            operations: HashMap::new(),
            frame_queue: Vec::new(),
        }
    }

    /// Install a custom stagger sequence, e.g. to stagger a grid by column.
    pub fn with_stagger_sequence<F>(mut self, sequence: F) -> Self
    where
        F: Fn(usize, &StaggerState) -> usize + 'static,
    {
        self.stagger.set_sequence(Some(Box::new(sequence)));
        self
    }

    pub fn settings(&self) -> &MotionSettings {
        &self.settings
    }

    /// Register an element and bind its transition-end listener.
    pub fn add_target(&mut self, mut element: E) -> TargetId {
        self.bridge.bind(&mut element);
        let id = TargetId(self.targets.len());
        self.targets.push(Some(Target::new(element)));
        debug!("{id} added");
        id
    }

    /// Unregister a target and hand its element back.
    ///
    /// A wait still armed on the target is superseded, and a queued
    /// end-style pass counts as immovable, so no operation is left hanging.
    pub fn remove_target(&mut self, id: TargetId) -> Option<E> {
        let mut target = self.targets.get_mut(id.0)?.take()?;
        self.bridge.unbind(target.element_mut());

        let (orphaned, queue): (Vec<_>, Vec<_>) = mem::take(&mut self.frame_queue)
            .into_iter()
            .partition(|job| job.target == id);
        self.frame_queue = queue;

        if let Some(release) = target.detach() {
            self.record_release(release);
        }
        for job in orphaned {
            if target.is_excluded() {
                continue;
            }
            let completes = self
                .operations
                .get_mut(&job.operation)
                .is_some_and(|context| context.barrier.record_immovable());
            if completes {
                self.complete(job.operation);
            }
        }

        debug!("{id} removed");
        Some(target.into_element())
    }

    pub fn target(&self, id: TargetId) -> Option<&Target<E>> {
        self.targets.get(id.0).and_then(Option::as_ref)
    }

    pub fn target_mut(&mut self, id: TargetId) -> Option<&mut Target<E>> {
        self.targets.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Ids of all registered targets, in registration order.
    pub fn target_ids(&self) -> Vec<TargetId> {
        self.targets
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(index, _)| TargetId(index))
            .collect()
    }

    pub fn target_count(&self) -> usize {
        self.targets.iter().flatten().count()
    }

    /// Current position and style of a target's element.
    pub fn pos_data(&self, id: TargetId) -> Result<StyleData> {
        self.target(id)
            .map(|target| target.pos_data(&self.settings))
            .ok_or(MotionError::UnknownTarget(id))
    }

    /// Open a new operation. `on_complete` runs once it is finished.
    pub fn begin_operation<F>(&mut self, on_complete: F) -> OperationId
    where
        F: FnOnce(&OperationReport) + 'static,
    {
        let operation = OperationId::new();
        self.operations.insert(
            operation,
            OperationContext {
                barrier: CompletionBarrier::new(),
                participants: Vec::new(),
                on_complete: Some(Box::new(on_complete)),
            },
        );
        debug!("{operation} started");
        operation
    }

    /// Whether `operation` is still waiting on any target.
    pub fn is_active(&self, operation: OperationId) -> bool {
        self.operations.contains_key(&operation)
    }

    pub fn barrier(&self, operation: OperationId) -> Option<&CompletionBarrier> {
        self.operations.get(&operation).map(|context| &context.barrier)
    }

    /// Number of end-style passes waiting for the next frame.
    pub fn pending_frame_jobs(&self) -> usize {
        self.frame_queue.len()
    }

    /// Move one target as part of `operation`.
    ///
    /// Start styles are applied now; the end styles wait for
    /// [`Stage::flush_frame`]. With animation disabled the target jumps to
    /// its end position and any callback runs immediately.
    pub fn move_target(
        &mut self,
        operation: OperationId,
        id: TargetId,
        request: MoveRequest,
    ) -> Result<()> {
        let context = self
            .operations
            .get_mut(&operation)
            .ok_or(MotionError::UnknownOperation(operation))?;
        let target = self
            .targets
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(MotionError::UnknownTarget(id))?;

        let mut request = request;
        if !self.settings.enable {
            request.pos_in = request.pos_out.clone();
            if let Some(callback) = request.callback.take() {
                callback(operation, Settlement::Finished);
            }
        }

        if !context.participants.contains(&id) {
            context.participants.push(id);
        }

        let displaced = target.move_to(&self.settings, operation, &request, &mut context.barrier);
        debug!("{operation}: {id} moving (stagger index {})", request.stagger_index);

        self.frame_queue.push(FrameJob {
            target: id,
            operation,
            request,
        });

        if let Some(release) = displaced {
            self.record_release(release);
        }
        Ok(())
    }

    /// Complete `operation` now if it moved nothing.
    ///
    /// Returns whether it completed.
    pub fn complete_if_idle(&mut self, operation: OperationId) -> Result<bool> {
        let context = self
            .operations
            .get_mut(&operation)
            .ok_or(MotionError::UnknownOperation(operation))?;

        if context.barrier.signal_if_idle() {
            self.complete(operation);
            return Ok(true);
        }
        Ok(false)
    }

    /// Run every end-style pass queued since the last frame.
    ///
    /// Returns the number of passes run.
    pub fn flush_frame(&mut self) -> usize {
        let jobs = mem::take(&mut self.frame_queue);
        let state = StaggerState {
            target_count: self.target_count(),
        };
        let count = jobs.len();

        for job in jobs {
            let Some(target) = self.targets.get_mut(job.target.0).and_then(Option::as_mut) else {
                warn!("{}: frame pass for removed {}", job.operation, job.target);
                continue;
            };

            let delay_ms = self.stagger.delay(job.request.stagger_index, &state);
            let mut scratch = CompletionBarrier::new();
            let barrier = match self.operations.get_mut(&job.operation) {
                Some(context) => &mut context.barrier,
                None => &mut scratch,
            };

            let out = target.apply_styles_out(
                &self.settings,
                job.operation,
                job.request,
                delay_ms,
                barrier,
            );

            if let Some(release) = out.displaced {
                self.record_release(release);
            }
            if out.completes {
                self.complete(job.operation);
            }
        }

        count
    }

    /// Deliver a native event to a target.
    ///
    /// Returns `true` if it settled a bound target.
    pub fn dispatch_event(&mut self, id: TargetId, event: &NativeEvent) -> bool {
        let Some(target) = self.targets.get_mut(id.0).and_then(Option::as_mut) else {
            warn!("{} event for unknown {id}", event.kind);
            return false;
        };
        let Some(end) = self.bridge.accept(event) else {
            trace!("{id}: ignoring {} event", event.kind);
            return false;
        };

        match target.handle_transition_end(&self.settings, end) {
            Some(release) => {
                debug!("{}: {id} settled on {}", release.operation, event.property_name);
                self.record_release(release);
                true
            }
            None => false,
        }
    }

    fn record_release(&mut self, release: Release) {
        if !release.counted {
            return;
        }
        let Some(context) = self.operations.get_mut(&release.operation) else {
            return;
        };
        if context.barrier.record_settled(release.settlement) {
            self.complete(release.operation);
        }
    }

    fn complete(&mut self, operation: OperationId) {
        let Some(mut context) = self.operations.remove(&operation) else {
            return;
        };

        for id in &context.participants {
            let Some(target) = self.targets.get_mut(id.0).and_then(Option::as_mut) else {
                continue;
            };
            // Targets picked up by a newer operation keep that operation's styles.
            if target.last_operation() == Some(operation) && target.phase() == TargetPhase::Idle {
                target.clean_up(&self.settings);
            }
        }

        let report = OperationReport::new(operation, &context.barrier);
        info!(
            "{operation} complete: {} moved, {} immovable, {} superseded",
            report.moved, report.immovable, report.superseded
        );

        if let Some(on_complete) = context.on_complete.take() {
            on_complete(&report);
        }
    }
}

impl<E> fmt::Debug for Stage<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("settings", &self.settings)
            .field("stagger", &self.stagger)
            .field("targets", &self.targets.iter().flatten().count())
            .field("operations", &self.operations.len())
            .field("frame_queue", &self.frame_queue.len())
            .finish()
    }
}
