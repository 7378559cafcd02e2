//! Error types for the motion orchestrator.

use thiserror::Error;

use crate::barrier::OperationId;
use crate::target::TargetId;

/// Result type for motion operations.
pub type Result<T> = std::result::Result<T, MotionError>;

/// Errors raised by API misuse or malformed configuration input.
///
/// Transition flow itself never fails: missing deltas, missing callbacks and
/// stray completion events are tolerated rather than reported.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MotionError {
    /// No target is registered under this id.
    #[error("unknown target: {0}")]
    UnknownTarget(TargetId),

    /// The operation was never started or has already completed.
    #[error("operation {0} is not in flight")]
    UnknownOperation(OperationId),

    /// An easing curve could not be parsed.
    #[error("invalid easing: {0}")]
    InvalidEasing(String),

    /// An effects string contained an unrecognised token.
    #[error("unknown effect: {0}")]
    UnknownEffect(String),

    /// An effect's argument was not a number with an optional unit.
    #[error("invalid argument for effect {name}: {argument:?}")]
    InvalidEffectArgument { name: String, argument: String },
}
