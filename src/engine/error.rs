use std::error::Error;
use std::fmt;

/// Reasons an engine cannot be constructed.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Sample rate is not a positive, finite number
    InvalidSampleRate(f64),
    /// No room for output events
    ZeroEventCapacity,
    /// Jitter tolerance below zero
    NegativeJitterTolerance(i64),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidSampleRate(rate) => write!(f, "Invalid sample rate: {}", rate),
            EngineError::ZeroEventCapacity => write!(f, "Event capacity must be at least 1"),
            EngineError::NegativeJitterTolerance(tolerance) => {
                write!(f, "Jitter tolerance must not be negative: {}", tolerance)
            }
        }
    }
}

impl Error for EngineError {}

/// Broken scheduling invariant detected inside a cycle.
///
/// These point at an arithmetic defect rather than bad input. The cycle drops
/// the affected event and the next cycle resynchronizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A quarter-frame 0 boundary did not convert to a whole frame
    NonZeroSubframe { subframe: i32 },
    /// The cycle start converted to a frame starting after it
    FrameStartAfterPosition { position: i64, frame_start: i64 },
    /// The aligned quarter-frame 0 lies behind the direction of travel
    AlignmentAgainstDirection { distance: i64 },
    /// A quarter-frame fell outside `[0, n_samples)`
    OffsetOutOfWindow { offset: i64, n_samples: u32 },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::NonZeroSubframe { subframe } => {
                write!(f, "Quarter frame 0 at subframe {}", subframe)
            }
            InvariantViolation::FrameStartAfterPosition {
                position,
                frame_start,
            } => write!(
                f,
                "Frame start {} lies after position {}",
                frame_start, position
            ),
            InvariantViolation::AlignmentAgainstDirection { distance } => write!(
                f,
                "Aligned quarter frame 0 is {} samples against the direction of travel",
                distance
            ),
            InvariantViolation::OffsetOutOfWindow { offset, n_samples } => {
                write!(f, "Offset {} outside cycle of {} samples", offset, n_samples)
            }
        }
    }
}

impl Error for InvariantViolation {}
