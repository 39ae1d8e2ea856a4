use log::trace;

/// Largest sample position accepted from the host or a rewind target.
/// Every integer up to here is exact as an `f64`.
pub const MAX_POSITION: i64 = 1 << 52;

/// Largest transport speed magnitude accepted from the host.
pub const MAX_HOST_SPEED: f32 = 64.0;

/// Typed value of a property in a host position event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AtomValue {
    Float(f32),
    Double(f64),
    Int(i32),
    Long(i64),
}

/// Host transport position as delivered on the event input.
///
/// Only the two properties the generator needs are kept; either may be
/// missing or carry an unexpected type.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PositionEvent {
    pub speed: Option<AtomValue>,
    pub frame: Option<AtomValue>,
}

/// Decoded host transport position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostPosition {
    pub speed: f32,
    pub frame: i64,
}

/// Result of decoding a [`PositionEvent`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionUpdate {
    /// Well-formed position with a non-negative frame.
    Valid(HostPosition),
    /// Well-formed but unusable (negative frame); host info becomes invalid.
    Invalid,
    /// Missing or mistyped properties; the event carries no information.
    Ignored,
}

impl PositionEvent {
    pub fn new(speed: f32, frame: i64) -> Self {
        Self {
            speed: Some(AtomValue::Float(speed)),
            frame: Some(AtomValue::Long(frame)),
        }
    }

    /// Extracts speed and frame. `speed` must be a float and `frame` a long.
    /// Positions the engine cannot represent mark the host info invalid.
    pub fn decode(&self) -> PositionUpdate {
        match (self.speed, self.frame) {
            (Some(AtomValue::Float(speed)), Some(AtomValue::Long(frame))) if speed.is_finite() => {
                if frame < 0 {
                    trace!("Host position with negative frame {}", frame);
                    PositionUpdate::Invalid
                } else if frame > MAX_POSITION || speed.abs() > MAX_HOST_SPEED {
                    trace!("Host position out of range: speed {}, frame {}", speed, frame);
                    PositionUpdate::Invalid
                } else {
                    PositionUpdate::Valid(HostPosition { speed, frame })
                }
            }
            _ => {
                trace!("Ignoring malformed host position: {:?}", self);
                PositionUpdate::Ignored
            }
        }
    }
}

/// Host position cached across cycles.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HostInfo {
    pub frame: i64,
    pub speed: f32,
    pub valid: bool,
}

impl HostInfo {
    pub fn apply(&mut self, update: PositionUpdate) {
        match update {
            PositionUpdate::Valid(position) => {
                self.frame = position.frame;
                self.speed = position.speed;
                self.valid = true;
            }
            PositionUpdate::Invalid => self.valid = false,
            PositionUpdate::Ignored => {}
        }
    }

    /// Predicts the host frame at the start of the next cycle.
    pub fn advance(&mut self, distance: i64) {
        self.frame = self.frame.saturating_add(distance).max(0);
    }
}
