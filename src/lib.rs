pub mod cli;
pub mod clock;
pub mod config;
pub mod control;
pub mod engine;
pub mod logging;
pub mod midi_output;
pub mod mtc;
pub mod output;
pub mod scheduler;
pub mod state;
pub mod timecode;
pub mod transport;
pub mod ui;

pub use crate::config::{EngineConfig, Settings};
pub use crate::engine::{CycleReport, Engine, EngineError, GeneratorState, InvariantViolation};
pub use crate::mtc::MtcMessage;
pub use crate::output::{EventBuffer, MidiSink, TimedMessage};
pub use crate::timecode::{RateDescriptor, TimecodeTime};
pub use crate::transport::{AtomValue, ControlInputs, PositionEvent};
