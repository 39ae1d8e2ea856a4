use crate::timecode::{RateDescriptor, TimecodeTime};
use crate::transport::HostInfo;

/// Everything the generator remembers from one cycle to the next.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratorState {
    /// Transport running state of the previous cycle.
    pub rolling: bool,
    /// Predicted local sample clock at the start of the next cycle.
    pub cycle_start_sample: i64,
    pub host: HostInfo,

    // Previous control values, for edge detection. `None` until the first cycle.
    pub cached_rate_selector: Option<f32>,
    pub cached_rewind_edge: f32,
    pub cached_transport_edge: f32,

    pub current_rate: RateDescriptor,
    /// Timecode at the most recent quarter-frame 0 boundary.
    pub current_timecode: TimecodeTime,
    /// Next quarter-frame index to emit (0..=7).
    pub next_quarter_index: u8,
    /// Absolute, fractional sample position of the next quarter frame.
    pub next_quarter_sample: f64,

    /// Set when a cycle hit an invariant violation.
    pub pending_resync: bool,
}

impl GeneratorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the rate selector, returning `true` if it differs from the
    /// previous cycle's value.
    pub(crate) fn update_rate_selector(&mut self, selector: f32) -> bool {
        let changed = match self.cached_rate_selector {
            Some(previous) => previous.to_bits() != selector.to_bits(),
            None => true,
        };
        self.cached_rate_selector = Some(selector);
        changed
    }
}
