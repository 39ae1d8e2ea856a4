//! Quarter-frame scheduling
//!
//! Emits every quarter frame whose scheduled sample falls inside the cycle.
//! Forward play walks indices 0..7 and moves the schedule forward; reverse
//! play walks 7..0 and moves it backward. The digits are refreshed whenever
//! index 0 comes up.
//!
//! Intra-cycle offsets are `(scheduled - cycle_start) / speed`, truncated
//! toward zero.

use crate::engine::{CycleReport, GeneratorState, InvariantViolation};
use crate::mtc;
use crate::output::MidiSink;
use crate::timecode::{frames_per_timecode_frame, sample_to_time};
use log::trace;

/// Sample range covered by one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleWindow {
    pub start: i64,
    pub end: i64,
    pub speed: f32,
    pub n_samples: u32,
}

impl CycleWindow {
    /// The end is `start + floor(speed * n_samples)`, clamped at zero.
    pub fn new(start: i64, speed: f32, n_samples: u32) -> Self {
        let end = start
            .saturating_add(Self::distance(speed, n_samples))
            .max(0);
        Self {
            start,
            end,
            speed,
            n_samples,
        }
    }

    /// Samples the transport moves during a cycle.
    pub fn distance(speed: f32, n_samples: u32) -> i64 {
        (speed * n_samples as f32).floor() as i64
    }

    /// Forward: `[start, end)`. Reverse: `(end, start]`.
    pub fn contains(&self, position: f64) -> bool {
        let start = self.start as f64;
        let end = self.end as f64;
        (self.speed > 0.0 && position >= start && position < end)
            || (self.speed < 0.0 && position <= start && position > end)
    }
}

/// Emits the quarter frames due in `window` and persists the schedule.
pub fn schedule_quarter_frames<S: MidiSink>(
    state: &mut GeneratorState,
    window: &CycleWindow,
    sample_rate: f64,
    out: &mut S,
    report: &mut CycleReport,
) -> Result<(), InvariantViolation> {
    let rate = state.current_rate;
    let samples_per_frame = frames_per_timecode_frame(&rate, sample_rate);
    let samples_per_quarter = samples_per_frame / 4.0;
    let speed = f64::from(window.speed);

    let mut index = state.next_quarter_index;
    let mut next = state.next_quarter_sample;

    while window.contains(next) {
        if index == 0 {
            // Accumulated quarter intervals may land just short of the frame start.
            let boundary = (next + samples_per_frame / 2.0).floor() as i64;
            state.current_timecode = sample_to_time(&rate, sample_rate, boundary);
            if state.current_timecode.subframe != 0 {
                return Err(InvariantViolation::NonZeroSubframe {
                    subframe: state.current_timecode.subframe,
                });
            }
            trace!("Quarter frame 0: {}", state.current_timecode);
        }

        if speed < 0.0 {
            index = if index == 0 { 7 } else { index - 1 };
        }

        let offset = ((next - window.start as f64) / speed).trunc() as i64;
        if offset < 0 || offset >= i64::from(window.n_samples) {
            return Err(InvariantViolation::OffsetOutOfWindow {
                offset,
                n_samples: window.n_samples,
            });
        }

        let message = mtc::quarter_frame(&state.current_timecode, index, rate.rate_code);
        trace!("Quarter frame {} at offset {}", index, offset);
        report.record_write(out.write(offset as u32, message.as_bytes()));

        if speed > 0.0 {
            index = (index + 1) % 8;
            next += samples_per_quarter;
        } else {
            next -= samples_per_quarter;
        }
    }

    state.next_quarter_index = index;
    state.next_quarter_sample = next;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_end_clamped_at_zero() {
        let window = CycleWindow::new(100, -1.0, 512);
        assert_eq!(window.end, 0);
        assert!(window.contains(100.0));
        assert!(!window.contains(0.0));
    }

    #[test]
    fn test_forward_window_is_half_open() {
        let window = CycleWindow::new(512, 1.0, 512);
        assert_eq!(window.end, 1024);
        assert!(window.contains(512.0));
        assert!(!window.contains(1024.0));
    }

    #[test]
    fn test_stopped_window_is_empty() {
        let window = CycleWindow::new(512, 0.0, 512);
        assert_eq!(window.end, 512);
        assert!(!window.contains(512.0));
    }

    #[test]
    fn test_huge_speed_saturates() {
        assert_eq!(CycleWindow::new(100, 1e20, 512).end, i64::MAX);
        assert_eq!(CycleWindow::new(100, -1e20, 512).end, 0);
    }

    #[test]
    fn test_distance_floors_toward_negative_infinity() {
        assert_eq!(CycleWindow::distance(-0.5, 3), -2);
        assert_eq!(CycleWindow::distance(0.5, 3), 1);
    }
}
