use super::{CycleReport, GeneratorState, InvariantViolation};
use crate::mtc;
use crate::output::MidiSink;
use crate::timecode::{decrement_time, increment_time, sample_to_time, time_to_sample, TimecodeTime};
use crate::transport::ResolvedTransport;
use log::{debug, info};

/// Emits a full-position message for the cycle start and re-anchors the
/// quarter-frame schedule on the next suitable frame boundary.
///
/// Outside 25fps a quarter-frame sequence has to start on an even frame, so
/// the boundary is stepped in the direction of travel until the frame
/// number is even.
pub(super) fn resync<S: MidiSink>(
    state: &mut GeneratorState,
    transport: &ResolvedTransport,
    sample_rate: f64,
    out: &mut S,
    report: &mut CycleReport,
) -> Result<(), InvariantViolation> {
    let rate = state.current_rate;
    let start = transport.cycle_start;

    let mut time = sample_to_time(&rate, sample_rate, start);
    if time.subframe != 0 {
        return Err(InvariantViolation::NonZeroSubframe {
            subframe: time.subframe,
        });
    }

    let message = mtc::full_frame(&time, rate.rate_code);
    report.record_write(out.write(0, message.as_bytes()));
    info!(
        "Full timecode {} at sample {} (speed {})",
        time, start, transport.speed
    );

    let frame_start = time_to_sample(&time, &rate, sample_rate);
    let mut misalignment = start - frame_start;
    if misalignment < 0 {
        return Err(InvariantViolation::FrameStartAfterPosition {
            position: start,
            frame_start,
        });
    }

    state.next_quarter_index = 0;
    state.next_quarter_sample = start as f64;

    let needs_even = !rate.allows_odd_frames();
    if needs_even && time.frame % 2 == 1 {
        misalignment = -1;
    }

    if transport.rolling && misalignment != 0 {
        loop {
            if transport.speed > 0.0 {
                increment_time(&mut time, &rate);
            } else if decrement_time(&mut time, &rate) {
                time = TimecodeTime::default();
            }
            if !needs_even || time.frame % 2 == 0 {
                break;
            }
        }

        let aligned = time_to_sample(&time, &rate, sample_rate);
        let distance = aligned - start;
        let with_direction =
            (transport.speed > 0.0 && distance >= 0) || (transport.speed < 0.0 && distance <= 0);
        if !with_direction {
            return Err(InvariantViolation::AlignmentAgainstDirection { distance });
        }
        state.next_quarter_sample = aligned as f64;
    }

    debug!(
        "Next quarter frame 0: {:.1} == {}",
        state.next_quarter_sample, time
    );
    state.current_timecode = time;
    Ok(())
}
