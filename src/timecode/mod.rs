//! Timecode arithmetic
//!
//! Conversions between absolute sample positions and timecode digits, and
//! single-frame stepping. Frame `n` starts at sample
//! `floor(n * sample_rate * den / num)`; every sample belongs to the frame
//! whose start is the closest one at or before it, so
//! `sample_to_time(time_to_sample(t)) == t` holds for every valid `t`.
//!
//! Drop-frame numbering (29.97) skips frame numbers 0 and 1 at the start of
//! every minute that is not a multiple of ten.

mod rate;

pub use rate::{
    rate_for, selector_from_control, RateDescriptor, DEFAULT_SELECTOR, FPS_24, FPS_25,
    FPS_2997_DROP, FPS_30,
};

use std::fmt;

const DROPPED_PER_MINUTE: i64 = 2;

/// Hour, minute, second, frame and subframe digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimecodeTime {
    pub hour: i32,
    pub minute: i32,
    pub second: i32,
    pub frame: i32,
    pub subframe: i32,
}

impl TimecodeTime {
    pub fn new(hour: i32, minute: i32, second: i32, frame: i32) -> Self {
        Self {
            hour,
            minute,
            second,
            frame,
            subframe: 0,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for TimecodeTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}",
            self.hour, self.minute, self.second, self.frame
        )
    }
}

/// Samples per timecode frame at the given sample rate.
pub fn frames_per_timecode_frame(rate: &RateDescriptor, sample_rate: f64) -> f64 {
    sample_rate * f64::from(rate.den) / f64::from(rate.num)
}

/// Converts an absolute sample position into the timecode of the frame
/// containing it. Negative positions are treated as zero.
pub fn sample_to_time(rate: &RateDescriptor, sample_rate: f64, sample: i64) -> TimecodeTime {
    let sample = sample.max(0);
    let mut count = ((sample as f64) * f64::from(rate.num)
        / (f64::from(rate.den) * sample_rate))
        .floor() as i64;

    // The float estimate is at most one frame off near a boundary.
    if frame_start(count.saturating_add(1), rate, sample_rate) <= sample {
        count = count.saturating_add(1);
    } else if count > 0 && frame_start(count, rate, sample_rate) > sample {
        count -= 1;
    }

    let mut time = time_from_count(count, rate);
    if rate.subframes > 0 {
        let into_frame = (sample - frame_start(count, rate, sample_rate)) as f64;
        let per_subframe = frames_per_timecode_frame(rate, sample_rate) / f64::from(rate.subframes);
        time.subframe = ((into_frame / per_subframe).floor() as i32).min(rate.subframes - 1);
    }
    time
}

/// Converts timecode digits into the sample position where that frame
/// (and subframe) starts.
pub fn time_to_sample(time: &TimecodeTime, rate: &RateDescriptor, sample_rate: f64) -> i64 {
    let mut sample = frame_start(frame_count(time, rate), rate, sample_rate);
    if rate.subframes > 0 && time.subframe > 0 {
        let per_subframe = frames_per_timecode_frame(rate, sample_rate) / f64::from(rate.subframes);
        sample += (f64::from(time.subframe) * per_subframe).floor() as i64;
    }
    sample
}

/// Advances by one frame. Returns `true` when the value wrapped past
/// 23:59:59 back to zero.
pub fn increment_time(time: &mut TimecodeTime, rate: &RateDescriptor) -> bool {
    let next = frame_count(time, rate) + 1;
    let wrapped = next == frames_per_day(rate);
    *time = time_from_count(if wrapped { 0 } else { next }, rate);
    wrapped
}

/// Steps back by one frame. Returns `true` when the value wrapped below
/// zero to the last frame of the day.
pub fn decrement_time(time: &mut TimecodeTime, rate: &RateDescriptor) -> bool {
    let count = frame_count(time, rate);
    if count <= 0 {
        *time = time_from_count(frames_per_day(rate) - 1, rate);
        return true;
    }
    *time = time_from_count(count - 1, rate);
    false
}

fn frame_start(count: i64, rate: &RateDescriptor, sample_rate: f64) -> i64 {
    ((count as f64) * f64::from(rate.den) * sample_rate / f64::from(rate.num)).floor() as i64
}

fn frames_per_day(rate: &RateDescriptor) -> i64 {
    frame_count(&TimecodeTime::new(24, 0, 0, 0), rate)
}

/// Number of frames elapsed since 00:00:00:00.
fn frame_count(time: &TimecodeTime, rate: &RateDescriptor) -> i64 {
    let fps = rate.nominal_fps();
    let hour = i64::from(time.hour);
    let minute = i64::from(time.minute);
    let mut count = ((hour * 60 + minute) * 60 + i64::from(time.second)) * fps
        + i64::from(time.frame);
    if rate.drop_frame {
        let total_minutes = hour * 60 + minute;
        count -= DROPPED_PER_MINUTE * (total_minutes - total_minutes / 10);
    }
    count
}

fn time_from_count(count: i64, rate: &RateDescriptor) -> TimecodeTime {
    let fps = rate.nominal_fps();
    let mut count = count.max(0);

    if rate.drop_frame {
        let per_minute = fps * 60 - DROPPED_PER_MINUTE;
        let per_ten_minutes = fps * 600 - 9 * DROPPED_PER_MINUTE;
        let tens = count / per_ten_minutes;
        let rest = count % per_ten_minutes;
        count += 9 * DROPPED_PER_MINUTE * tens;
        if rest > DROPPED_PER_MINUTE {
            count += DROPPED_PER_MINUTE * ((rest - DROPPED_PER_MINUTE) / per_minute);
        }
    }

    TimecodeTime {
        hour: (count / (fps * 3600)) as i32,
        minute: ((count / (fps * 60)) % 60) as i32,
        second: ((count / fps) % 60) as i32,
        frame: (count % fps) as i32,
        subframe: 0,
    }
}
