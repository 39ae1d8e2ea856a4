//! MTC message encoding
//!
//! Quarter-frame messages carry one nibble of the current timecode each;
//! eight of them (index 0..7) convey a full value. Full-position messages
//! are universal real-time sysex messages that carry the whole value at once.

use crate::timecode::TimecodeTime;

/// Status byte of a quarter-frame message.
pub const QUARTER_FRAME_STATUS: u8 = 0xF1;

/// Length of a full-position sysex message.
pub const FULL_FRAME_LEN: usize = 10;

const SYSEX_HEADER: [u8; 5] = [0xF0, 0x7F, 0x7F, 0x01, 0x01];
const SYSEX_END: u8 = 0xF7;

/// A single outgoing MTC message, stored inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MtcMessage {
    QuarterFrame([u8; 2]),
    FullFrame([u8; FULL_FRAME_LEN]),
}

impl MtcMessage {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            MtcMessage::QuarterFrame(bytes) => bytes,
            MtcMessage::FullFrame(bytes) => bytes,
        }
    }

    /// Parses raw bytes back into a message, if they form one.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        match data.len() {
            2 if data[0] == QUARTER_FRAME_STATUS && data[1] & 0x80 == 0 => {
                Some(MtcMessage::QuarterFrame([data[0], data[1]]))
            }
            FULL_FRAME_LEN if data[..5] == SYSEX_HEADER && data[9] == SYSEX_END => {
                let mut bytes = [0u8; FULL_FRAME_LEN];
                bytes.copy_from_slice(data);
                Some(MtcMessage::FullFrame(bytes))
            }
            _ => None,
        }
    }

    /// Quarter-frame index and payload nibble.
    pub fn quarter_frame_parts(&self) -> Option<(u8, u8)> {
        match self {
            MtcMessage::QuarterFrame([_, data]) => Some((data >> 4, data & 0x0F)),
            MtcMessage::FullFrame(_) => None,
        }
    }

    /// Timecode digits and rate code carried by a full-position message.
    pub fn full_frame_time(&self) -> Option<(TimecodeTime, u8)> {
        match self {
            MtcMessage::FullFrame(bytes) => Some((
                TimecodeTime::new(
                    i32::from(bytes[5] & 0x1F),
                    i32::from(bytes[6]),
                    i32::from(bytes[7]),
                    i32::from(bytes[8]),
                ),
                bytes[5] & 0x60,
            )),
            MtcMessage::QuarterFrame(_) => None,
        }
    }

    pub fn is_full_frame(&self) -> bool {
        matches!(self, MtcMessage::FullFrame(_))
    }
}

fn hour_field(time: &TimecodeTime, rate_code: u8) -> u8 {
    rate_code | (time.hour.rem_euclid(24) as u8)
}

/// Renders quarter-frame `index` (0..7) of `time`.
pub fn quarter_frame(time: &TimecodeTime, index: u8, rate_code: u8) -> MtcMessage {
    let index = index & 0x07;
    let frame = time.frame as u8;
    let second = time.second as u8;
    let minute = time.minute as u8;
    let hour = hour_field(time, rate_code);

    let nibble = match index {
        0 => frame & 0x0F,
        1 => (frame & 0xF0) >> 4,
        2 => second & 0x0F,
        3 => (second & 0xF0) >> 4,
        4 => minute & 0x0F,
        5 => (minute & 0xF0) >> 4,
        6 => hour & 0x0F,
        _ => (hour & 0xF0) >> 4,
    };

    MtcMessage::QuarterFrame([QUARTER_FRAME_STATUS, (index << 4) | nibble])
}

/// Renders a full-position sysex message for `time`.
pub fn full_frame(time: &TimecodeTime, rate_code: u8) -> MtcMessage {
    let mut sysex = [0u8; FULL_FRAME_LEN];
    sysex[..5].copy_from_slice(&SYSEX_HEADER);
    sysex[5] = (rate_code & 0x60) | ((time.hour.rem_euclid(24) as u8) & 0x1F);
    sysex[6] = (time.minute as u8) & 0x7F;
    sysex[7] = (time.second as u8) & 0x7F;
    sysex[8] = (time.frame as u8) & 0x7F;
    sysex[9] = SYSEX_END;
    MtcMessage::FullFrame(sysex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_frame_layout() {
        let msg = full_frame(&TimecodeTime::new(1, 2, 3, 4), 0x60);
        assert_eq!(
            msg.as_bytes(),
            &[0xF0, 0x7F, 0x7F, 0x01, 0x01, 0x61, 0x02, 0x03, 0x04, 0xF7]
        );
    }

    #[test]
    fn test_hour_wraps_at_24() {
        let msg = full_frame(&TimecodeTime::new(25, 0, 0, 0), 0x20);
        assert_eq!(msg.as_bytes()[5], 0x21);
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        assert_eq!(MtcMessage::from_bytes(&[0xF8]), None);
        assert_eq!(MtcMessage::from_bytes(&[0xF1, 0x80]), None);
        assert_eq!(MtcMessage::from_bytes(&[0xF0, 0x7E, 0x7F, 0x01, 0x01, 0, 0, 0, 0, 0xF7]), None);
    }
}
