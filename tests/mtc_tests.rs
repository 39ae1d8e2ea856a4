use mtcgen::mtc::{full_frame, quarter_frame, QUARTER_FRAME_STATUS};
use mtcgen::{MtcMessage, TimecodeTime};

#[test]
fn test_quarter_frame_nibbles() {
    // 13:45:37:22 at 25fps, hour field 0x20 | 13 = 0x2D
    let time = TimecodeTime::new(13, 45, 37, 22);
    let expected: [u8; 8] = [0x06, 0x11, 0x25, 0x32, 0x4D, 0x52, 0x6D, 0x72];

    for (index, data) in expected.iter().enumerate() {
        let msg = quarter_frame(&time, index as u8, 0x20);
        assert_eq!(
            msg.as_bytes(),
            &[QUARTER_FRAME_STATUS, *data],
            "quarter frame {}",
            index
        );
    }
}

#[test]
fn test_quarter_frame_payload_is_seven_bit() {
    let time = TimecodeTime::new(23, 59, 59, 29);
    for index in 0..8 {
        let msg = quarter_frame(&time, index, 0x60);
        assert_eq!(msg.as_bytes()[1] & 0x80, 0);
        assert_eq!(msg.quarter_frame_parts().map(|(i, _)| i), Some(index));
    }
}

#[test]
fn test_full_frame_carries_rate_code() {
    let time = TimecodeTime::new(10, 20, 30, 14);
    for rate_code in [0x00, 0x20, 0x40, 0x60] {
        let msg = full_frame(&time, rate_code);
        let bytes = msg.as_bytes();
        assert_eq!(bytes.len(), 10);
        assert_eq!(bytes[5], rate_code | 10);
        assert_eq!(msg.full_frame_time(), Some((time, rate_code)));
    }
}

#[test]
fn test_from_bytes_accepts_encoded_messages() {
    let time = TimecodeTime::new(0, 0, 2, 2);
    let sysex = full_frame(&time, 0x60);
    assert_eq!(MtcMessage::from_bytes(sysex.as_bytes()), Some(sysex));

    let quarter = quarter_frame(&time, 3, 0x60);
    assert_eq!(MtcMessage::from_bytes(quarter.as_bytes()), Some(quarter));
    assert!(!quarter.is_full_frame());
}
