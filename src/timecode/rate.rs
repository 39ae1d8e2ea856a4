/// Frame rate of a timecode stream together with the MTC rate code that
/// goes into the hour field of outgoing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDescriptor {
    pub num: i32,
    pub den: i32,
    pub drop_frame: bool,
    pub subframes: i32,
    pub rate_code: u8,
}

pub const FPS_24: RateDescriptor = RateDescriptor {
    num: 24,
    den: 1,
    drop_frame: false,
    subframes: 0,
    rate_code: 0x00,
};

pub const FPS_25: RateDescriptor = RateDescriptor {
    num: 25,
    den: 1,
    drop_frame: false,
    subframes: 0,
    rate_code: 0x20,
};

pub const FPS_2997_DROP: RateDescriptor = RateDescriptor {
    num: 30000,
    den: 1001,
    drop_frame: true,
    subframes: 0,
    rate_code: 0x40,
};

pub const FPS_30: RateDescriptor = RateDescriptor {
    num: 30,
    den: 1,
    drop_frame: false,
    subframes: 0,
    rate_code: 0x60,
};

/// Selector used when the control value is out of range or not a number.
pub const DEFAULT_SELECTOR: i32 = 3;

impl RateDescriptor {
    /// Exact frames per second.
    pub fn fps(&self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Frame numbers per second as they appear in the digits (30 for 29.97).
    pub fn nominal_fps(&self) -> i64 {
        let num = i64::from(self.num);
        let den = i64::from(self.den);
        (num + den - 1) / den
    }

    /// 25fps is the only rate whose quarter-frame sequences may start on an
    /// odd frame number.
    pub fn allows_odd_frames(&self) -> bool {
        self.rate_code == FPS_25.rate_code
    }
}

impl Default for RateDescriptor {
    fn default() -> Self {
        FPS_30
    }
}

/// Looks up the rate for a selector: 0=24, 1=25, 2=29.97 drop, anything else 30.
pub fn rate_for(selector: i32) -> RateDescriptor {
    match selector {
        0 => FPS_24,
        1 => FPS_25,
        2 => FPS_2997_DROP,
        _ => FPS_30,
    }
}

/// Turns a scalar control value into a selector, rounding to nearest.
pub fn selector_from_control(value: f32) -> i32 {
    if !value.is_finite() {
        return DEFAULT_SELECTOR;
    }
    value.round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_table_entries() {
        assert_eq!(rate_for(0).rate_code, 0x00);
        assert_eq!(rate_for(1).rate_code, 0x20);
        assert_eq!(rate_for(2).rate_code, 0x40);
        assert!(rate_for(2).drop_frame);
        assert_eq!(rate_for(3).rate_code, 0x60);
    }

    #[test]
    fn test_unknown_selector_defaults_to_30fps() {
        assert_eq!(rate_for(-1), FPS_30);
        assert_eq!(rate_for(17), FPS_30);
        assert_eq!(rate_for(selector_from_control(f32::NAN)), FPS_30);
    }

    #[test]
    fn test_selector_rounds_to_nearest() {
        assert_eq!(selector_from_control(0.4), 0);
        assert_eq!(selector_from_control(1.6), 2);
    }

    #[test]
    fn test_nominal_fps() {
        assert_eq!(FPS_24.nominal_fps(), 24);
        assert_eq!(FPS_2997_DROP.nominal_fps(), 30);
        assert!((FPS_2997_DROP.fps() - 29.97).abs() < 0.001);
    }
}
