//! Transport resolution
//!
//! Each cycle the generator needs to know whether the transport is rolling,
//! at which speed, and at which sample the cycle starts. The answer comes
//! either from the host's position reports (when host sync is enabled and
//! the cached report is valid) or from the local transport controls.
//!
//! A host position that disagrees with the locally predicted cycle start is
//! a locate, unless the transport is rolling and the difference is within
//! the jitter tolerance (interpolating hosts are not sample exact at
//! non-unity speed).

mod input;

pub use input::{
    AtomValue, HostInfo, HostPosition, PositionEvent, PositionUpdate, MAX_HOST_SPEED, MAX_POSITION,
};

use log::debug;

/// Scalar control values, sampled once per cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlInputs {
    /// 0=24fps, 1=25fps, 2=29.97fps drop, 3=30fps.
    pub rate_selector: f32,
    /// > 0 follows the host transport.
    pub sync_to_host: f32,
    /// > 0 rolls the local transport.
    pub transport_on: f32,
    /// Rising edge relocates to `zero_position`.
    pub rewind_trigger: f32,
    /// Seconds.
    pub zero_position: f32,
}

impl Default for ControlInputs {
    fn default() -> Self {
        Self {
            rate_selector: 3.0,
            sync_to_host: 0.0,
            transport_on: 0.0,
            rewind_trigger: 0.0,
            zero_position: 0.0,
        }
    }
}

impl ControlInputs {
    pub fn host_sync_enabled(&self) -> bool {
        self.sync_to_host > 0.0
    }
}

/// Transport state in effect for one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedTransport {
    pub rolling: bool,
    pub speed: f32,
    pub cycle_start: i64,
    pub force_resync: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct TransportResolver {
    sample_rate: f64,
    jitter_tolerance: i64,
}

impl TransportResolver {
    pub fn new(sample_rate: f64, jitter_tolerance: i64) -> Self {
        Self {
            sample_rate,
            jitter_tolerance,
        }
    }

    /// Resolves the cycle's transport.
    ///
    /// `predicted_start` is the cycle start computed at the end of the
    /// previous cycle. `rewind_edge` holds the previous rewind value and is
    /// updated. `next_quarter_sample` may be snapped onto the host frame when
    /// the host only jittered.
    pub fn resolve(
        &self,
        inputs: &ControlInputs,
        host: &HostInfo,
        predicted_start: i64,
        rewind_edge: &mut f32,
        next_quarter_sample: &mut f64,
    ) -> ResolvedTransport {
        let host_synced = inputs.host_sync_enabled() && host.valid;
        let mut force_resync = false;

        let (rolling, speed, mut cycle_start) = if host_synced {
            let rolling = host.speed != 0.0;
            if predicted_start != host.frame {
                let drift = (predicted_start - host.frame).abs();
                if rolling && drift <= self.jitter_tolerance {
                    // Float to integer truncates toward zero.
                    if ((*next_quarter_sample as i64) - host.frame).abs() <= self.jitter_tolerance {
                        debug!(
                            "Snapping next quarter frame {:.1} -> {}",
                            next_quarter_sample, host.frame
                        );
                        *next_quarter_sample = host.frame as f64;
                    }
                } else {
                    debug!(
                        "Host locate: predicted {} but host is at {}",
                        predicted_start, host.frame
                    );
                    force_resync = true;
                }
            }
            (rolling, host.speed, host.frame)
        } else {
            let rolling = inputs.transport_on > 0.0;
            (rolling, if rolling { 1.0 } else { 0.0 }, predicted_start)
        };

        // Only the rising edge counts.
        if inputs.rewind_trigger > 0.0 && *rewind_edge <= 0.0 {
            force_resync = true;
            if !host_synced {
                cycle_start = (f64::from(inputs.zero_position) * self.sample_rate)
                    .clamp(0.0, MAX_POSITION as f64) as i64;
                debug!("Rewind to sample {}", cycle_start);
            }
        }
        *rewind_edge = inputs.rewind_trigger;

        ResolvedTransport {
            rolling,
            speed,
            cycle_start,
            force_resync,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> TransportResolver {
        TransportResolver::new(48000.0, 2)
    }

    fn host(frame: i64, speed: f32) -> HostInfo {
        HostInfo {
            frame,
            speed,
            valid: true,
        }
    }

    fn synced() -> ControlInputs {
        ControlInputs {
            sync_to_host: 1.0,
            ..ControlInputs::default()
        }
    }

    #[test]
    fn test_local_transport() {
        let inputs = ControlInputs {
            transport_on: 1.0,
            ..ControlInputs::default()
        };
        let mut edge = 0.0;
        let mut next = 0.0;
        let resolved = resolver().resolve(&inputs, &HostInfo::default(), 1024, &mut edge, &mut next);
        assert!(resolved.rolling);
        assert_eq!(resolved.speed, 1.0);
        assert_eq!(resolved.cycle_start, 1024);
        assert!(!resolved.force_resync);
    }

    #[test]
    fn test_invalid_host_info_falls_back_to_local() {
        let info = HostInfo {
            frame: 5000,
            speed: 1.0,
            valid: false,
        };
        let mut edge = 0.0;
        let mut next = 0.0;
        let resolved = resolver().resolve(&synced(), &info, 512, &mut edge, &mut next);
        assert!(!resolved.rolling);
        assert_eq!(resolved.cycle_start, 512);
    }

    #[test]
    fn test_host_jitter_snaps_schedule() {
        let mut edge = 0.0;
        let mut next = 1025.4;
        let resolved = resolver().resolve(&synced(), &host(1024, 1.0), 1026, &mut edge, &mut next);
        assert!(!resolved.force_resync);
        assert_eq!(resolved.cycle_start, 1024);
        assert_eq!(next, 1024.0);
    }

    #[test]
    fn test_host_jitter_leaves_distant_schedule_alone() {
        let mut edge = 0.0;
        let mut next = 1400.0;
        let resolved = resolver().resolve(&synced(), &host(1024, 1.0), 1026, &mut edge, &mut next);
        assert!(!resolved.force_resync);
        assert_eq!(next, 1400.0);
    }

    #[test]
    fn test_host_jump_forces_resync() {
        let mut edge = 0.0;
        let mut next = 1536.0;
        let resolved = resolver().resolve(&synced(), &host(100_000, 1.0), 1536, &mut edge, &mut next);
        assert!(resolved.force_resync);
        assert_eq!(resolved.cycle_start, 100_000);
    }

    #[test]
    fn test_small_mismatch_while_stopped_is_a_locate() {
        let mut edge = 0.0;
        let mut next = 0.0;
        let resolved = resolver().resolve(&synced(), &host(1, 0.0), 0, &mut edge, &mut next);
        assert!(!resolved.rolling);
        assert!(resolved.force_resync);
    }

    #[test]
    fn test_rewind_rising_edge_only() {
        let inputs = ControlInputs {
            rewind_trigger: 1.0,
            zero_position: 10.0,
            ..ControlInputs::default()
        };
        let mut edge = 0.0;
        let mut next = 0.0;
        let first = resolver().resolve(&inputs, &HostInfo::default(), 4096, &mut edge, &mut next);
        assert!(first.force_resync);
        assert_eq!(first.cycle_start, 480_000);
        assert_eq!(edge, 1.0);

        let second = resolver().resolve(&inputs, &HostInfo::default(), 4096, &mut edge, &mut next);
        assert!(!second.force_resync);
        assert_eq!(second.cycle_start, 4096);
    }

    #[test]
    fn test_rewind_while_host_synced_keeps_host_position() {
        let inputs = ControlInputs {
            rewind_trigger: 1.0,
            zero_position: 10.0,
            ..synced()
        };
        let mut edge = 0.0;
        let mut next = 2048.0;
        let resolved = resolver().resolve(&inputs, &host(2048, 1.0), 2048, &mut edge, &mut next);
        assert!(resolved.force_resync);
        assert_eq!(resolved.cycle_start, 2048);
    }
}
