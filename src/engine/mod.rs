//! MTC generator engine
//!
//! [`Engine::run`] is called once per processing cycle. It resolves the
//! transport, decides whether a full-position resync is due, emits the
//! quarter frames that fall inside the cycle and prepares the state for the
//! next cycle. It never blocks and never allocates; messages go straight
//! into the caller's [`MidiSink`].
//!
//! A resync is forced when any of these hold:
//! - the transport resolver saw a locate or a rewind,
//! - the rate selector changed (including the very first cycle),
//! - the transport started or stopped,
//! - the transport is stopped and the position moved,
//! - the schedule fell behind the cycle start for the direction of travel,
//! - the previous cycle hit an invariant violation.

mod error;
mod resync;
mod state;

pub use error::{EngineError, InvariantViolation};
pub use state::GeneratorState;

use crate::config::EngineConfig;
use crate::output::{EventBuffer, MidiSink};
use crate::scheduler::{schedule_quarter_frames, CycleWindow};
use crate::timecode::{
    frames_per_timecode_frame, rate_for, selector_from_control, TimecodeTime, FPS_30,
};
use crate::transport::{
    ControlInputs, PositionEvent, ResolvedTransport, TransportResolver, MAX_HOST_SPEED,
};
use log::{debug, info, warn};

/// What happened during one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CycleReport {
    pub rolling: bool,
    pub speed: f32,
    pub cycle_start: i64,
    pub cycle_end: i64,
    pub resynced: bool,
    pub written: u32,
    pub dropped: u32,
    pub violation: Option<InvariantViolation>,
    pub timecode: TimecodeTime,
}

impl CycleReport {
    pub(crate) fn record_write(&mut self, stored: bool) {
        if stored {
            self.written += 1;
        } else {
            self.dropped += 1;
        }
    }

    /// Hour, minute, second and frame as scalar outputs.
    pub fn outputs(&self) -> [f32; 4] {
        [
            self.timecode.hour as f32,
            self.timecode.minute as f32,
            self.timecode.second as f32,
            self.timecode.frame as f32,
        ]
    }
}

pub struct Engine {
    config: EngineConfig,
    resolver: TransportResolver,
    state: GeneratorState,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        info!(
            "Creating MTC engine at {} Hz (jitter tolerance {} samples)",
            config.sample_rate, config.jitter_tolerance
        );
        Ok(Self {
            resolver: TransportResolver::new(config.sample_rate, config.jitter_tolerance),
            config,
            state: GeneratorState::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &GeneratorState {
        &self.state
    }

    /// Upper bound on messages one cycle of `n_samples` can produce: the
    /// full-position message plus every quarter frame at 30fps, the fastest
    /// rate, with the transport moving at [`MAX_HOST_SPEED`]. Host positions
    /// reporting a faster speed are rejected when decoded.
    pub fn max_events_per_cycle(&self, n_samples: u32) -> usize {
        let quarter = frames_per_timecode_frame(&FPS_30, self.config.sample_rate) / 4.0;
        let travel = f64::from(MAX_HOST_SPEED) * f64::from(n_samples);
        (travel / quarter).ceil() as usize + 2
    }

    /// Buffer sized for cycles of `n_samples`.
    pub fn event_buffer(&self, n_samples: u32) -> EventBuffer {
        EventBuffer::with_capacity(
            self.config
                .event_capacity
                .max(self.max_events_per_cycle(n_samples)),
        )
    }

    /// Processes one cycle of `n_samples` samples.
    pub fn run<S: MidiSink>(
        &mut self,
        inputs: &ControlInputs,
        host_event: Option<&PositionEvent>,
        n_samples: u32,
        out: &mut S,
    ) -> CycleReport {
        let sample_rate = self.config.sample_rate;
        let mut report = CycleReport::default();

        if let Some(event) = host_event {
            self.state.host.apply(event.decode());
        }

        let state = &mut self.state;
        let transport = self.resolver.resolve(
            inputs,
            &state.host,
            state.cycle_start_sample,
            &mut state.cached_rewind_edge,
            &mut state.next_quarter_sample,
        );

        let resync_due = self.resync_due(inputs, &transport);

        let mut violation = None;
        if resync_due {
            report.resynced = true;
            if let Err(err) = resync::resync(
                &mut self.state,
                &transport,
                sample_rate,
                out,
                &mut report,
            ) {
                violation = Some(err);
            }
        }

        let window = CycleWindow::new(transport.cycle_start, transport.speed, n_samples);
        if transport.rolling && violation.is_none() {
            if let Err(err) =
                schedule_quarter_frames(&mut self.state, &window, sample_rate, out, &mut report)
            {
                violation = Some(err);
            }
        }

        if let Some(err) = violation {
            warn!("{}; resynchronizing next cycle", err);
            self.state.pending_resync = true;
            report.violation = Some(err);
        }

        let state = &mut self.state;
        state.rolling = transport.rolling;
        state.cycle_start_sample = window.end;
        state
            .host
            .advance(CycleWindow::distance(transport.speed, n_samples));

        report.rolling = transport.rolling;
        report.speed = transport.speed;
        report.cycle_start = transport.cycle_start;
        report.cycle_end = window.end;
        report.timecode = state.current_timecode;
        report
    }

    fn resync_due(&mut self, inputs: &ControlInputs, transport: &ResolvedTransport) -> bool {
        let state = &mut self.state;
        let mut due = transport.force_resync || std::mem::take(&mut state.pending_resync);

        if state.update_rate_selector(inputs.rate_selector) {
            state.current_rate = rate_for(selector_from_control(inputs.rate_selector));
            debug!("Timecode rate code now 0x{:02X}", state.current_rate.rate_code);
            due = true;
        }

        if state.cached_transport_edge.to_bits() != inputs.transport_on.to_bits() {
            debug!(
                "Transport control {} -> {}",
                state.cached_transport_edge, inputs.transport_on
            );
            state.cached_transport_edge = inputs.transport_on;
        }

        // start <> stop
        if state.rolling != transport.rolling {
            due = true;
        }

        // locate while stopped
        if !transport.rolling && state.cycle_start_sample != transport.cycle_start {
            due = true;
        }

        // schedule behind the direction of travel
        let start = transport.cycle_start as f64;
        if (transport.speed > 0.0 && state.next_quarter_sample < start)
            || (transport.speed < 0.0 && state.next_quarter_sample > start)
        {
            due = true;
        }

        due
    }
}
