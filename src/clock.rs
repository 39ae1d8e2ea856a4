// clock.rs

use crate::config::Settings;
use crate::control::ControlCommand;
use crate::engine::{CycleReport, Engine, EngineError};
use crate::midi_output::ScheduledMessage;
use crate::output::{EventBuffer, TimedMessage};
use crate::scheduler::CycleWindow;
use crate::state::SharedDisplay;
use crate::transport::{ControlInputs, PositionEvent};
use crossbeam::channel::{Receiver, Sender, TryRecvError, TrySendError};
use log::{info, trace, warn};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Stand-in for a host transport that reports its position every cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostSimulator {
    speed: f32,
    frame: i64,
    sample_rate: f64,
}

impl HostSimulator {
    pub fn new(speed: f32, sample_rate: f64) -> Self {
        Self {
            speed,
            frame: 0,
            sample_rate,
        }
    }

    pub fn frame(&self) -> i64 {
        self.frame
    }

    pub fn locate(&mut self, seconds: f32) {
        self.frame = (f64::from(seconds) * self.sample_rate).max(0.0) as i64;
        info!("Host located to sample {}", self.frame);
    }

    /// Position report for the cycle about to run; the host only moves when
    /// the local transport control is on.
    pub fn report(&self, inputs: &ControlInputs) -> PositionEvent {
        PositionEvent::new(self.effective_speed(inputs), self.frame)
    }

    pub fn advance(&mut self, inputs: &ControlInputs, n_samples: u32) {
        let distance = CycleWindow::distance(self.effective_speed(inputs), n_samples);
        self.frame = self.frame.saturating_add(distance).max(0);
    }

    fn effective_speed(&self, inputs: &ControlInputs) -> f32 {
        if inputs.transport_on > 0.0 {
            self.speed
        } else {
            0.0
        }
    }
}

/// Drives the engine the way an audio callback would: one call per block.
pub struct CycleClock {
    engine: Engine,
    inputs: ControlInputs,
    host: Option<HostSimulator>,
    buffer: EventBuffer,
    block_size: u32,
    block_duration: Duration,
}

impl CycleClock {
    pub fn new(settings: &Settings) -> Result<Self, EngineError> {
        let engine = Engine::new(settings.engine_config())?;
        let buffer = engine.event_buffer(settings.block_size);
        let host = settings
            .host_speed
            .map(|speed| HostSimulator::new(speed, settings.sample_rate));

        let inputs = ControlInputs {
            rate_selector: settings.rate as f32,
            sync_to_host: if host.is_some() { 1.0 } else { 0.0 },
            transport_on: 1.0,
            rewind_trigger: 0.0,
            zero_position: settings.zero_position,
        };

        info!(
            "Cycle clock: {} samples per cycle at {} Hz{}",
            settings.block_size,
            settings.sample_rate,
            if host.is_some() { ", host sync" } else { "" }
        );

        Ok(Self {
            engine,
            inputs,
            host,
            buffer,
            block_size: settings.block_size,
            block_duration: settings.block_duration(),
        })
    }

    pub fn inputs(&self) -> &ControlInputs {
        &self.inputs
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn host(&self) -> Option<&HostSimulator> {
        self.host.as_ref()
    }

    /// Messages produced by the most recent cycle.
    pub fn events(&self) -> &[TimedMessage] {
        self.buffer.events()
    }

    /// Applies a command. Returns `false` when the clock should stop.
    pub fn handle_command(&mut self, command: ControlCommand) -> bool {
        if command == ControlCommand::Rewind {
            if let Some(host) = self.host.as_mut() {
                host.locate(self.inputs.zero_position);
            }
        }
        command.apply(&mut self.inputs)
    }

    /// Runs one cycle.
    pub fn process_cycle(&mut self) -> CycleReport {
        self.buffer.clear();
        let host_event = self.host.map(|host| host.report(&self.inputs));
        let report = self.engine.run(
            &self.inputs,
            host_event.as_ref(),
            self.block_size,
            &mut self.buffer,
        );

        if let Some(host) = self.host.as_mut() {
            host.advance(&self.inputs, self.block_size);
        }
        // The rewind control is momentary.
        self.inputs.rewind_trigger = 0.0;
        report
    }

    /// Runs cycles in real time until a `Quit` command arrives or the
    /// command channel closes.
    pub fn run(
        mut self,
        commands: Receiver<ControlCommand>,
        output: Sender<ScheduledMessage>,
        display: SharedDisplay,
    ) {
        let sample_rate = self.engine.config().sample_rate;
        let started = Instant::now();
        let mut cycle: u32 = 0;

        'cycles: loop {
            loop {
                match commands.try_recv() {
                    Ok(command) => {
                        if !self.handle_command(command) {
                            break 'cycles;
                        }
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => break 'cycles,
                }
            }

            let cycle_started = Instant::now();
            let report = self.process_cycle();
            display.publish(&report, self.engine.state().current_rate.rate_code);

            // One block of output latency keeps messages in order across cycles.
            let base = cycle_started + self.block_duration;
            for event in self.buffer.events() {
                let due = base + Duration::from_secs_f64(f64::from(event.offset) / sample_rate);
                match output.try_send(ScheduledMessage {
                    due,
                    message: event.message,
                }) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => warn!("Output queue full, dropping message"),
                    Err(TrySendError::Disconnected(_)) => {
                        warn!("Output thread gone, stopping clock");
                        break 'cycles;
                    }
                }
            }
            trace!("Cycle {} wrote {} messages", cycle, report.written);

            cycle = cycle.wrapping_add(1);
            let deadline = started + self.block_duration * cycle;
            let now = Instant::now();
            if deadline > now {
                thread::sleep(deadline - now);
            }
        }

        info!("Cycle clock stopped after {} cycles", cycle);
    }
}

pub fn run_cycle_clock(
    clock: CycleClock,
    commands: Receiver<ControlCommand>,
    output: Sender<ScheduledMessage>,
    display: SharedDisplay,
) -> JoinHandle<()> {
    thread::spawn(move || clock.run(commands, output, display))
}
