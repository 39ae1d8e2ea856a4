use crate::transport::ControlInputs;
use crossbeam::channel::Sender;
use log::{info, warn};
use std::io::{self, BufRead};
use std::thread::{self, JoinHandle};

/// Commands accepted on the control input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlCommand {
    Play,
    Stop,
    Rewind,
    Rate(i32),
    Zero(f32),
    Sync(bool),
    Quit,
}

pub fn parse_command(line: &str) -> Option<ControlCommand> {
    let mut words = line.split_whitespace();
    let command = words.next()?.to_ascii_lowercase();
    let argument = words.next();

    match (command.as_str(), argument) {
        ("play" | "start" | "p", None) => Some(ControlCommand::Play),
        ("stop" | "s", None) => Some(ControlCommand::Stop),
        ("rewind" | "r", None) => Some(ControlCommand::Rewind),
        ("rate", Some(value)) => match value.parse::<i32>() {
            Ok(rate) if (0..=3).contains(&rate) => Some(ControlCommand::Rate(rate)),
            _ => None,
        },
        ("zero", Some(value)) => value
            .parse::<f32>()
            .ok()
            .filter(|seconds| seconds.is_finite() && *seconds >= 0.0)
            .map(ControlCommand::Zero),
        ("sync", Some("on")) => Some(ControlCommand::Sync(true)),
        ("sync", Some("off")) => Some(ControlCommand::Sync(false)),
        ("quit" | "q" | "exit", None) => Some(ControlCommand::Quit),
        _ => None,
    }
}

impl ControlCommand {
    /// Applies the command to the control values. Returns `false` for `Quit`.
    pub fn apply(self, inputs: &mut ControlInputs) -> bool {
        match self {
            ControlCommand::Play => inputs.transport_on = 1.0,
            ControlCommand::Stop => inputs.transport_on = 0.0,
            ControlCommand::Rewind => inputs.rewind_trigger = 1.0,
            ControlCommand::Rate(rate) => inputs.rate_selector = rate as f32,
            ControlCommand::Zero(seconds) => inputs.zero_position = seconds,
            ControlCommand::Sync(on) => inputs.sync_to_host = if on { 1.0 } else { 0.0 },
            ControlCommand::Quit => return false,
        }
        true
    }
}

/// Reads commands from stdin, one per line, until `quit` or end of input.
pub fn run_command_reader(tx: Sender<ControlCommand>) -> JoinHandle<()> {
    thread::spawn(move || {
        info!("Command reader started");
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match parse_command(&line) {
                Some(command) => {
                    info!("Command: {:?}", command);
                    let quit = command == ControlCommand::Quit;
                    if tx.send(command).is_err() || quit {
                        break;
                    }
                }
                None => {
                    warn!("Unknown command: {}", line.trim());
                    eprintln!("Commands: play, stop, rewind, rate <0-3>, zero <seconds>, sync on|off, quit");
                }
            }
        }
        let _ = tx.send(ControlCommand::Quit);
    })
}
