// config.rs

use crate::cli::Args;
use crate::engine::EngineError;
use log::{debug, info};
use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::path::Path;

pub const DEFAULT_SAMPLE_RATE: f64 = 48000.0;
pub const DEFAULT_BLOCK_SIZE: u32 = 512;
pub const DEFAULT_JITTER_TOLERANCE: i64 = 2;
pub const DEFAULT_EVENT_CAPACITY: usize = 64;
pub const DEFAULT_CONFIG_FILE: &str = "mtcgen.toml";
pub const ENV_PREFIX: &str = "MTCGEN";

/// Settings fixed for the lifetime of an engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f64,
    /// Largest host/prediction mismatch (in samples) treated as interpolation
    /// jitter rather than a locate.
    pub jitter_tolerance: i64,
    /// Minimum number of events an engine-sized buffer can hold.
    pub event_capacity: usize,
}

impl EngineConfig {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            jitter_tolerance: DEFAULT_JITTER_TOLERANCE,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    pub fn with_jitter_tolerance(mut self, samples: i64) -> Self {
        self.jitter_tolerance = samples;
        self
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(EngineError::InvalidSampleRate(self.sample_rate));
        }
        if self.event_capacity == 0 {
            return Err(EngineError::ZeroEventCapacity);
        }
        if self.jitter_tolerance < 0 {
            return Err(EngineError::NegativeJitterTolerance(self.jitter_tolerance));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}

#[derive(Debug)]
pub enum SettingsError {
    /// Error reading or deserializing a configuration source
    Load(config::ConfigError),
    /// A value outside its allowed range
    Invalid(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Load(err) => write!(f, "Configuration error: {}", err),
            SettingsError::Invalid(msg) => write!(f, "Invalid setting: {}", msg),
        }
    }
}

impl Error for SettingsError {}

impl From<config::ConfigError> for SettingsError {
    fn from(err: config::ConfigError) -> Self {
        SettingsError::Load(err)
    }
}

/// Runtime settings of the generator binary.
///
/// Layered from lowest to highest priority: built-in defaults, the TOML
/// configuration file, `MTCGEN_*` environment variables, command line flags.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sample_rate: f64,
    pub block_size: u32,
    /// Rate selector, 0..=3
    pub rate: i32,
    /// Rewind target in seconds
    pub zero_position: f32,
    pub jitter_tolerance: i64,
    pub output_device: Option<String>,
    /// When set, a simulated host transport runs at this speed and the
    /// generator follows it.
    pub host_speed: Option<f32>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            sample_rate: DEFAULT_SAMPLE_RATE,
            block_size: DEFAULT_BLOCK_SIZE,
            rate: 3,
            zero_position: 0.0,
            jitter_tolerance: DEFAULT_JITTER_TOLERANCE,
            output_device: None,
            host_speed: None,
        }
    }
}

impl Settings {
    /// Loads settings from `path` (required) or from the default file in
    /// the working directory (optional), then from the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
        };

        let settings: Settings = config::Config::builder()
            .add_source(file)
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    /// Loads settings and applies the command line on top.
    pub fn from_args(args: &Args) -> Result<Self, SettingsError> {
        let mut settings = Self::load(args.config.as_deref())?;
        settings.apply_args(args);
        settings.validate()?;
        Ok(settings)
    }

    pub fn apply_args(&mut self, args: &Args) {
        if let Some(sample_rate) = args.sample_rate {
            self.sample_rate = sample_rate;
        }
        if let Some(block_size) = args.block_size {
            self.block_size = block_size;
        }
        if let Some(rate) = args.rate {
            self.rate = rate;
        }
        if let Some(zero_position) = args.zero_position {
            self.zero_position = zero_position;
        }
        if let Some(tolerance) = args.jitter_tolerance {
            self.jitter_tolerance = tolerance;
        }
        if let Some(device) = &args.output_device {
            self.output_device = Some(device.clone());
        }
        if let Some(speed) = args.host_speed {
            info!("Simulating host transport at speed {}", speed);
            self.host_speed = Some(speed);
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.block_size == 0 {
            return Err(SettingsError::Invalid("block size must be at least 1".into()));
        }
        if !(0..=3).contains(&self.rate) {
            return Err(SettingsError::Invalid(format!(
                "rate selector {} is not one of 0 (24), 1 (25), 2 (29.97 drop), 3 (30)",
                self.rate
            )));
        }
        if let Some(speed) = self.host_speed {
            if !speed.is_finite() {
                return Err(SettingsError::Invalid("host speed must be finite".into()));
            }
        }
        self.engine_config()
            .validate()
            .map_err(|e| SettingsError::Invalid(e.to_string()))
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new(self.sample_rate).with_jitter_tolerance(self.jitter_tolerance)
    }

    /// Wall-clock duration of one processing cycle.
    pub fn block_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(f64::from(self.block_size) / self.sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_engine_config_validation() {
        assert!(EngineConfig::default().validate().is_ok());
        assert_eq!(
            EngineConfig::new(-1.0).validate(),
            Err(EngineError::InvalidSampleRate(-1.0))
        );
        assert_eq!(
            EngineConfig::default().with_jitter_tolerance(-3).validate(),
            Err(EngineError::NegativeJitterTolerance(-3))
        );
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("mtcgen-settings-{}.toml", std::process::id()));
        fs::write(&path, "sample_rate = 44100.0\nrate = 1\nhost_speed = -1.0\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(settings.sample_rate, 44100.0);
        assert_eq!(settings.rate, 1);
        assert_eq!(settings.host_speed, Some(-1.0));
        assert_eq!(settings.block_size, DEFAULT_BLOCK_SIZE);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let path = std::env::temp_dir().join("mtcgen-does-not-exist.toml");
        assert!(matches!(Settings::load(Some(&path)), Err(SettingsError::Load(_))));
    }

    #[test]
    fn test_validate_rejects_bad_rate() {
        let settings = Settings {
            rate: 7,
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));
    }

    #[test]
    fn test_block_duration() {
        let settings = Settings::default();
        let micros = settings.block_duration().as_micros();
        assert_eq!(micros, 10_666);
    }
}
