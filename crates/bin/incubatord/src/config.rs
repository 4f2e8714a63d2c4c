//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `incubator.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use incubator_adapter_serial::SerialConfig;
use incubator_adapter_simulated::SimulationConfig;
use incubator_app::ingestion::SourceFallback;
use incubator_app::supervisor::SupervisorSettings;
use incubator_domain::profile::{EggProfile, Setpoints, Species};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Serial link to the controller board.
    pub serial: SerialConfig,
    /// Simulated readings used when the serial sensor is unavailable.
    pub simulation: SimulationConfig,
    /// Control loop and background task settings.
    pub control: ControlConfig,
    /// Setpoints written over the stored profiles at startup.
    pub profiles: Vec<ProfileOverride>,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Control settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Automatic loop poll interval, in milliseconds.
    pub tick_ms: u64,
    /// How long leaving automatic mode may wait for the loop, in milliseconds.
    pub shutdown_timeout_ms: u64,
    /// Telemetry sampling interval, in milliseconds.
    pub telemetry_interval_ms: u64,
    /// What to do when the serial sensor cannot be opened.
    pub fallback: SourceFallback,
    /// Species selected at startup.
    pub species: Option<Species>,
}

/// Stored setpoints to replace for one species.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProfileOverride {
    pub species: Species,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

impl ProfileOverride {
    #[must_use]
    pub fn to_profile(&self) -> EggProfile {
        EggProfile::new(
            self.species,
            Setpoints {
                temperature: self.temperature,
                humidity: self.humidity,
            },
        )
    }
}

impl Config {
    /// Load configuration from `incubator.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, if an
    /// override cannot be parsed, or if validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("incubator.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(val) = var("INCUBATOR_HOST") {
            self.server.host = val;
        }
        if let Some(port) = var("INCUBATOR_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some((host, port)) = var("INCUBATOR_BIND")
            .as_deref()
            .and_then(|val| val.rsplit_once(':'))
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = var("INCUBATOR_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = var("INCUBATOR_SERIAL_PORT") {
            self.serial.port = val;
        }
        if let Some(val) = var("INCUBATOR_FALLBACK") {
            self.control.fallback = match val.trim().to_ascii_lowercase().as_str() {
                "simulate" => SourceFallback::Simulate,
                "shutdown" => SourceFallback::Shutdown,
                _ => {
                    return Err(ConfigError::Validation(format!(
                        "unknown fallback {val:?}, expected \"simulate\" or \"shutdown\""
                    )));
                }
            };
        }
        if let Some(val) = var("INCUBATOR_SPECIES") {
            let species = val
                .parse()
                .map_err(|err: incubator_domain::error::ValidationError| {
                    ConfigError::Validation(err.to_string())
                })?;
            self.control.species = Some(species);
        }
        if let Some(val) = var("INCUBATOR_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        self.serial
            .validate()
            .and_then(|()| self.simulation.validate())
            .map_err(|err| ConfigError::Validation(err.to_string()))?;

        for (name, value) in [
            ("control.tick_ms", self.control.tick_ms),
            ("control.shutdown_timeout_ms", self.control.shutdown_timeout_ms),
            (
                "control.telemetry_interval_ms",
                self.control.telemetry_interval_ms,
            ),
        ] {
            if value == 0 {
                return Err(ConfigError::Validation(format!("{name} must be non-zero")));
            }
        }

        for profile in &self.profiles {
            let finite = [profile.temperature, profile.humidity]
                .into_iter()
                .flatten()
                .all(f64::is_finite);
            if !finite {
                return Err(ConfigError::Validation(format!(
                    "setpoints for {} must be finite numbers",
                    profile.species
                )));
            }
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }
}

impl ControlConfig {
    #[must_use]
    pub fn supervisor_settings(&self) -> SupervisorSettings {
        SupervisorSettings {
            tick: Duration::from_millis(self.tick_ms),
            shutdown_timeout: Duration::from_millis(self.shutdown_timeout_ms),
        }
    }

    #[must_use]
    pub fn telemetry_interval(&self) -> Duration {
        Duration::from_millis(self.telemetry_interval_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:incubator.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "incubatord=info,incubator=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            tick_ms: 1000,
            shutdown_timeout_ms: 2000,
            telemetry_interval_ms: 4000,
            fallback: SourceFallback::Simulate,
            species: None,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
