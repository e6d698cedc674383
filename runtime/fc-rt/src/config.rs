use log::LevelFilter;

/// Environment variable selecting the log level.
pub const LOG_ENV: &str = "FC_RT_LOG";

/// Environment variable that, set to `1`, silences the direct fault line.
pub const FAULT_QUIET_ENV: &str = "FC_RT_FAULT_QUIET";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}={0:?}: expected one of off, error, warn, info, debug, trace", var = LOG_ENV)]
    InvalidLogLevel(String),
    #[error("{var}={0:?}: expected 0 or 1", var = FAULT_QUIET_ENV)]
    InvalidFlag(String),
}

/// Process-wide runtime settings.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Most verbose level the installed logger lets through.
    pub log_level: LevelFilter,
    /// Suppress the direct standard-error line written on a fault.
    pub fault_quiet: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_level: LevelFilter::Warn,
            fault_quiet: false,
        }
    }
}

impl RuntimeConfig {
    /// Read [`LOG_ENV`] and [`FAULT_QUIET_ENV`]; unset variables keep their defaults.
    ///
    /// # Errors
    /// A variable is set to a value it does not accept.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// As [`from_env`](Self::from_env), reading variables through `lookup`.
    ///
    /// # Errors
    /// A variable is set to a value it does not accept.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(LOG_ENV) {
            config.log_level = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidLogLevel(value))?;
        }

        if let Some(value) = lookup(FAULT_QUIET_ENV) {
            config.fault_quiet = match value.trim() {
                "1" => true,
                "0" | "" => false,
                _ => return Err(ConfigError::InvalidFlag(value)),
            };
        }

        Ok(config)
    }
}
