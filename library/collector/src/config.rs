use std::env;

use cyclic_system::time::Duration;

use thiserror::Error;

/// Occurs when a [`CollectorConfig`] is built from invalid values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: '{value}'")]
    InvalidValue { var: &'static str, value: String },
    #[error("the scan tick threshold must be greater than zero")]
    ZeroTickThreshold,
}

/// Tuning knobs for a [`CycleCollector`](crate::CycleCollector)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorConfig {
    /// A scan is only considered once more than this many rendezvous calls have
    /// happened since the last one
    pub tick_threshold: u32,
    /// A scan is only requested once more than this much time has passed since the last one
    pub scan_interval: Duration,
    /// When set, the first worker to register never runs an opportunistic
    /// collection pass, as it is assumed to be latency-sensitive (e.g. a UI thread)
    pub spare_first_worker: bool,
}
impl CollectorConfig {
    pub const DEFAULT_TICK_THRESHOLD: u32 = 10;
    pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_millis(10);

    pub const ENV_TICK_THRESHOLD: &'static str = "CYCLIC_SCAN_TICKS";
    pub const ENV_SCAN_INTERVAL_US: &'static str = "CYCLIC_SCAN_INTERVAL_US";
    pub const ENV_SPARE_FIRST_WORKER: &'static str = "CYCLIC_SPARE_FIRST_WORKER";

    pub fn with_tick_threshold(mut self, ticks: u32) -> Self {
        self.tick_threshold = ticks;
        self
    }

    pub fn with_scan_interval(mut self, interval: Duration) -> Self {
        self.scan_interval = interval;
        self
    }

    pub fn with_spare_first_worker(mut self, enabled: bool) -> Self {
        self.spare_first_worker = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_threshold == 0 {
            return Err(ConfigError::ZeroTickThreshold);
        }
        Ok(())
    }

    /// Builds a configuration from the defaults, overridden by any of the
    /// `CYCLIC_*` environment variables which are set
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(value) = lookup(Self::ENV_TICK_THRESHOLD) {
            config.tick_threshold = parse(Self::ENV_TICK_THRESHOLD, value)?;
        }
        if let Some(value) = lookup(Self::ENV_SCAN_INTERVAL_US) {
            config.scan_interval =
                Duration::from_micros(parse(Self::ENV_SCAN_INTERVAL_US, value)?);
        }
        if let Some(value) = lookup(Self::ENV_SPARE_FIRST_WORKER) {
            let enabled = match value.trim() {
                "1" | "true" | "yes" => Some(true),
                "0" | "false" | "no" => Some(false),
                _ => None,
            };
            config.spare_first_worker = enabled.ok_or(ConfigError::InvalidValue {
                var: Self::ENV_SPARE_FIRST_WORKER,
                value,
            })?;
        }
        config.validate()?;
        Ok(config)
    }
}
impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            tick_threshold: Self::DEFAULT_TICK_THRESHOLD,
            scan_interval: Self::DEFAULT_SCAN_INTERVAL,
            spare_first_worker: false,
        }
    }
}

fn parse<T: core::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { var, value })
}
