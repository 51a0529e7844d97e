use crate::session::DEFAULT_UPDATE_INTERVAL;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("tick rate must be at least 1 tick per second")]
    ZeroTickRate,
    #[error("update interval must be at least 1 tick")]
    ZeroUpdateInterval,
    #[error("server must accept at least one client")]
    ZeroClients,
}

/// Settings for the demo sidebar server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Game ticks per second
    pub tick_rate: u32,
    /// Ticks between scoreboard updates
    pub update_interval: u64,
    pub max_clients: usize,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        if self.update_interval == 0 {
            return Err(ConfigError::ZeroUpdateInterval);
        }
        if self.max_clients == 0 {
            return Err(ConfigError::ZeroClients);
        }
        Ok(())
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Wall-clock length of one tick
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate.max(1) as f64)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            tick_rate: 20,
            update_interval: DEFAULT_UPDATE_INTERVAL,
            max_clients: 16,
        }
    }
}
