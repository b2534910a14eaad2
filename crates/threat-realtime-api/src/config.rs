//! # API Configuration
//!
//! Environment-based configuration for the real-time gateway.

use std::env;
use std::net::SocketAddr;

use threat_simulator::SimulationConfig;

use crate::error::ApiError;

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub server_addr: SocketAddr,

    /// Logging level
    pub log_level: String,

    /// CORS allowed origins
    pub cors_origins: Vec<String>,

    /// Simulation engine parameters
    pub simulation: SimulationConfig,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] when the listener address is invalid.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Log filter directive, readable before the rest of the configuration
    /// so tracing can be installed first
    pub fn log_level_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> String {
        lookup("LOG_LEVEL")
            .map(|level| level.trim().to_string())
            .filter(|level| !level.is_empty())
            .unwrap_or_else(|| "info".to_string())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] when the listener address is invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let host = lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = lookup("PORT")
            .and_then(|v| v.trim().parse::<u16>().ok())
            .unwrap_or(3001);
        let server_addr = format!("{host}:{port}")
            .parse()
            .map_err(|e| ApiError::Config(format!("invalid listener address {host}:{port}: {e}")))?;

        Ok(Self {
            server_addr,

            log_level: Self::log_level_from_lookup(&lookup),

            cors_origins: lookup("CORS_ORIGINS")
                .unwrap_or_else(|| "*".to_string())
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),

            simulation: SimulationConfig::from_lookup(&lookup),
        })
    }

    /// Whether any origin is allowed
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == "*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.server_addr, "0.0.0.0:3001".parse().unwrap());
        assert_eq!(config.log_level, "info");
        assert!(config.allows_any_origin());
        assert_eq!(config.simulation, SimulationConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(|key| match key {
            "SERVER_HOST" => Some("127.0.0.1".into()),
            "PORT" => Some("8088".into()),
            "CORS_ORIGINS" => Some("http://localhost:5173, http://radar.local".into()),
            "WARMUP_DELAY_MS" => Some("5000".into()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.server_addr, "127.0.0.1:8088".parse().unwrap());
        assert_eq!(config.cors_origins, vec!["http://localhost:5173", "http://radar.local"]);
        assert!(!config.allows_any_origin());
        assert_eq!(config.simulation.warmup_delay_ms, 5000);
    }

    #[test]
    fn test_log_level_readable_ahead_of_config() {
        assert_eq!(Config::log_level_from_lookup(|_| None), "info");
        assert_eq!(Config::log_level_from_lookup(|_| Some("  ".into())), "info");

        let lookup = |key: &str| (key == "LOG_LEVEL").then(|| "threat_simulator=debug".to_string());
        assert_eq!(Config::log_level_from_lookup(lookup), "threat_simulator=debug");
        assert_eq!(Config::from_lookup(lookup).unwrap().log_level, "threat_simulator=debug");
    }

    #[test]
    fn test_invalid_host_is_an_error() {
        let result = Config::from_lookup(|key| (key == "SERVER_HOST").then(|| "not a host".into()));
        assert!(matches!(result, Err(ApiError::Config(_))));
    }
}
