use std::{env, net::SocketAddr, time::Duration};

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
pub const DEFAULT_BIND_PORT: u16 = 3000;
pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_token: String,
    pub bind_addr: String,
    pub bind_port: u16,
    pub tool_timeout: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("MCP_API_TOKEN is required and must not be empty")]
    MissingApiToken,
    #[error("BIND_PORT must be a valid u16")]
    InvalidPort,
    #[error("MCP_TOOL_TIMEOUT_SECS must be a positive integer")]
    InvalidToolTimeout,
    #[error("invalid bind address or port")]
    InvalidSocket,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_token = lookup("MCP_API_TOKEN")
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::MissingApiToken)?;

        let bind_addr = lookup("BIND_ADDR")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_port = lookup("BIND_PORT")
            .map(|value| {
                value
                    .trim()
                    .parse::<u16>()
                    .map_err(|_| ConfigError::InvalidPort)
            })
            .transpose()?
            .unwrap_or(DEFAULT_BIND_PORT);
        let tool_timeout_secs = lookup("MCP_TOOL_TIMEOUT_SECS")
            .map(|value| {
                value
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or(ConfigError::InvalidToolTimeout)
            })
            .transpose()?
            .unwrap_or(DEFAULT_TOOL_TIMEOUT_SECS);

        let config = Self {
            api_token,
            bind_addr,
            bind_port,
            tool_timeout: Duration::from_secs(tool_timeout_secs),
        };

        let _ = config.bind_socket()?;
        Ok(config)
    }

    pub fn bind_socket(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.bind_port)
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidSocket)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn parse(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn parse_defaults() {
        let config = parse(&[("MCP_API_TOKEN", "abc")]).expect("config should parse");
        assert_eq!(config.bind_addr, "127.0.0.1");
        assert_eq!(config.bind_port, 3000);
        assert_eq!(config.tool_timeout, Duration::from_secs(30));
    }

    #[test]
    fn missing_token_fails() {
        let err = parse(&[]).expect_err("expected missing token error");
        assert!(matches!(err, ConfigError::MissingApiToken));
    }

    #[test]
    fn blank_token_fails() {
        let err = parse(&[("MCP_API_TOKEN", "   ")]).expect_err("expected missing token error");
        assert!(matches!(err, ConfigError::MissingApiToken));
    }

    #[test]
    fn invalid_port_fails() {
        let err = parse(&[("MCP_API_TOKEN", "abc"), ("BIND_PORT", "70000")])
            .expect_err("expected invalid port error");
        assert!(matches!(err, ConfigError::InvalidPort));
    }

    #[test]
    fn tool_timeout_parses_when_positive() {
        let config = parse(&[("MCP_API_TOKEN", "abc"), ("MCP_TOOL_TIMEOUT_SECS", "5")])
            .expect("config should parse");
        assert_eq!(config.tool_timeout, Duration::from_secs(5));
    }

    #[test]
    fn zero_tool_timeout_fails() {
        let err = parse(&[("MCP_API_TOKEN", "abc"), ("MCP_TOOL_TIMEOUT_SECS", "0")])
            .expect_err("expected invalid timeout error");
        assert!(matches!(err, ConfigError::InvalidToolTimeout));
    }

    #[test]
    fn invalid_bind_addr_fails() {
        let err = parse(&[("MCP_API_TOKEN", "abc"), ("BIND_ADDR", "not an address")])
            .expect_err("expected invalid socket error");
        assert!(matches!(err, ConfigError::InvalidSocket));
    }
}
