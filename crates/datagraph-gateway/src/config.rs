//! Configuration for the graph gateway
//!
//! Values come from environment variables, with a `.env` file honoured when present.

use std::env;
use std::net::SocketAddr;
use tracing::warn;

/// Gateway server configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Host to bind to
    pub bind_address: String,
    /// Port to listen on
    pub port: u16,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
    #[cfg(feature = "adapters")]
    pub neo4j: crate::adapters::Neo4jConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
            log_level: DEFAULT_LOG_FILTER.to_string(),
            #[cfg(feature = "adapters")]
            neo4j: crate::adapters::Neo4jConfig::default(),
        }
    }
}

const DEFAULT_LOG_FILTER: &str = "info,datagraph_gateway=debug";

fn log_filter_or_default(value: Option<String>) -> String {
    match value {
        Some(filter) if !filter.trim().is_empty() => filter,
        _ => DEFAULT_LOG_FILTER.to_string(),
    }
}

impl GatewayConfig {
    /// Log filter from `LOG_LEVEL`, read on its own so tracing can be
    /// initialised before the rest of the configuration is parsed.
    pub fn log_filter() -> String {
        dotenv::dotenv().ok();
        log_filter_or_default(env::var("LOG_LEVEL").ok())
    }

    /// Load configuration from environment variables.
    /// Invalid values are logged and replaced by defaults.
    pub fn load() -> Self {
        dotenv::dotenv().ok();

        let mut config = Self::default();

        if let Ok(host) = env::var("SERVER_HOST") {
            config.bind_address = host;
        }

        if let Ok(port) = env::var("SERVER_PORT") {
            match port.parse::<u16>() {
                Ok(port) => config.port = port,
                Err(_) => warn!("Invalid SERVER_PORT value: {}", port),
            }
        }

        config.log_level = log_filter_or_default(env::var("LOG_LEVEL").ok());

        #[cfg(feature = "adapters")]
        {
            config.neo4j = crate::adapters::Neo4jConfig::from_env();
        }

        config
    }

    /// Socket address the server listens on
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.bind_address, self.port).parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_socket_addr() {
        let config = GatewayConfig::default();
        assert_eq!(config.socket_addr().unwrap().port(), 3000);
    }

    #[test]
    fn test_log_filter_falls_back_to_default() {
        assert_eq!(log_filter_or_default(None), DEFAULT_LOG_FILTER);
        assert_eq!(log_filter_or_default(Some("  ".to_string())), DEFAULT_LOG_FILTER);
        assert_eq!(log_filter_or_default(Some("warn".to_string())), "warn");
    }

    #[test]
    fn test_invalid_bind_address() {
        let config = GatewayConfig {
            bind_address: "not an address".to_string(),
            ..GatewayConfig::default()
        };
        assert!(config.socket_addr().is_err());
    }
}
