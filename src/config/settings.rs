// Configuration structs

use serde::Deserialize;

use crate::defaults;

/// Where the Autotest server lives and who talks to it
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Server hostname or IP address
    #[serde(default)]
    pub host: Option<String>,

    /// Server port
    #[serde(default)]
    pub port: Option<u16>,

    /// Username for the HTTP API
    #[serde(default)]
    pub username: Option<String>,

    /// Password for the HTTP API (basic auth is only sent when both are set)
    #[serde(default)]
    pub password: Option<String>,

    /// Request timeout in seconds
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
}

/// Source of connection defaults
///
/// Connections only ever ask for these values, so tests can hand in
/// anything that answers them.
pub trait ConfigProvider: Send + Sync {
    fn get_server_host(&self) -> String;
    fn get_server_port(&self) -> u16;
    fn get_username(&self) -> Option<String>;

    fn get_password(&self) -> Option<String> {
        None
    }

    fn get_timeout_seconds(&self) -> u64 {
        defaults::TIMEOUT_SECONDS
    }
}

impl Config {
    pub fn with_server(host: impl Into<String>, port: u16) -> Self {
        Self {
            server: ServerConfig {
                host: Some(host.into()),
                port: Some(port),
                ..ServerConfig::default()
            },
        }
    }
}

impl ConfigProvider for Config {
    fn get_server_host(&self) -> String {
        self.server
            .host
            .clone()
            .unwrap_or_else(|| defaults::SERVER_HOST.to_string())
    }

    fn get_server_port(&self) -> u16 {
        self.server.port.unwrap_or(defaults::SERVER_PORT)
    }

    fn get_username(&self) -> Option<String> {
        self.server.username.clone()
    }

    fn get_password(&self) -> Option<String> {
        self.server.password.clone()
    }

    fn get_timeout_seconds(&self) -> u64 {
        self.server
            .timeout_seconds
            .unwrap_or(defaults::TIMEOUT_SECONDS)
    }
}
