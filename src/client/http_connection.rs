// HTTP connection to the newer server API
//
// Unlike the RPC connection, this one talks plain HTTP and refuses to
// come up against a server older than defaults::MIN_SERVER_VERSION.

use reqwest::{Client, Method, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::error::{ConnectionError, Result};
use crate::config::ConfigProvider;
use crate::defaults;

/// Overrides for values otherwise taken from configuration
#[derive(Debug, Clone, Default)]
pub struct HttpConnectOptions {
    pub hostname: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Parse a `major.minor.release` version string
pub fn parse_version(version: &str) -> Option<(u32, u32, u32)> {
    let mut parts = version.trim().split('.').map(|p| p.parse::<u32>().ok());
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(Some(major)), Some(Some(minor)), Some(Some(release)), None) => {
            Some((major, minor, release))
        }
        _ => None,
    }
}

fn meets_minimum(version: Option<&str>) -> bool {
    version
        .and_then(parse_version)
        .map_or(false, |v| v >= defaults::MIN_SERVER_VERSION)
}

pub struct HttpConnection {
    hostname: String,
    port: u16,
    username: Option<String>,
    password: Option<String>,
    client: Client,
}

impl HttpConnection {
    /// Connect and verify the server API version
    pub async fn connect(options: HttpConnectOptions, config: &dyn ConfigProvider) -> Result<Self> {
        let connection = Self::without_version_check(options, config)?;

        let found = connection.fetch_version().await?;
        if !meets_minimum(found.as_deref()) {
            warn!(version = ?found, "Server API version is too old");
            return Err(ConnectionError::InvalidServerVersion {
                found,
                minimum: defaults::MIN_SERVER_VERSION,
            });
        }

        info!(
            hostname = %connection.hostname,
            port = connection.port,
            version = ?found,
            "Connected to HTTP server"
        );
        Ok(connection)
    }

    /// Build the connection without contacting the server
    pub fn without_version_check(
        options: HttpConnectOptions,
        config: &dyn ConfigProvider,
    ) -> Result<Self> {
        let hostname = options
            .hostname
            .unwrap_or_else(|| config.get_server_host());
        if hostname.trim().is_empty() {
            return Err(ConnectionError::InvalidConnection(
                "no server hostname configured".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.get_timeout_seconds()))
            .build()?;

        Ok(Self {
            hostname,
            port: options.port.unwrap_or_else(|| config.get_server_port()),
            username: options.username.or_else(|| config.get_username()),
            password: options.password.or_else(|| config.get_password()),
            client,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!(
            "http://{}:{}/{}",
            self.hostname,
            self.port,
            path.trim_start_matches('/')
        )
    }

    /// Send a request to `path` and hand back the raw response
    ///
    /// `method` defaults to GET. Basic auth is used only when both a
    /// username and a password are known.
    pub async fn run(
        &self,
        path: &str,
        method: Option<Method>,
        data: Option<&Value>,
    ) -> Result<Response> {
        let method = method.unwrap_or(Method::GET);
        let url = self.url(path);
        debug!(method = %method, url = %url, "Sending HTTP request");

        let mut request = self.client.request(method, &url);
        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            request = request.basic_auth(username, Some(password));
        }
        if let Some(data) = data {
            request = request.json(data);
        }

        Ok(request.send().await?)
    }

    /// Version string reported by the server, if any
    pub async fn fetch_version(&self) -> Result<Option<String>> {
        let response = self.run(defaults::VERSION_PATH, None, None).await?;
        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) if e.is_decode() => {
                debug!(error = %e, "Version endpoint did not return JSON");
                Value::Null
            }
            Err(e) => return Err(e.into()),
        };

        Ok(body
            .get("version")
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    /// Whether the server is at least defaults::MIN_SERVER_VERSION
    ///
    /// A missing or unparseable version counts as too old.
    pub async fn check_min_version(&self) -> Result<bool> {
        Ok(meets_minimum(self.fetch_version().await?.as_deref()))
    }

    /// Check that the server answers at all
    ///
    /// Any error, whatever its kind, counts as unreachable.
    pub async fn ping(&self) -> bool {
        match self.run(defaults::VERSION_PATH, None, None).await {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "Ping failed");
                false
            }
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}
