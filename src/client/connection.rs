// RPC connection to the AFE and TKO services
//
// A connection owns one JSON-RPC proxy per registered service and
// dispatches named operations to them.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::error::{ConnectionError, Result, RpcError};
use super::jsonrpc::{HttpConnector, Params, RpcConnector, RpcProxy};
use crate::config::ConfigProvider;
use crate::defaults;

/// Overrides for values otherwise taken from configuration
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    pub hostname: Option<String>,
    pub port: Option<u16>,
    /// Base RPC path (defaults to `/`)
    pub path: Option<String>,
}

impl ConnectOptions {
    pub fn new(hostname: Option<String>, port: Option<u16>) -> Self {
        Self {
            hostname,
            port,
            path: None,
        }
    }
}

/// Identity sent in the AUTHORIZATION header
pub fn auth_identity() -> String {
    std::env::var("USER").unwrap_or_else(|_| defaults::DEBUG_USER.to_string())
}

/// Connection to the RPC services of an Autotest server
pub struct Connection {
    hostname: String,
    port: u16,
    connector: Arc<dyn RpcConnector>,
    proxy: Box<dyn RpcProxy>,
    services: HashMap<String, String>,
    service_proxies: HashMap<String, Box<dyn RpcProxy>>,
    service_interface_versions: HashMap<String, Option<Value>>,
}

impl Connection {
    /// Connect to the AFE and TKO services over HTTP
    pub async fn connect(options: ConnectOptions, config: &dyn ConfigProvider) -> Result<Self> {
        let connector = HttpConnector::new(Duration::from_secs(config.get_timeout_seconds()));
        Self::connect_with(options, config, Arc::new(connector)).await
    }

    /// Connect to the AFE and TKO services through `connector`
    pub async fn connect_with(
        options: ConnectOptions,
        config: &dyn ConfigProvider,
        connector: Arc<dyn RpcConnector>,
    ) -> Result<Self> {
        let mut connection = Self::bare(options, config, connector)?;
        connection
            .add_service(defaults::AFE_SERVICE_NAME, defaults::AFE_RPC_PATH)
            .await?;
        connection
            .add_service(defaults::TKO_SERVICE_NAME, defaults::TKO_RPC_PATH)
            .await?;

        info!(
            hostname = %connection.hostname,
            port = connection.port,
            "Connected to RPC server"
        );
        Ok(connection)
    }

    /// Connection with only the base proxy and no registered services
    pub fn bare(
        options: ConnectOptions,
        config: &dyn ConfigProvider,
        connector: Arc<dyn RpcConnector>,
    ) -> Result<Self> {
        let hostname = options
            .hostname
            .unwrap_or_else(|| config.get_server_host());
        let port = options.port.unwrap_or_else(|| config.get_server_port());
        let path = options
            .path
            .unwrap_or_else(|| defaults::RPC_PATH.to_string());

        let proxy = open_proxy(connector.as_ref(), &hostname, port, &path)?;

        Ok(Self {
            hostname,
            port,
            connector,
            proxy,
            services: HashMap::new(),
            service_proxies: HashMap::new(),
            service_interface_versions: HashMap::new(),
        })
    }

    /// Register a service hosted under `path` and probe its interface version
    ///
    /// Failing to learn the version is not fatal: it is recorded as unknown.
    pub async fn add_service(&mut self, name: &str, path: &str) -> Result<()> {
        let proxy = open_proxy(self.connector.as_ref(), &self.hostname, self.port, path)?;
        self.services.insert(name.to_string(), path.to_string());
        self.service_proxies.insert(name.to_string(), proxy);

        let version = match self
            .run(name, "get_interface_version", Params::none())
            .await
        {
            Ok(version) => Some(version),
            Err(e) => {
                debug!(service = name, error = %e, "Could not probe interface version");
                None
            }
        };
        debug!(service = name, path, version = ?version, "Registered service");
        self.service_interface_versions
            .insert(name.to_string(), version);
        Ok(())
    }

    /// Run `operation` on the proxy registered for `service`
    ///
    /// Fails with [`ConnectionError::InvalidProxy`] without touching the
    /// network when `service` was never registered.
    pub async fn run(&self, service: &str, operation: &str, params: Params) -> Result<Value> {
        let proxy = self
            .service_proxies
            .get(service)
            .ok_or_else(|| ConnectionError::InvalidProxy(service.to_string()))?;

        debug!(service, operation, "Running remote operation");
        Ok(proxy.call(operation, &params).await?)
    }

    /// Check that the AFE service answers
    ///
    /// Every error, whatever its kind, counts as unreachable.
    pub async fn ping(&self) -> bool {
        match self
            .run(defaults::AFE_SERVICE_NAME, "get_server_time", Params::none())
            .await
        {
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

    /// Proxy bound to the base RPC path
    pub fn proxy(&self) -> &dyn RpcProxy {
        self.proxy.as_ref()
    }

    /// Registered service names and their paths
    pub fn services(&self) -> &HashMap<String, String> {
        &self.services
    }

    pub fn service_path(&self, name: &str) -> Option<&str> {
        self.services.get(name).map(String::as_str)
    }

    /// Interface version reported by `name`; `None` when the service is
    /// unknown or did not report one
    pub fn interface_version(&self, name: &str) -> Option<&Value> {
        self.service_interface_versions
            .get(name)
            .and_then(Option::as_ref)
    }
}

fn open_proxy(
    connector: &dyn RpcConnector,
    hostname: &str,
    port: u16,
    path: &str,
) -> Result<Box<dyn RpcProxy>> {
    let headers = vec![("AUTHORIZATION".to_string(), auth_identity())];
    let uri = format!("http://{}:{}{}", hostname, port, path);

    connector.connect(&uri, &headers).map_err(|e| match e {
        RpcError::Auth(reason) => {
            warn!(uri = %uri, reason = %reason, "Authentication setup failed");
            ConnectionError::Auth
        }
        other => other.into(),
    })
}
