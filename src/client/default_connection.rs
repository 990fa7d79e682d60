// Process-wide default connection
//
// Built from configuration on first use and shared afterwards. Callers
// own the handle and pass it around explicitly.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

use super::connection::{ConnectOptions, Connection};
use super::error::Result;
use super::jsonrpc::{HttpConnector, RpcConnector};
use crate::config::ConfigProvider;

pub struct DefaultConnection {
    config: Box<dyn ConfigProvider>,
    options: ConnectOptions,
    connector: Arc<dyn RpcConnector>,
    cell: OnceCell<Connection>,
}

impl DefaultConnection {
    pub fn new(config: impl ConfigProvider + 'static, options: ConnectOptions) -> Self {
        let connector = HttpConnector::new(Duration::from_secs(config.get_timeout_seconds()));
        Self::with_connector(config, options, Arc::new(connector))
    }

    pub fn with_connector(
        config: impl ConfigProvider + 'static,
        options: ConnectOptions,
        connector: Arc<dyn RpcConnector>,
    ) -> Self {
        Self {
            config: Box::new(config),
            options,
            connector,
            cell: OnceCell::new(),
        }
    }

    /// The shared connection, connecting on first call
    ///
    /// A failed attempt leaves the handle empty so the next call retries.
    pub async fn get(&self) -> Result<&Connection> {
        self.cell
            .get_or_try_init(|| {
                Connection::connect_with(
                    self.options.clone(),
                    self.config.as_ref(),
                    self.connector.clone(),
                )
            })
            .await
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::connection::tests::MockConnector;
    use crate::config::Config;

    #[tokio::test]
    async fn test_same_instance_on_repeated_calls() {
        let connector = MockConnector::default();
        let calls = connector.calls.clone();
        let handle = DefaultConnection::with_connector(
            Config::default(),
            ConnectOptions::default(),
            Arc::new(connector),
        );
        assert!(!handle.is_initialized());

        let first = handle.get().await.unwrap();
        let connects = calls.lock().unwrap().len();
        let second = handle.get().await.unwrap();

        assert!(std::ptr::eq(first, second));
        assert!(handle.is_initialized());
        assert_eq!(calls.lock().unwrap().len(), connects);
    }

    #[tokio::test]
    async fn test_failed_connect_is_not_cached() {
        let connector = MockConnector {
            auth_fails: true,
            ..Default::default()
        };
        let handle = DefaultConnection::with_connector(
            Config::default(),
            ConnectOptions::default(),
            Arc::new(connector),
        );

        assert!(handle.get().await.is_err());
        assert!(!handle.is_initialized());
    }
}
