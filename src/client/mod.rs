// Connection layer for the Autotest server
//
// Two flavours: `Connection` speaks JSON-RPC to the AFE/TKO services,
// `HttpConnection` talks to the newer HTTP API.

mod connection;
mod default_connection;
mod error;
mod http_connection;
pub mod jsonrpc;

pub use connection::{auth_identity, ConnectOptions, Connection};
pub use default_connection::DefaultConnection;
pub use error::{ConnectionError, Result, RpcError};
pub use http_connection::{parse_version, HttpConnectOptions, HttpConnection};
pub use jsonrpc::{HttpConnector, Params, RpcConnector, RpcProxy, ServiceProxy};

#[cfg(test)]
pub(crate) use connection::tests as connection_tests;

use async_trait::async_trait;

/// Best-effort reachability check shared by both connection flavours
#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// `true` when the server answered; never fails
    async fn ping(&self) -> bool;
}

#[async_trait]
impl HealthCheck for Connection {
    async fn ping(&self) -> bool {
        Connection::ping(self).await
    }
}

#[async_trait]
impl HealthCheck for HttpConnection {
    async fn ping(&self) -> bool {
        HttpConnection::ping(self).await
    }
}
