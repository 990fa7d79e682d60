// Error types for the RPC and HTTP connection layer

use serde_json::Value;
use thiserror::Error;

/// Failures reported by the JSON-RPC transport
#[derive(Debug, Error)]
pub enum RpcError {
    /// The server refused our credentials, or the AUTHORIZATION header
    /// could not be built in the first place
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The remote method ran and reported an error
    #[error("remote error {code}: {message}")]
    Remote {
        code: i64,
        message: String,
        data: Option<Value>,
    },

    #[error("invalid JSON-RPC response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors surfaced to users of a connection
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("authentication with the server failed")]
    Auth,

    /// `run` targeted a service that was never registered
    #[error("no proxy registered for service '{0}'")]
    InvalidProxy(String),

    #[error("invalid connection: {0}")]
    InvalidConnection(String),

    #[error("server version {} is older than the minimum {}.{}.{}",
        found.as_deref().unwrap_or("<unknown>"), minimum.0, minimum.1, minimum.2)]
    InvalidServerVersion {
        found: Option<String>,
        minimum: (u32, u32, u32),
    },

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type Result<T, E = ConnectionError> = std::result::Result<T, E>;
