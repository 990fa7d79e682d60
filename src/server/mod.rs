// Server facade
//
// Typed access to the server-wide AFE operations the CLI needs.

mod types;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::{Connection, ConnectionError, Params, Result, RpcError};
use crate::defaults;

pub use types::{Profile, ServerStatus};

/// Server-level queries, independent of how they reach the server
#[async_trait]
pub trait ServerApi: Send + Sync {
    async fn get_status(&self) -> Result<ServerStatus>;
    async fn get_profiles(&self) -> Result<Vec<Profile>>;
}

#[async_trait]
impl ServerApi for Connection {
    async fn get_status(&self) -> Result<ServerStatus> {
        let value = self
            .run(defaults::AFE_SERVICE_NAME, "get_server_status", Params::none())
            .await?;
        decode("get_server_status", value)
    }

    async fn get_profiles(&self) -> Result<Vec<Profile>> {
        let value = self
            .run(defaults::AFE_SERVICE_NAME, "get_profiles", Params::none())
            .await?;
        decode("get_profiles", value)
    }
}

/// Fetch the server status through `connection`
pub async fn get_status(connection: &Connection) -> Result<ServerStatus> {
    connection.get_status().await
}

/// Fetch the installation profiles through `connection`
pub async fn get_profiles(connection: &Connection) -> Result<Vec<Profile>> {
    connection.get_profiles().await
}

fn decode<T: DeserializeOwned>(operation: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| {
        ConnectionError::Rpc(RpcError::InvalidResponse(format!(
            "unexpected {} result: {}",
            operation, e
        )))
    })
}
