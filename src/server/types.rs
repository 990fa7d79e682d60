// Records returned by the AFE server facade

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Operational flags reported by `get_server_status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerStatus {
    /// Whether anything on the server needs attention
    pub concerns: bool,
    pub scheduler_running: bool,
    pub scheduler_watcher_running: bool,
    pub install_server_running: bool,
    /// Disk usage of the results/log partition, in percent
    pub used_space_logs: Number,
}

/// An installation profile known to the install server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: Map::new(),
        }
    }
}
