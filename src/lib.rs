// Arc - Autotest RPC client
// Library exports

pub mod cli;
pub mod client; // RPC and HTTP connections
pub mod config;
pub mod defaults;
pub mod errors;
pub mod server; // Server-wide AFE queries
