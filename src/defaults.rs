// Default values shared by the connection layer and the CLI

/// Server host used when neither the config file nor the command line set one
pub const SERVER_HOST: &str = "localhost";

/// Server port used when neither the config file nor the command line set one
pub const SERVER_PORT: u16 = 80;

/// Base path of the RPC proxy; nothing is served here on a stock server
pub const RPC_PATH: &str = "/";

pub const AFE_SERVICE_NAME: &str = "afe";
pub const AFE_RPC_PATH: &str = "/afe/server/rpc/";

pub const TKO_SERVICE_NAME: &str = "tko";
pub const TKO_RPC_PATH: &str = "/new_tko/server/rpc/";

/// Identity sent in the AUTHORIZATION header when $USER is not set
pub const DEBUG_USER: &str = "debug_user";

/// Oldest HTTP server API this client can talk to
pub const MIN_SERVER_VERSION: (u32, u32, u32) = (0, 1, 0);

/// HTTP endpoint reporting the server API version
pub const VERSION_PATH: &str = "version";

/// Request timeout in seconds
pub const TIMEOUT_SECONDS: u64 = 30;

/// Placeholder the install server pads its profile list with
pub const PROFILE_PLACEHOLDER: &str = "N/A";
