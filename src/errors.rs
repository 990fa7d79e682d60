// User-friendly error messages
//
// Turns connection failures into messages that tell the user what to
// check next.

use crate::client::{ConnectionError, RpcError};

/// Format a connection refused error with helpful suggestions
pub fn connection_refused_error(address: &str) -> String {
    format!(
        "Could not connect to the Autotest server at {}\n\n\
        \x1b[1;33mPossible causes:\x1b[0m\n\
        • Server is down or not reachable from this host\n\
        • Wrong host or port\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        1. Check the configured server:\n\
           \x1b[36mcat ~/.arc/config.toml\x1b[0m\n\n\
        2. Point at another server:\n\
           \x1b[36marc --host <server> --port <port> ping\x1b[0m",
        address
    )
}

/// Format an authentication error with helpful suggestions
pub fn auth_error(user: &str) -> String {
    format!(
        "The server did not accept user '{}'\n\n\
        \x1b[1;33mPossible causes:\x1b[0m\n\
        • User is not known to the server\n\
        • $USER contains characters that cannot be sent in a header\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        1. Check the identity being sent:\n\
           \x1b[36mecho $USER\x1b[0m\n\n\
        2. Ask the server administrator to add the user",
        user
    )
}

/// Format an outdated server error with helpful suggestions
pub fn server_version_error(found: Option<&str>, minimum: (u32, u32, u32)) -> String {
    format!(
        "Server API version {} is not supported (need {}.{}.{} or newer)\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        1. Upgrade the Autotest server\n\
        2. Check that the host runs the HTTP server API at all:\n\
           \x1b[36mcurl http://<server>/version\x1b[0m",
        found.unwrap_or("<none reported>"),
        minimum.0,
        minimum.1,
        minimum.2
    )
}

/// Pick the most helpful message for a connection failure
pub fn describe(error: &ConnectionError, address: &str, user: &str) -> String {
    match error {
        ConnectionError::Auth | ConnectionError::Rpc(RpcError::Auth(_)) => auth_error(user),
        ConnectionError::InvalidServerVersion { found, minimum } => {
            server_version_error(found.as_deref(), *minimum)
        }
        ConnectionError::Http(e) | ConnectionError::Rpc(RpcError::Http(e)) if e.is_connect() => {
            connection_refused_error(address)
        }
        other => other.to_string(),
    }
}
