// CLI module
// Actions run by the `arc` binary

mod actions;

pub use actions::{list_install_profiles, ping, status};
