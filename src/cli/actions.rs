// Server-level CLI actions
//
// Each action writes plain lines to `out` and returns the value the
// binary turns into its exit status.

use anyhow::{Context, Result};
use std::io::Write;
use tracing::debug;

use crate::client::HealthCheck;
use crate::defaults;
use crate::server::ServerApi;

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Print the server status; returns whether the server has concerns
pub async fn status(server: &dyn ServerApi, out: &mut dyn Write) -> Result<bool> {
    let stat = server
        .get_status()
        .await
        .context("Failed to fetch server status")?;

    writeln!(out, "Concerns: {}", yes_no(stat.concerns))?;
    writeln!(out, "Scheduler Running: {}", yes_no(stat.scheduler_running))?;
    writeln!(
        out,
        "Scheduler Watcher Running: {}",
        yes_no(stat.scheduler_watcher_running)
    )?;
    writeln!(
        out,
        "Install Server Running: {}",
        yes_no(stat.install_server_running)
    )?;
    writeln!(out, "Log Disk Space Usage: {}%", stat.used_space_logs)?;

    Ok(stat.concerns)
}

/// Print the names of the available installation profiles
///
/// The install server pads its list with "N/A" entries; listing stops at
/// the first one.
pub async fn list_install_profiles(server: &dyn ServerApi, out: &mut dyn Write) -> Result<()> {
    let profiles = server
        .get_profiles()
        .await
        .context("Failed to fetch installation profiles")?;

    for profile in &profiles {
        if profile.name == defaults::PROFILE_PLACEHOLDER {
            debug!(total = profiles.len(), "Stopping at placeholder profile");
            break;
        }
        writeln!(out, "{}", profile.name)?;
    }
    Ok(())
}

/// Report whether the server answers; returns the reachability flag
pub async fn ping(server: &dyn HealthCheck, out: &mut dyn Write) -> Result<bool> {
    let reachable = server.ping().await;
    if reachable {
        writeln!(out, "Server is reachable")?;
    } else {
        writeln!(out, "Server is not reachable")?;
    }
    Ok(reachable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ConnectionError, Result as ConnectionResult, RpcError};
    use crate::server::{Profile, ServerStatus};
    use async_trait::async_trait;

    /// Canned facade standing in for a live server
    struct MockServer {
        status: Option<ServerStatus>,
        profiles: Vec<Profile>,
    }

    #[async_trait]
    impl ServerApi for MockServer {
        async fn get_status(&self) -> ConnectionResult<ServerStatus> {
            self.status.clone().ok_or_else(|| {
                ConnectionError::Rpc(RpcError::InvalidResponse("server down".into()))
            })
        }

        async fn get_profiles(&self) -> ConnectionResult<Vec<Profile>> {
            Ok(self.profiles.clone())
        }
    }

    struct FixedHealth(bool);

    #[async_trait]
    impl HealthCheck for FixedHealth {
        async fn ping(&self) -> bool {
            self.0
        }
    }

    fn with_profiles(names: &[&str]) -> MockServer {
        MockServer {
            status: None,
            profiles: names.iter().map(|n| Profile::new(*n)).collect(),
        }
    }

    #[tokio::test]
    async fn test_status_prints_five_lines_and_returns_concerns() {
        let server = MockServer {
            status: Some(ServerStatus {
                concerns: true,
                scheduler_running: false,
                scheduler_watcher_running: true,
                install_server_running: true,
                used_space_logs: 42u32.into(),
            }),
            profiles: Vec::new(),
        };
        let mut out = Vec::new();

        let concerns = status(&server, &mut out).await.unwrap();

        assert!(concerns);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Concerns: Yes\n\
             Scheduler Running: No\n\
             Scheduler Watcher Running: Yes\n\
             Install Server Running: Yes\n\
             Log Disk Space Usage: 42%\n"
        );
    }

    #[tokio::test]
    async fn test_status_error_carries_context() {
        let server = with_profiles(&[]);
        let mut out = Vec::new();

        let err = status(&server, &mut out).await.unwrap_err();
        assert!(err.to_string().contains("server status"));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_profiles_stop_at_placeholder() {
        let server = with_profiles(&["alpha", "N/A", "beta"]);
        let mut out = Vec::new();

        list_install_profiles(&server, &mut out).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "alpha\n");
    }

    #[tokio::test]
    async fn test_profiles_without_placeholder_print_all() {
        let server = with_profiles(&["rhel6", "fedora19"]);
        let mut out = Vec::new();

        list_install_profiles(&server, &mut out).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "rhel6\nfedora19\n");
    }

    #[tokio::test]
    async fn test_ping_reports_both_outcomes() {
        let mut out = Vec::new();
        assert!(ping(&FixedHealth(true), &mut out).await.unwrap());
        assert!(!ping(&FixedHealth(false), &mut out).await.unwrap());
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Server is reachable\nServer is not reachable\n"
        );
    }
}
