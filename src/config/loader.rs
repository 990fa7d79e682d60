// Configuration loader
// Loads server settings from ~/.arc/config.toml, then applies environment overrides

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::settings::Config;

/// Default location of the config file
pub fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".arc/config.toml"))
}

/// Load configuration from the default config file and the environment
pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

/// Load configuration from `path`; a missing file yields the defaults
pub fn load_config_from(path: &Path) -> Result<Config> {
    let mut config = if path.exists() {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        debug!(path = %path.display(), "Loading config file");
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?
    } else {
        debug!(path = %path.display(), "No config file, using defaults");
        Config::default()
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

fn apply_env_overrides<F>(config: &mut Config, var: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| var(key).filter(|v| !v.is_empty());

    if let Some(host) = non_empty("ARC_SERVER_HOST") {
        config.server.host = Some(host);
    }
    if let Some(port) = non_empty("ARC_SERVER_PORT") {
        let port = port
            .parse()
            .with_context(|| format!("Invalid ARC_SERVER_PORT: {}", port))?;
        config.server.port = Some(port);
    }
    if let Some(username) = non_empty("ARC_USERNAME") {
        config.server.username = Some(username);
    }
    if let Some(password) = non_empty("ARC_PASSWORD") {
        config.server.password = Some(password);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigProvider;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [server]
            host = "autotest.example.com"
            port = 8000
            username = "cleber"
            "#
        )
        .unwrap();

        let config = load_config_from(file.path()).unwrap();
        assert_eq!(config.server.host.as_deref(), Some("autotest.example.com"));
        assert_eq!(config.server.port, Some(8000));
        assert_eq!(config.get_username().as_deref(), Some("cleber"));
        assert_eq!(config.server.password, None);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.server, Config::default().server);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nhost = ").unwrap();

        let err = load_config_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_env_overrides_win_over_file() {
        let env: HashMap<&str, &str> = [
            ("ARC_SERVER_HOST", "10.0.0.1"),
            ("ARC_SERVER_PORT", "8080"),
            ("ARC_PASSWORD", ""),
        ]
        .into_iter()
        .collect();

        let mut config = Config::with_server("file-host", 80);
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.get_server_host(), "10.0.0.1");
        assert_eq!(config.get_server_port(), 8080);
        assert_eq!(config.server.password, None);
    }

    #[test]
    fn test_bad_port_override_is_rejected() {
        let mut config = Config::default();
        let result = apply_env_overrides(&mut config, |k| {
            (k == "ARC_SERVER_PORT").then(|| "eighty".to_string())
        });
        assert!(result.is_err());
    }
}
