// Arc - Autotest RPC client
// Main entry point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use arc::client::{
    auth_identity, ConnectOptions, ConnectionError, DefaultConnection, HttpConnectOptions,
    HttpConnection,
};
use arc::config::{load_config, load_config_from, Config, ConfigProvider};
use arc::errors;

#[derive(Parser, Debug)]
#[command(name = "arc")]
#[command(about = "Command-line client for the Autotest server", version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Server host (overrides config)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Server port (overrides config)
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Username for the HTTP API (overrides config)
    #[arg(long, global = true)]
    user: Option<String>,

    /// Config file to use instead of ~/.arc/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show server status; exits 1 when the server reports concerns
    Status,
    /// List the installation profiles available on the install server
    ListInstallProfiles,
    /// Check that the server answers
    Ping {
        /// Check the HTTP server API instead of the RPC services
        #[arg(long)]
        http: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args = Args::parse();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let config = match &args.config {
        Some(path) => load_config_from(path)?,
        None => load_config().context("Failed to load configuration")?,
    };
    let address = format!(
        "{}:{}",
        args.host.clone().unwrap_or_else(|| config.get_server_host()),
        args.port.unwrap_or_else(|| config.get_server_port())
    );

    let outcome = match args.command {
        Command::Ping { http: true } => run_http_ping(&args, &config).await,
        _ => run_rpc_command(&args, config).await,
    };

    outcome.map_err(|e| match e.downcast_ref::<ConnectionError>() {
        Some(conn_err) => anyhow::anyhow!(errors::describe(conn_err, &address, &auth_identity())),
        None => e,
    })
}

async fn run_rpc_command(args: &Args, config: Config) -> Result<ExitCode> {
    let options = ConnectOptions::new(args.host.clone(), args.port);
    let connection = DefaultConnection::new(config, options);
    let mut stdout = io::stdout();

    match args.command {
        Command::Status => {
            let concerns = arc::cli::status(connection.get().await?, &mut stdout).await?;
            Ok(exit_code(!concerns))
        }
        Command::ListInstallProfiles => {
            arc::cli::list_install_profiles(connection.get().await?, &mut stdout).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Ping { .. } => {
            let reachable = arc::cli::ping(connection.get().await?, &mut stdout).await?;
            Ok(exit_code(reachable))
        }
    }
}

async fn run_http_ping(args: &Args, config: &Config) -> Result<ExitCode> {
    let options = HttpConnectOptions {
        hostname: args.host.clone(),
        port: args.port,
        username: args.user.clone(),
        password: None,
    };
    let connection = HttpConnection::connect(options, config).await?;
    let reachable = arc::cli::ping(&connection, &mut io::stdout()).await?;
    Ok(exit_code(reachable))
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Initialize tracing to stderr
///
/// Default level is WARN so action output stays clean; RUST_LOG or
/// ARC_DEBUG=1 turn it up.
fn init_tracing() {
    use tracing_subscriber::prelude::*;

    let show_debug = std::env::var("ARC_DEBUG")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false);

    let env_filter = if show_debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    // Bridge log crate -> tracing (reqwest and hyper log through it)
    tracing_log::LogTracer::init().ok();
}
