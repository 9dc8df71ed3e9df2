use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use ideation_agent_lib::config::ConfigLoader;
use ideation_agent_lib::server::{self, generate_auth_token, AppState};
use ideation_agent_lib::shutdown::{register_signal_handlers, ShutdownState};

/// Ideation agent server - sessions, agent logs, event streams and reports
#[derive(Parser, Debug)]
#[command(name = "ideation-agent")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML config file (defaults to the user config directory)
    #[arg(long, env = "IDEATION_CONFIG")]
    config: Option<PathBuf>,

    /// Port to bind the server to
    #[arg(long)]
    port: Option<u16>,

    /// Address to bind the server to
    #[arg(long)]
    bind: Option<String>,

    /// Bearer token required on /api and /ws routes (or set IDEATION_SERVER_TOKEN)
    #[arg(long, env = "IDEATION_SERVER_TOKEN")]
    token: Option<String>,

    /// Generate a random bearer token for this run and print it
    #[arg(long, conflicts_with = "token")]
    generate_token: bool,

    /// Directory for persisted sessions; in-memory storage when unset
    #[arg(long, env = "IDEATION_DATA_DIR")]
    data_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let loader = match &cli.config {
        Some(path) => ConfigLoader::with_path(path),
        None => ConfigLoader::new(),
    };
    let mut config = loader.load()?;

    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    if let Some(data_dir) = cli.data_dir {
        config.sessions.data_dir = Some(data_dir);
    }
    if cli.generate_token {
        let token = generate_auth_token();
        println!("Auth token: {}", token);
        config.server.auth_token = Some(token);
    } else if let Some(token) = cli.token {
        config.server.auth_token = Some(token);
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

    runtime.block_on(async {
        let shutdown_state = ShutdownState::new();
        if let Err(e) = register_signal_handlers(shutdown_state.clone()) {
            log::warn!("Failed to register signal handlers: {}", e);
        }

        let state = AppState::new(config, shutdown_state)?;
        log::info!("Loaded {} stored session(s)", state.store.len());

        server::run_server(state).await
    })
}
