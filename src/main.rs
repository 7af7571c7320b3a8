#![cfg_attr(not(test), deny(clippy::panic))]

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::time::Duration;
use werewolf_server::config;
use werewolf_server::http;
use werewolf_server::logging;
use werewolf_server::profiles::FileProfileStore;
use werewolf_server::server::GameServer;

const FINISHED_ROOM_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Werewolf -- authoritative WebSocket server for the social-deduction game
#[derive(Parser, Debug)]
#[command(name = "werewolf-server")]
#[command(about = "Authoritative WebSocket server for the Werewolf social-deduction game")]
#[command(version)]
struct Cli {
    /// Validate configuration and exit without starting the server.
    #[arg(long, short = 'c', conflicts_with = "print_config")]
    validate_config: bool,

    /// Print the loaded configuration to stdout (as JSON) and exit.
    #[arg(long, conflicts_with = "validate_config")]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration from config.json if present; otherwise use code defaults.
    let cfg = Arc::new(config::load());

    if cli.print_config {
        let json = serde_json::to_string_pretty(&*cfg)
            .map_err(|e| anyhow::anyhow!("Failed to serialize config: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    let validation_result = config::validate(&cfg);

    if cli.validate_config {
        match validation_result {
            Ok(()) => {
                println!("Configuration validation passed");
                println!();
                println!("Configuration summary:");
                println!("  Port: {}", cfg.port);
                println!("  Data directory: {}", cfg.storage.data_dir);
                println!("  Max avatar size: {} bytes", cfg.storage.max_avatar_bytes);
                println!("  Werewolf turn: {}s", cfg.stages.werewolf_turn_secs);
                println!("  Day vote: {}s", cfg.stages.vote_secs);
                return Ok(());
            }
            Err(e) => {
                eprintln!("Configuration validation failed:\n{e}");
                std::process::exit(1);
            }
        }
    }

    validation_result?;

    logging::init_with_config(&cfg.logging);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    tracing::info!(%addr, "Starting Werewolf server");

    let profiles = FileProfileStore::new(&cfg.storage)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize profile store: {e}"))?;

    let game_server = GameServer::new(cfg.clone(), profiles);

    // Reap finished rooms in the background.
    let cleanup_server = game_server.clone();
    tokio::spawn(cleanup_server.cleanup_task(FINISHED_ROOM_SWEEP_INTERVAL));

    let router = http::create_router(game_server, &cfg.cors_origins);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        cors_origins = %cfg.cors_origins,
        "Server started - WebSocket channel: /ws/{{room_id}}/{{player_id}}, health: /health"
    );

    axum::serve(listener, router).await?;

    Ok(())
}
