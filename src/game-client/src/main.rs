use std::path::PathBuf;

use clap::Parser;
use common::{model::game::GameMode, utility::create_shutdown_channel};
use game_client::{
    config::DEFAULT_CONFIG_PATH,
    entrypoint::{run, ClientOptions},
};
use tracing::{error, Level};

/// Play rock-paper-scissors against a remote arbiter.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Settings file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Arbiter channel: host:port, or a device path
    #[arg(long)]
    port: Option<String>,
    /// PvP, PvC or CvC
    #[arg(long)]
    mode: Option<GameMode>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_line_number(true)
        .with_file(true)
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();
    let options = ClientOptions {
        config_path: args.config,
        port: args.port,
        mode: args.mode,
    };
    let shutdown_receiver = create_shutdown_channel().await;
    if let Err(e) = run(options, shutdown_receiver).await {
        error!("{}", e);
        std::process::exit(1);
    }
}
