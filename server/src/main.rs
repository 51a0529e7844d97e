use clap::Parser;
use log::info;
use server::config::ServerConfig;
use server::network::Server;
use server::session::DEFAULT_UPDATE_INTERVAL;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Tick rate (ticks per second)
    #[arg(short, long, default_value = "20")]
    tick_rate: u32,

    /// Ticks between scoreboard updates
    #[arg(short, long, default_value_t = DEFAULT_UPDATE_INTERVAL)]
    update_interval: u64,

    /// Maximum number of connected viewers
    #[arg(short, long, default_value = "16")]
    max_clients: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let config = ServerConfig {
        host: args.host,
        port: args.port,
        tick_rate: args.tick_rate,
        update_interval: args.update_interval,
        max_clients: args.max_clients,
    };

    info!(
        "Starting sidebar server at {} ({} ticks/s, update every {} ticks, max {} clients)",
        config.address(),
        config.tick_rate,
        config.update_interval,
        config.max_clients
    );

    let mut server = Server::new(config).await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
