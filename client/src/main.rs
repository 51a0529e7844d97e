use clap::Parser;
use client::network::NetworkClient;
use client::rendering::Renderer;
use log::{error, info};
use macroquad::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Window width
    #[arg(short = 'w', long, default_value = "800")]
    width: usize,

    /// Window height (no short flag to avoid conflict with --help)
    #[arg(long, default_value = "600")]
    height: usize,
}

fn window_conf() -> Conf {
    let args = Args::parse();
    Conf {
        window_title: "Sidebar Viewer".to_string(),
        window_width: args.width as i32,
        window_height: args.height as i32,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Starting client...");
    info!("Connecting to: {}", args.server);

    let mut network = match NetworkClient::spawn(&args.server) {
        Ok(network) => network,
        Err(e) => {
            error!("Failed to start networking: {}", e);
            return;
        }
    };
    let view = network.view();
    let mut renderer = Renderer::new(args.width, args.height);

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        // Draw from a snapshot, not under the lock
        let snapshot = view.lock().clone();
        renderer.render(&snapshot);

        next_frame().await;
    }

    network.shutdown();
}
