use clap::Parser;
use log::info;
use macroquad::prelude::*;
use peer::network::PeerConfig;
use peer::session::GameSession;
use peer::{input, render};
use shared::{DEFAULT_PORT, DEFAULT_TARGET, TICK_INTERVAL_MS};
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to look for an existing host on before hosting
    #[arg(short = 'c', long, default_value = DEFAULT_TARGET)]
    connect: String,

    /// Port used both for joining and for hosting
    #[arg(short = 'p', long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Simulation tick interval in milliseconds
    #[arg(short = 't', long, default_value_t = TICK_INTERVAL_MS)]
    tick_ms: u64,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Grid Snake".to_owned(),
        window_width: render::WINDOW_WIDTH,
        window_height: render::WINDOW_HEIGHT,
        window_resizable: false,
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

    info!("Looking for a host at {}:{}", args.connect, args.port);
    info!("Controls: arrows or WASD to steer, Escape to quit");

    let config = PeerConfig {
        target: args.connect,
        port: args.port,
    };
    let mut session = match GameSession::start(&config, Duration::from_millis(args.tick_ms)) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Could not start a session: {}", e);
            return;
        }
    };
    info!(
        "Running as {:?}, player {}",
        session.role(),
        session.local_player()
    );

    // Route window close through the same shutdown path as Escape.
    prevent_quit();

    loop {
        if input::quit_requested() {
            break;
        }

        let snapshot = session.frame(input::poll_direction(), Instant::now());
        render::draw(&snapshot);

        next_frame().await;
    }

    session.shutdown();
}
