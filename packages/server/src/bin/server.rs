//! Room presence, chat and signaling relay server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server
//! cargo run --bin hiroba-server -- --host 0.0.0.0 --port 3000 --history-limit 200
//! ```

use std::sync::Arc;

use clap::Parser;
use hiroba_server::{
    domain::{HubConfig, HubState},
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{DEFAULT_ARCHIVE_LIMIT, InMemoryChatArchive},
    },
    ui::{AppState, Server},
};
use hiroba_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "hiroba-server")]
#[command(about = "Room presence, chat and WebRTC signaling relay server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Number of chat messages kept per room
    #[arg(long, default_value_t = 100)]
    history_limit: usize,

    /// Window in which a repeated video id in a playback update is ignored
    #[arg(long, default_value_t = 5000)]
    playback_dedup_window_ms: i64,

    /// Number of memberless rooms kept for their history and playback state
    #[arg(long, default_value_t = 1000)]
    max_retained_rooms: usize,

    /// Number of chat messages the in-memory archive keeps per room
    #[arg(long, default_value_t = DEFAULT_ARCHIVE_LIMIT)]
    archive_limit: usize,
}

impl Args {
    fn hub_config(&self) -> HubConfig {
        HubConfig {
            history_limit: self.history_limit,
            playback_dedup_window_millis: self.playback_dedup_window_ms,
            max_retained_rooms: self.max_retained_rooms,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Hub (in-memory presence, rooms and history)
    // 2. MessagePusher
    // 3. ChatArchive
    // 4. UseCases (AppState)
    // 5. Server
    let config = args.hub_config();
    tracing::info!(
        "Hub configured: history limit {}, playback de-dup window {} ms, {} retained rooms",
        config.history_limit,
        config.playback_dedup_window_millis,
        config.max_retained_rooms
    );
    let hub = HubState::new(config).into_shared();
    let message_pusher = Arc::new(WebSocketMessagePusher::default());
    let archive = Arc::new(InMemoryChatArchive::with_limit(args.archive_limit));
    let state = Arc::new(AppState::new(
        hub,
        message_pusher,
        archive,
        Arc::new(SystemClock),
    ));

    let server = Server::new(state);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
