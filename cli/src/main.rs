use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use pitch::{Annotation, AnnotationKind, EditIntent, Point, Side, Token};
use sync::{Broker, MemoryStore, SessionConfig, SessionHandle, spawn_session};
use uuid::Uuid;

/// Runs a scripted collaborative editing session over the in-memory broker:
/// an owner sets up a board and drags a token, guests join late and bootstrap,
/// one guest draws, the owner undoes and redoes, and the debounced snapshot
/// write fires at the end.
#[derive(Parser, Debug)]
#[command(name = "tacboard", about = "Tactics board sync engine demo")]
struct Cli {
    /// Number of guest participants joining after the owner.
    #[arg(long, default_value_t = 2)]
    guests: u32,

    /// Intermediate positions simulated for the opening token drag.
    #[arg(long, default_value_t = 20)]
    drag_steps: u32,

    /// Throttle flush interval in milliseconds.
    #[arg(long, env = "TACBOARD_THROTTLE_INTERVAL_MS", default_value_t = 50)]
    throttle_ms: u64,

    /// Owner persistence quiet period in milliseconds (shortened from the
    /// production default so the demo finishes quickly).
    #[arg(long, env = "TACBOARD_PERSIST_QUIET_MS", default_value_t = 1_000)]
    persist_ms: u64,
}

fn session_config(cli: &Cli, document_id: Uuid, name: &str, is_owner: bool) -> SessionConfig {
    let mut config = SessionConfig::new(document_id, Uuid::new_v4(), name, is_owner);
    config.throttle_interval = Duration::from_millis(cli.throttle_ms);
    config.persist_quiet = Duration::from_millis(cli.persist_ms);
    config
}

fn home_token(label: &str, x: f64, y: f64) -> Token {
    Token { id: Uuid::new_v4(), side: Side::Home, label: label.to_owned(), pos: Point::new(x, y) }
}

async fn print_board(name: &str, session: &SessionHandle) {
    let document = session.document();
    let document = document.read().await;
    println!(
        "[{name}] tokens={} annotations={} ball=({:.1}, {:.1}) undo_depth={}",
        document.token_count(),
        document.annotations().len(),
        document.ball().x,
        document.ball().y,
        document.undo_depth(),
    );
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let document_id = Uuid::new_v4();
    let broker = Broker::new();
    let store = Arc::new(MemoryStore::new());

    println!("document {document_id}");

    let owner_config = session_config(&cli, document_id, "owner", true);
    let owner_channel = broker.channel(document_id, owner_config.participant_id);
    let owner = spawn_session(owner_config, Box::new(owner_channel), Some(store.clone()));
    tokio::time::sleep(Duration::from_millis(600)).await;

    // Set up a small formation and kick the ball to the center spot.
    let dragged = home_token("7", 10.0, 30.0);
    let dragged_id = dragged.id;
    for token in [dragged, home_token("4", 20.0, 15.0), home_token("9", 30.0, 50.0)] {
        owner.send_intent(EditIntent::PlaceToken { token }).await;
    }
    owner.send_intent(EditIntent::MoveBall { to: Point::new(52.5, 34.0) }).await;

    // Guests join late and bootstrap from the owner.
    let mut guests = Vec::new();
    for n in 1..=cli.guests {
        let config = session_config(&cli, document_id, &format!("guest-{n}"), false);
        let channel = broker.channel(document_id, config.participant_id);
        guests.push(spawn_session(config, Box::new(channel), None));
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    tokio::time::sleep(Duration::from_millis(600)).await;

    // A continuous drag: many intermediate positions, few broadcasts.
    for step in 1..=cli.drag_steps {
        let to = Point::new(10.0 + 2.0 * f64::from(step), 30.0);
        owner.send_intent(EditIntent::MoveToken { id: dragged_id, to }).await;
        tokio::time::sleep(Duration::from_millis(15)).await;
    }

    if let Some(guest) = guests.first() {
        let annotation = Annotation {
            id: Uuid::new_v4(),
            kind: AnnotationKind::Arrow,
            points: vec![Point::new(10.0, 30.0), Point::new(52.5, 34.0)],
            color: "#e11d48".to_owned(),
        };
        guest.send_intent(EditIntent::AddAnnotation { annotation }).await;
    }
    tokio::time::sleep(Duration::from_millis(2 * cli.throttle_ms)).await;

    println!("-- after edits --");
    print_board("owner", &owner).await;
    for (n, guest) in guests.iter().enumerate() {
        print_board(&format!("guest-{}", n + 1), guest).await;
    }
    let peer_names: Vec<String> =
        owner.roster().borrow().iter().map(|entry| entry.display_name.clone()).collect();
    println!("owner sees {} peer(s): {}", peer_names.len(), peer_names.join(", "));

    // Undo rolls back the owner's last edit everywhere; redo restores it.
    owner.undo().await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    println!("-- after owner undo --");
    print_board("owner", &owner).await;
    if let Some(guest) = guests.first() {
        print_board("guest-1", guest).await;
    }
    owner.redo().await;

    // Let the quiet period elapse so the debounced snapshot write fires.
    tokio::time::sleep(Duration::from_millis(cli.persist_ms + 200)).await;
    println!("-- persistence --");
    println!("store writes: {}", store.write_count());
    if let Some(snapshot) = store.written(&document_id) {
        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::warn!(error = %e, "snapshot serialization failed"),
        }
    }

    for guest in guests {
        guest.disconnect().await;
    }
    owner.disconnect().await;
}
