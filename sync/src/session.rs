//! Channel session: the sole owner of one document's transport connection.
//!
//! DESIGN
//! ======
//! `spawn_session` starts one task per open document and returns a handle.
//! The task runs a single `select!` loop over three sources:
//! - commands from the handle (locally applied intents, disconnect),
//! - events from the channel (peer packets, membership syncs),
//! - the earliest pending deadline (throttle flush, persist countdown,
//!   bootstrap-request delay).
//!
//! Handlers run to completion before the next source is polled, so the
//! engine state needs no locking beyond the shared document lock.
//!
//! LIFECYCLE
//! =========
//! 1. Subscribe → announce presence → mark `Connected`
//! 2. After a short delay, broadcast a sync-request (late-joiner bootstrap)
//! 3. Loop: classify/throttle/publish local intents, replay remote ones
//! 4. Disconnect → drop buffered drags, final owner flush if dirty, part
//!
//! ERROR HANDLING
//! ==============
//! Everything degrades to "this participant is not currently collaborating":
//! publish failures and malformed payloads are logged and dropped, and a
//! failed subscribe leaves the session `Disconnected` with an empty roster.

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use pitch::{EditIntent, Origin, Pitch};
use relay::{Packet, PresenceMeta, Topic};
use serde::Serialize;
use tokio::sync::{RwLock, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::bootstrap::Bootstrap;
use crate::classify::{classify, throttle_key};
use crate::directory::{PresenceDirectory, PresenceEntry};
use crate::persist::{DebouncedWriter, SnapshotStore};
use crate::protocol::{EditBroadcast, SyncRequest, SyncResponse, from_packet, to_packet};
use crate::throttle::ThrottleCoalescer;
use crate::transport::{Channel, ChannelEvent};

const DEFAULT_THROTTLE_INTERVAL_MS: u64 = 50;
const DEFAULT_PERSIST_QUIET_MS: u64 = 5_000;
const DEFAULT_SYNC_REQUEST_DELAY_MS: u64 = 500;

/// Connection state of a session's channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Not connected; the channel is closed or was never opened.
    #[default]
    Disconnected,
    /// Subscription is in progress.
    Connecting,
    /// Subscribed; presence announced.
    Connected,
}

/// Per-session settings. Tuning knobs default from environment variables.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// The document this session edits.
    pub document_id: Uuid,
    /// Stable identifier of the local participant.
    pub participant_id: Uuid,
    /// Name shown in peers' rosters.
    pub display_name: String,
    /// Avatar image reference shown in peers' rosters.
    pub avatar_ref: Option<String>,
    /// Whether this participant owns the document (and therefore persists it).
    pub is_owner: bool,
    /// Flush cadence for drag-style intents.
    pub throttle_interval: Duration,
    /// Quiet period before the owner writes a snapshot.
    pub persist_quiet: Duration,
    /// Delay between connecting and broadcasting the sync-request, so the
    /// presence announcement reaches already-connected peers first.
    pub sync_request_delay: Duration,
    /// Join-timestamp override (ms since epoch) for deterministic tests.
    pub joined_at_ms: Option<i64>,
}

impl SessionConfig {
    #[must_use]
    pub fn new(
        document_id: Uuid,
        participant_id: Uuid,
        display_name: impl Into<String>,
        is_owner: bool,
    ) -> Self {
        Self {
            document_id,
            participant_id,
            display_name: display_name.into(),
            avatar_ref: None,
            is_owner,
            throttle_interval: Duration::from_millis(env_parse(
                "TACBOARD_THROTTLE_INTERVAL_MS",
                DEFAULT_THROTTLE_INTERVAL_MS,
            )),
            persist_quiet: Duration::from_millis(env_parse(
                "TACBOARD_PERSIST_QUIET_MS",
                DEFAULT_PERSIST_QUIET_MS,
            )),
            sync_request_delay: Duration::from_millis(env_parse(
                "TACBOARD_SYNC_REQUEST_DELAY_MS",
                DEFAULT_SYNC_REQUEST_DELAY_MS,
            )),
            joined_at_ms: None,
        }
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    parse_override(std::env::var(key).ok(), default)
}

fn parse_override<T>(raw: Option<String>, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    raw.and_then(|v| v.parse::<T>().ok()).unwrap_or(default)
}

enum Command {
    /// An intent already applied locally; classify and publish.
    Intent(EditIntent),
    Disconnect,
}

/// Handle onto a running session.
pub struct SessionHandle {
    document: Arc<RwLock<Pitch>>,
    commands: mpsc::UnboundedSender<Command>,
    connection: watch::Receiver<ConnectionStatus>,
    roster: watch::Receiver<Vec<PresenceEntry>>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// The shared document. The session task applies remote edits to it;
    /// callers read it and edit through [`Self::send_intent`].
    #[must_use]
    pub fn document(&self) -> Arc<RwLock<Pitch>> {
        Arc::clone(&self.document)
    }

    /// Watch the channel connection state.
    #[must_use]
    pub fn connection(&self) -> watch::Receiver<ConnectionStatus> {
        self.connection.clone()
    }

    /// Watch the roster of other connected participants.
    #[must_use]
    pub fn roster(&self) -> watch::Receiver<Vec<PresenceEntry>> {
        self.roster.clone()
    }

    /// Apply a local edit immediately, then propagate it if it is shared.
    /// Returns without waiting for any network activity.
    pub async fn send_intent(&self, intent: EditIntent) {
        self.document.write().await.apply(&intent, Origin::Local);
        let _ = self.commands.send(Command::Intent(intent));
    }

    /// Undo the most recent locally authored edit and broadcast the restored
    /// document so peers converge. Returns false when there is nothing to
    /// undo.
    pub async fn undo(&self) -> bool {
        let snapshot = {
            let mut doc = self.document.write().await;
            if !doc.undo() {
                return false;
            }
            doc.snapshot()
        };
        let _ = self.commands.send(Command::Intent(EditIntent::LoadDocument { snapshot }));
        true
    }

    /// Re-apply the most recently undone edit and broadcast the result.
    pub async fn redo(&self) -> bool {
        let snapshot = {
            let mut doc = self.document.write().await;
            if !doc.redo() {
                return false;
            }
            doc.snapshot()
        };
        let _ = self.commands.send(Command::Intent(EditIntent::LoadDocument { snapshot }));
        true
    }

    /// Tear the session down and wait for cleanup to finish.
    pub async fn disconnect(self) {
        let _ = self.commands.send(Command::Disconnect);
        let _ = self.task.await;
    }
}

/// Spawn a session task for one document and return its handle.
///
/// `store` is only consulted when `config.is_owner` is set.
#[must_use]
pub fn spawn_session(
    config: SessionConfig,
    channel: Box<dyn Channel>,
    store: Option<Arc<dyn SnapshotStore>>,
) -> SessionHandle {
    let document = Arc::new(RwLock::new(Pitch::new()));
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (conn_tx, conn_rx) = watch::channel(ConnectionStatus::Disconnected);
    let (roster_tx, roster_rx) = watch::channel(Vec::new());

    let task = tokio::spawn(run_session(
        config,
        channel,
        store,
        Arc::clone(&document),
        cmd_rx,
        conn_tx,
        roster_tx,
    ));

    SessionHandle { document, commands: cmd_tx, connection: conn_rx, roster: roster_rx, task }
}

async fn run_session(
    config: SessionConfig,
    mut channel: Box<dyn Channel>,
    store: Option<Arc<dyn SnapshotStore>>,
    document: Arc<RwLock<Pitch>>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    conn_tx: watch::Sender<ConnectionStatus>,
    roster_tx: watch::Sender<Vec<PresenceEntry>>,
) {
    conn_tx.send_replace(ConnectionStatus::Connecting);
    let mut events = match channel.subscribe().await {
        Ok(events) => events,
        Err(e) => {
            warn!(error = %e, document_id = %config.document_id, "channel subscribe failed");
            conn_tx.send_replace(ConnectionStatus::Disconnected);
            return;
        }
    };

    let joined_at = config.joined_at_ms.unwrap_or_else(relay::unix_millis);
    let presence = PresenceMeta {
        participant_id: config.participant_id,
        display_name: config.display_name.clone(),
        avatar_ref: config.avatar_ref.clone(),
        joined_at,
    };
    if let Err(e) = channel.track(presence).await {
        warn!(error = %e, "presence announce failed");
    }
    conn_tx.send_replace(ConnectionStatus::Connected);
    info!(
        document_id = %config.document_id,
        participant_id = %config.participant_id,
        owner = config.is_owner,
        "session connected"
    );

    let mut ctx = SessionCtx {
        throttle: ThrottleCoalescer::new(config.throttle_interval),
        writer: DebouncedWriter::new(config.persist_quiet),
        bootstrap: Bootstrap::new(config.participant_id, joined_at),
        directory: PresenceDirectory::new(config.participant_id),
        sync_request_at: Some(Instant::now() + config.sync_request_delay),
        config,
        channel,
        store,
        document,
        conn_tx,
        roster_tx,
    };

    loop {
        let deadline = ctx.next_deadline();
        tokio::select! {
            cmd = commands.recv() => match cmd {
                Some(Command::Intent(intent)) => ctx.on_local_intent(intent).await,
                Some(Command::Disconnect) | None => break,
            },
            event = events.recv() => match event {
                Some(event) => ctx.on_event(event).await,
                None => {
                    warn!(document_id = %ctx.config.document_id, "channel event stream closed");
                    break;
                }
            },
            () = sleep_until_or_forever(deadline) => ctx.on_deadline(Instant::now()).await,
        }
    }

    ctx.teardown().await;
}

async fn sleep_until_or_forever(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

struct SessionCtx {
    config: SessionConfig,
    channel: Box<dyn Channel>,
    store: Option<Arc<dyn SnapshotStore>>,
    document: Arc<RwLock<Pitch>>,
    conn_tx: watch::Sender<ConnectionStatus>,
    roster_tx: watch::Sender<Vec<PresenceEntry>>,
    throttle: ThrottleCoalescer,
    writer: DebouncedWriter,
    bootstrap: Bootstrap,
    directory: PresenceDirectory,
    sync_request_at: Option<Instant>,
}

impl SessionCtx {
    fn next_deadline(&self) -> Option<Instant> {
        [self.sync_request_at, self.throttle.next_deadline(), self.writer.deadline()]
            .into_iter()
            .flatten()
            .min()
    }

    /// An intent the handle already applied locally: classify, then either
    /// coalesce (drag gestures) or publish immediately.
    async fn on_local_intent(&mut self, intent: EditIntent) {
        let class = classify(intent.kind());
        if !class.shared {
            return;
        }
        self.note_shared_edit(Instant::now());
        if class.throttled
            && let Some(key) = throttle_key(&intent)
        {
            self.throttle.submit(key, intent, Instant::now());
        } else {
            self.publish_edit(intent).await;
        }
    }

    async fn on_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::MembershipSync(members) => {
                self.directory.rebuild(&members);
                self.roster_tx.send_replace(self.directory.entries().to_vec());
            }
            ChannelEvent::Packet(packet) => self.on_packet(packet).await,
        }
    }

    async fn on_packet(&mut self, packet: Packet) {
        if packet.document_id != self.config.document_id {
            return;
        }
        match packet.topic {
            Topic::Edit => self.on_edit(&packet).await,
            Topic::SyncRequest => self.on_sync_request(&packet).await,
            Topic::SyncResponse => self.on_sync_response(&packet).await,
        }
    }

    async fn on_edit(&mut self, packet: &Packet) {
        // The transport is configured not to echo, but remove any doubt:
        // applying our own broadcast would double-mutate the document.
        if packet.sender_id == self.config.participant_id {
            return;
        }
        let broadcast: EditBroadcast = match from_packet(packet) {
            Ok(broadcast) => broadcast,
            Err(e) => {
                warn!(error = %e, "malformed edit payload; dropping");
                return;
            }
        };
        if broadcast.sender_id == self.config.participant_id {
            return;
        }
        self.document.write().await.apply(&broadcast.intent, Origin::Remote);
        if classify(broadcast.intent.kind()).shared {
            self.note_shared_edit(Instant::now());
        }
    }

    async fn on_sync_request(&mut self, packet: &Packet) {
        let request: SyncRequest = match from_packet(packet) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "malformed sync request; dropping");
                return;
            }
        };
        if !self.bootstrap.should_respond(&request, self.directory.entries()) {
            return;
        }
        let snapshot = self.document.read().await.snapshot();
        let response = SyncResponse { snapshot, target_id: request.requester_id };
        debug!(target = %request.requester_id, "answering sync request");
        self.publish(Topic::SyncResponse, &response).await;
    }

    async fn on_sync_response(&mut self, packet: &Packet) {
        let response: SyncResponse = match from_packet(packet) {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "malformed sync response; dropping");
                return;
            }
        };
        // Accepts at most once; duplicate or misaddressed responses drop here.
        if !self.bootstrap.accept(&response) {
            return;
        }
        info!(from = %packet.sender_id, "document bootstrapped from peer");
        let intent = EditIntent::LoadDocument { snapshot: response.snapshot };
        self.document.write().await.apply(&intent, Origin::Remote);
        self.note_shared_edit(Instant::now());
    }

    async fn on_deadline(&mut self, now: Instant) {
        if self.sync_request_at.is_some_and(|at| at <= now) {
            self.sync_request_at = None;
            let request = self.bootstrap.request();
            self.publish(Topic::SyncRequest, &request).await;
            self.bootstrap.mark_requested();
        }
        for (_, intent) in self.throttle.take_due(now) {
            self.publish_edit(intent).await;
        }
        if self.writer.fire(now) {
            self.persist_in_background();
        }
    }

    fn note_shared_edit(&mut self, now: Instant) {
        if self.config.is_owner {
            self.writer.note_change(now);
        }
    }

    async fn publish_edit(&self, intent: EditIntent) {
        let broadcast = EditBroadcast { intent, sender_id: self.config.participant_id };
        self.publish(Topic::Edit, &broadcast).await;
    }

    async fn publish<T: Serialize>(&self, topic: Topic, payload: &T) {
        match to_packet(payload, topic, self.config.document_id, self.config.participant_id) {
            Ok(packet) => {
                if let Err(e) = self.channel.publish(packet).await {
                    warn!(error = %e, ?topic, "publish failed");
                }
            }
            Err(e) => warn!(error = %e, ?topic, "payload serialization failed"),
        }
    }

    /// Serialize and write the current document off the loop. The dirty flag
    /// was already cleared: a failed write is lost until the next edit.
    fn persist_in_background(&self) {
        let Some(store) = self.store.clone() else {
            return;
        };
        let document = Arc::clone(&self.document);
        let document_id = self.config.document_id;
        tokio::spawn(async move {
            let snapshot = document.read().await.snapshot();
            match store.update(document_id, snapshot).await {
                Ok(()) => debug!(%document_id, "snapshot written"),
                Err(e) => warn!(error = %e, %document_id, "snapshot write failed"),
            }
        });
    }

    async fn teardown(mut self) {
        let dropped = self.throttle.pending();
        self.throttle.clear();
        if dropped > 0 {
            debug!(dropped, "buffered drag intents dropped on disconnect");
        }
        if self.config.is_owner && self.writer.take_dirty() {
            self.persist_in_background();
        }
        self.channel.unsubscribe().await;
        self.directory.clear();
        self.roster_tx.send_replace(Vec::new());
        self.conn_tx.send_replace(ConnectionStatus::Disconnected);
        info!(
            document_id = %self.config.document_id,
            participant_id = %self.config.participant_id,
            "session disconnected"
        );
    }
}
