//! Synchronization engine for the collaborative tactics board.
//!
//! Each participant runs one [`session::SessionHandle`] per open document.
//! Local edit intents are applied to the document immediately, classified,
//! rate-limited where they represent continuous drag gestures, and published
//! on a best-effort broadcast channel. Remote intents replay the same apply
//! path under [`pitch::Origin::Remote`], which keeps them out of the local
//! undo history. A late joiner bootstraps the current document from the
//! longest-tenured peer, and the document owner debounces durable writes.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`classify`] | Shared/throttled policy per intent kind |
//! | [`throttle`] | Latest-value-per-key coalescing on a fixed cadence |
//! | [`protocol`] | Typed payloads for the edit / sync topics |
//! | [`bootstrap`] | Late-joiner sync state machine |
//! | [`directory`] | Roster derived from membership events |
//! | [`persist`] | Debounced snapshot writer and the store seam |
//! | [`transport`] | The channel trait the session runs over |
//! | [`broker`] | In-memory pub/sub broker for tests and demos |
//! | [`session`] | Channel session lifecycle and run loop |

pub mod bootstrap;
pub mod broker;
pub mod classify;
pub mod directory;
pub mod persist;
pub mod protocol;
pub mod session;
pub mod throttle;
pub mod transport;

pub use broker::Broker;
pub use classify::{Classification, ThrottleKey, classify, throttle_key};
pub use directory::PresenceEntry;
pub use persist::{MemoryStore, PersistError, SnapshotStore};
pub use session::{ConnectionStatus, SessionConfig, SessionHandle, spawn_session};
pub use transport::{Channel, ChannelError, ChannelEvent};
