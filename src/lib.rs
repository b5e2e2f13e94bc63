//! # amino-fast
//!
//! Async Rust client for the AminoApps (Narvii) API: authenticated REST
//! calls plus the persistent realtime WebSocket with typed event routing.
//!
//! ## Features
//!
//! - **HMAC-SHA1 request signing**: device identity and per-body message
//!   signatures matching the official client
//! - **Session handling**: email login and sid decoding (the undocumented
//!   base64 claims envelope)
//! - **NDC routing**: global, community, and service-selector hosts
//!   resolved from the NDC id
//! - **Realtime connection manager**: signed handshake, scheduled 120 s
//!   refresh, supervised reconnect with backoff and jitter
//! - **Typed event routing**: text/chat/catch-all listeners plus ordered
//!   prefix-matched commands, with a bound reply capability per chat event
//!
//! ## Quick Start: REST
//!
//! ```no_run
//! use amino_fast::AminoRestClient;
//!
//! # async fn run() -> Result<(), amino_fast::AminoError> {
//! let client = AminoRestClient::new();
//! client.login_with_email("me@example.com", "secret").await?;
//!
//! let profile = client.session().map(|s| s.claims.uid);
//! println!("logged in as {profile:?}");
//!
//! let threads = client.get_threads(0, 0, 25).await?;
//! for thread in threads.thread_list {
//!     println!("{}: {:?}", thread.thread_id, thread.title);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Quick Start: Realtime
//!
//! ```no_run
//! use amino_fast::{AminoRestClient, AminoWsClient, EventRouter};
//!
//! # async fn run() -> Result<(), amino_fast::AminoError> {
//! let rest = AminoRestClient::new();
//! rest.login_with_email("me@example.com", "secret").await?;
//!
//! let mut router = EventRouter::new();
//! router.command("!ping", |event| async move {
//!     let _ = event.reply("pong").await;
//! });
//! router.on_connection_error(|err| async move {
//!     eprintln!("realtime error: {err}");
//! });
//!
//! let ws = AminoWsClient::new(rest);
//! let handle = ws.start(router)?;
//! // ... run until done ...
//! handle.stop().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Scopes
//!
//! Every call takes the target NDC id explicitly: `0` is the global scope,
//! positive ids address a community, and negative ids select the global
//! host's community-lookup service. Replies sent from chat events carry the
//! originating frame's NDC id, so concurrent handlers never interfere.
//!
//! ## Errors
//!
//! All operations return [`AminoError`]. HTTP 403 is always surfaced as
//! [`AminoError::TemporaryBan`]: the service rate-bans by IP and the
//! caller decides how long to back off. Realtime transport errors are
//! delivered to [`EventRouter::on_connection_error`] subscribers while the
//! client reconnects under the configured [`ReconnectConfig`].

pub mod auth;
pub mod env;
pub mod error;
pub mod rest;
pub mod session;
pub mod ws;

// Primary clients
pub use error::AminoError;
pub use rest::{AminoRestClient, AminoRestClientBuilder, ApiResponse, CallOptions};
pub use session::{decode_sid, Session, SidClaims};
pub use ws::{AminoWsClient, ChatEvent, EventRouter, FrameEvent, ReconnectConfig, WsHandle};

// Commonly used type re-exports
pub use rest::types::*;
pub use ws::types::*;
