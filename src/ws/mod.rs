pub mod client;
pub mod router;
pub mod types;

pub use client::{AminoWsClient, ReconnectConfig, WsHandle};
pub use router::{ChatEvent, EventRouter, FrameEvent};
