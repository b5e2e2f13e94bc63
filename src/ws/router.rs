//! Typed dispatch of inbound realtime frames.
//!
//! Listeners are registered per event kind before the connection starts;
//! registration lists are append-only and evaluated in registration order.
//! Command triggers match when they are a case-sensitive prefix of the
//! message content, and every matching command fires.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::AminoError;
use crate::rest::types::{ChatMessage, MessageParams, Mention};
use crate::rest::AminoRestClient;
use crate::ws::types::{ChatEnvelope, InboundFrame, CHAT_MESSAGE_DEFAULT};

type ChatHandler = Box<dyn Fn(ChatEvent) -> BoxFuture<'static, ()> + Send + Sync>;
type FrameHandler = Box<dyn Fn(FrameEvent) -> BoxFuture<'static, ()> + Send + Sync>;
type ErrorHandler = Box<dyn Fn(Arc<AminoError>) -> BoxFuture<'static, ()> + Send + Sync>;

/// A chat frame delivered to listeners, with a bound reply capability.
///
/// The originating NDC id travels with the event, so replies are sent
/// under the right community without touching any shared client state.
#[derive(Clone)]
pub struct ChatEvent {
    rest: AminoRestClient,
    pub ndc_id: i64,
    pub message: ChatMessage,
    pub alert_option: Option<i64>,
    pub membership_status: Option<i64>,
}

impl ChatEvent {
    fn new(rest: AminoRestClient, envelope: ChatEnvelope) -> Self {
        Self {
            rest,
            ndc_id: envelope.ndc_id,
            message: envelope.chat_message,
            alert_option: envelope.alert_option,
            membership_status: envelope.membership_status,
        }
    }

    /// Message text, or empty for non-text payloads.
    pub fn content(&self) -> &str {
        self.message.content.as_deref().unwrap_or_default()
    }

    /// Send a text reply threaded to this message, into its originating
    /// community.
    pub async fn reply(&self, text: impl Into<String>) -> Result<ChatMessage, AminoError> {
        self.reply_with(text, Vec::new(), CHAT_MESSAGE_DEFAULT).await
    }

    /// Reply with mentions and an explicit message type.
    pub async fn reply_with(
        &self,
        text: impl Into<String>,
        mentions: Vec<Mention>,
        message_type: i64,
    ) -> Result<ChatMessage, AminoError> {
        self.rest
            .send_message(
                self.ndc_id,
                MessageParams {
                    thread_id: self.message.thread_id.clone(),
                    text: Some(text.into()),
                    reply_to: Some(self.message.message_id.clone()),
                    mentions,
                    message_type,
                },
            )
            .await
    }
}

/// One inbound frame as seen by catch-all listeners.
///
/// Chat frames whose payload parsed arrive as [`FrameEvent::Chat`], so the
/// reply capability is attached before any emission; everything else
/// (other categories, chat frames with a broken payload) arrives raw.
#[derive(Debug, Clone)]
pub enum FrameEvent {
    Chat(ChatEvent),
    Other(InboundFrame),
}

impl std::fmt::Debug for ChatEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatEvent")
            .field("ndc_id", &self.ndc_id)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Routes decoded frames to registered listeners.
///
/// Build one, register listeners, then hand it to
/// [`AminoWsClient::start`](crate::ws::AminoWsClient::start). Listener
/// futures for one frame run to completion, in order, before the next
/// frame is dispatched.
#[derive(Default)]
pub struct EventRouter {
    text_message: Vec<ChatHandler>,
    chat_message: Vec<ChatHandler>,
    any_frame: Vec<FrameHandler>,
    connection_error: Vec<ErrorHandler>,
    commands: Vec<(String, ChatHandler)>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen for plain text chat messages (message type 0).
    pub fn on_text_message<F, Fut>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(ChatEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.text_message.push(Box::new(move |ev| Box::pin(handler(ev))));
        self
    }

    /// Listen for every default-typed chat message.
    pub fn on_chat_message<F, Fut>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(ChatEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.chat_message.push(Box::new(move |ev| Box::pin(handler(ev))));
        self
    }

    /// Listen for every inbound frame of any category. See [`FrameEvent`].
    pub fn on_frame<F, Fut>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(FrameEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.any_frame.push(Box::new(move |frame| Box::pin(handler(frame))));
        self
    }

    /// Listen for transport-level connection errors.
    pub fn on_connection_error<F, Fut>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(Arc<AminoError>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.connection_error.push(Box::new(move |err| Box::pin(handler(err))));
        self
    }

    /// Register a command. The handler fires for every text message whose
    /// content starts with `trigger`. Commands fire in registration order
    /// and multiple commands may fire for one message.
    pub fn command<F, Fut>(&mut self, trigger: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(ChatEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.commands
            .push((trigger.into(), Box::new(move |ev| Box::pin(handler(ev)))));
        self
    }

    /// Parse one raw text message and dispatch it. Malformed frames are
    /// logged and skipped rather than failing the receive loop.
    pub async fn dispatch_text(&self, rest: &AminoRestClient, text: &str) {
        match serde_json::from_str::<InboundFrame>(text) {
            Ok(frame) => self.dispatch_frame(rest, frame).await,
            Err(err) => tracing::warn!(%err, "skipping malformed frame"),
        }
    }

    /// Dispatch one decoded frame.
    ///
    /// The chat event, with its bound reply capability, is built once
    /// before any emission. Chat frames with a default-typed message
    /// emit, in order: the text-message event, every matching command,
    /// the chat-message event. Every frame additionally reaches the
    /// catch-all listeners as a [`FrameEvent`].
    pub async fn dispatch_frame(&self, rest: &AminoRestClient, frame: InboundFrame) {
        let mut chat_event = None;
        if frame.is_chat() {
            match frame.parse_chat() {
                Ok(envelope) => chat_event = Some(ChatEvent::new(rest.clone(), envelope)),
                Err(err) => tracing::warn!(%err, "skipping malformed chat payload"),
            }
        }

        if let Some(event) = &chat_event {
            if event.message.message_type == CHAT_MESSAGE_DEFAULT {
                for handler in &self.text_message {
                    handler(event.clone()).await;
                }
                let content = event.content();
                for (trigger, handler) in &self.commands {
                    if content.starts_with(trigger.as_str()) {
                        handler(event.clone()).await;
                    }
                }
                for handler in &self.chat_message {
                    handler(event.clone()).await;
                }
            }
        }

        let any = match chat_event {
            Some(event) => FrameEvent::Chat(event),
            None => FrameEvent::Other(frame),
        };
        for handler in &self.any_frame {
            handler(any.clone()).await;
        }
    }

    pub(crate) async fn dispatch_connection_error(&self, err: Arc<AminoError>) {
        for handler in &self.connection_error {
            handler(Arc::clone(&err)).await;
        }
    }
}

impl std::fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRouter")
            .field("text_message", &self.text_message.len())
            .field("chat_message", &self.chat_message.len())
            .field("any_frame", &self.any_frame.len())
            .field("connection_error", &self.connection_error.len())
            .field(
                "commands",
                &self.commands.iter().map(|(t, _)| t.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
