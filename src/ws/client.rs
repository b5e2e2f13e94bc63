//! Realtime connection manager.
//!
//! One [`AminoWsClient`] owns one live transport at a time. The handshake
//! body embeds a timestamp the server expires, so the connection is torn
//! down and re-established on a fixed 120 second schedule; a closed
//! transport reconnects after a short fixed delay, and transport errors
//! feed the caller-configured backoff policy instead of killing anything.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::{SinkExt, StreamExt};
use rand::random;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderValue, Request};
use tokio_tungstenite::tungstenite::Message;

use crate::auth;
use crate::env::WS_URL;
use crate::error::AminoError;
use crate::rest::client::{now_ms, HEADER_AUTH, HEADER_DEVICE_ID, HEADER_MSG_SIG};
use crate::rest::AminoRestClient;
use crate::session::Session;
use crate::ws::router::EventRouter;

/// The handshake timestamp expires server-side; refresh the connection on
/// this schedule.
const REFRESH_INTERVAL: Duration = Duration::from_secs(120);

/// Delay before reconnecting after a clean transport close.
const CLOSE_RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Backoff policy for reconnecting after transport errors.
///
/// Exponential backoff with jitter, capped at `max_delay`. `max_retries`
/// bounds consecutive failures; `None` retries forever. A successful
/// connection resets the failure count.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Jitter factor in range `[0.0, 1.0]`.
    pub jitter: f64,
    pub max_retries: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(30),
            jitter: 0.2,
            max_retries: None,
        }
    }
}

impl ReconnectConfig {
    fn backoff_delay(&self, failure_number: u32) -> Duration {
        let exp = 2f64.powi(failure_number.saturating_sub(1) as i32);
        let mut delay = self.base_delay.mul_f64(exp);
        if delay > self.max_delay {
            delay = self.max_delay;
        }

        let jitter = self.jitter.clamp(0.0, 1.0);
        if jitter > 0.0 {
            let factor = 1.0 - jitter + random::<f64>() * (2.0 * jitter);
            delay = delay.mul_f64(factor);
        }
        delay
    }

    fn exhausted(&self, failures: u32) -> bool {
        self.max_retries.is_some_and(|max| failures > max)
    }
}

/// Everything needed to open one realtime connection.
#[derive(Debug, Clone)]
pub(crate) struct HandshakeData {
    pub url: String,
    pub device_id: String,
    pub auth: String,
    pub signature: String,
}

/// Build the signed handshake: body `deviceId|timestampMs`, its signature
/// in the `NDC-MSG-SIG` header, and the body percent-escaped into the
/// connection URL.
fn build_handshake(device_id: &str, session: &Session, timestamp_ms: i64) -> HandshakeData {
    let body = format!("{device_id}|{timestamp_ms}");
    HandshakeData {
        url: format!("{WS_URL}/?signbody={}", body.replace('|', "%7C")),
        device_id: device_id.to_owned(),
        auth: session.auth_header(),
        signature: auth::sign(body.as_bytes()),
    }
}

/// A connected transport yielding inbound text frames. `None` means the
/// peer closed cleanly; `Some(Err(_))` is a transport error.
pub(crate) trait FrameSource: Send {
    fn next_text(&mut self) -> BoxFuture<'_, Option<Result<String, AminoError>>>;
}

/// Opens one transport from a handshake.
pub(crate) trait Connector: Send + Sync {
    fn connect(
        &self,
        handshake: HandshakeData,
    ) -> BoxFuture<'static, Result<Box<dyn FrameSource>, AminoError>>;
}

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

struct WsFrameSource {
    inner: WsStream,
}

impl FrameSource for WsFrameSource {
    fn next_text(&mut self) -> BoxFuture<'_, Option<Result<String, AminoError>>> {
        Box::pin(async move {
            while let Some(msg) = self.inner.next().await {
                match msg {
                    Ok(Message::Text(text)) => return Some(Ok(text)),
                    Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                        Ok(text) => return Some(Ok(text)),
                        Err(err) => return Some(Err(AminoError::Ws(err.to_string()))),
                    },
                    Ok(Message::Ping(payload)) => {
                        if let Err(err) = self.inner.send(Message::Pong(payload)).await {
                            return Some(Err(AminoError::Ws(err.to_string())));
                        }
                    }
                    Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => {}
                    Ok(Message::Close(_)) => return None,
                    Err(err) => return Some(Err(AminoError::Ws(err.to_string()))),
                }
            }
            None
        })
    }
}

struct WsConnector;

impl Connector for WsConnector {
    fn connect(
        &self,
        handshake: HandshakeData,
    ) -> BoxFuture<'static, Result<Box<dyn FrameSource>, AminoError>> {
        Box::pin(async move {
            let mut req: Request<()> = handshake
                .url
                .into_client_request()
                .map_err(|e| AminoError::Ws(e.to_string()))?;

            req.headers_mut().insert(
                HEADER_DEVICE_ID,
                HeaderValue::from_str(&handshake.device_id)
                    .map_err(|e| AminoError::Header(e.to_string()))?,
            );
            req.headers_mut().insert(
                HEADER_AUTH,
                HeaderValue::from_str(&handshake.auth)
                    .map_err(|e| AminoError::Header(e.to_string()))?,
            );
            req.headers_mut().insert(
                HEADER_MSG_SIG,
                HeaderValue::from_str(&handshake.signature)
                    .map_err(|e| AminoError::Header(e.to_string()))?,
            );

            let (stream, _resp) = connect_async(req)
                .await
                .map_err(|e| AminoError::Ws(e.to_string()))?;

            Ok(Box::new(WsFrameSource { inner: stream }) as Box<dyn FrameSource>)
        })
    }
}

/// Handle to a running realtime connection.
///
/// [`stop`](Self::stop) tears down the transport, cancels the scheduled
/// refresh, and makes any pending reconnect a no-op. Dropping the handle
/// has the same effect.
#[derive(Debug)]
pub struct WsHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl WsHandle {
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

/// Manages one persistent realtime connection and routes its frames.
pub struct AminoWsClient {
    rest: AminoRestClient,
    config: ReconnectConfig,
    connector: Arc<dyn Connector>,
}

impl AminoWsClient {
    pub fn new(rest: AminoRestClient) -> Self {
        Self {
            rest,
            config: ReconnectConfig::default(),
            connector: Arc::new(WsConnector),
        }
    }

    pub fn with_reconnect_config(mut self, config: ReconnectConfig) -> Self {
        self.config = config;
        self
    }

    #[cfg(test)]
    fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = connector;
        self
    }

    /// Open the realtime connection and start dispatching frames to
    /// `router` on a background task.
    ///
    /// Fails with [`AminoError::AuthRequired`] when no session is active.
    pub fn start(&self, router: EventRouter) -> Result<WsHandle, AminoError> {
        if self.rest.session().is_none() {
            return Err(AminoError::AuthRequired("realtime connection requires login"));
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run_loop(
            self.rest.clone(),
            router,
            Arc::clone(&self.connector),
            self.config.clone(),
            shutdown_rx,
        ));

        Ok(WsHandle {
            shutdown: shutdown_tx,
            task,
        })
    }
}

impl std::fmt::Debug for AminoWsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AminoWsClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// The connection state machine. Exactly one transport is live at a time:
/// every reconnect path drops the old transport before the new handshake,
/// so a close racing the scheduled refresh still yields one connection and
/// no duplicate dispatch.
async fn run_loop(
    rest: AminoRestClient,
    router: EventRouter,
    connector: Arc<dyn Connector>,
    config: ReconnectConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut failures: u32 = 0;

    'connect: loop {
        if *shutdown.borrow() {
            break;
        }

        let Some(session) = rest.session() else {
            router
                .dispatch_connection_error(Arc::new(AminoError::AuthRequired(
                    "realtime connection requires login",
                )))
                .await;
            break;
        };

        let handshake = build_handshake(rest.device_id(), &session, now_ms());
        let connected = tokio::select! {
            _ = shutdown.changed() => break,
            result = connector.connect(handshake) => result,
        };

        let mut source = match connected {
            Ok(source) => {
                tracing::debug!("realtime connected");
                failures = 0;
                source
            }
            Err(err) => {
                tracing::debug!(%err, "realtime connect failed");
                router.dispatch_connection_error(Arc::new(err)).await;
                failures += 1;
                if config.exhausted(failures) {
                    tracing::warn!(failures, "reconnect attempts exhausted");
                    break;
                }
                let delay = config.backoff_delay(failures);
                tokio::select! {
                    _ = shutdown.changed() => break,
                    _ = sleep(delay) => {}
                }
                continue;
            }
        };

        let refresh = sleep(REFRESH_INTERVAL);
        tokio::pin!(refresh);

        loop {
            tokio::select! {
                _ = shutdown.changed() => break 'connect,
                _ = &mut refresh => {
                    tracing::debug!("scheduled reconnect (handshake refresh)");
                    continue 'connect;
                }
                message = source.next_text() => match message {
                    Some(Ok(text)) => router.dispatch_text(&rest, &text).await,
                    Some(Err(err)) => {
                        tracing::debug!(%err, "realtime transport error");
                        router.dispatch_connection_error(Arc::new(err)).await;
                        failures += 1;
                        if config.exhausted(failures) {
                            tracing::warn!(failures, "reconnect attempts exhausted");
                            break 'connect;
                        }
                        let delay = config.backoff_delay(failures);
                        drop(source);
                        tokio::select! {
                            _ = shutdown.changed() => break 'connect,
                            _ = sleep(delay) => {}
                        }
                        continue 'connect;
                    }
                    None => {
                        tracing::debug!("realtime connection closed, reconnecting");
                        drop(source);
                        tokio::select! {
                            _ = shutdown.changed() => break 'connect,
                            _ = sleep(CLOSE_RECONNECT_DELAY) => {}
                        }
                        continue 'connect;
                    }
                }
            }
        }
    }
}
