//! WebSocket transport for the radio connection.
//!
//! Each connection attempt runs as one task that exclusively owns its
//! socket. The task talks to the event loop only through channels: it
//! receives [`Outbound`] requests and reports [`SessionEvent`]s, tagged with
//! the attempt's generation. Every attempt reports exactly one
//! [`SessionEvent::Closed`], whether the dial failed, the peer went away, or
//! a close was requested.

use crate::endpoint::Endpoint;
use crate::errors::RemoteClientError;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{Instant, Interval};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long to wait for the peer to answer our Close frame.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Requests from the event loop to a session task.
#[derive(Debug)]
pub(crate) enum Outbound {
    /// Send a text frame.
    Text(String),
    /// Close gracefully (or abandon the dial if not yet open).
    Close,
}

/// Reports from a session task to the event loop.
#[derive(Debug)]
pub(crate) enum SessionEvent {
    Opened { generation: u64 },
    Message { generation: u64, text: String },
    Closed { generation: u64, reason: CloseReason },
}

/// Why a session ended.
#[derive(Debug)]
pub(crate) enum CloseReason {
    /// Close was requested locally before or after the socket opened.
    Requested,
    /// The peer closed the connection.
    Remote,
    /// Dial failure, abort, timeout, or protocol violation.
    Failed(RemoteClientError),
}

/// Per-attempt transport settings.
#[derive(Debug, Clone)]
pub(crate) struct SessionSettings {
    pub(crate) connect_timeout: Duration,
    pub(crate) ping_interval: Option<Duration>,
}

/// Opens the WebSocket, bounded by `timeout`.
async fn dial(endpoint: &Endpoint, timeout: Duration) -> Result<WsStream, RemoteClientError> {
    let (ws, response) = tokio::time::timeout(timeout, connect_async(endpoint.as_str()))
        .await
        .map_err(|_| RemoteClientError::Timeout(timeout))?
        .map_err(|e| {
            RemoteClientError::ConnectionFailed(format!("Failed to connect to {endpoint}: {e}"))
        })?;

    info!(status = %response.status(), "Connected to {}", endpoint);
    Ok(ws)
}

/// Runs one connection attempt to completion.
pub(crate) async fn run_session(
    generation: u64,
    endpoint: Endpoint,
    settings: SessionSettings,
    outbound: flume::Receiver<Outbound>,
    events: flume::Sender<SessionEvent>,
) {
    debug!(generation, "Dialing {}", endpoint);

    // Dropping the dial future on cancellation drops the half-open socket.
    let ws = tokio::select! {
        result = dial(&endpoint, settings.connect_timeout) => match result {
            Ok(ws) => ws,
            Err(e) => {
                let _ = events.send(SessionEvent::Closed { generation, reason: CloseReason::Failed(e) });
                return;
            }
        },
        () = wait_for_close(&outbound) => {
            debug!(generation, "Connection attempt cancelled");
            let _ = events.send(SessionEvent::Closed { generation, reason: CloseReason::Requested });
            return;
        }
    };

    let _ = events.send(SessionEvent::Opened { generation });

    let reason = match pump(ws, generation, &settings, &outbound, &events).await {
        Ok(reason) => reason,
        Err(e) => CloseReason::Failed(e),
    };
    let _ = events.send(SessionEvent::Closed { generation, reason });
}

/// Resolves once a close is requested or the event loop goes away.
async fn wait_for_close(outbound: &flume::Receiver<Outbound>) {
    loop {
        match outbound.recv_async().await {
            Ok(Outbound::Close) | Err(_) => return,
            Ok(Outbound::Text(_)) => trace!("Discarding outbound message before open"),
        }
    }
}

/// Moves frames in both directions until the connection ends.
async fn pump(
    ws: WsStream,
    generation: u64,
    settings: &SessionSettings,
    outbound: &flume::Receiver<Outbound>,
    events: &flume::Sender<SessionEvent>,
) -> Result<CloseReason, RemoteClientError> {
    let (mut sink, mut stream) = ws.split();
    let mut pings = settings
        .ping_interval
        .map(|period| tokio::time::interval_at(Instant::now() + period, period));
    let mut last_seen = Instant::now();

    loop {
        tokio::select! {
            frame = stream.next() => {
                let Some(frame) = frame else {
                    return Ok(CloseReason::Remote);
                };
                match frame {
                    Ok(message) => {
                        last_seen = Instant::now();
                        match message {
                            Message::Text(text) => {
                                trace!(generation, "<- {}", text.as_str());
                                let _ = events.send(SessionEvent::Message {
                                    generation,
                                    text: text.as_str().to_owned(),
                                });
                            }
                            Message::Binary(data) => {
                                debug!(generation, "Ignoring {} byte binary frame", data.len());
                            }
                            Message::Close(frame) => {
                                debug!(generation, ?frame, "Peer closed connection");
                            }
                            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
                        }
                    }
                    Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => {
                        return Ok(CloseReason::Remote);
                    }
                    Err(e) => return Err(e.into()),
                }
            }

            request = outbound.recv_async() => match request {
                Ok(Outbound::Text(text)) => {
                    trace!(generation, "-> {}", text);
                    sink.send(Message::Text(text.into())).await?;
                }
                Ok(Outbound::Close) | Err(_) => {
                    let frame = CloseFrame {
                        code: CloseCode::Normal,
                        reason: String::new().into(),
                    };
                    sink.send(Message::Close(Some(frame))).await?;
                    drain(&mut stream, generation).await;
                    return Ok(CloseReason::Requested);
                }
            },

            () = tick(&mut pings) => {
                let period = settings.ping_interval.unwrap_or(Duration::MAX);
                if last_seen.elapsed() > period.saturating_mul(2) {
                    warn!(generation, "No traffic for {:?}, dropping connection", last_seen.elapsed());
                    return Err(RemoteClientError::Timeout(last_seen.elapsed()));
                }
                sink.send(Message::Ping(Bytes::new())).await?;
            }
        }
    }
}

/// Reads until the peer finishes the close handshake, for at most
/// [`CLOSE_TIMEOUT`].
async fn drain<S>(stream: &mut S, generation: u64)
where
    S: futures::Stream<Item = Result<Message, WsError>> + Unpin,
{
    let finished = tokio::time::timeout(CLOSE_TIMEOUT, async {
        while let Some(Ok(_)) = stream.next().await {}
    })
    .await;

    if finished.is_err() {
        debug!(generation, "Peer did not complete close handshake within {:?}", CLOSE_TIMEOUT);
    }
}

async fn tick(pings: &mut Option<Interval>) {
    match pings {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
