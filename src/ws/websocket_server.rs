use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite::protocol::Message;
use tracing::{debug, info, warn};

use crate::error::TimerError;
use crate::pomodoro::events::{EventSink, Snapshot, TimerEvent};
use crate::pomodoro::pomodoro::Mode;
use crate::runtime::{Command, RequestSender, send_command};
use crate::settings::Theme;

const EVENT_BUFFER: usize = 64; // Events a slow client may fall behind by

/// Commands a browser page may send, e.g. `{"type":"start"}` or
/// `{"type":"update_config","mode":"focus","minutes":10}`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Start,
    Pause,
    Toggle,
    Reset,
    Snapshot,
    Theme,
    ToggleTheme,
    UpdateConfig {
        mode: Mode,
        minutes: serde_json::Number,
    },
}

impl ClientMessage {
    pub fn into_command(self) -> Result<Command, TimerError> {
        Ok(match self {
            ClientMessage::Start => Command::Start,
            ClientMessage::Pause => Command::Pause,
            ClientMessage::Toggle => Command::Toggle,
            ClientMessage::Reset => Command::Reset,
            ClientMessage::Snapshot => Command::Status,
            ClientMessage::Theme => Command::Theme,
            ClientMessage::ToggleTheme => Command::ToggleTheme,
            ClientMessage::UpdateConfig { mode, minutes } => {
                let minutes = minutes
                    .as_i64()
                    .ok_or_else(|| TimerError::InvalidMinutes(minutes.to_string()))?;
                Command::UpdateConfig { mode, minutes }
            }
        })
    }
}

pub fn parse_client_message(text: &str) -> Result<Command, TimerError> {
    serde_json::from_str::<ClientMessage>(text)?.into_command()
}

#[derive(Debug, Serialize)]
pub struct WebSocketResponse {
    pub success: bool,
    pub message: Option<String>,
    pub snapshot: Option<Snapshot>,
    pub theme: Option<Theme>,
}

impl WebSocketResponse {
    fn failure(e: &TimerError) -> Self {
        Self {
            success: false,
            message: Some(e.to_string()),
            snapshot: None,
            theme: None,
        }
    }
}

pub type EventSender = broadcast::Sender<String>;

pub fn create_event_channel() -> EventSender {
    broadcast::channel(EVENT_BUFFER).0
}

/// Forwards controller events, as JSON, to every connected client.
pub struct BroadcastSink {
    tx: EventSender,
}

impl BroadcastSink {
    pub fn new(tx: EventSender) -> Self {
        Self { tx }
    }
}

impl EventSink for BroadcastSink {
    fn on_event(&mut self, event: &TimerEvent) {
        match serde_json::to_string(event) {
            // No connected clients is not an error.
            Ok(json) => {
                let _ = self.tx.send(json);
            }
            Err(e) => warn!(error = %e, "failed to encode timer event"),
        }
    }
}

pub async fn start_websocket_server(
    addr: SocketAddr,
    requests: RequestSender,
    events: EventSender,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "WebSocket server listening");
    serve(listener, requests, events).await;
    Ok(())
}

pub async fn serve(listener: TcpListener, requests: RequestSender, events: EventSender) {
    while let Ok((stream, peer_addr)) = listener.accept().await {
        info!(%peer_addr, "new WebSocket connection");
        tokio::spawn(handle_connection(
            stream,
            peer_addr,
            requests.clone(),
            events.subscribe(),
        ));
    }
}

async fn respond(requests: &RequestSender, text: &str) -> WebSocketResponse {
    let command = match parse_client_message(text) {
        Ok(command) => command,
        Err(e) => {
            debug!(error = %e, "rejecting client message");
            return WebSocketResponse::failure(&e);
        }
    };
    match send_command(requests, command).await {
        Ok(reply) => WebSocketResponse {
            success: true,
            message: None,
            snapshot: Some(reply.snapshot),
            theme: Some(reply.theme),
        },
        Err(e) => WebSocketResponse::failure(&e),
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    requests: RequestSender,
    mut events: broadcast::Receiver<String>,
) {
    let ws_stream = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!(%peer_addr, error = %e, "WebSocket handshake failed");
            return;
        }
    };

    debug!(%peer_addr, "WebSocket handshake completed");

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    loop {
        tokio::select! {
            msg = ws_receiver.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    let response = respond(&requests, &text).await;
                    match serde_json::to_string(&response) {
                        Ok(json) => {
                            if let Err(e) = ws_sender.send(Message::Text(json)).await {
                                warn!(%peer_addr, error = %e, "failed to send WebSocket response");
                                break;
                            }
                        }
                        Err(e) => warn!(error = %e, "failed to encode WebSocket response"),
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    info!(%peer_addr, "WebSocket connection closed");
                    break;
                }
                Some(Ok(Message::Ping(data))) => {
                    if let Err(e) = ws_sender.send(Message::Pong(data)).await {
                        warn!(%peer_addr, error = %e, "failed to send pong");
                        break;
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(%peer_addr, error = %e, "WebSocket error");
                    break;
                }
            },
            event = events.recv() => match event {
                Ok(json) => {
                    if let Err(e) = ws_sender.send(Message::Text(json)).await {
                        warn!(%peer_addr, error = %e, "failed to push timer event");
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(%peer_addr, skipped, "client fell behind, dropped timer events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    debug!(%peer_addr, "WebSocket connection terminated");
}
