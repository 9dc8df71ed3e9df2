//! Per-session event broadcaster and its WebSocket / SSE transports
//!
//! Each session gets its own `tokio::sync::broadcast` channel, created on the
//! first subscription. Sends for a session with no channel reach nobody.
//! Closing a session drops its sender: subscribers drain whatever is already
//! queued and then see the end of the stream. A closed session stays closed
//! until it is forgotten on delete, so later subscribers get an ended stream
//! and later sends are dropped.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
};
use futures_util::{SinkExt, Stream, StreamExt};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};

use super::error::ApiError;
use super::AppState;
use crate::events::{EventEnvelope, EventNotifier, SessionEvent};
use crate::models::state_machine::is_terminal_state;
use crate::utils::{read_lock_recover, write_lock_recover};

/// Default per-session channel capacity
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

enum Channel {
    Open(broadcast::Sender<EventEnvelope>),
    Closed,
}

/// Fans session events out to the subscribers of that session only
pub struct SessionBroadcaster {
    channels: RwLock<HashMap<String, Channel>>,
    capacity: usize,
}

impl SessionBroadcaster {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Register a subscriber. Only events sent after this call are received.
    ///
    /// On a closed session the receiver reports `Closed` straight away.
    pub fn subscribe(&self, session_id: &str) -> broadcast::Receiver<EventEnvelope> {
        let mut channels = write_lock_recover(&self.channels);
        let channel = channels
            .entry(session_id.to_string())
            .or_insert_with(|| Channel::Open(broadcast::channel(self.capacity).0));
        match channel {
            Channel::Open(sender) => {
                log::debug!(
                    "Subscriber added for session {} ({} total)",
                    session_id,
                    sender.receiver_count() + 1
                );
                sender.subscribe()
            }
            Channel::Closed => {
                log::debug!("Subscriber for closed session {} gets an ended stream", session_id);
                broadcast::channel(1).1
            }
        }
    }

    pub fn subscriber_count(&self, session_id: &str) -> usize {
        match read_lock_recover(&self.channels).get(session_id) {
            Some(Channel::Open(sender)) => sender.receiver_count(),
            _ => 0,
        }
    }

    /// Number of sessions with an open channel
    pub fn session_count(&self) -> usize {
        read_lock_recover(&self.channels)
            .values()
            .filter(|channel| matches!(channel, Channel::Open(_)))
            .count()
    }

    pub fn is_closed(&self, session_id: &str) -> bool {
        matches!(
            read_lock_recover(&self.channels).get(session_id),
            Some(Channel::Closed)
        )
    }

    /// Drop the session's channel if nobody is listening any more
    pub fn prune(&self, session_id: &str) {
        let mut channels = write_lock_recover(&self.channels);
        if let Some(Channel::Open(sender)) = channels.get(session_id) {
            if sender.receiver_count() == 0 {
                channels.remove(session_id);
                log::debug!("Removed idle event channel for session {}", session_id);
            }
        }
    }

    /// Drop all state for a deleted session, including its closed marker
    pub fn forget(&self, session_id: &str) {
        write_lock_recover(&self.channels).remove(session_id);
    }

    /// Close every session channel (server shutdown)
    pub fn close_all(&self) {
        let mut channels = write_lock_recover(&self.channels);
        let mut count = 0;
        for channel in channels.values_mut() {
            if matches!(channel, Channel::Open(_)) {
                *channel = Channel::Closed;
                count += 1;
            }
        }
        if count > 0 {
            log::info!("Closed {} session event channel(s)", count);
        }
    }
}

impl Default for SessionBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl EventNotifier for SessionBroadcaster {
    fn send_message(&self, session_id: &str, event: SessionEvent) -> usize {
        let envelope = EventEnvelope::new(event);
        let event_type = envelope.event_type();
        // Sending under the read lock keeps close_connection from dropping
        // the sender halfway through a send
        let channels = read_lock_recover(&self.channels);
        let sender = match channels.get(session_id) {
            Some(Channel::Open(sender)) => sender,
            Some(Channel::Closed) => {
                log::debug!("Session {} is closed, dropping {}", session_id, event_type);
                return 0;
            }
            None => {
                log::trace!("No subscribers for session {}, dropping {}", session_id, event_type);
                return 0;
            }
        };
        match sender.send(envelope) {
            Ok(count) => {
                log::debug!("Sent {} to {} subscriber(s) of session {}", event_type, count, session_id);
                count
            }
            Err(_) => 0,
        }
    }

    fn close_connection(&self, session_id: &str) {
        let previous = write_lock_recover(&self.channels)
            .insert(session_id.to_string(), Channel::Closed);
        if matches!(previous, Some(Channel::Open(_))) {
            log::info!("Closed event channel for session {}", session_id);
        }
    }
}

/// Prunes the session channel when a transport stream is dropped
struct SubscriptionGuard {
    notifier: Arc<SessionBroadcaster>,
    session_id: String,
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.notifier.prune(&self.session_id);
    }
}

/// Subscribe a transport to a session's events.
///
/// Runs before the WebSocket upgrade or SSE response so no event sent after
/// the handshake is missed. A session that already finished gets an ended
/// stream.
fn open_stream(
    state: &AppState,
    session_id: &str,
) -> Result<broadcast::Receiver<EventEnvelope>, ApiError> {
    let session = state.store.get(session_id)?;
    if is_terminal_state(session.status) {
        state.notifier.close_connection(session_id);
    }
    Ok(state.notifier.subscribe(session_id))
}

/// WebSocket upgrade handler for `/ws/sessions/:id`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let event_rx = open_stream(&state, &session_id)?;
    let guard = SubscriptionGuard {
        notifier: state.notifier.clone(),
        session_id: session_id.clone(),
    };

    Ok(ws.on_upgrade(move |socket| handle_websocket(socket, event_rx, guard)))
}

/// Handle a WebSocket connection
async fn handle_websocket(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<EventEnvelope>,
    guard: SubscriptionGuard,
) {
    let session_id = guard.session_id.clone();
    let (mut sender, mut receiver) = socket.split();

    log::info!("WebSocket client connected to session {}", session_id);

    let mut send_task = tokio::spawn(async move {
        loop {
            match event_rx.recv().await {
                Ok(envelope) => match serde_json::to_string(&envelope) {
                    Ok(json) => {
                        if sender.send(Message::Text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => log::warn!("Failed to serialize event: {}", e),
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::warn!("WebSocket subscriber lagged, skipped {} event(s)", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Close(_)) => break,
                Ok(Message::Text(text)) => {
                    log::debug!("Ignoring client message: {}", text);
                }
                Ok(_) => {}
                Err(e) => {
                    log::warn!("WebSocket error: {}", e);
                    break;
                }
            }
        }
    });

    // Wait for the aborted task so its receiver is gone before pruning
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
            let _ = recv_task.await;
        }
        _ = &mut recv_task => {
            send_task.abort();
            let _ = send_task.await;
        }
    }

    drop(guard);
    log::info!("WebSocket connection closed for session {}", session_id);
}

/// Server-Sent Events handler for `/api/sessions/:id/events`
///
/// Each envelope is one SSE event whose name is the envelope type.
pub async fn sse_handler(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let event_rx = open_stream(&state, &session_id)?;
    let guard = SubscriptionGuard {
        notifier: state.notifier.clone(),
        session_id,
    };

    let stream = BroadcastStream::new(event_rx).filter_map(move |item| {
        let _ = &guard;
        let event = match item {
            Ok(envelope) => match Event::default()
                .event(envelope.event_type())
                .json_data(&envelope)
            {
                Ok(event) => Some(Ok(event)),
                Err(e) => {
                    log::warn!("Failed to encode SSE event: {}", e);
                    None
                }
            },
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                log::warn!("SSE subscriber lagged, skipped {} event(s)", skipped);
                None
            }
        };
        std::future::ready(event)
    });

    let keep_alive = KeepAlive::new().interval(Duration::from_secs(state.config.events.keep_alive_secs));
    Ok(Sse::new(stream).keep_alive(keep_alive))
}
