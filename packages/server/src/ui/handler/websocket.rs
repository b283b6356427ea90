//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{
        ChatMessage, ConnectionId, PlaybackPatch, PlaybackSync, RoomId, Timestamp,
        UserDescriptor, ValueObjectError,
    },
    infrastructure::dto::websocket::ClientEvent,
    ui::state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    // The connection id is assigned only once the upgrade has succeeded.
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// The loop ends when the channel is closed (the client was unregistered) or the
/// socket refuses a write. Queued messages are flushed before the close frame.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                return;
            }
        }
        let _ = sender.send(Message::Close(None)).await;
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();

    // Create a channel for this client to receive messages
    let (tx, rx) = mpsc::unbounded_channel();
    let connection_id = state.connect_client_usecase.execute(tx).await;

    let state_clone = state.clone();
    let id_clone = connection_id.clone();

    // Spawn a task to receive events from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on '{}': {}", id_clone, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    let event = match serde_json::from_str::<ClientEvent>(&text) {
                        Ok(event) => event,
                        Err(e) => {
                            tracing::warn!("Dropped malformed frame from '{}': {}", id_clone, e);
                            continue;
                        }
                    };
                    if let Err(e) = dispatch_event(&state_clone, &id_clone, event).await {
                        tracing::warn!("Dropped invalid event from '{}': {}", id_clone, e);
                    }
                }
                Message::Close(_) => {
                    tracing::info!("Client '{}' requested close", id_clone);
                    break;
                }
                // Ping/pong is handled automatically by the WebSocket protocol
                _ => {}
            }
        }
    });

    // Spawn a task to push queued events to this client
    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // No-op when an administrative kick already tore the connection down
    state
        .disconnect_client_usecase
        .execute(&connection_id)
        .await;
}

/// Route one decoded client event to its use case.
///
/// Use case rejections are logged here; only identifiers that fail validation
/// are reported back to the caller.
async fn dispatch_event(
    state: &AppState,
    connection_id: &ConnectionId,
    event: ClientEvent,
) -> Result<(), ValueObjectError> {
    match event {
        ClientEvent::JoinRoom(payload) => {
            let room_id = RoomId::new(payload.room_id)?;
            let user = UserDescriptor::from(payload.user);
            if let Err(e) = state
                .join_room_usecase
                .execute(connection_id, room_id, user)
                .await
            {
                tracing::warn!("Join rejected for '{}': {}", connection_id, e);
            }
        }
        ClientEvent::LeaveRoom(payload) => {
            let room_id = RoomId::new(payload.room_id)?;
            state
                .leave_room_usecase
                .execute(connection_id, &room_id)
                .await;
        }
        ClientEvent::Signal(payload) => {
            let target = ConnectionId::new(payload.target)?;
            state
                .relay_signal_usecase
                .execute(connection_id, &target, payload.payload)
                .await;
        }
        ClientEvent::ChatMessage(dto) => {
            let message = ChatMessage::try_from(dto)?;
            if let Err(e) = state
                .send_message_usecase
                .execute(connection_id, message)
                .await
            {
                tracing::debug!("Chat message from '{}' not sent: {}", connection_id, e);
            }
        }
        ClientEvent::ChatMessageUpdate(dto) => {
            let message = ChatMessage::try_from(dto)?;
            if let Err(e) = state
                .update_message_usecase
                .execute(connection_id, message)
                .await
            {
                tracing::debug!("Chat update from '{}' not applied: {}", connection_id, e);
            }
        }
        ClientEvent::GetHistory(payload) => {
            let room_id = RoomId::new(payload.room_id)?;
            state
                .get_chat_history_usecase
                .execute(connection_id, &room_id)
                .await;
        }
        ClientEvent::Typing(payload) => {
            let room_id = RoomId::new(payload.room_id)?;
            state
                .typing_usecase
                .start(connection_id, &room_id, payload.user)
                .await;
        }
        ClientEvent::StopTyping(payload) => {
            let room_id = RoomId::new(payload.room_id)?;
            state.typing_usecase.stop(connection_id, &room_id).await;
        }
        ClientEvent::TubeUpdate(payload) => {
            let room_id = RoomId::new(payload.room_id)?;
            let patch = PlaybackPatch {
                video_id: payload.video_id,
                is_playing: payload.is_playing,
                current_position: payload.current_position,
                timestamp: Timestamp::new(payload.timestamp),
            };
            if let Err(e) = state
                .playback_usecase
                .update(connection_id, &room_id, patch)
                .await
            {
                tracing::debug!("Playback update from '{}' ignored: {}", connection_id, e);
            }
        }
        ClientEvent::TubeSync(payload) => {
            let room_id = RoomId::new(payload.room_id)?;
            let sync = PlaybackSync {
                current_position: payload.current_position,
                is_playing: payload.is_playing,
            };
            if let Err(e) = state
                .playback_usecase
                .sync(connection_id, &room_id, sync)
                .await
            {
                tracing::debug!("Playback sync from '{}' ignored: {}", connection_id, e);
            }
        }
        ClientEvent::TubeRequestState(payload) => {
            let room_id = RoomId::new(payload.room_id)?;
            state
                .playback_usecase
                .request_state(connection_id, &room_id)
                .await;
        }
    }
    Ok(())
}
