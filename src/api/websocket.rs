use crate::smoothing::SharedEmotion;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use super::server::AppState;

/// Upgrade to a socket that pushes the current emotion on a fixed period
pub async fn emotion_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| push_emotions(socket, state.emotion, state.ws_push_interval))
}

/// Per-client push loop. Ends on close or send failure without affecting
/// other clients.
async fn push_emotions(socket: WebSocket, emotion: SharedEmotion, period: Duration) {
    info!("WebSocket client connected");

    let (mut sender, mut receiver) = socket.split();
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut pushed = 0u64;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let payload = match serde_json::to_string(&emotion.get()) {
                    Ok(payload) => payload,
                    Err(e) => {
                        error!("Failed to encode emotion update: {}", e);
                        continue;
                    }
                };

                if sender.send(Message::Text(payload)).await.is_err() {
                    debug!("WebSocket send failed, dropping client");
                    break;
                }
                pushed += 1;
            }
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    debug!("WebSocket receive error: {}", e);
                    break;
                }
                Some(Ok(_)) => {}
            }
        }
    }

    info!("WebSocket client disconnected after {} updates", pushed);
}
