//! Live update WebSocket.

use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use mockable::Clock;
use std::sync::Arc;
use tracing::debug;

use super::AppState;
use crate::board::ports::BoardStore;
use crate::live::{
    adapters::{DEFAULT_OUTBOX_CAPACITY, WebSocketChannel},
    services::Broadcaster,
};

const PING: &str = "ping";
const PONG: &str = "pong";

pub(super) async fn connect<S, C>(
    State(state): State<AppState<S, C>>,
    upgrade: WebSocketUpgrade,
) -> Response
where
    S: BoardStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let broadcaster = Arc::clone(state.broadcaster());
    upgrade.on_upgrade(move |socket| serve(socket, broadcaster))
}

/// Registers the connection, pumps queued frames to the peer and answers
/// liveness pings until the peer goes away.
async fn serve(socket: WebSocket, broadcaster: Arc<Broadcaster>) {
    let (channel, mut outbox) = WebSocketChannel::new(DEFAULT_OUTBOX_CAPACITY);
    let replies = channel.outbox();
    let channel_id = broadcaster.connect(Arc::new(channel));
    let (mut sink, mut stream) = socket.split();

    let writer = tokio::spawn(async move {
        while let Some(frame) = outbox.recv().await {
            if sink.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(message)) = stream.next().await {
        match message {
            Message::Text(text) if text.as_str() == PING => {
                if replies.send(PONG.to_owned()).await.is_err() {
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    debug!(channel = %channel_id, "viewer went away");
    broadcaster.disconnect(channel_id);
    writer.abort();
}
