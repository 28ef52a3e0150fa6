//! WebSocket upgrade handler

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::app::AppState;
use crate::relay::RelayHub;
use crate::util::rate_limit::ConnectionRateLimiter;
use crate::ws::protocol::ConnId;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let hub = state.relay.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, hub: Arc<RelayHub>) {
    let (ws_sink, ws_stream) = socket.split();

    let (conn_id, outbound_rx) = hub.connect();

    run_session(&conn_id, &hub, ws_sink, ws_stream, outbound_rx).await;

    // Cleanup on disconnect
    hub.disconnect(&conn_id);

    info!(conn_id = %conn_id, "WebSocket connection closed");
}

/// Run the WebSocket session with read/write split
async fn run_session(
    conn_id: &ConnId,
    hub: &RelayHub,
    mut ws_sink: futures::stream::SplitSink<WebSocket, Message>,
    mut ws_stream: futures::stream::SplitStream<WebSocket>,
    mut outbound_rx: mpsc::Receiver<String>,
) {
    let rate_limiter = ConnectionRateLimiter::new();

    // Spawn writer task: relay queue -> WebSocket
    let writer_conn_id = conn_id.clone();
    let writer_handle = tokio::spawn(async move {
        while let Some(text) = outbound_rx.recv().await {
            if let Err(e) = ws_sink.send(Message::Text(text)).await {
                debug!(conn_id = %writer_conn_id, error = %e, "WebSocket send failed");
                break;
            }
        }
        debug!(conn_id = %writer_conn_id, "Outbound queue closed");
    });

    // Reader loop: WebSocket -> relay hub
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if !rate_limiter.check_frame() {
                    warn!(conn_id = %conn_id, "Rate limited relay message");
                    continue;
                }

                if let Err(e) = hub.handle_text(conn_id, &text) {
                    warn!(conn_id = %conn_id, error = %e, "Discarding client message");
                }
            }
            Ok(Message::Binary(_)) => {
                warn!(conn_id = %conn_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) => {
                debug!(conn_id = %conn_id, "Received ping");
            }
            Ok(Message::Pong(_)) => {
                debug!(conn_id = %conn_id, "Received pong");
            }
            Ok(Message::Close(_)) => {
                info!(conn_id = %conn_id, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    // Abort writer task
    writer_handle.abort();
}
