// Agent WebSocket: `online:<NAME>` handshake, then `ping`/`pong` keepalives.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use tokio::time::{Duration, timeout};

use super::AppState;
use crate::models::PresenceStatus;
use crate::registry::AgentLease;

pub(super) const HANDSHAKE_PREFIX: &str = "online:";
pub(super) const WS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

pub(super) async fn ws_agent(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = handle_agent(socket, state).await {
            tracing::error!(error = %e, "Error in websocket connection");
        }
    })
}

/// `online:NAME` -> `NAME`. The name is everything after the first `:` and must be non-empty.
fn parse_handshake(frame: &str) -> Option<&str> {
    frame
        .strip_prefix(HANDSHAKE_PREFIX)
        .filter(|name| !name.is_empty())
}

async fn handle_agent(mut socket: WebSocket, state: AppState) -> anyhow::Result<()> {
    let ping_timeout = Duration::from_secs(state.config.agents.ping_timeout_secs);

    let first = match timeout(ping_timeout, socket.recv()).await {
        Ok(Some(Ok(Message::Text(text)))) => text,
        Ok(Some(Ok(other))) => {
            tracing::warn!(frame = ?other, "Invalid handshake");
            let _ = socket.send(Message::Close(None)).await;
            return Ok(());
        }
        Ok(Some(Err(e))) => return Err(e.into()),
        Ok(None) => return Ok(()),
        Err(_) => {
            tracing::warn!("Timeout waiting for handshake");
            return Ok(());
        }
    };
    let Some(name) = parse_handshake(first.as_str()) else {
        tracing::warn!(data = %first.as_str(), "Invalid handshake");
        let _ = socket.send(Message::Close(None)).await;
        return Ok(());
    };

    let lease = state.registry.register(name).await;
    if let Err(e) = state
        .computer_repo
        .update_status(name, PresenceStatus::Online)
        .await
    {
        tracing::warn!(error = %e, agent = %name, operation = "update_status", "Failed to mark agent online");
    }
    tracing::info!(agent = %name, "New connection");

    let result = agent_loop(&mut socket, &state, &lease, ping_timeout).await;

    if state.registry.release(&lease).await {
        if let Err(e) = state
            .computer_repo
            .update_status(&lease.name, PresenceStatus::Offline)
            .await
        {
            tracing::warn!(error = %e, agent = %lease.name, operation = "update_status", "Failed to mark agent offline");
        }
        state.notifier.agent_offline(&lease.name).await;
    }
    result
}

/// Runs until the agent disconnects, misses a ping, or is evicted by the registry.
async fn agent_loop(
    socket: &mut WebSocket,
    state: &AppState,
    lease: &AgentLease,
    ping_timeout: Duration,
) -> anyhow::Result<()> {
    loop {
        tokio::select! {
            _ = lease.kicked() => {
                tracing::debug!(agent = %lease.name, "Connection evicted");
                let _ = timeout(WS_SEND_TIMEOUT, socket.send(Message::Close(None))).await;
                return Ok(());
            }
            frame = timeout(ping_timeout, socket.recv()) => {
                match frame {
                    Err(_) => {
                        tracing::warn!(agent = %lease.name, "Timeout waiting for ping");
                        return Ok(());
                    }
                    Ok(None) | Ok(Some(Ok(Message::Close(_)))) => {
                        tracing::info!(agent = %lease.name, "WebSocket disconnected");
                        return Ok(());
                    }
                    Ok(Some(Err(e))) => return Err(e.into()),
                    Ok(Some(Ok(Message::Text(text)))) if text.as_str() == "ping" => {
                        state.registry.touch(lease).await;
                        let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Text("pong".into()))).await;
                        if !matches!(r, Ok(Ok(()))) {
                            return Ok(());
                        }
                    }
                    Ok(Some(Ok(_))) => {}
                }
            }
        }
    }
}
