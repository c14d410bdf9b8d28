use crate::AppState;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, State};
use axum::response::Response;
use hub::{serve, TopicKey};
use log::*;

/// GET / upgrades to a subscriber socket with no initial topic.
pub async fn subscribe(ws: WebSocketUpgrade, State(app_state): State<AppState>) -> Response {
    upgrade(ws, app_state, None)
}

/// GET /{topic} upgrades to a subscriber socket already subscribed to `topic`.
pub async fn subscribe_to_topic(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
    Path(topic): Path<TopicKey>,
) -> Response {
    upgrade(ws, app_state, Some(topic))
}

fn upgrade(ws: WebSocketUpgrade, app_state: AppState, topic: Option<TopicKey>) -> Response {
    let settings = app_state.connection_settings();
    let hub = app_state.hub;

    debug!("Upgrading subscriber connection, initial topic {topic:?}");

    ws.max_message_size(settings.max_message_size)
        .on_failed_upgrade(|e| warn!("WebSocket upgrade failed: {e}"))
        .on_upgrade(move |socket| serve(socket, hub, settings, topic))
}
