use crate::{error::Error, AppState};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use hub::{Envelope, TopicKey};
use log::*;

/// POST a message to every subscriber of a topic
///
/// The body is forwarded as the envelope's `message` when it is JSON and as `null` otherwise.
/// 202 means the broadcast was handed to the hub, not that anyone received it.
pub async fn publish(
    State(app_state): State<AppState>,
    Path(topic): Path<TopicKey>,
    body: Bytes,
) -> Result<impl IntoResponse, Error> {
    debug!("Publishing {} byte(s) to topic {topic:?}", body.len());

    app_state.hub.broadcast(Envelope::from_body(topic, &body))?;

    Ok(StatusCode::ACCEPTED)
}
