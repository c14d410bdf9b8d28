use crate::AppState;
use auth::{Decision, Denial};
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use log::*;

/// Publish authorization middleware.
///
/// Returns 401 Unauthorized when no usable bearer token is presented and 403 Forbidden when the
/// token does not carry the publish scope. Only an allowed request reaches the handler.
pub async fn require_publish_scope(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match app_state.authorizer.authorize(authorization).await {
        Decision::Allow => next.run(request).await,
        Decision::Deny(Denial::Unauthenticated) => {
            debug!("Rejecting publish to {}: unauthenticated", request.uri());
            (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
        }
        Decision::Deny(Denial::Forbidden) => {
            debug!("Rejecting publish to {}: forbidden", request.uri());
            (StatusCode::FORBIDDEN, "Forbidden").into_response()
        }
    }
}
