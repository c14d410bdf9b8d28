use crate::{
    controller::{publish_controller, subscribe_controller},
    middleware::auth::require_publish_scope,
    AppState,
};
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(publish_routes(app_state.clone()))
        .merge(subscribe_routes(app_state))
}

fn publish_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/publish/{*topic}",
            post(publish_controller::publish),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            require_publish_scope,
        ))
        .with_state(app_state)
}

// Any other path is a topic key; the empty path subscribes to nothing.
fn subscribe_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(subscribe_controller::subscribe))
        .route("/{*topic}", get(subscribe_controller::subscribe_to_topic))
        .with_state(app_state)
}
