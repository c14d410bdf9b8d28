use auth::Authorizer;
use hub::{ConnectionSettings, Hub};
use log::*;
use service::config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;

mod controller;
pub mod error;
mod middleware;
mod router;

pub use router::define_routes;

// Everything a request handler needs: the hub handle, the publish authorizer and the limits
// applied to each subscriber connection.
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub hub: Hub,
    pub authorizer: Arc<dyn Authorizer>,
}

impl AppState {
    pub fn new(config: Config, hub: Hub, authorizer: Arc<dyn Authorizer>) -> Self {
        Self {
            config,
            hub,
            authorizer,
        }
    }

    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            queue_capacity: self.config.outbound_queue_capacity,
            max_message_size: self.config.max_message_size,
            pong_wait: self.config.pong_wait(),
            write_wait: self.config.write_wait(),
        }
    }
}

/// Binds the configured interface and port and serves until Ctrl-C.
pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let host = app_state.config.interface().to_string();
    let port = app_state.config.port;
    let listener = TcpListener::bind((host.as_str(), port)).await?;

    info!("Server starting... listening for connections on http://{host}:{port}");

    serve(listener, app_state).await
}

/// Serves the broker's routes on an already bound listener until Ctrl-C.
pub async fn serve(listener: TcpListener, app_state: AppState) -> std::io::Result<()> {
    axum::serve(listener, define_routes(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C, shutting down"),
        Err(e) => error!("Failed to listen for Ctrl-C: {e}"),
    }
}
