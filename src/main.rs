use auth::{Authorizer, IntrospectionClient, ScopeAuthorizer};
use hub::Hub;
use log::*;
use secrecy::SecretString;
use service::{config::Config, logging::Logger};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config);

    info!("Starting topic broker");

    let authorizer = match build_authorizer(&config) {
        Ok(authorizer) => authorizer,
        Err(e) => {
            error!("Failed to configure publish authorization: {e}");
            std::process::exit(1);
        }
    };

    let hub = Hub::spawn();
    let app_state = web::AppState::new(config, hub, authorizer);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server failed: {e}");
        std::process::exit(1);
    }

    info!("Topic broker stopped");
}

fn build_authorizer(config: &Config) -> Result<Arc<dyn Authorizer>, auth::Error> {
    let authorizer = ScopeAuthorizer::new(config.publish_scope());

    if !config.introspection_enabled {
        warn!(
            "Token introspection is disabled; publish tokens are trusted on their {} scope claim alone",
            config.publish_scope()
        );
        return Ok(Arc::new(authorizer));
    }

    let client = IntrospectionClient::new(
        config.introspection_url().unwrap_or_default(),
        config.resource_name().unwrap_or_default(),
        SecretString::new(config.resource_secret().unwrap_or_default()),
    )?;
    info!("Token introspection enabled");

    Ok(Arc::new(authorizer.with_introspection(client)))
}
