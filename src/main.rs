use std::sync::Arc;

use itinera::canvas::SceneCanvas;
use itinera::config::Config;
use itinera::engine::Engine;
use itinera::external::RouteMbnClient;
use itinera::server::{serve, SearchDefaults};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("invalid configuration: {}", err);
            std::process::exit(1);
        }
    };

    let engine = Engine::new(
        RouteMbnClient::new(config.api_base.clone(), config.api_key.clone()),
        SceneCanvas::new(config.origin, config.viewport),
        config.locale,
        config.zoom_margin,
    );

    let defaults = SearchDefaults {
        origin: config.origin,
        destination: config.destination,
    };

    if let Err(err) = serve(Arc::new(engine), defaults, config.listen_addr).await {
        tracing::error!("server stopped: {}", err);
        std::process::exit(1);
    }
}
