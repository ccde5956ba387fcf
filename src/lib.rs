use config::Config;
use gate::Gate;
use std::sync::Arc;
use upstream::UpstreamProvider;

pub mod cache;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod gate;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod store;
pub mod upstream;
pub mod utils;

#[cfg(test)]
mod testing;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub gate: Arc<Gate>,
    pub upstream: Arc<dyn UpstreamProvider>,
}
