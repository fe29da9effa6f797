use std::sync::Arc;

use database::RecordStore;
use middleware::AuthGate;

pub mod authority;
pub mod cache;
pub mod common;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub gate: Arc<AuthGate>,
}
