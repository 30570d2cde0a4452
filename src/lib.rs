//! MyMine API library
//!
//! Period aggregation and trend dashboards over a mine's daily fact tables.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod analytics;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod logging;
pub mod migrator;
pub mod openapi;
pub mod seed;
pub mod services;

use axum::{routing::get, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use services::dashboard::DashboardService;
use services::fact_store::SeaOrmFactStore;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub dashboard: DashboardService,
}

impl AppState {
    /// Wires the dashboard service to the database-backed fact store.
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        let store = Arc::new(SeaOrmFactStore::new(db.clone()));
        let dashboard = DashboardService::new(store, config.dashboard_settings());
        Self {
            db,
            config,
            dashboard,
        }
    }
}

pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(handlers::health::api_status))
        .nest("/dashboard", handlers::dashboard::dashboard_routes())
}

/// Full router without the transport layers `main` adds.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/api/v1", api_v1_routes())
        .merge(openapi::swagger_ui())
        .layer(axum::middleware::from_fn(logging::request_logging_middleware))
        .with_state(state)
}

pub mod prelude {
    pub use crate::analytics::*;
    pub use crate::errors::*;
    pub use crate::services::dashboard::{DashboardFilters, DashboardService, Domain};
    pub use crate::services::fact_store::{FactStore, InMemoryFactStore, SeaOrmFactStore};
}
