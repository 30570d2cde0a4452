use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::Value;
use tower::ServiceExt;

use mymine_api::{
    app_router,
    config::AppConfig,
    db::{self, DbConfig},
    entities::{energy_usage, mining_department},
    AppState,
};

/// Router plus the in-memory SQLite database behind it.
pub struct TestApp {
    router: Router,
    pub db: Arc<DatabaseConnection>,
}

impl TestApp {
    pub async fn new() -> Self {
        let pool = db::establish_connection_with_config(&DbConfig::single_connection("sqlite::memory:"))
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool).await.expect("failed to migrate test database");

        let db = Arc::new(pool);
        let cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        let router = app_router(AppState::new(db.clone(), cfg));

        Self { router, db }
    }

    /// GET `uri`, returning the status and the raw body bytes.
    pub async fn get_raw(&self, uri: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("valid request");
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        (status, bytes.to_vec())
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let (status, bytes) = self.get_raw(uri).await;
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn add_energy(&self, date: NaiveDate, electricity_kwh: i64, diesel_liters: i64) {
        let electricity_kwh = Decimal::from(electricity_kwh);
        let diesel_liters = Decimal::from(diesel_liters);
        energy_usage::ActiveModel {
            date: Set(date),
            electricity_kwh: Set(electricity_kwh),
            electricity_cost: Set(electricity_kwh / Decimal::from(10)),
            diesel_liters: Set(diesel_liters),
            diesel_cost: Set(diesel_liters),
            total_cost: Set(electricity_kwh / Decimal::from(10) + diesel_liters),
            notes: Set(None),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await
        .expect("insert energy row");
    }

    pub async fn add_department(&self, name: &str) -> i32 {
        mining_department::ActiveModel {
            name: Set(name.to_string()),
            department_type: Set("extraction".to_string()),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await
        .expect("insert department")
        .id
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}
