use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use tracing::debug;

use super::common::{parse_domain, DashboardQuery};
use crate::{
    errors::ServiceError,
    services::dashboard::{DomainDashboard, Overview},
    AppState,
};

/// Dashboard routes, nested under `/api/v1/dashboard`.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_overview))
        .route("/:domain", get(get_domain_dashboard))
}

/// Every domain for one period
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Overview across all domains"),
        (status = 400, description = "Invalid period", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "Dashboard"
)]
pub async fn get_overview(
    State(state): State<AppState>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Result<Json<Overview>, ServiceError> {
    let Query(query) = query?;
    let range = query.range(&state.dashboard)?;
    let overview = state.dashboard.overview(range).await?;
    Ok(Json(overview))
}

/// Period summary, trends and chart rows for one domain
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/{domain}",
    params(
        ("domain" = crate::services::dashboard::Domain, Path, description = "Metric domain"),
        DashboardQuery
    ),
    responses(
        (status = 200, description = "Dashboard for the requested domain and period"),
        (status = 400, description = "Invalid domain, date or filter", body = crate::errors::ErrorResponse),
        (status = 404, description = "Domain or filter target not configured", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "Dashboard"
)]
pub async fn get_domain_dashboard(
    State(state): State<AppState>,
    Path(domain): Path<String>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Result<Json<DomainDashboard>, ServiceError> {
    let domain = parse_domain(&domain)?;
    let Query(query) = query?;
    let range = query.range(&state.dashboard)?;
    let filters = query.filters()?;
    debug!(%domain, ?filters, "Dashboard request");

    let dashboard = state
        .dashboard
        .assemble_dashboard(domain, range, &filters)
        .await?;
    Ok(Json(dashboard))
}
