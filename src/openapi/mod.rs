use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MyMine API",
        version = "0.1.0",
        description = r#"
# MyMine Operations Dashboards

Read-only period dashboards for a gold mining operation: energy, gold
production, chemicals, explosives, labor, environmental readings,
equipment and safety.

## Periods

Every dashboard covers an inclusive `from_date`..`to_date` period
(`YYYY-MM-DD`). Both parameters must be given together; without them the
last 30 days up to today are used. Trends compare daily averages with the
equal-length period immediately before.

## Errors

```json
{
  "error": "Invalid from_date: expected YYYY-MM-DD, got '2024-13-01'",
  "code": "VALIDATION_ERROR",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Dashboard", description = "Period dashboards"),
        (name = "Health", description = "Health check endpoints")
    ),
    paths(
        crate::handlers::dashboard::get_overview,
        crate::handlers::dashboard::get_domain_dashboard,
        crate::handlers::health::health_check,
        crate::handlers::health::api_status,
    ),
    components(
        schemas(
            crate::services::dashboard::Domain,
            crate::handlers::health::HealthResponse,
            crate::handlers::health::HealthStatus,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_dashboard_paths() {
        let json = serde_json::to_string(&ApiDocV1::openapi()).unwrap();
        assert!(json.contains("MyMine API"));
        assert!(json.contains("/api/v1/dashboard/{domain}"));
        assert!(json.contains("from_date"));
        assert!(json.contains("ErrorResponse"));
    }
}
