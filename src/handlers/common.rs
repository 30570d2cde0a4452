use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::str::FromStr;
use utoipa::IntoParams;

use crate::analytics::DateRange;
use crate::errors::{ServiceError, ServiceResult};
use crate::services::dashboard::{DashboardFilters, DashboardService, Domain};

/// Query parameters shared by the dashboard endpoints.
///
/// Everything arrives as text and is parsed by hand so a bad value is
/// reported against the parameter that carried it.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DashboardQuery {
    /// Start of the period, `YYYY-MM-DD`. Must be given together with `to_date`.
    #[param(example = "2024-01-01")]
    pub from_date: Option<String>,
    /// End of the period, inclusive.
    #[param(example = "2024-01-31")]
    pub to_date: Option<String>,
    /// Department name (labor and safety only)
    pub department: Option<String>,
    /// Machine id (equipment only)
    pub equipment_id: Option<String>,
}

impl DashboardQuery {
    /// Period for this request; defaults to the configured window ending today (UTC).
    pub fn range(&self, service: &DashboardService) -> ServiceResult<DateRange> {
        self.range_on(service, Utc::now().date_naive())
    }

    pub fn range_on(&self, service: &DashboardService, today: NaiveDate) -> ServiceResult<DateRange> {
        service.resolve_range(self.from_date.as_deref(), self.to_date.as_deref(), today)
    }

    pub fn filters(&self) -> ServiceResult<DashboardFilters> {
        let equipment_id = match self.equipment_id.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<i32>().map_err(|_| {
                ServiceError::invalid_field(
                    "equipment_id",
                    format!("Invalid equipment_id: expected an integer, got '{}'", raw),
                )
            })?),
        };

        let department = self
            .department
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        Ok(DashboardFilters {
            department,
            equipment_id,
        })
    }
}

pub fn parse_domain(raw: &str) -> ServiceResult<Domain> {
    Domain::from_str(raw.trim()).map_err(|_| {
        let known: Vec<String> = Domain::all().iter().map(Domain::to_string).collect();
        ServiceError::invalid_field(
            "domain",
            format!("Invalid domain '{}': expected one of {}", raw, known.join(", ")),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::dashboard::DashboardSettings;
    use crate::services::fact_store::InMemoryFactStore;
    use assert_matches::assert_matches;
    use std::sync::Arc;

    fn query(equipment_id: Option<&str>, department: Option<&str>) -> DashboardQuery {
        DashboardQuery {
            equipment_id: equipment_id.map(String::from),
            department: department.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn equipment_id_must_be_an_integer() {
        assert_matches!(
            query(Some("crusher-1"), None).filters(),
            Err(ServiceError::ValidationError { field, .. }) if field == "equipment_id"
        );
        assert_eq!(query(Some(" 7 "), None).filters().unwrap().equipment_id, Some(7));
        assert_eq!(query(Some(""), None).filters().unwrap().equipment_id, None);
    }

    #[test]
    fn blank_department_is_ignored() {
        assert_eq!(query(None, Some("  ")).filters().unwrap().department, None);
        assert_eq!(
            query(None, Some(" Processing ")).filters().unwrap().department.as_deref(),
            Some("Processing")
        );
    }

    #[test]
    fn unknown_domain_names_the_parameter() {
        assert_eq!(parse_domain("Labor").unwrap(), Domain::Labor);
        assert_matches!(
            parse_domain("payroll"),
            Err(ServiceError::ValidationError { field, message }) if field == "domain" && message.contains("payroll")
        );
    }

    #[test]
    fn malformed_date_names_the_parameter() {
        let service =
            DashboardService::new(Arc::new(InMemoryFactStore::new()), DashboardSettings::default());
        let q = DashboardQuery {
            from_date: Some("2024-01-01".into()),
            to_date: Some("31/01/2024".into()),
            ..Default::default()
        };
        let today = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();

        assert_matches!(
            q.range_on(&service, today),
            Err(ServiceError::ValidationError { field, .. }) if field == "to_date"
        );
    }
}
