use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;
use strum::{Display, EnumString};

use super::{department_label, Dashboard, DashboardService};
use crate::analytics::numeric::{from_count, percent_of, round_to};
use crate::analytics::{aggregate, trend, trend_of, DateRange, MeasurementRecord, TrendResult};
use crate::entities::safety_incident;
use crate::errors::ServiceResult;

metric_set! {
    pub enum IncidentMetric {
        Incidents => "incidents",
    }
}

impl MeasurementRecord for safety_incident::Model {
    type Metric = IncidentMetric;

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn value(&self, metric: IncidentMetric) -> Option<Decimal> {
        match metric {
            IncidentMetric::Incidents => Some(Decimal::ONE),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn parse(raw: &str) -> Option<Self> {
        Severity::from_str(raw.trim()).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncidentRow {
    pub id: i32,
    pub date: NaiveDate,
    pub incident_type: String,
    pub severity: String,
    pub description: String,
    pub action_taken: Option<String>,
    pub resolved: bool,
    pub department: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityBreakdown {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    /// Severities that are none of the above.
    pub other: usize,
}

impl SeverityBreakdown {
    fn record(&mut self, severity: Option<Severity>) {
        match severity {
            Some(Severity::Low) => self.low += 1,
            Some(Severity::Medium) => self.medium += 1,
            Some(Severity::High) => self.high += 1,
            None => self.other += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SafetySummary {
    pub total_incidents: usize,
    pub severity_breakdown: SeverityBreakdown,
    pub department_breakdown: BTreeMap<String, usize>,
    pub resolved_percentage: f64,
    pub days_without_incident: i64,
    pub trend_incidents: f64,
    pub trends: Vec<TrendResult>,
}

pub type SafetyDashboard = Dashboard<IncidentRow, SafetySummary>;

impl DashboardService {
    /// Incidents for the period, optionally for one department.
    pub async fn safety(&self, range: DateRange, department: Option<&str>) -> ServiceResult<SafetyDashboard> {
        let department_id = self.resolve_department(department).await?.map(|d| d.id);
        let names = self.department_names().await?;

        let previous_range = range.previous();
        let keep =
            |row: &safety_incident::Model| department_id.is_none() || row.department_id == department_id;
        let incidents: Vec<safety_incident::Model> =
            self.store.safety_incidents(range).await?.into_iter().filter(keep).collect();
        let previous_incidents: Vec<safety_incident::Model> = self
            .store
            .safety_incidents(previous_range)
            .await?
            .into_iter()
            .filter(keep)
            .collect();

        let mut severity_breakdown = SeverityBreakdown::default();
        let mut department_breakdown: BTreeMap<String, usize> = BTreeMap::new();
        let mut last_high: Option<NaiveDate> = None;

        for incident in &incidents {
            let severity = Severity::parse(&incident.severity);
            severity_breakdown.record(severity);
            *department_breakdown
                .entry(department_label(&names, incident.department_id))
                .or_insert(0) += 1;

            if severity == Some(Severity::High) && incident.date <= range.to() {
                last_high = last_high.max(Some(incident.date));
            }
        }

        let resolved = incidents.iter().filter(|i| i.resolved).count();
        let resolved_percentage = if incidents.is_empty() {
            100.0
        } else {
            round_to(percent_of(from_count(resolved), from_count(incidents.len())), 1)
        };

        let days_without_incident = last_high
            .map(|date| (range.to() - date).num_days())
            .unwrap_or_else(|| range.length_days());

        let current = aggregate(incidents.iter(), range, &[IncidentMetric::Incidents]);
        let previous = aggregate(previous_incidents.iter(), previous_range, &[IncidentMetric::Incidents]);
        let days = range.length_days();

        let summary = SafetySummary {
            total_incidents: incidents.len(),
            severity_breakdown,
            department_breakdown,
            resolved_percentage,
            days_without_incident,
            trend_incidents: trend_of(IncidentMetric::Incidents, &current, &previous, days)
                .absolute_delta,
            trends: trend(&current, &previous, days),
        };

        let mut data: Vec<IncidentRow> = incidents
            .iter()
            .map(|incident| IncidentRow {
                id: incident.id,
                date: incident.date,
                incident_type: incident.incident_type.clone(),
                severity: incident.severity.clone(),
                description: incident.description.clone(),
                action_taken: incident.action_taken.clone(),
                resolved: incident.resolved,
                department: department_label(&names, incident.department_id),
            })
            .collect();
        data.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));

        Ok(Dashboard { data, summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ServiceError;
    use crate::services::dashboard::fixtures::{date, department};
    use crate::services::dashboard::DashboardSettings;
    use crate::services::fact_store::InMemoryFactStore;
    use assert_matches::assert_matches;
    use rstest::rstest;
    use std::sync::Arc;

    fn incident(
        id: i32,
        day: NaiveDate,
        severity: &str,
        resolved: bool,
        department_id: Option<i32>,
    ) -> safety_incident::Model {
        safety_incident::Model {
            id,
            date: day,
            incident_type: "Near miss".into(),
            severity: severity.into(),
            description: "Loose rock at face".into(),
            action_taken: None,
            resolved,
            department_id,
        }
    }

    fn store() -> InMemoryFactStore {
        InMemoryFactStore {
            departments: vec![department(1, "Extraction"), department(2, "Processing")],
            safety_incidents: vec![
                incident(1, date(2024, 7, 2), "High", true, Some(1)),
                incident(2, date(2024, 7, 5), "low", false, Some(2)),
                incident(3, date(2024, 7, 6), "MEDIUM", true, None),
                incident(4, date(2024, 7, 8), "Critical", true, Some(1)),
                incident(5, date(2024, 6, 28), "High", true, Some(1)),
            ],
            ..Default::default()
        }
    }

    fn range() -> DateRange {
        DateRange::new(date(2024, 7, 1), date(2024, 7, 10)).unwrap()
    }

    #[tokio::test]
    async fn breakdowns_and_streak() {
        let service = DashboardService::new(Arc::new(store()), DashboardSettings::default());
        let dashboard = service.safety(range(), None).await.unwrap();
        let s = &dashboard.summary;

        assert_eq!(s.total_incidents, 4);
        assert_eq!(
            s.severity_breakdown,
            SeverityBreakdown {
                low: 1,
                medium: 1,
                high: 1,
                other: 1
            }
        );
        assert_eq!(s.department_breakdown.get("Extraction"), Some(&2));
        assert_eq!(s.department_breakdown.get("Unassigned"), Some(&1));
        assert_eq!(s.resolved_percentage, 75.0);
        assert_eq!(s.days_without_incident, 8);
        // 4 over 10 days against 1 over the 10 days before
        assert_eq!(s.trend_incidents, 0.3);

        let ids: Vec<i32> = dashboard.data.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![4, 3, 2, 1]);
    }

    #[tokio::test]
    async fn quiet_period_defaults() {
        let service = DashboardService::new(Arc::new(store()), DashboardSettings::default());
        let quiet = DateRange::new(date(2024, 8, 1), date(2024, 8, 5)).unwrap();

        let s = service.safety(quiet, None).await.unwrap().summary;
        assert_eq!(s.total_incidents, 0);
        assert_eq!(s.resolved_percentage, 100.0);
        assert_eq!(s.days_without_incident, 5);
    }

    #[tokio::test]
    async fn department_filter() {
        let service = DashboardService::new(Arc::new(store()), DashboardSettings::default());
        let dashboard = service.safety(range(), Some("PROCESSING")).await.unwrap();

        assert_eq!(dashboard.summary.total_incidents, 1);
        assert_eq!(dashboard.summary.resolved_percentage, 0.0);
        assert_eq!(dashboard.summary.days_without_incident, 10);

        assert_matches!(
            service.safety(range(), Some("Payroll")).await,
            Err(ServiceError::NotConfigured(_))
        );
    }

    #[rstest]
    #[case("High", Some(Severity::High))]
    #[case("high", Some(Severity::High))]
    #[case(" MEDIUM ", Some(Severity::Medium))]
    #[case("Low", Some(Severity::Low))]
    #[case("Critical", None)]
    fn severity_is_case_insensitive(#[case] raw: &str, #[case] expected: Option<Severity>) {
        assert_eq!(Severity::parse(raw), expected);
    }
}
