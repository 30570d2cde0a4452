use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use super::{department_label, DashboardService};
use crate::analytics::numeric::{from_count, percent_of, round_to, saturating_mul, to_f64};
use crate::analytics::{
    aggregate, trend, trend_of, DateRange, FieldAggregate, MeasurementRecord, Metric, TrendResult,
};
use crate::entities::labor_metric;
use crate::errors::ServiceResult;

metric_set! {
    pub enum LaborMeasure {
        WorkersPresent => "workers_present",
        HoursWorked => "hours_worked",
        OvertimeHours => "overtime_hours",
        ProductivityIndex => "productivity_index",
        SafetyIncidents => "safety_incidents",
        LaborCost => "labor_cost",
    }
}

impl MeasurementRecord for labor_metric::Model {
    type Metric = LaborMeasure;

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn value(&self, metric: LaborMeasure) -> Option<Decimal> {
        match metric {
            LaborMeasure::WorkersPresent => Some(Decimal::from(self.workers_present)),
            LaborMeasure::HoursWorked => Some(self.hours_worked),
            LaborMeasure::OvertimeHours => Some(self.overtime_hours),
            LaborMeasure::ProductivityIndex => Some(self.productivity_index),
            LaborMeasure::SafetyIncidents => Some(Decimal::from(self.safety_incidents)),
            LaborMeasure::LaborCost => Some(saturating_mul(self.hours_worked, self.hourly_rate)),
        }
    }
}

fn shift_rank(shift: &str) -> u8 {
    match shift.to_ascii_uppercase().as_str() {
        "MORNING" => 0,
        "AFTERNOON" => 1,
        "NIGHT" => 2,
        _ => 3,
    }
}

fn whole(value: Decimal) -> i64 {
    value.round().to_i64().unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaborRow {
    pub date: NaiveDate,
    pub shift: String,
    pub department: String,
    pub workers_present: i32,
    pub hours_worked: f64,
    pub overtime_hours: f64,
    pub productivity_index: f64,
    pub safety_incidents: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentLabor {
    pub name: String,
    /// Average workers present per shift record, rounded.
    pub worker_count: i64,
    pub productivity: f64,
    pub incidents: i64,
    /// Share of all departments' worker counts.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaborSummary {
    pub total_workers: i64,
    pub attendance_rate: f64,
    pub productivity_rate: f64,
    pub total_hours_worked: f64,
    pub total_overtime_hours: f64,
    pub total_labor_cost: f64,
    pub incidents: i64,
    /// Percent change of daily averages, one decimal.
    pub attendance_trend: f64,
    pub productivity_trend: f64,
    pub incidents_trend: f64,
    pub trends: Vec<TrendResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaborDashboard {
    pub data: Vec<LaborRow>,
    pub departments: Vec<DepartmentLabor>,
    pub summary: LaborSummary,
}

impl DashboardService {
    /// Attendance and productivity, optionally for one department.
    pub async fn labor(&self, range: DateRange, department: Option<&str>) -> ServiceResult<LaborDashboard> {
        let department_id = self.resolve_department(department).await?.map(|d| d.id);
        let names = self.department_names().await?;

        let previous_range = range.previous();
        let keep = |row: &labor_metric::Model| department_id.is_none() || row.department_id == department_id;
        let mut rows: Vec<labor_metric::Model> =
            self.store.labor_metrics(range).await?.into_iter().filter(keep).collect();
        let previous_rows: Vec<labor_metric::Model> = self
            .store
            .labor_metrics(previous_range)
            .await?
            .into_iter()
            .filter(keep)
            .collect();

        rows.sort_by_key(|row| (row.date, shift_rank(&row.shift), row.id));

        let current = aggregate(rows.iter(), range, LaborMeasure::all());
        let previous = aggregate(previous_rows.iter(), previous_range, LaborMeasure::all());
        let days = range.length_days();

        let mut grouped: BTreeMap<String, Vec<&labor_metric::Model>> = BTreeMap::new();
        for row in &rows {
            grouped
                .entry(department_label(&names, row.department_id))
                .or_default()
                .push(row);
        }

        let mut departments: Vec<DepartmentLabor> = grouped
            .into_iter()
            .map(|(name, members)| {
                let agg = aggregate(members.into_iter(), range, LaborMeasure::all());
                DepartmentLabor {
                    name,
                    worker_count: whole(agg.get(LaborMeasure::WorkersPresent).avg()),
                    productivity: round_to(agg.get(LaborMeasure::ProductivityIndex).avg(), 1),
                    incidents: whole(agg.sum(LaborMeasure::SafetyIncidents)),
                    percentage: 0.0,
                }
            })
            .collect();

        let expected_workers: i64 = departments.iter().map(|d| d.worker_count).sum();
        for dept in departments.iter_mut() {
            dept.percentage = round_to(
                percent_of(Decimal::from(dept.worker_count), Decimal::from(expected_workers)),
                1,
            );
        }

        let workers: FieldAggregate = current.get(LaborMeasure::WorkersPresent);
        let percent_trend =
            |metric| trend_of(metric, &current, &previous, days).percent_rounded(1);

        let summary = LaborSummary {
            total_workers: whole(workers.avg()),
            attendance_rate: round_to(percent_of(workers.avg(), from_count(expected_workers.max(0) as usize)), 1),
            productivity_rate: round_to(current.get(LaborMeasure::ProductivityIndex).avg(), 1),
            total_hours_worked: to_f64(current.sum(LaborMeasure::HoursWorked)),
            total_overtime_hours: to_f64(current.sum(LaborMeasure::OvertimeHours)),
            total_labor_cost: to_f64(current.sum(LaborMeasure::LaborCost)),
            incidents: whole(current.sum(LaborMeasure::SafetyIncidents)),
            attendance_trend: percent_trend(LaborMeasure::WorkersPresent),
            productivity_trend: percent_trend(LaborMeasure::ProductivityIndex),
            incidents_trend: percent_trend(LaborMeasure::SafetyIncidents),
            trends: trend(&current, &previous, days),
        };

        let data = rows
            .iter()
            .map(|row| LaborRow {
                date: row.date,
                shift: row.shift.clone(),
                department: department_label(&names, row.department_id),
                workers_present: row.workers_present,
                hours_worked: to_f64(row.hours_worked),
                overtime_hours: to_f64(row.overtime_hours),
                productivity_index: to_f64(row.productivity_index),
                safety_incidents: row.safety_incidents,
            })
            .collect();

        Ok(LaborDashboard {
            data,
            departments,
            summary,
        })
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
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn shift(
        id: i32,
        day: NaiveDate,
        shift: &str,
        department_id: i32,
        workers: i32,
        productivity: Decimal,
        incidents: i32,
    ) -> labor_metric::Model {
        labor_metric::Model {
            id,
            date: day,
            shift: shift.into(),
            department_id: Some(department_id),
            workers_present: workers,
            hours_worked: dec!(8) * Decimal::from(workers),
            overtime_hours: dec!(1),
            productivity_index: productivity,
            safety_incidents: incidents,
            hourly_rate: dec!(25),
        }
    }

    fn store() -> InMemoryFactStore {
        InMemoryFactStore {
            departments: vec![department(1, "Extraction"), department(2, "Processing")],
            labor_metrics: vec![
                shift(1, date(2024, 5, 2), "NIGHT", 1, 30, dec!(80), 1),
                shift(2, date(2024, 5, 2), "MORNING", 1, 50, dec!(90), 0),
                shift(3, date(2024, 5, 2), "MORNING", 2, 20, dec!(70), 0),
                shift(4, date(2024, 5, 1), "MORNING", 2, 20, dec!(75), 1),
                // previous period
                shift(5, date(2024, 4, 30), "MORNING", 1, 40, dec!(85), 0),
                shift(6, date(2024, 4, 29), "MORNING", 1, 40, dec!(85), 1),
            ],
            ..Default::default()
        }
    }

    fn range() -> DateRange {
        DateRange::new(date(2024, 5, 1), date(2024, 5, 2)).unwrap()
    }

    #[tokio::test]
    async fn groups_by_department() {
        let service = DashboardService::new(Arc::new(store()), DashboardSettings::default());
        let dashboard = service.labor(range(), None).await.unwrap();

        let shifts: Vec<(NaiveDate, &str)> = dashboard
            .data
            .iter()
            .map(|r| (r.date, r.shift.as_str()))
            .collect();
        assert_eq!(
            shifts,
            vec![
                (date(2024, 5, 1), "MORNING"),
                (date(2024, 5, 2), "MORNING"),
                (date(2024, 5, 2), "MORNING"),
                (date(2024, 5, 2), "NIGHT"),
            ]
        );

        assert_eq!(dashboard.departments.len(), 2);
        let extraction = &dashboard.departments[0];
        assert_eq!(extraction.name, "Extraction");
        assert_eq!(extraction.worker_count, 40);
        assert_eq!(extraction.productivity, 85.0);
        assert_eq!(extraction.incidents, 1);
        assert_eq!(extraction.percentage, 66.7);

        let s = &dashboard.summary;
        assert_eq!(s.total_workers, 30);
        assert_eq!(s.attendance_rate, 50.0);
        assert_eq!(s.productivity_rate, 78.8);
        assert_eq!(s.incidents, 2);
        assert_eq!(s.total_hours_worked, 960.0);
        assert_eq!(s.total_labor_cost, 24000.0);
        // 60 workers/day against 40/day before
        assert_eq!(s.attendance_trend, 50.0);
        assert_eq!(s.incidents_trend, 100.0);
    }

    #[tokio::test]
    async fn department_filter_restricts_both_periods() {
        let service = DashboardService::new(Arc::new(store()), DashboardSettings::default());
        let dashboard = service.labor(range(), Some("processing")).await.unwrap();

        assert_eq!(dashboard.data.len(), 2);
        assert!(dashboard.data.iter().all(|r| r.department == "Processing"));
        assert_eq!(dashboard.summary.total_workers, 20);
        // nothing for Processing in the previous period
        assert_eq!(dashboard.summary.attendance_trend, 0.0);
    }

    #[tokio::test]
    async fn unknown_department_is_rejected() {
        let service = DashboardService::new(Arc::new(store()), DashboardSettings::default());
        assert_matches!(
            service.labor(range(), Some("Payroll")).await,
            Err(ServiceError::NotConfigured(_))
        );
    }
}
