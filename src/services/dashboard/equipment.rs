use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use super::{Dashboard, DashboardService};
use crate::analytics::numeric::{from_count, ratio, round_to, saturating_sum, to_f64};
use crate::analytics::{
    aggregate, trend, trend_of, DateRange, MeasurementRecord, Metric, TrendResult,
};
use crate::entities::{equipment_status_log, machinery, maintenance_record};
use crate::errors::{ServiceError, ServiceResult};

metric_set! {
    pub enum MaintenanceMetric {
        Cost => "maintenance_cost",
        DurationHours => "maintenance_hours",
    }
}

impl MeasurementRecord for maintenance_record::Model {
    type Metric = MaintenanceMetric;

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn value(&self, metric: MaintenanceMetric) -> Option<Decimal> {
        Some(match metric {
            MaintenanceMetric::Cost => self.cost,
            MaintenanceMetric::DurationHours => self.duration_hours,
        })
    }
}

/// Operating state of a machine, parsed leniently from stored text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineStatus {
    Operational,
    Maintenance,
    OutOfService,
}

impl MachineStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace(['_', '-'], " ").as_str() {
            "operational" | "active" => Some(MachineStatus::Operational),
            "maintenance" | "under maintenance" => Some(MachineStatus::Maintenance),
            "out of service" | "offline" | "retired" => Some(MachineStatus::OutOfService),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenanceEntry {
    pub date: NaiveDate,
    pub maintenance_type: String,
    pub description: String,
    pub cost: f64,
    pub duration_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusEntry {
    pub date: NaiveDate,
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MachineRow {
    pub id: i32,
    pub name: String,
    pub machine_type: String,
    pub status: String,
    pub efficiency: f64,
    pub operating_hours: f64,
    pub last_maintenance: NaiveDate,
    pub next_maintenance_due: NaiveDate,
    pub maintenance_history: Vec<MaintenanceEntry>,
    pub status_history: Vec<StatusEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquipmentSummary {
    pub total_count: usize,
    pub operational_count: usize,
    pub maintenance_count: usize,
    pub out_of_service_count: usize,
    pub avg_efficiency: f64,
    pub total_maintenance_cost: f64,
    pub total_maintenance_hours: f64,
    /// Machines due for maintenance on or before the end of the period.
    pub maintenance_due_count: usize,
    pub trend_maintenance_cost: f64,
    pub trends: Vec<TrendResult>,
}

pub type EquipmentDashboard = Dashboard<MachineRow, EquipmentSummary>;

impl DashboardService {
    /// Fleet status and maintenance, optionally for a single machine.
    pub async fn equipment(
        &self,
        range: DateRange,
        equipment_id: Option<i32>,
    ) -> ServiceResult<EquipmentDashboard> {
        let mut fleet = self.store.machinery().await?;
        if let Some(id) = equipment_id {
            fleet.retain(|m| m.id == id);
            if fleet.is_empty() {
                return Err(ServiceError::NotConfigured(format!(
                    "equipment {} is not configured",
                    id
                )));
            }
            debug!(equipment_id = id, "Filtering by machine");
        }

        let keep = |machinery_id: i32| equipment_id.map_or(true, |id| id == machinery_id);
        let previous_range = range.previous();

        let maintenance: Vec<maintenance_record::Model> = self
            .store
            .maintenance_records(range)
            .await?
            .into_iter()
            .filter(|r| keep(r.machinery_id))
            .collect();
        let previous_maintenance: Vec<maintenance_record::Model> = self
            .store
            .maintenance_records(previous_range)
            .await?
            .into_iter()
            .filter(|r| keep(r.machinery_id))
            .collect();
        let status_logs = self.store.status_logs(range).await?;

        let mut maintenance_by_machine: BTreeMap<i32, Vec<&maintenance_record::Model>> = BTreeMap::new();
        for record in &maintenance {
            maintenance_by_machine.entry(record.machinery_id).or_default().push(record);
        }
        let mut logs_by_machine: BTreeMap<i32, Vec<&equipment_status_log::Model>> = BTreeMap::new();
        for log in status_logs.iter().filter(|l| keep(l.machinery_id)) {
            logs_by_machine.entry(log.machinery_id).or_default().push(log);
        }

        let data: Vec<MachineRow> = fleet
            .iter()
            .map(|machine| {
                machine_row(
                    machine,
                    maintenance_by_machine.remove(&machine.id).unwrap_or_default(),
                    logs_by_machine.remove(&machine.id).unwrap_or_default(),
                )
            })
            .collect();

        let mut counts = [0usize; 3];
        for row in &data {
            match MachineStatus::parse(&row.status) {
                Some(MachineStatus::Operational) => counts[0] += 1,
                Some(MachineStatus::Maintenance) => counts[1] += 1,
                Some(MachineStatus::OutOfService) => counts[2] += 1,
                None => {}
            }
        }

        let efficiency = saturating_sum(fleet.iter().map(|m| m.efficiency));
        let avg_efficiency = ratio(efficiency, from_count(fleet.len()));

        let current = aggregate(maintenance.iter(), range, MaintenanceMetric::all());
        let previous = aggregate(previous_maintenance.iter(), previous_range, MaintenanceMetric::all());
        let days = range.length_days();

        let summary = EquipmentSummary {
            total_count: fleet.len(),
            operational_count: counts[0],
            maintenance_count: counts[1],
            out_of_service_count: counts[2],
            avg_efficiency: round_to(avg_efficiency, 1),
            total_maintenance_cost: to_f64(current.sum(MaintenanceMetric::Cost)),
            total_maintenance_hours: to_f64(current.sum(MaintenanceMetric::DurationHours)),
            maintenance_due_count: fleet
                .iter()
                .filter(|m| m.next_maintenance_due <= range.to())
                .count(),
            trend_maintenance_cost: trend_of(MaintenanceMetric::Cost, &current, &previous, days)
                .absolute_delta,
            trends: trend(&current, &previous, days),
        };

        Ok(Dashboard { data, summary })
    }
}

/// Builds a row from range-limited histories that arrive oldest first.
fn machine_row(
    machine: &machinery::Model,
    maintenance: Vec<&maintenance_record::Model>,
    logs: Vec<&equipment_status_log::Model>,
) -> MachineRow {
    let status = logs
        .last()
        .map(|log| log.status.clone())
        .unwrap_or_else(|| machine.status.clone());

    MachineRow {
        id: machine.id,
        name: machine.name.clone(),
        machine_type: machine.machine_type.clone(),
        status,
        efficiency: to_f64(machine.efficiency),
        operating_hours: to_f64(machine.operating_hours),
        last_maintenance: machine.last_maintenance,
        next_maintenance_due: machine.next_maintenance_due,
        maintenance_history: maintenance
            .into_iter()
            .rev()
            .map(|r| MaintenanceEntry {
                date: r.date,
                maintenance_type: r.maintenance_type.clone(),
                description: r.description.clone(),
                cost: to_f64(r.cost),
                duration_hours: to_f64(r.duration_hours),
            })
            .collect(),
        status_history: logs
            .into_iter()
            .rev()
            .map(|l| StatusEntry {
                date: l.date,
                status: l.status.clone(),
                notes: l.notes.clone(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::dashboard::fixtures::date;
    use crate::services::dashboard::DashboardSettings;
    use crate::services::fact_store::InMemoryFactStore;
    use assert_matches::assert_matches;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn machine(id: i32, name: &str, status: &str, efficiency: Decimal, due: NaiveDate) -> machinery::Model {
        machinery::Model {
            id,
            name: name.into(),
            machine_type: "Crusher".into(),
            status: status.into(),
            efficiency,
            operating_hours: dec!(1200),
            last_maintenance: date(2024, 1, 1),
            next_maintenance_due: due,
        }
    }

    fn service_record(id: i32, machinery_id: i32, day: NaiveDate, cost: Decimal) -> maintenance_record::Model {
        maintenance_record::Model {
            id,
            machinery_id,
            date: day,
            maintenance_type: "Preventive".into(),
            description: "Liner change".into(),
            cost,
            duration_hours: dec!(4),
        }
    }

    fn status_log(id: i32, machinery_id: i32, day: NaiveDate, status: &str) -> equipment_status_log::Model {
        equipment_status_log::Model {
            id,
            machinery_id,
            date: day,
            status: status.into(),
            notes: None,
        }
    }

    fn store() -> InMemoryFactStore {
        InMemoryFactStore {
            machinery: vec![
                machine(1, "Jaw Crusher", "Operational", dec!(90), date(2024, 3, 20)),
                machine(2, "Ball Mill", "Operational", dec!(80), date(2024, 3, 1)),
                machine(3, "Hoist", "Out of Service", dec!(40), date(2024, 4, 30)),
            ],
            maintenance_records: vec![
                service_record(1, 1, date(2024, 3, 2), dec!(500)),
                service_record(2, 1, date(2024, 3, 9), dec!(300)),
                service_record(3, 2, date(2024, 3, 5), dec!(200)),
                service_record(4, 2, date(2024, 2, 25), dec!(100)),
            ],
            status_logs: vec![
                status_log(1, 2, date(2024, 3, 3), "Operational"),
                status_log(2, 2, date(2024, 3, 6), "Under Maintenance"),
                status_log(3, 1, date(2024, 2, 20), "Out of Service"),
            ],
            ..Default::default()
        }
    }

    fn range() -> DateRange {
        DateRange::new(date(2024, 3, 1), date(2024, 3, 10)).unwrap()
    }

    #[tokio::test]
    async fn fleet_summary_uses_latest_status_in_range() {
        let service = DashboardService::new(Arc::new(store()), DashboardSettings::default());
        let dashboard = service.equipment(range(), None).await.unwrap();

        let mill = &dashboard.data[1];
        assert_eq!(mill.status, "Under Maintenance");
        assert_eq!(mill.status_history.len(), 2);
        assert_eq!(mill.status_history[0].date, date(2024, 3, 6));

        // the out-of-range log does not override the crusher's own status
        let crusher = &dashboard.data[0];
        assert_eq!(crusher.status, "Operational");
        let dates: Vec<NaiveDate> = crusher.maintenance_history.iter().map(|m| m.date).collect();
        assert_eq!(dates, vec![date(2024, 3, 9), date(2024, 3, 2)]);

        let s = &dashboard.summary;
        assert_eq!(s.total_count, 3);
        assert_eq!(s.operational_count, 1);
        assert_eq!(s.maintenance_count, 1);
        assert_eq!(s.out_of_service_count, 1);
        assert_eq!(s.avg_efficiency, 70.0);
        assert_eq!(s.total_maintenance_cost, 1000.0);
        assert_eq!(s.total_maintenance_hours, 12.0);
        assert_eq!(s.maintenance_due_count, 1);
        // 100/day now against 10/day before
        assert_eq!(s.trend_maintenance_cost, 90.0);
    }

    #[tokio::test]
    async fn single_machine_filter() {
        let service = DashboardService::new(Arc::new(store()), DashboardSettings::default());
        let dashboard = service.equipment(range(), Some(1)).await.unwrap();

        assert_eq!(dashboard.data.len(), 1);
        assert_eq!(dashboard.summary.total_maintenance_cost, 800.0);
        assert_eq!(dashboard.summary.trend_maintenance_cost, 80.0);
    }

    #[tokio::test]
    async fn unknown_machine_is_not_configured() {
        let service = DashboardService::new(Arc::new(store()), DashboardSettings::default());
        assert_matches!(
            service.equipment(range(), Some(99)).await,
            Err(ServiceError::NotConfigured(msg)) if msg.contains("99")
        );
    }

    #[rstest]
    #[case("Operational", Some(MachineStatus::Operational))]
    #[case("under maintenance", Some(MachineStatus::Maintenance))]
    #[case("MAINTENANCE", Some(MachineStatus::Maintenance))]
    #[case("out_of_service", Some(MachineStatus::OutOfService))]
    #[case("Offline", Some(MachineStatus::OutOfService))]
    #[case("scrapped", None)]
    fn parses_status_text(#[case] raw: &str, #[case] expected: Option<MachineStatus>) {
        assert_eq!(MachineStatus::parse(raw), expected);
    }

    #[tokio::test]
    async fn fleet_efficiency_saturates() {
        let store = InMemoryFactStore {
            machinery: vec![
                machine(1, "Jaw Crusher", "Operational", Decimal::MAX, date(2024, 3, 20)),
                machine(2, "Ball Mill", "Operational", Decimal::MAX, date(2024, 3, 20)),
            ],
            ..Default::default()
        };
        let service = DashboardService::new(Arc::new(store), DashboardSettings::default());

        let s = service.equipment(range(), None).await.unwrap().summary;

        assert_eq!(s.avg_efficiency, round_to(Decimal::MAX / dec!(2), 1));
        assert_eq!(s.operational_count, 2);
    }
}
