use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{Dashboard, DashboardService};
use crate::analytics::numeric::to_f64;
use crate::analytics::{aggregate, trend, trend_of, DateRange, MeasurementRecord, Metric, TrendResult};
use crate::entities::energy_usage;
use crate::errors::ServiceResult;

metric_set! {
    pub enum EnergyMetric {
        ElectricityKwh => "electricity_kwh",
        ElectricityCost => "electricity_cost",
        DieselLiters => "diesel_liters",
        DieselCost => "diesel_cost",
        TotalCost => "total_cost",
    }
}

impl MeasurementRecord for energy_usage::Model {
    type Metric = EnergyMetric;

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn value(&self, metric: EnergyMetric) -> Option<Decimal> {
        Some(match metric {
            EnergyMetric::ElectricityKwh => self.electricity_kwh,
            EnergyMetric::ElectricityCost => self.electricity_cost,
            EnergyMetric::DieselLiters => self.diesel_liters,
            EnergyMetric::DieselCost => self.diesel_cost,
            EnergyMetric::TotalCost => self.total_cost,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyRow {
    pub date: NaiveDate,
    pub electricity_kwh: f64,
    pub electricity_cost: f64,
    pub diesel_liters: f64,
    pub diesel_cost: f64,
    pub total_cost: f64,
}

impl From<&energy_usage::Model> for EnergyRow {
    fn from(row: &energy_usage::Model) -> Self {
        Self {
            date: row.date,
            electricity_kwh: to_f64(row.electricity_kwh),
            electricity_cost: to_f64(row.electricity_cost),
            diesel_liters: to_f64(row.diesel_liters),
            diesel_cost: to_f64(row.diesel_cost),
            total_cost: to_f64(row.total_cost),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergySummary {
    pub total_electricity_kwh: f64,
    pub total_electricity_cost: f64,
    pub total_diesel_liters: f64,
    pub total_diesel_cost: f64,
    pub total_cost: f64,
    /// Per calendar day of the period.
    pub avg_electricity_kwh: f64,
    pub avg_diesel_liters: f64,
    pub trend_electricity: f64,
    pub trend_diesel: f64,
    pub trend_cost: f64,
    pub trends: Vec<TrendResult>,
}

pub type EnergyDashboard = Dashboard<EnergyRow, EnergySummary>;

impl DashboardService {
    pub async fn energy(&self, range: DateRange) -> ServiceResult<EnergyDashboard> {
        let previous_range = range.previous();
        let rows = self.store.energy_usage(range).await?;
        let previous_rows = self.store.energy_usage(previous_range).await?;

        let current = aggregate(rows.iter(), range, EnergyMetric::all());
        let previous = aggregate(previous_rows.iter(), previous_range, EnergyMetric::all());
        let days = range.length_days();

        let delta = |metric| trend_of(metric, &current, &previous, days).absolute_delta;

        let summary = EnergySummary {
            total_electricity_kwh: to_f64(current.sum(EnergyMetric::ElectricityKwh)),
            total_electricity_cost: to_f64(current.sum(EnergyMetric::ElectricityCost)),
            total_diesel_liters: to_f64(current.sum(EnergyMetric::DieselLiters)),
            total_diesel_cost: to_f64(current.sum(EnergyMetric::DieselCost)),
            total_cost: to_f64(current.sum(EnergyMetric::TotalCost)),
            avg_electricity_kwh: to_f64(current.daily_average(EnergyMetric::ElectricityKwh)),
            avg_diesel_liters: to_f64(current.daily_average(EnergyMetric::DieselLiters)),
            trend_electricity: delta(EnergyMetric::ElectricityKwh),
            trend_diesel: delta(EnergyMetric::DieselLiters),
            trend_cost: delta(EnergyMetric::TotalCost),
            trends: trend(&current, &previous, days),
        };

        let mut data: Vec<EnergyRow> = rows.iter().map(EnergyRow::from).collect();
        data.sort_by(|a, b| b.date.cmp(&a.date));

        Ok(Dashboard { data, summary })
    }
}
