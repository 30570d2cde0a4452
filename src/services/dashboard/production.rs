use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use super::{Dashboard, DashboardService};
use crate::analytics::numeric::{percent_of, round_to, to_f64};
use crate::analytics::{
    aggregate, compare_values, trend, trend_of, DateRange, MeasurementRecord, Metric, TrendResult,
};
use crate::entities::daily_production_log;
use crate::errors::{ServiceError, ServiceResult};

metric_set! {
    pub enum ProductionMetric {
        TonnageCrushed => "total_tonnage_crushed",
        TonnageHoisted => "total_tonnage_hoisted",
        TonnageMilled => "total_tonnage_milled",
        GoldRecoveryRate => "gold_recovery_rate",
        OperationalEfficiency => "operational_efficiency",
        SmeltedGold => "smelted_gold",
        GoldPrice => "gold_price",
        GrossProfit => "gross_profit",
    }
}

impl MeasurementRecord for daily_production_log::Model {
    type Metric = ProductionMetric;

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn value(&self, metric: ProductionMetric) -> Option<Decimal> {
        Some(match metric {
            ProductionMetric::TonnageCrushed => self.total_tonnage_crushed,
            ProductionMetric::TonnageHoisted => self.total_tonnage_hoisted,
            ProductionMetric::TonnageMilled => self.total_tonnage_milled,
            ProductionMetric::GoldRecoveryRate => self.gold_recovery_rate,
            ProductionMetric::OperationalEfficiency => self.operational_efficiency,
            ProductionMetric::SmeltedGold => self.smelted_gold,
            ProductionMetric::GoldPrice => self.gold_price,
            ProductionMetric::GrossProfit => self.gross_profit,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductionRow {
    pub date: NaiveDate,
    pub total_tonnage_crushed: f64,
    pub total_tonnage_hoisted: f64,
    pub total_tonnage_milled: f64,
    pub gold_recovery_rate: f64,
    pub operational_efficiency: f64,
    pub smelted_gold: f64,
    pub gold_price: f64,
    pub gross_profit: f64,
    pub notes: Option<String>,
}

impl From<&daily_production_log::Model> for ProductionRow {
    fn from(row: &daily_production_log::Model) -> Self {
        Self {
            date: row.date,
            total_tonnage_crushed: to_f64(row.total_tonnage_crushed),
            total_tonnage_hoisted: to_f64(row.total_tonnage_hoisted),
            total_tonnage_milled: to_f64(row.total_tonnage_milled),
            gold_recovery_rate: to_f64(row.gold_recovery_rate),
            operational_efficiency: to_f64(row.operational_efficiency),
            smelted_gold: to_f64(row.smelted_gold),
            gold_price: to_f64(row.gold_price),
            gross_profit: to_f64(row.gross_profit),
            notes: row.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductionSummary {
    pub total_tonnage_crushed: f64,
    pub total_tonnage_hoisted: f64,
    pub total_tonnage_milled: f64,
    pub total_smelted_gold: f64,
    pub total_gross_profit: f64,
    pub avg_gold_recovery_rate: f64,
    pub avg_operational_efficiency: f64,
    pub avg_gold_price: f64,
    pub daily_avg_crushed: f64,
    pub daily_avg_hoisted: f64,
    pub daily_avg_gold_smelted: f64,
    pub trend_crushed: f64,
    pub trend_hoisted: f64,
    pub trend_gold_smelted: f64,
    /// Change of the per-record average, not of a daily average.
    pub trend_recovery: f64,
    pub trend_efficiency: f64,
    pub daily_target: f64,
    /// Tonnage crushed on the last day of the period.
    pub latest_production: f64,
    pub target_achievement: f64,
    pub trends: Vec<TrendResult>,
}

pub type ProductionDashboard = Dashboard<ProductionRow, ProductionSummary>;

impl DashboardService {
    /// Gold production for the period. Requires at least one mining site.
    pub async fn production(&self, range: DateRange) -> ServiceResult<ProductionDashboard> {
        if self.store.mining_sites().await?.is_empty() {
            warn!("Production dashboard requested without a mining site");
            return Err(ServiceError::NotConfigured(
                "no mining site configured".to_string(),
            ));
        }

        let previous_range = range.previous();
        let rows = self.store.production_logs(range).await?;
        let previous_rows = self.store.production_logs(previous_range).await?;

        let current = aggregate(rows.iter(), range, ProductionMetric::all());
        let previous = aggregate(previous_rows.iter(), previous_range, ProductionMetric::all());
        let days = range.length_days();

        let delta = |metric| trend_of(metric, &current, &previous, days).absolute_delta;
        let avg_delta = |metric: ProductionMetric| {
            compare_values(metric.name(), current.get(metric).avg(), previous.get(metric).avg())
                .absolute_delta
        };

        let target = self.settings.daily_production_target;
        let latest = rows
            .iter()
            .find(|r| r.date == range.to())
            .map(|r| r.total_tonnage_crushed)
            .unwrap_or(Decimal::ZERO);

        let summary = ProductionSummary {
            total_tonnage_crushed: to_f64(current.sum(ProductionMetric::TonnageCrushed)),
            total_tonnage_hoisted: to_f64(current.sum(ProductionMetric::TonnageHoisted)),
            total_tonnage_milled: to_f64(current.sum(ProductionMetric::TonnageMilled)),
            total_smelted_gold: to_f64(current.sum(ProductionMetric::SmeltedGold)),
            total_gross_profit: to_f64(current.sum(ProductionMetric::GrossProfit)),
            avg_gold_recovery_rate: to_f64(current.get(ProductionMetric::GoldRecoveryRate).avg()),
            avg_operational_efficiency: to_f64(
                current.get(ProductionMetric::OperationalEfficiency).avg(),
            ),
            avg_gold_price: to_f64(current.get(ProductionMetric::GoldPrice).avg()),
            daily_avg_crushed: to_f64(current.daily_average(ProductionMetric::TonnageCrushed)),
            daily_avg_hoisted: to_f64(current.daily_average(ProductionMetric::TonnageHoisted)),
            daily_avg_gold_smelted: to_f64(current.daily_average(ProductionMetric::SmeltedGold)),
            trend_crushed: delta(ProductionMetric::TonnageCrushed),
            trend_hoisted: delta(ProductionMetric::TonnageHoisted),
            trend_gold_smelted: delta(ProductionMetric::SmeltedGold),
            trend_recovery: avg_delta(ProductionMetric::GoldRecoveryRate),
            trend_efficiency: avg_delta(ProductionMetric::OperationalEfficiency),
            daily_target: to_f64(target),
            latest_production: to_f64(latest),
            target_achievement: round_to(percent_of(latest, target), 1),
            trends: trend(&current, &previous, days),
        };

        let mut data: Vec<ProductionRow> = rows.iter().map(ProductionRow::from).collect();
        data.sort_by(|a, b| b.date.cmp(&a.date));

        Ok(Dashboard { data, summary })
    }
}
