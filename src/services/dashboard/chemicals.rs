use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;

use super::{Dashboard, DashboardService};
use crate::analytics::numeric::{ratio, saturating_mul, saturating_sum, to_f64};
use crate::analytics::{
    aggregate, trend, trend_of, DateRange, MeasurementRecord, StockCounts, StockStatus,
    TrendResult,
};
use crate::entities::chemical_usage;
use crate::errors::ServiceResult;

metric_set! {
    pub enum ChemicalMetric {
        AmountUsed => "amount_used",
    }
}

impl MeasurementRecord for chemical_usage::Model {
    type Metric = ChemicalMetric;

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn value(&self, metric: ChemicalMetric) -> Option<Decimal> {
        match metric {
            ChemicalMetric::AmountUsed => Some(self.amount_used),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChemicalRow {
    pub id: i32,
    pub name: String,
    pub unit: String,
    pub amount_used: f64,
    pub value_used: f64,
    pub current_stock: f64,
    pub minimum_required: f64,
    pub avg_daily_usage: f64,
    pub status: StockStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChemicalSummary {
    pub total_chemicals: usize,
    pub low_stock_count: usize,
    pub warning_stock_count: usize,
    pub total_value_used: f64,
    pub trend_amount_used: f64,
    pub trends: Vec<TrendResult>,
}

pub type ChemicalsDashboard = Dashboard<ChemicalRow, ChemicalSummary>;

impl DashboardService {
    /// Usage and stock position for every chemical in inventory.
    pub async fn chemicals(&self, range: DateRange) -> ServiceResult<ChemicalsDashboard> {
        let previous_range = range.previous();
        let inventory = self.store.chemical_inventory().await?;
        let usage = self.store.chemical_usage(range).await?;
        let previous_usage = self.store.chemical_usage(previous_range).await?;

        let days = range.length_days();
        let thresholds = self.settings.chemical_thresholds;

        let mut ranked: Vec<(Decimal, ChemicalRow)> = inventory
            .iter()
            .map(|item| {
                let used = aggregate(
                    usage.iter().filter(|u| u.chemical_id == item.id),
                    range,
                    &[ChemicalMetric::AmountUsed],
                )
                .get(ChemicalMetric::AmountUsed);
                let value_used = saturating_mul(used.sum, item.unit_price);

                let row = ChemicalRow {
                    id: item.id,
                    name: item.name.clone(),
                    unit: item.unit.clone(),
                    amount_used: to_f64(used.sum),
                    value_used: to_f64(value_used),
                    current_stock: to_f64(item.current_stock),
                    minimum_required: to_f64(item.minimum_required),
                    avg_daily_usage: to_f64(ratio(used.sum, Decimal::from(days))),
                    status: thresholds.classify(item.current_stock, item.minimum_required),
                };
                (value_used, row)
            })
            .collect();

        ranked.sort_by(|(a_value, a), (b_value, b)| match b_value.cmp(a_value) {
            Ordering::Equal => a.name.cmp(&b.name),
            other => other,
        });

        let total_value = saturating_sum(ranked.iter().map(|(value, _)| *value));
        let data: Vec<ChemicalRow> = ranked.into_iter().map(|(_, row)| row).collect();
        let counts: StockCounts = data.iter().map(|row| row.status).collect();

        let current = aggregate(usage.iter(), range, &[ChemicalMetric::AmountUsed]);
        let previous = aggregate(previous_usage.iter(), previous_range, &[ChemicalMetric::AmountUsed]);

        let summary = ChemicalSummary {
            total_chemicals: inventory.len(),
            low_stock_count: counts.low,
            warning_stock_count: counts.warning,
            total_value_used: to_f64(total_value),
            trend_amount_used: trend_of(ChemicalMetric::AmountUsed, &current, &previous, days)
                .absolute_delta,
            trends: trend(&current, &previous, days),
        };

        Ok(Dashboard { data, summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::StockThresholds;
    use crate::entities::chemical_inventory;
    use crate::services::dashboard::fixtures::date;
    use crate::services::dashboard::DashboardSettings;
    use crate::services::fact_store::InMemoryFactStore;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn chemical(id: i32, name: &str, stock: Decimal, minimum: Decimal, price: Decimal) -> chemical_inventory::Model {
        chemical_inventory::Model {
            id,
            name: name.into(),
            current_stock: stock,
            minimum_required: minimum,
            unit: "kg".into(),
            unit_price: price,
            supplier: None,
        }
    }

    fn used(id: i32, chemical_id: i32, day: NaiveDate, amount: Decimal) -> chemical_usage::Model {
        chemical_usage::Model {
            id,
            date: day,
            chemical_id,
            amount_used: amount,
            process: "Leaching".into(),
        }
    }

    fn store() -> InMemoryFactStore {
        InMemoryFactStore {
            chemical_inventory: vec![
                chemical(1, "Sodium Cyanide", dec!(5), dec!(10), dec!(3)),
                chemical(2, "Lime", dec!(13), dec!(10), dec!(1)),
                chemical(3, "Caustic Soda", dec!(100), dec!(10), dec!(2)),
            ],
            chemical_usage: vec![
                used(1, 1, date(2024, 3, 1), dec!(10)),
                used(2, 1, date(2024, 3, 2), dec!(10)),
                used(3, 2, date(2024, 3, 2), dec!(40)),
                used(4, 2, date(2024, 2, 28), dec!(8)),
            ],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn rows_ranked_by_value_with_status() {
        let settings = DashboardSettings {
            chemical_thresholds: StockThresholds::from_f64(1.5),
            ..Default::default()
        };
        let service = DashboardService::new(Arc::new(store()), settings);
        let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 2)).unwrap();

        let dashboard = service.chemicals(range).await.unwrap();
        let names: Vec<&str> = dashboard.data.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Sodium Cyanide", "Lime", "Caustic Soda"]);

        let cyanide = &dashboard.data[0];
        assert_eq!(cyanide.amount_used, 20.0);
        assert_eq!(cyanide.value_used, 60.0);
        assert_eq!(cyanide.avg_daily_usage, 10.0);
        assert_eq!(cyanide.status, StockStatus::Low);
        // 13 < 10 * 1.5
        assert_eq!(dashboard.data[1].status, StockStatus::Warning);
        assert_eq!(dashboard.data[2].status, StockStatus::Normal);
        assert_eq!(dashboard.data[2].amount_used, 0.0);

        let s = &dashboard.summary;
        assert_eq!(s.total_chemicals, 3);
        assert_eq!(s.low_stock_count, 1);
        assert_eq!(s.warning_stock_count, 1);
        assert_eq!(s.total_value_used, 100.0);
        // 60 over two days now, 8 over the two days before
        assert_eq!(s.trend_amount_used, 26.0);
    }

    #[tokio::test]
    async fn default_multiplier_applies_without_override() {
        let service = DashboardService::new(Arc::new(store()), DashboardSettings::default());
        let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 2)).unwrap();

        let dashboard = service.chemicals(range).await.unwrap();
        let lime = dashboard.data.iter().find(|r| r.name == "Lime").unwrap();
        assert_eq!(lime.status, StockStatus::Normal);
    }

    #[tokio::test]
    async fn oversized_values_saturate() {
        let huge = dec!(1e15);
        let store = InMemoryFactStore {
            chemical_inventory: vec![
                chemical(1, "Sodium Cyanide", huge, dec!(10), huge),
                chemical(2, "Lime", huge, dec!(10), huge),
            ],
            chemical_usage: vec![
                used(1, 1, date(2024, 3, 1), huge),
                used(2, 2, date(2024, 3, 1), huge),
            ],
            ..Default::default()
        };
        let service = DashboardService::new(Arc::new(store), DashboardSettings::default());

        let dashboard = service.chemicals(DateRange::single_day(date(2024, 3, 1))).await.unwrap();

        let ceiling = to_f64(Decimal::MAX);
        assert!(dashboard.data.iter().all(|row| row.value_used == ceiling));
        assert_eq!(dashboard.summary.total_value_used, ceiling);
    }
}
