use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use super::DashboardService;
use crate::analytics::numeric::{round_to, saturating_add, to_f64};
use crate::analytics::{
    aggregate, trend_of, DateRange, MeasurementRecord, Metric, StockCounts, StockStatus, TrendResult,
};
use crate::entities::{explosives_inventory, explosives_usage};
use crate::errors::ServiceResult;

metric_set! {
    pub enum ExplosiveMetric {
        AmountUsed => "amount_used",
        EffectivenessRating => "effectiveness_rating",
    }
}

impl MeasurementRecord for explosives_usage::Model {
    type Metric = ExplosiveMetric;

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn value(&self, metric: ExplosiveMetric) -> Option<Decimal> {
        match metric {
            ExplosiveMetric::AmountUsed => Some(self.amount_used),
            ExplosiveMetric::EffectivenessRating => self.effectiveness_rating,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlastRow {
    pub date: NaiveDate,
    pub explosive: String,
    pub unit: String,
    pub amount_used: f64,
    pub blast_location: String,
    pub blast_purpose: String,
    pub effectiveness_rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplosiveStock {
    pub id: i32,
    pub name: String,
    pub explosive_type: String,
    pub current_stock: f64,
    pub minimum_required: f64,
    pub unit: String,
    pub status: StockStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplosivesSummary {
    pub total_explosives: usize,
    pub low_stock_count: usize,
    pub warning_stock_count: usize,
    /// Keyed by `"name (unit)"`.
    pub total_usage: BTreeMap<String, f64>,
    pub avg_effectiveness_rating: f64,
    pub total_blasts: usize,
    pub trend_amount_used: f64,
    pub trends: Vec<TrendResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplosivesDashboard {
    pub data: Vec<BlastRow>,
    pub inventory: Vec<ExplosiveStock>,
    pub summary: ExplosivesSummary,
}

impl DashboardService {
    pub async fn explosives(&self, range: DateRange) -> ServiceResult<ExplosivesDashboard> {
        let previous_range = range.previous();
        let items = self.store.explosives_inventory().await?;
        let usage = self.store.explosives_usage(range).await?;
        let previous_usage = self.store.explosives_usage(previous_range).await?;

        let by_id: BTreeMap<i32, &explosives_inventory::Model> =
            items.iter().map(|item| (item.id, item)).collect();
        let thresholds = self.settings.stock_thresholds;

        let inventory: Vec<ExplosiveStock> = items
            .iter()
            .map(|item| ExplosiveStock {
                id: item.id,
                name: item.name.clone(),
                explosive_type: item.explosive_type.clone(),
                current_stock: to_f64(item.current_stock),
                minimum_required: to_f64(item.minimum_required),
                unit: item.unit.clone(),
                status: thresholds.classify(item.current_stock, item.minimum_required),
            })
            .collect();
        let counts: StockCounts = inventory.iter().map(|item| item.status).collect();

        let mut usage_by_label: BTreeMap<String, Decimal> = BTreeMap::new();
        let mut blasts: BTreeSet<(NaiveDate, &str)> = BTreeSet::new();
        let mut data = Vec::with_capacity(usage.len());

        for blast in &usage {
            let (name, unit) = by_id
                .get(&blast.explosive_id)
                .map(|item| (item.name.as_str(), item.unit.as_str()))
                .unwrap_or(("Unknown", ""));

            let total = usage_by_label
                .entry(format!("{} ({})", name, unit))
                .or_insert(Decimal::ZERO);
            *total = saturating_add(*total, blast.amount_used);
            blasts.insert((blast.date, blast.blast_location.as_str()));

            data.push(BlastRow {
                date: blast.date,
                explosive: name.to_string(),
                unit: unit.to_string(),
                amount_used: to_f64(blast.amount_used),
                blast_location: blast.blast_location.clone(),
                blast_purpose: blast.blast_purpose.clone(),
                effectiveness_rating: blast.effectiveness_rating.map(to_f64),
            });
        }
        data.sort_by(|a, b| b.date.cmp(&a.date));

        let current = aggregate(usage.iter(), range, ExplosiveMetric::all());
        let previous = aggregate(previous_usage.iter(), previous_range, &[ExplosiveMetric::AmountUsed]);
        let amount_trend = trend_of(
            ExplosiveMetric::AmountUsed,
            &current,
            &previous,
            range.length_days(),
        );

        let summary = ExplosivesSummary {
            total_explosives: items.len(),
            low_stock_count: counts.low,
            warning_stock_count: counts.warning,
            total_usage: usage_by_label
                .into_iter()
                .map(|(label, amount)| (label, to_f64(amount)))
                .collect(),
            avg_effectiveness_rating: round_to(
                current.get(ExplosiveMetric::EffectivenessRating).avg(),
                2,
            ),
            total_blasts: blasts.len(),
            trend_amount_used: amount_trend.absolute_delta,
            trends: vec![amount_trend],
        };

        Ok(ExplosivesDashboard {
            data,
            inventory,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::dashboard::fixtures::date;
    use crate::services::dashboard::DashboardSettings;
    use crate::services::fact_store::InMemoryFactStore;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn item(id: i32, name: &str, unit: &str, stock: Decimal, minimum: Decimal) -> explosives_inventory::Model {
        explosives_inventory::Model {
            id,
            name: name.into(),
            explosive_type: "Secondary".into(),
            current_stock: stock,
            minimum_required: minimum,
            unit: unit.into(),
            unit_price: dec!(2.5),
            storage_location: "Magazine A".into(),
        }
    }

    fn blast(
        id: i32,
        explosive_id: i32,
        day: NaiveDate,
        location: &str,
        amount: Decimal,
        rating: Option<Decimal>,
    ) -> explosives_usage::Model {
        explosives_usage::Model {
            id,
            date: day,
            explosive_id,
            amount_used: amount,
            blast_location: location.into(),
            blast_purpose: "Production".into(),
            effectiveness_rating: rating,
        }
    }

    #[tokio::test]
    async fn summarises_blasts_and_stock() {
        let store = InMemoryFactStore {
            explosives_inventory: vec![
                item(1, "ANFO", "kg", dec!(400), dec!(500)),
                item(2, "Detonator", "units", dec!(110), dec!(100)),
            ],
            explosives_usage: vec![
                blast(1, 1, date(2024, 4, 1), "Level 3 East", dec!(120), Some(dec!(8))),
                blast(2, 2, date(2024, 4, 1), "Level 3 East", dec!(12), Some(dec!(7))),
                blast(3, 1, date(2024, 4, 2), "Level 4 West", dec!(80), None),
                blast(4, 1, date(2024, 3, 31), "Level 2", dec!(50), Some(dec!(9))),
            ],
            ..Default::default()
        };
        let service = DashboardService::new(Arc::new(store), DashboardSettings::default());
        let range = DateRange::new(date(2024, 4, 1), date(2024, 4, 2)).unwrap();

        let dashboard = service.explosives(range).await.unwrap();
        let s = &dashboard.summary;

        assert_eq!(s.total_explosives, 2);
        assert_eq!(s.low_stock_count, 1);
        assert_eq!(s.warning_stock_count, 1);
        assert_eq!(s.total_usage.get("ANFO (kg)"), Some(&200.0));
        assert_eq!(s.total_usage.get("Detonator (units)"), Some(&12.0));
        assert_eq!(s.avg_effectiveness_rating, 7.5);
        assert_eq!(s.total_blasts, 2);
        // 212 over 2 days against 50 over the 2 days before
        assert_eq!(s.trend_amount_used, 81.0);

        assert_eq!(dashboard.data.len(), 3);
        assert_eq!(dashboard.data[0].date, date(2024, 4, 2));
        assert_eq!(dashboard.inventory[0].status, StockStatus::Low);
    }

    #[tokio::test]
    async fn usage_totals_saturate() {
        let store = InMemoryFactStore {
            explosives_inventory: vec![item(1, "ANFO", "kg", dec!(400), dec!(500))],
            explosives_usage: vec![
                blast(1, 1, date(2024, 4, 1), "Level 3 East", Decimal::MAX, None),
                blast(2, 1, date(2024, 4, 1), "Level 4 West", Decimal::MAX, None),
            ],
            ..Default::default()
        };
        let service = DashboardService::new(Arc::new(store), DashboardSettings::default());

        let dashboard = service
            .explosives(DateRange::single_day(date(2024, 4, 1)))
            .await
            .unwrap();

        assert_eq!(dashboard.summary.total_usage.get("ANFO (kg)"), Some(&to_f64(Decimal::MAX)));
        assert_eq!(dashboard.summary.total_blasts, 2);
    }
}
