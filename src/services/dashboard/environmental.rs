use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{Dashboard, DashboardService};
use crate::analytics::numeric::{round_to, to_f64};
use crate::analytics::{
    aggregate, compare_values, trend, trend_of, DateRange, MeasurementRecord, Metric,
    PeriodAggregate, TrendResult,
};
use crate::entities::environmental_metric;
use crate::errors::ServiceResult;

metric_set! {
    pub enum EnvironmentalMetric {
        DustLevel => "dust_level_pm10",
        NoiseLevel => "noise_level_db",
        WaterUsage => "water_usage_m3",
        WasteWaterPh => "waste_water_ph",
        RehabilitationArea => "rehabilitation_area_m2",
    }
}

impl MeasurementRecord for environmental_metric::Model {
    type Metric = EnvironmentalMetric;

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn value(&self, metric: EnvironmentalMetric) -> Option<Decimal> {
        Some(match metric {
            EnvironmentalMetric::DustLevel => self.dust_level_pm10,
            EnvironmentalMetric::NoiseLevel => self.noise_level_db,
            EnvironmentalMetric::WaterUsage => self.water_usage_m3,
            EnvironmentalMetric::WasteWaterPh => self.waste_water_ph,
            EnvironmentalMetric::RehabilitationArea => self.rehabilitation_area_m2,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentalRow {
    pub date: NaiveDate,
    pub dust_level_pm10: f64,
    pub noise_level_db: f64,
    pub water_usage_m3: f64,
    pub waste_water_ph: f64,
    pub rehabilitation_area_m2: f64,
}

impl From<&environmental_metric::Model> for EnvironmentalRow {
    fn from(row: &environmental_metric::Model) -> Self {
        Self {
            date: row.date,
            dust_level_pm10: to_f64(row.dust_level_pm10),
            noise_level_db: to_f64(row.noise_level_db),
            water_usage_m3: to_f64(row.water_usage_m3),
            waste_water_ph: to_f64(row.waste_water_ph),
            rehabilitation_area_m2: to_f64(row.rehabilitation_area_m2),
        }
    }
}

/// Spread of one reading over the period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReadingStats {
    pub average: f64,
    pub max: f64,
    pub min: f64,
    /// Daily-average delta against the previous period.
    pub trend: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RehabilitationStats {
    pub current_area: f64,
    pub trend: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentalSummary {
    pub dust_level: ReadingStats,
    pub noise_level: ReadingStats,
    pub water_usage: ReadingStats,
    pub ph_level: ReadingStats,
    pub rehabilitation: RehabilitationStats,
    pub trends: Vec<TrendResult>,
}

pub type EnvironmentalDashboard = Dashboard<EnvironmentalRow, EnvironmentalSummary>;

fn reading_stats(
    metric: EnvironmentalMetric,
    current: &PeriodAggregate<EnvironmentalMetric>,
    previous: &PeriodAggregate<EnvironmentalMetric>,
    places: u32,
) -> ReadingStats {
    let field = current.get(metric);
    ReadingStats {
        average: round_to(field.avg(), places),
        max: round_to(field.max, places),
        min: round_to(field.min, places),
        trend: trend_of(metric, current, previous, current.length_days()).delta_rounded(places),
    }
}

impl DashboardService {
    pub async fn environmental(&self, range: DateRange) -> ServiceResult<EnvironmentalDashboard> {
        let previous_range = range.previous();
        let rows = self.store.environmental_metrics(range).await?;
        let previous_rows = self.store.environmental_metrics(previous_range).await?;

        let current = aggregate(rows.iter(), range, EnvironmentalMetric::all());
        let previous = aggregate(previous_rows.iter(), previous_range, EnvironmentalMetric::all());

        // rehabilitation area is cumulative, so compare the high-water marks
        let area = EnvironmentalMetric::RehabilitationArea;
        let current_area = current.get(area).max;
        let rehabilitation = RehabilitationStats {
            current_area: to_f64(current_area),
            trend: compare_values(area.name(), current_area, previous.get(area).max).absolute_delta,
        };

        let summary = EnvironmentalSummary {
            dust_level: reading_stats(EnvironmentalMetric::DustLevel, &current, &previous, 2),
            noise_level: reading_stats(EnvironmentalMetric::NoiseLevel, &current, &previous, 1),
            water_usage: reading_stats(EnvironmentalMetric::WaterUsage, &current, &previous, 1),
            ph_level: reading_stats(EnvironmentalMetric::WasteWaterPh, &current, &previous, 2),
            rehabilitation,
            trends: trend(&current, &previous, range.length_days()),
        };

        let mut data: Vec<EnvironmentalRow> = rows.iter().map(EnvironmentalRow::from).collect();
        data.sort_by(|a, b| b.date.cmp(&a.date));

        Ok(Dashboard { data, summary })
    }
}
