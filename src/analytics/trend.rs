use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::Serialize;

use super::aggregator::{Metric, PeriodAggregate};
use super::numeric;

/// Change of one metric between a period and the one preceding it.
///
/// Values are daily averages. A period with no data contributes zero, so a
/// metric that only appears in the current period trends by its full value
/// and reports a percent change of zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendResult {
    pub metric_name: &'static str,
    pub current_value: f64,
    pub previous_value: f64,
    pub absolute_delta: f64,
    pub percent_delta: f64,
}

impl TrendResult {
    pub fn percent_rounded(&self, places: u32) -> f64 {
        numeric::from_f64(self.percent_delta)
            .map(|p| numeric::round_to(p, places))
            .unwrap_or(0.0)
    }

    pub fn delta_rounded(&self, places: u32) -> f64 {
        numeric::from_f64(self.absolute_delta)
            .map(|d| numeric::round_to(d, places))
            .unwrap_or(0.0)
    }
}

/// Compares two already-reduced values of the same metric.
pub fn compare_values(metric_name: &'static str, current: Decimal, previous: Decimal) -> TrendResult {
    let delta = numeric::saturating_add(current, -previous);

    TrendResult {
        metric_name,
        current_value: numeric::to_f64(current),
        previous_value: numeric::to_f64(previous),
        absolute_delta: numeric::to_f64(delta),
        percent_delta: numeric::to_f64(numeric::percent_of(delta, previous)),
    }
}

/// Daily-average trend for a single metric.
pub fn trend_of<M: Metric>(
    metric: M,
    current: &PeriodAggregate<M>,
    previous: &PeriodAggregate<M>,
    period_length_days: i64,
) -> TrendResult {
    compare_values(
        metric.name(),
        current.get(metric).daily_average(period_length_days),
        previous.get(metric).daily_average(period_length_days),
    )
}

/// Daily-average trends for every metric present in either aggregate.
pub fn trend<M: Metric>(
    current: &PeriodAggregate<M>,
    previous: &PeriodAggregate<M>,
    period_length_days: i64,
) -> Vec<TrendResult> {
    let metrics: BTreeSet<M> = current.metrics().chain(previous.metrics()).collect();

    metrics
        .into_iter()
        .map(|metric| trend_of(metric, current, previous, period_length_days))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::aggregator::{aggregate, MeasurementRecord};
    use crate::analytics::period::DateRange;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum Output {
        Tonnes,
    }

    impl Metric for Output {
        fn name(&self) -> &'static str {
            "tonnes"
        }

        fn all() -> &'static [Self] {
            &[Output::Tonnes]
        }
    }

    struct Shift(NaiveDate, Decimal);

    impl MeasurementRecord for Shift {
        type Metric = Output;

        fn date(&self) -> NaiveDate {
            self.0
        }

        fn value(&self, _: Output) -> Option<Decimal> {
            Some(self.1)
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn trend_uses_period_length_not_record_count() {
        let current_range = DateRange::new(day(11), day(20)).unwrap();
        let previous_range = current_range.previous();

        // one record in the current period, ten in the previous
        let rows: Vec<Shift> = std::iter::once(Shift(day(15), dec!(100)))
            .chain((1..=10).map(|d| Shift(day(d), dec!(20))))
            .collect();

        let current = aggregate(rows.iter(), current_range, Output::all());
        let previous = aggregate(rows.iter(), previous_range, Output::all());
        let trends = trend(&current, &previous, current_range.length_days());

        assert_eq!(trends.len(), 1);
        let t = &trends[0];
        assert_eq!(t.metric_name, "tonnes");
        assert_eq!(t.current_value, 10.0);
        assert_eq!(t.previous_value, 20.0);
        assert_eq!(t.absolute_delta, -10.0);
        assert_eq!(t.percent_delta, -50.0);
    }

    #[test]
    fn missing_previous_data_counts_as_zero() {
        let t = compare_values("tonnes", dec!(12.5), Decimal::ZERO);
        assert_eq!(t.absolute_delta, 12.5);
        assert_eq!(t.percent_delta, 0.0);
    }

    #[test]
    fn swapping_periods_negates_delta() {
        let a = compare_values("tonnes", dec!(30), dec!(12));
        let b = compare_values("tonnes", dec!(12), dec!(30));
        assert_eq!(a.absolute_delta, -b.absolute_delta);
        assert_eq!(a.percent_delta, 150.0);
    }

    #[test]
    fn rounded_accessors() {
        let t = compare_values("tonnes", dec!(2), dec!(3));
        assert_eq!(t.percent_rounded(1), -33.3);
        assert_eq!(t.delta_rounded(0), -1.0);
    }
}
