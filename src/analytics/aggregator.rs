use std::collections::BTreeMap;
use std::fmt::Debug;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::numeric;
use super::period::DateRange;

/// A numeric column a fact table exposes for aggregation.
///
/// Implemented by one small enum per table so metrics are chosen at compile
/// time rather than looked up by column name.
pub trait Metric: Copy + Ord + Debug + Send + Sync + 'static {
    /// Stable snake_case name used in trend output.
    fn name(&self) -> &'static str;

    /// Every metric of the table, in output order.
    fn all() -> &'static [Self];
}

/// A dated fact row with typed numeric accessors.
pub trait MeasurementRecord {
    type Metric: Metric;

    fn date(&self) -> NaiveDate;

    /// `None` for a nullable column that holds no value on this row.
    fn value(&self, metric: Self::Metric) -> Option<Decimal>;
}

/// Reduction of one field over a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldAggregate {
    pub sum: Decimal,
    pub min: Decimal,
    pub max: Decimal,
    pub count: usize,
}

impl FieldAggregate {
    pub fn record(&mut self, value: Decimal) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.sum = numeric::saturating_add(self.sum, value);
        self.count += 1;
    }

    /// Mean per record; zero for an empty aggregate.
    pub fn avg(&self) -> Decimal {
        numeric::ratio(self.sum, numeric::from_count(self.count))
    }

    /// Sum spread over the calendar length of the period, regardless of how
    /// many records fell inside it.
    pub fn daily_average(&self, length_days: i64) -> Decimal {
        if length_days <= 0 {
            return Decimal::ZERO;
        }
        numeric::ratio(self.sum, Decimal::from(length_days))
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Per-metric aggregates for one period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodAggregate<M: Metric> {
    range: DateRange,
    fields: BTreeMap<M, FieldAggregate>,
}

impl<M: Metric> PeriodAggregate<M> {
    pub fn empty(range: DateRange, fields: &[M]) -> Self {
        Self {
            range,
            fields: fields.iter().map(|m| (*m, FieldAggregate::default())).collect(),
        }
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn length_days(&self) -> i64 {
        self.range.length_days()
    }

    /// Aggregate for `metric`, all zeros when it was not requested or saw no data.
    pub fn get(&self, metric: M) -> FieldAggregate {
        self.fields.get(&metric).copied().unwrap_or_default()
    }

    pub fn sum(&self, metric: M) -> Decimal {
        self.get(metric).sum
    }

    pub fn daily_average(&self, metric: M) -> Decimal {
        self.get(metric).daily_average(self.length_days())
    }

    pub fn metrics(&self) -> impl Iterator<Item = M> + '_ {
        self.fields.keys().copied()
    }
}

/// Reduces `records` dated inside `range` into sum/min/max/count per field.
///
/// Records outside the range are ignored, so callers may pass a wider
/// snapshot. An empty input yields zero aggregates for every field.
pub fn aggregate<'a, R, I>(records: I, range: DateRange, fields: &[R::Metric]) -> PeriodAggregate<R::Metric>
where
    R: MeasurementRecord + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut result = PeriodAggregate::empty(range, fields);

    for record in records.into_iter().filter(|r| range.contains(r.date())) {
        for (metric, field) in result.fields.iter_mut() {
            if let Some(value) = record.value(*metric) {
                field.record(value);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum Reading {
        Level,
        Rating,
    }

    impl Metric for Reading {
        fn name(&self) -> &'static str {
            match self {
                Reading::Level => "level",
                Reading::Rating => "rating",
            }
        }

        fn all() -> &'static [Self] {
            &[Reading::Level, Reading::Rating]
        }
    }

    struct Row {
        date: NaiveDate,
        level: Decimal,
        rating: Option<Decimal>,
    }

    impl MeasurementRecord for Row {
        type Metric = Reading;

        fn date(&self) -> NaiveDate {
            self.date
        }

        fn value(&self, metric: Reading) -> Option<Decimal> {
            match metric {
                Reading::Level => Some(self.level),
                Reading::Rating => self.rating,
            }
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn row(d: u32, level: Decimal, rating: Option<Decimal>) -> Row {
        Row {
            date: day(d),
            level,
            rating,
        }
    }

    #[test]
    fn empty_input_yields_zeros() {
        let range = DateRange::new(day(1), day(5)).unwrap();
        let agg = aggregate(Vec::<Row>::new().iter(), range, Reading::all());

        for metric in Reading::all() {
            let field = agg.get(*metric);
            assert_eq!(field.sum, Decimal::ZERO);
            assert_eq!(field.avg(), Decimal::ZERO);
            assert_eq!(field.min, Decimal::ZERO);
            assert_eq!(field.max, Decimal::ZERO);
            assert_eq!(field.count, 0);
        }
    }

    #[test]
    fn reduces_records_inside_the_range() {
        let rows = vec![
            row(1, dec!(10), Some(dec!(4.5))),
            row(2, dec!(30), None),
            row(3, dec!(20), Some(dec!(3.5))),
            row(9, dec!(1000), Some(dec!(1))),
        ];
        let range = DateRange::new(day(1), day(4)).unwrap();
        let agg = aggregate(rows.iter(), range, Reading::all());

        let level = agg.get(Reading::Level);
        assert_eq!(level.sum, dec!(60));
        assert_eq!(level.count, 3);
        assert_eq!(level.avg(), dec!(20));
        assert_eq!(level.min, dec!(10));
        assert_eq!(level.max, dec!(30));
        assert_eq!(agg.daily_average(Reading::Level), dec!(15));

        let rating = agg.get(Reading::Rating);
        assert_eq!(rating.count, 2);
        assert_eq!(rating.avg(), dec!(4));
    }

    #[test]
    fn unrequested_metric_reads_as_zero() {
        let rows = vec![row(1, dec!(5), Some(dec!(2)))];
        let range = DateRange::single_day(day(1));
        let agg = aggregate(rows.iter(), range, &[Reading::Level]);

        assert_eq!(agg.sum(Reading::Level), dec!(5));
        assert!(agg.get(Reading::Rating).is_empty());
        assert_eq!(agg.metrics().collect::<Vec<_>>(), vec![Reading::Level]);
    }

    #[test]
    fn negative_values_track_min() {
        let mut field = FieldAggregate::default();
        field.record(dec!(-2));
        field.record(dec!(3));
        assert_eq!(field.min, dec!(-2));
        assert_eq!(field.max, dec!(3));
        assert_eq!(field.sum, dec!(1));
    }
}
