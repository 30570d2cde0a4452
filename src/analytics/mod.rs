//! Period aggregation and trend engine.
//!
//! Everything in this module is pure: callers hand in records they already
//! fetched and get back aggregates, trends and stock classifications. Nothing
//! here touches the database or holds shared state, so every function is safe
//! to call concurrently from any number of requests.

pub mod aggregator;
pub mod numeric;
pub mod period;
pub mod stock;
pub mod trend;

pub use aggregator::{aggregate, FieldAggregate, MeasurementRecord, Metric, PeriodAggregate};
pub use period::{DateRange, DateRangeError};
pub use stock::{classify_stock, StockCounts, StockStatus, StockThresholds};
pub use trend::{compare_values, trend, trend_of, TrendResult};
