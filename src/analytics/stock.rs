use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::numeric;

pub const DEFAULT_WARNING_MULTIPLIER: Decimal = dec!(1.2);

/// Sufficiency of an inventory item relative to its minimum requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum StockStatus {
    Normal,
    Warning,
    Low,
}

/// Below the minimum is `Low`, below `minimum * warning_multiplier` is
/// `Warning`, anything else is `Normal`. Pure comparisons, so `(0, 0)` is
/// `Normal`.
pub fn classify_stock(
    current_stock: Decimal,
    minimum_required: Decimal,
    warning_multiplier: Decimal,
) -> StockStatus {
    let warning_level = minimum_required
        .checked_mul(warning_multiplier)
        .unwrap_or(Decimal::MAX);

    if current_stock < minimum_required {
        StockStatus::Low
    } else if current_stock < warning_level {
        StockStatus::Warning
    } else {
        StockStatus::Normal
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StockThresholds {
    pub warning_multiplier: Decimal,
}

impl Default for StockThresholds {
    fn default() -> Self {
        Self {
            warning_multiplier: DEFAULT_WARNING_MULTIPLIER,
        }
    }
}

impl StockThresholds {
    pub fn new(warning_multiplier: Decimal) -> Self {
        Self { warning_multiplier }
    }

    /// Falls back to the default multiplier when `value` is not representable.
    pub fn from_f64(value: f64) -> Self {
        numeric::from_f64(value)
            .map(Self::new)
            .unwrap_or_default()
    }

    pub fn classify(&self, current_stock: Decimal, minimum_required: Decimal) -> StockStatus {
        classify_stock(current_stock, minimum_required, self.warning_multiplier)
    }
}

/// Tally of classified items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StockCounts {
    pub low: usize,
    pub warning: usize,
    pub normal: usize,
}

impl StockCounts {
    pub fn record(&mut self, status: StockStatus) {
        match status {
            StockStatus::Low => self.low += 1,
            StockStatus::Warning => self.warning += 1,
            StockStatus::Normal => self.normal += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.low + self.warning + self.normal
    }
}

impl FromIterator<StockStatus> for StockCounts {
    fn from_iter<I: IntoIterator<Item = StockStatus>>(iter: I) -> Self {
        let mut counts = Self::default();
        for status in iter {
            counts.record(status);
        }
        counts
    }
}
