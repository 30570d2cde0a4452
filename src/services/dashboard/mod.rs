//! Dashboard assembly.
//!
//! One sub-module per metric domain. Each fetches the requested period and
//! the equal-length period before it, reduces both with the analytics core
//! and shapes a `{data, summary}` payload. Decimal values are converted to
//! `f64` only when a row or summary is built.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::analytics::{DateRange, StockThresholds};
use crate::entities::mining_department;
use crate::errors::{ServiceError, ServiceResult};
use crate::services::fact_store::FactStore;

/// Declares a metric enum and its `Metric` implementation in one go.
macro_rules! metric_set {
    ($(#[$meta:meta])* $vis:vis enum $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis enum $name {
            $($variant),+
        }

        impl $crate::analytics::Metric for $name {
            fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }

            fn all() -> &'static [Self] {
                &[$(Self::$variant),+]
            }
        }
    };
}

pub mod chemicals;
pub mod energy;
pub mod environmental;
pub mod equipment;
pub mod explosives;
pub mod labor;
pub mod overview;
pub mod production;
pub mod safety;

pub use chemicals::{ChemicalRow, ChemicalSummary, ChemicalsDashboard};
pub use energy::{EnergyDashboard, EnergyMetric, EnergyRow, EnergySummary};
pub use environmental::{EnvironmentalDashboard, EnvironmentalRow, EnvironmentalSummary};
pub use equipment::{EquipmentDashboard, EquipmentSummary, MachineRow, MachineStatus};
pub use explosives::{ExplosivesDashboard, ExplosivesSummary};
pub use labor::{DepartmentLabor, LaborDashboard, LaborSummary};
pub use overview::{Overview, PeriodInfo};
pub use production::{ProductionDashboard, ProductionMetric, ProductionRow, ProductionSummary};
pub use safety::{SafetyDashboard, SafetySummary, Severity};

/// Label used for rows with no department.
pub const UNASSIGNED: &str = "Unassigned";

/// Metric domains with a dashboard.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Domain {
    Energy,
    Production,
    Chemicals,
    Explosives,
    Labor,
    Environmental,
    Equipment,
    Safety,
}

impl Domain {
    pub fn all() -> Vec<Domain> {
        Domain::iter().collect()
    }
}

/// Optional narrowing applied by the domains that support it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardFilters {
    /// Department name, matched case-insensitively (labor, safety).
    pub department: Option<String>,
    /// Machine id (equipment).
    pub equipment_id: Option<i32>,
}

/// Tunables the assemblers read; built from `AppConfig`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashboardSettings {
    pub stock_thresholds: StockThresholds,
    pub chemical_thresholds: StockThresholds,
    pub default_window_days: u32,
    /// Tonnes crushed per day.
    pub daily_production_target: Decimal,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            stock_thresholds: StockThresholds::default(),
            chemical_thresholds: StockThresholds::default(),
            default_window_days: 30,
            daily_production_target: dec!(200),
        }
    }
}

/// Per-record rows for charts plus the period summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard<R, S> {
    pub data: Vec<R>,
    pub summary: S,
}

/// Any domain's dashboard, serialized without a wrapper.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DomainDashboard {
    Energy(EnergyDashboard),
    Production(ProductionDashboard),
    Chemicals(ChemicalsDashboard),
    Explosives(ExplosivesDashboard),
    Labor(LaborDashboard),
    Environmental(EnvironmentalDashboard),
    Equipment(EquipmentDashboard),
    Safety(SafetyDashboard),
}

#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn FactStore>,
    settings: DashboardSettings,
}

impl DashboardService {
    pub fn new(store: Arc<dyn FactStore>, settings: DashboardSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    /// Range from raw `from_date` / `to_date` parameters, defaulting to the
    /// configured window ending on `today`.
    pub fn resolve_range(
        &self,
        from: Option<&str>,
        to: Option<&str>,
        today: NaiveDate,
    ) -> ServiceResult<DateRange> {
        Ok(DateRange::resolve(from, to, today, self.settings.default_window_days)?)
    }

    pub async fn assemble_dashboard(
        &self,
        domain: Domain,
        range: DateRange,
        filters: &DashboardFilters,
    ) -> ServiceResult<DomainDashboard> {
        info!(
            domain = %domain,
            from = %range.from(),
            to = %range.to(),
            "Assembling dashboard"
        );

        let dashboard = match domain {
            Domain::Energy => DomainDashboard::Energy(self.energy(range).await?),
            Domain::Production => DomainDashboard::Production(self.production(range).await?),
            Domain::Chemicals => DomainDashboard::Chemicals(self.chemicals(range).await?),
            Domain::Explosives => DomainDashboard::Explosives(self.explosives(range).await?),
            Domain::Labor => {
                DomainDashboard::Labor(self.labor(range, filters.department.as_deref()).await?)
            }
            Domain::Environmental => {
                DomainDashboard::Environmental(self.environmental(range).await?)
            }
            Domain::Equipment => {
                DomainDashboard::Equipment(self.equipment(range, filters.equipment_id).await?)
            }
            Domain::Safety => {
                DomainDashboard::Safety(self.safety(range, filters.department.as_deref()).await?)
            }
        };

        Ok(dashboard)
    }

    /// Looks up a department by name; `Ok(None)` when no filter was given.
    async fn resolve_department(
        &self,
        name: Option<&str>,
    ) -> ServiceResult<Option<mining_department::Model>> {
        let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
            return Ok(None);
        };

        let department = self
            .store
            .departments()
            .await?
            .into_iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                ServiceError::NotConfigured(format!("department '{}' is not configured", name))
            })?;

        debug!(department = %department.name, id = department.id, "Filtering by department");
        Ok(Some(department))
    }

    async fn department_names(&self) -> ServiceResult<BTreeMap<i32, String>> {
        Ok(self
            .store
            .departments()
            .await?
            .into_iter()
            .map(|d| (d.id, d.name))
            .collect())
    }
}

fn department_label(names: &BTreeMap<i32, String>, id: Option<i32>) -> String {
    id.and_then(|id| names.get(&id).cloned())
        .unwrap_or_else(|| UNASSIGNED.to_string())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::entities::mining_department;
    use chrono::NaiveDate;

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn department(id: i32, name: &str) -> mining_department::Model {
        mining_department::Model {
            id,
            name: name.to_string(),
            department_type: "extraction".to_string(),
        }
    }
}
