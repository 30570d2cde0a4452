use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use super::{
    ChemicalsDashboard, DashboardService, EnergyDashboard, EnvironmentalDashboard, EquipmentDashboard,
    ExplosivesDashboard, LaborDashboard, ProductionDashboard, SafetyDashboard,
};
use crate::analytics::DateRange;
use crate::errors::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodInfo {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub length_days: i64,
}

impl From<DateRange> for PeriodInfo {
    fn from(range: DateRange) -> Self {
        Self {
            from: range.from(),
            to: range.to(),
            length_days: range.length_days(),
        }
    }
}

/// Every domain for one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub period: PeriodInfo,
    pub energy: EnergyDashboard,
    /// `None` until a mining site exists.
    pub production: Option<ProductionDashboard>,
    pub chemicals: ChemicalsDashboard,
    pub explosives: ExplosivesDashboard,
    pub labor: LaborDashboard,
    pub environmental: EnvironmentalDashboard,
    pub equipment: EquipmentDashboard,
    pub safety: SafetyDashboard,
}

impl DashboardService {
    pub async fn overview(&self, range: DateRange) -> ServiceResult<Overview> {
        info!(from = %range.from(), to = %range.to(), "Assembling overview");

        let production = async {
            match self.production(range).await {
                Ok(dashboard) => Ok(Some(dashboard)),
                Err(ServiceError::NotConfigured(reason)) => {
                    warn!(%reason, "Leaving production out of the overview");
                    Ok(None)
                }
                Err(e) => Err(e),
            }
        };

        let (energy, production, chemicals, explosives, labor, environmental, equipment, safety) = futures::try_join!(
            self.energy(range),
            production,
            self.chemicals(range),
            self.explosives(range),
            self.labor(range, None),
            self.environmental(range),
            self.equipment(range, None),
            self.safety(range, None),
        )?;

        Ok(Overview {
            period: range.into(),
            energy,
            production,
            chemicals,
            explosives,
            labor,
            environmental,
            equipment,
            safety,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{energy_usage, mining_site};
    use crate::services::dashboard::fixtures::date;
    use crate::services::dashboard::DashboardSettings;
    use crate::services::fact_store::InMemoryFactStore;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn energy_store() -> InMemoryFactStore {
        InMemoryFactStore {
            energy_usage: vec![energy_usage::Model {
                id: 1,
                date: date(2024, 9, 1),
                electricity_kwh: dec!(900),
                electricity_cost: dec!(90),
                diesel_liters: dec!(30),
                diesel_cost: dec!(45),
                total_cost: dec!(135),
                notes: None,
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn production_is_omitted_without_a_site() {
        let service = DashboardService::new(Arc::new(energy_store()), DashboardSettings::default());
        let range = DateRange::new(date(2024, 9, 1), date(2024, 9, 3)).unwrap();

        let overview = service.overview(range).await.unwrap();
        assert_eq!(
            overview.period,
            PeriodInfo {
                from: date(2024, 9, 1),
                to: date(2024, 9, 3),
                length_days: 3
            }
        );
        assert!(overview.production.is_none());
        assert_eq!(overview.energy.summary.total_electricity_kwh, 900.0);
        assert_eq!(overview.energy.summary.avg_electricity_kwh, 300.0);
        assert!(overview.safety.data.is_empty());

        let json = serde_json::to_value(&overview).unwrap();
        assert!(json["production"].is_null());
    }

    #[tokio::test]
    async fn production_is_included_with_a_site() {
        let mut store = energy_store();
        store.mining_sites.push(mining_site::Model {
            id: 1,
            name: "North Pit".into(),
            location: "Kadoma".into(),
            area_hectares: dec!(80),
            status: "active".into(),
            estimated_gold_reserves: dec!(3.5),
        });
        let service = DashboardService::new(Arc::new(store), DashboardSettings::default());

        let overview = service
            .overview(DateRange::single_day(date(2024, 9, 1)))
            .await
            .unwrap();
        assert!(overview.production.is_some());
    }
}
