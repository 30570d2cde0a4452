/*!
 * # Fact Store
 *
 * Read access to the dated fact tables and the reference tables the
 * dashboards join against. The dashboards only ever read; rows are written
 * by data entry or the seed tool.
 */

use async_trait::async_trait;
use chrono::NaiveDate;
use metrics::histogram;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

use crate::analytics::DateRange;
use crate::entities::{
    chemical_inventory, chemical_usage, daily_production_log, energy_usage, environmental_metric,
    equipment_status_log, explosives_inventory, explosives_usage, labor_metric, machinery,
    maintenance_record, mining_department, mining_site, safety_incident,
};
use crate::errors::{ServiceError, ServiceResult};

/// Range fetches return rows dated inside the inclusive range, ordered by
/// date then id. Reference lookups are ordered by id.
#[async_trait]
pub trait FactStore: Send + Sync {
    async fn energy_usage(&self, range: DateRange) -> ServiceResult<Vec<energy_usage::Model>>;
    async fn production_logs(&self, range: DateRange) -> ServiceResult<Vec<daily_production_log::Model>>;
    async fn chemical_usage(&self, range: DateRange) -> ServiceResult<Vec<chemical_usage::Model>>;
    async fn explosives_usage(&self, range: DateRange) -> ServiceResult<Vec<explosives_usage::Model>>;
    async fn labor_metrics(&self, range: DateRange) -> ServiceResult<Vec<labor_metric::Model>>;
    async fn environmental_metrics(
        &self,
        range: DateRange,
    ) -> ServiceResult<Vec<environmental_metric::Model>>;
    async fn maintenance_records(&self, range: DateRange) -> ServiceResult<Vec<maintenance_record::Model>>;
    async fn status_logs(&self, range: DateRange) -> ServiceResult<Vec<equipment_status_log::Model>>;
    async fn safety_incidents(&self, range: DateRange) -> ServiceResult<Vec<safety_incident::Model>>;

    async fn chemical_inventory(&self) -> ServiceResult<Vec<chemical_inventory::Model>>;
    async fn explosives_inventory(&self) -> ServiceResult<Vec<explosives_inventory::Model>>;
    async fn machinery(&self) -> ServiceResult<Vec<machinery::Model>>;
    async fn departments(&self) -> ServiceResult<Vec<mining_department::Model>>;
    async fn mining_sites(&self) -> ServiceResult<Vec<mining_site::Model>>;
}

/// Fact store backed by the application database.
#[derive(Clone)]
pub struct SeaOrmFactStore {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmFactStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn fetch_range<E>(
        &self,
        table: &'static str,
        date: E::Column,
        id: E::Column,
        range: DateRange,
    ) -> ServiceResult<Vec<E::Model>>
    where
        E: EntityTrait,
    {
        let start = Instant::now();

        let rows = E::find()
            .filter(date.between(range.from(), range.to()))
            .order_by_asc(date)
            .order_by_asc(id)
            .all(&*self.db)
            .await
            .map_err(|e| {
                error!(table, error = %e, "Fact query failed");
                ServiceError::DatabaseError(e)
            })?;

        histogram!("mymine_fact_store.query_duration", start.elapsed(), "table" => table);
        debug!(table, from = %range.from(), to = %range.to(), rows = rows.len(), "Fetched fact rows");

        Ok(rows)
    }

    async fn fetch_all<E>(&self, table: &'static str, id: E::Column) -> ServiceResult<Vec<E::Model>>
    where
        E: EntityTrait,
    {
        E::find().order_by_asc(id).all(&*self.db).await.map_err(|e| {
            error!(table, error = %e, "Reference query failed");
            ServiceError::DatabaseError(e)
        })
    }
}

#[async_trait]
impl FactStore for SeaOrmFactStore {
    async fn energy_usage(&self, range: DateRange) -> ServiceResult<Vec<energy_usage::Model>> {
        self.fetch_range::<energy_usage::Entity>(
            "energy_usage",
            energy_usage::Column::Date,
            energy_usage::Column::Id,
            range,
        )
        .await
    }

    async fn production_logs(&self, range: DateRange) -> ServiceResult<Vec<daily_production_log::Model>> {
        self.fetch_range::<daily_production_log::Entity>(
            "daily_production_logs",
            daily_production_log::Column::Date,
            daily_production_log::Column::Id,
            range,
        )
        .await
    }

    async fn chemical_usage(&self, range: DateRange) -> ServiceResult<Vec<chemical_usage::Model>> {
        self.fetch_range::<chemical_usage::Entity>(
            "chemical_usage",
            chemical_usage::Column::Date,
            chemical_usage::Column::Id,
            range,
        )
        .await
    }

    async fn explosives_usage(&self, range: DateRange) -> ServiceResult<Vec<explosives_usage::Model>> {
        self.fetch_range::<explosives_usage::Entity>(
            "explosives_usage",
            explosives_usage::Column::Date,
            explosives_usage::Column::Id,
            range,
        )
        .await
    }

    async fn labor_metrics(&self, range: DateRange) -> ServiceResult<Vec<labor_metric::Model>> {
        self.fetch_range::<labor_metric::Entity>(
            "labor_metrics",
            labor_metric::Column::Date,
            labor_metric::Column::Id,
            range,
        )
        .await
    }

    async fn environmental_metrics(
        &self,
        range: DateRange,
    ) -> ServiceResult<Vec<environmental_metric::Model>> {
        self.fetch_range::<environmental_metric::Entity>(
            "environmental_metrics",
            environmental_metric::Column::Date,
            environmental_metric::Column::Id,
            range,
        )
        .await
    }

    async fn maintenance_records(&self, range: DateRange) -> ServiceResult<Vec<maintenance_record::Model>> {
        self.fetch_range::<maintenance_record::Entity>(
            "maintenance_records",
            maintenance_record::Column::Date,
            maintenance_record::Column::Id,
            range,
        )
        .await
    }

    async fn status_logs(&self, range: DateRange) -> ServiceResult<Vec<equipment_status_log::Model>> {
        self.fetch_range::<equipment_status_log::Entity>(
            "equipment_status_logs",
            equipment_status_log::Column::Date,
            equipment_status_log::Column::Id,
            range,
        )
        .await
    }

    async fn safety_incidents(&self, range: DateRange) -> ServiceResult<Vec<safety_incident::Model>> {
        self.fetch_range::<safety_incident::Entity>(
            "safety_incidents",
            safety_incident::Column::Date,
            safety_incident::Column::Id,
            range,
        )
        .await
    }

    async fn chemical_inventory(&self) -> ServiceResult<Vec<chemical_inventory::Model>> {
        self.fetch_all::<chemical_inventory::Entity>("chemical_inventory", chemical_inventory::Column::Id)
            .await
    }

    async fn explosives_inventory(&self) -> ServiceResult<Vec<explosives_inventory::Model>> {
        self.fetch_all::<explosives_inventory::Entity>(
            "explosives_inventory",
            explosives_inventory::Column::Id,
        )
        .await
    }

    async fn machinery(&self) -> ServiceResult<Vec<machinery::Model>> {
        self.fetch_all::<machinery::Entity>("machinery", machinery::Column::Id)
            .await
    }

    async fn departments(&self) -> ServiceResult<Vec<mining_department::Model>> {
        self.fetch_all::<mining_department::Entity>("mining_departments", mining_department::Column::Id)
            .await
    }

    async fn mining_sites(&self) -> ServiceResult<Vec<mining_site::Model>> {
        self.fetch_all::<mining_site::Entity>("mining_sites", mining_site::Column::Id)
            .await
    }
}

/// Vector-backed fact store for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFactStore {
    pub energy_usage: Vec<energy_usage::Model>,
    pub production_logs: Vec<daily_production_log::Model>,
    pub chemical_usage: Vec<chemical_usage::Model>,
    pub explosives_usage: Vec<explosives_usage::Model>,
    pub labor_metrics: Vec<labor_metric::Model>,
    pub environmental_metrics: Vec<environmental_metric::Model>,
    pub maintenance_records: Vec<maintenance_record::Model>,
    pub status_logs: Vec<equipment_status_log::Model>,
    pub safety_incidents: Vec<safety_incident::Model>,
    pub chemical_inventory: Vec<chemical_inventory::Model>,
    pub explosives_inventory: Vec<explosives_inventory::Model>,
    pub machinery: Vec<machinery::Model>,
    pub departments: Vec<mining_department::Model>,
    pub mining_sites: Vec<mining_site::Model>,
}

impl InMemoryFactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn within<T, D, I>(rows: &[T], range: DateRange, date: D, id: I) -> Vec<T>
where
    T: Clone,
    D: Fn(&T) -> NaiveDate,
    I: Fn(&T) -> i32,
{
    let mut selected: Vec<T> = rows
        .iter()
        .filter(|row| range.contains(date(row)))
        .cloned()
        .collect();
    selected.sort_by_key(|row| (date(row), id(row)));
    selected
}

fn by_id<T, I>(rows: &[T], id: I) -> Vec<T>
where
    T: Clone,
    I: Fn(&T) -> i32,
{
    let mut all = rows.to_vec();
    all.sort_by_key(|row| id(row));
    all
}

#[async_trait]
impl FactStore for InMemoryFactStore {
    async fn energy_usage(&self, range: DateRange) -> ServiceResult<Vec<energy_usage::Model>> {
        Ok(within(&self.energy_usage, range, |r| r.date, |r| r.id))
    }

    async fn production_logs(&self, range: DateRange) -> ServiceResult<Vec<daily_production_log::Model>> {
        Ok(within(&self.production_logs, range, |r| r.date, |r| r.id))
    }

    async fn chemical_usage(&self, range: DateRange) -> ServiceResult<Vec<chemical_usage::Model>> {
        Ok(within(&self.chemical_usage, range, |r| r.date, |r| r.id))
    }

    async fn explosives_usage(&self, range: DateRange) -> ServiceResult<Vec<explosives_usage::Model>> {
        Ok(within(&self.explosives_usage, range, |r| r.date, |r| r.id))
    }

    async fn labor_metrics(&self, range: DateRange) -> ServiceResult<Vec<labor_metric::Model>> {
        Ok(within(&self.labor_metrics, range, |r| r.date, |r| r.id))
    }

    async fn environmental_metrics(
        &self,
        range: DateRange,
    ) -> ServiceResult<Vec<environmental_metric::Model>> {
        Ok(within(&self.environmental_metrics, range, |r| r.date, |r| r.id))
    }

    async fn maintenance_records(&self, range: DateRange) -> ServiceResult<Vec<maintenance_record::Model>> {
        Ok(within(&self.maintenance_records, range, |r| r.date, |r| r.id))
    }

    async fn status_logs(&self, range: DateRange) -> ServiceResult<Vec<equipment_status_log::Model>> {
        Ok(within(&self.status_logs, range, |r| r.date, |r| r.id))
    }

    async fn safety_incidents(&self, range: DateRange) -> ServiceResult<Vec<safety_incident::Model>> {
        Ok(within(&self.safety_incidents, range, |r| r.date, |r| r.id))
    }

    async fn chemical_inventory(&self) -> ServiceResult<Vec<chemical_inventory::Model>> {
        Ok(by_id(&self.chemical_inventory, |r| r.id))
    }

    async fn explosives_inventory(&self) -> ServiceResult<Vec<explosives_inventory::Model>> {
        Ok(by_id(&self.explosives_inventory, |r| r.id))
    }

    async fn machinery(&self) -> ServiceResult<Vec<machinery::Model>> {
        Ok(by_id(&self.machinery, |r| r.id))
    }

    async fn departments(&self) -> ServiceResult<Vec<mining_department::Model>> {
        Ok(by_id(&self.departments, |r| r.id))
    }

    async fn mining_sites(&self) -> ServiceResult<Vec<mining_site::Model>> {
        Ok(by_id(&self.mining_sites, |r| r.id))
    }
}
