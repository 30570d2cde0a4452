use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240101_000001_create_fact_tables::Migration)]
    }
}

mod m20240101_000001_create_fact_tables {
    use crate::entities::{
        chemical_inventory, chemical_usage, daily_production_log, energy_usage,
        environmental_metric, equipment_status_log, explosives_inventory, explosives_usage,
        labor_metric, machinery, maintenance_record, mining_department, mining_site,
        safety_incident,
    };
    use sea_orm_migration::prelude::*;
    use sea_orm_migration::sea_orm::{EntityTrait, Schema};

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_fact_tables"
        }
    }

    async fn create_table<E>(manager: &SchemaManager<'_>, schema: &Schema, entity: E) -> Result<(), DbErr>
    where
        E: EntityTrait,
    {
        manager
            .create_table(schema.create_table_from_entity(entity).if_not_exists().to_owned())
            .await
    }

    async fn drop_table<E>(manager: &SchemaManager<'_>, entity: E) -> Result<(), DbErr>
    where
        E: EntityTrait,
    {
        manager
            .drop_table(Table::drop().table(entity).if_exists().to_owned())
            .await
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let schema = Schema::new(manager.get_database_backend());

            // reference tables first, fact tables reference them
            create_table(manager, &schema, mining_site::Entity).await?;
            create_table(manager, &schema, mining_department::Entity).await?;
            create_table(manager, &schema, chemical_inventory::Entity).await?;
            create_table(manager, &schema, explosives_inventory::Entity).await?;
            create_table(manager, &schema, machinery::Entity).await?;

            create_table(manager, &schema, energy_usage::Entity).await?;
            create_table(manager, &schema, daily_production_log::Entity).await?;
            create_table(manager, &schema, chemical_usage::Entity).await?;
            create_table(manager, &schema, explosives_usage::Entity).await?;
            create_table(manager, &schema, labor_metric::Entity).await?;
            create_table(manager, &schema, environmental_metric::Entity).await?;
            create_table(manager, &schema, maintenance_record::Entity).await?;
            create_table(manager, &schema, equipment_status_log::Entity).await?;
            create_table(manager, &schema, safety_incident::Entity).await?;

            // date lookups on tables without a unique date
            manager
                .create_index(
                    Index::create()
                        .name("idx_chemical_usage_date")
                        .table(chemical_usage::Entity)
                        .col(chemical_usage::Column::Date)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
            manager
                .create_index(
                    Index::create()
                        .name("idx_explosives_usage_date")
                        .table(explosives_usage::Entity)
                        .col(explosives_usage::Column::Date)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
            manager
                .create_index(
                    Index::create()
                        .name("idx_labor_metrics_date")
                        .table(labor_metric::Entity)
                        .col(labor_metric::Column::Date)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
            manager
                .create_index(
                    Index::create()
                        .name("idx_maintenance_records_date")
                        .table(maintenance_record::Entity)
                        .col(maintenance_record::Column::Date)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
            manager
                .create_index(
                    Index::create()
                        .name("idx_equipment_status_logs_date")
                        .table(equipment_status_log::Entity)
                        .col(equipment_status_log::Column::Date)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
            manager
                .create_index(
                    Index::create()
                        .name("idx_safety_incidents_date")
                        .table(safety_incident::Entity)
                        .col(safety_incident::Column::Date)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            drop_table(manager, safety_incident::Entity).await?;
            drop_table(manager, equipment_status_log::Entity).await?;
            drop_table(manager, maintenance_record::Entity).await?;
            drop_table(manager, environmental_metric::Entity).await?;
            drop_table(manager, labor_metric::Entity).await?;
            drop_table(manager, explosives_usage::Entity).await?;
            drop_table(manager, chemical_usage::Entity).await?;
            drop_table(manager, daily_production_log::Entity).await?;
            drop_table(manager, energy_usage::Entity).await?;

            drop_table(manager, machinery::Entity).await?;
            drop_table(manager, explosives_inventory::Entity).await?;
            drop_table(manager, chemical_inventory::Entity).await?;
            drop_table(manager, mining_department::Entity).await?;
            drop_table(manager, mining_site::Entity).await
        }
    }
}
