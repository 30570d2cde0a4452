use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "environmental_metrics")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub date: NaiveDate,
    /// µg/m³
    pub dust_level_pm10: Decimal,
    pub noise_level_db: Decimal,
    pub water_usage_m3: Decimal,
    pub waste_water_ph: Decimal,
    /// Cumulative, so the latest value is the largest.
    pub rehabilitation_area_m2: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
