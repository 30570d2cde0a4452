use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::prelude::*;
use serde::{Deserialize, Serialize};

/// Site-wide energy consumption, one row per day.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "energy_usage")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub date: NaiveDate,
    pub electricity_kwh: Decimal,
    pub electricity_cost: Decimal,
    pub diesel_liters: Decimal,
    pub diesel_cost: Decimal,
    pub total_cost: Decimal,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
