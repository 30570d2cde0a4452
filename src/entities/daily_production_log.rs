use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::prelude::*;
use serde::{Deserialize, Serialize};

/// Plant throughput and gold output for one day.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "daily_production_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub date: NaiveDate,
    pub total_tonnage_crushed: Decimal,
    pub total_tonnage_hoisted: Decimal,
    pub total_tonnage_milled: Decimal,
    /// Percent.
    pub gold_recovery_rate: Decimal,
    /// Percent.
    pub operational_efficiency: Decimal,
    /// Grams.
    pub smelted_gold: Decimal,
    /// Price per gram.
    pub gold_price: Decimal,
    pub gross_profit: Decimal,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
