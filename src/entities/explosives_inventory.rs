use rust_decimal::Decimal;
use sea_orm::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "explosives_inventory")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    /// `Primary`, `Secondary`, `Detonator`, `Booster` or `Other`.
    pub explosive_type: String,
    pub current_stock: Decimal,
    pub minimum_required: Decimal,
    pub unit: String,
    pub unit_price: Decimal,
    pub storage_location: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
