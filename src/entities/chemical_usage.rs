use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chemical_usage")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub date: NaiveDate,
    pub chemical_id: i32,
    pub amount_used: Decimal,
    /// e.g. `Leaching`, `pH Control`.
    pub process: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::chemical_inventory::Entity",
        from = "Column::ChemicalId",
        to = "super::chemical_inventory::Column::Id"
    )]
    Chemical,
}

impl Related<super::chemical_inventory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Chemical.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
