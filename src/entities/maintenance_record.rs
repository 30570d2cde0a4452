use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "maintenance_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub machinery_id: i32,
    pub date: NaiveDate,
    pub maintenance_type: String,
    pub description: String,
    pub cost: Decimal,
    pub duration_hours: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::machinery::Entity",
        from = "Column::MachineryId",
        to = "super::machinery::Column::Id"
    )]
    Machinery,
}

impl Related<super::machinery::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Machinery.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
