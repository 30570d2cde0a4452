use chrono::NaiveDate;
use sea_orm::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "equipment_status_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub machinery_id: i32,
    pub date: NaiveDate,
    pub status: String,
    pub notes: Option<String>,
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
