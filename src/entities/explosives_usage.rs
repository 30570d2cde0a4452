use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "explosives_usage")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub date: NaiveDate,
    pub explosive_id: i32,
    pub amount_used: Decimal,
    pub blast_location: String,
    pub blast_purpose: String,
    /// 0.0 to 10.0, recorded after the blast is assessed.
    pub effectiveness_rating: Option<Decimal>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::explosives_inventory::Entity",
        from = "Column::ExplosiveId",
        to = "super::explosives_inventory::Column::Id"
    )]
    Explosive,
}

impl Related<super::explosives_inventory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Explosive.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
