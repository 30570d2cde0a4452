use chrono::NaiveDate;
use sea_orm::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "safety_incidents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub date: NaiveDate,
    pub incident_type: String,
    /// `Low`, `Medium` or `High`; older rows may be lower case.
    pub severity: String,
    pub description: String,
    pub action_taken: Option<String>,
    pub resolved: bool,
    pub department_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::mining_department::Entity",
        from = "Column::DepartmentId",
        to = "super::mining_department::Column::Id"
    )]
    Department,
}

impl Related<super::mining_department::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
