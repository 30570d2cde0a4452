use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::prelude::*;
use serde::{Deserialize, Serialize};

/// Attendance and output of one department for one shift.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "labor_metrics")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub date: NaiveDate,
    /// `MORNING`, `AFTERNOON` or `NIGHT`.
    pub shift: String,
    pub department_id: Option<i32>,
    pub workers_present: i32,
    pub hours_worked: Decimal,
    pub overtime_hours: Decimal,
    pub productivity_index: Decimal,
    pub safety_incidents: i32,
    pub hourly_rate: Decimal,
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
