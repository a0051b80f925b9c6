use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub job_title: String,
    pub gender: String,
    pub join_date: String,
    pub probation_salary: f64,
    pub full_salary: f64,
    pub probation_months: i32,
    pub password_hash: String,
    pub first_login: bool,
    pub synced: bool,
    pub version: i64,
    pub local_updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::leave_requests::Entity")]
    LeaveRequests,
}

impl Related<super::leave_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LeaveRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
