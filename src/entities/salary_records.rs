use sea_orm::entity::prelude::*;

/// Deliberately unrelated to `employees`: salary history outlives the
/// employee record it was computed for.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "salary_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub employee_id: String,
    pub employee_name: String,
    pub payout_month: String,
    pub basic_salary: f64,
    pub manual_work_days: Option<f64>,
    pub standard_salary: f64,
    pub leave_deduction: f64,
    pub sales_amount: f64,
    pub bonus_rate: f64,
    pub bonus_amount: f64,
    pub attendance_bonus: f64,
    pub total_salary: f64,
    pub updated_at: i64,
    pub synced: bool,
    pub version: i64,
    pub local_updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
