//! Absence entity model.
//!
//! Absence records for a (tenant, company, date) window. A sync run replaces
//! every row in its requested window, so rows carry no provider-side natural
//! key.

use super::company::Entity as Company;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "absences")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Tenant identifier for multi-tenancy
    pub tenant_id: Uuid,

    /// Company the absence was reported under
    pub company_id: Uuid,

    /// Registration number of the absent employee
    pub employee_registration: String,

    pub date: Date,

    pub absence_type: Option<String>,

    pub hours: Option<f64>,

    pub justified: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Company",
        from = "Column::CompanyId",
        to = "super::company::Column::Id"
    )]
    Company,
}

impl Related<Company> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
