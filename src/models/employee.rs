//! Employee entity model.
//!
//! Employees mirrored from the external HR provider. The registration number
//! is the natural key; upserts match on (tenant_id, registration_number).

use super::company::Entity as Company;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Tenant identifier for multi-tenancy
    pub tenant_id: Uuid,

    /// Company this employee belongs to
    pub company_id: Uuid,

    /// Registration number assigned by the external provider
    pub registration_number: String,

    pub name: String,

    pub position: Option<String>,

    /// Admission date as reported by the provider; unparseable dates arrive
    /// as None rather than failing the record
    pub admission_date: Option<Date>,

    pub active: bool,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
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
