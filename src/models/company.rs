//! Company entity model.
//!
//! Companies mirrored from the external HR provider. The provider's company
//! code is the natural key; upserts match on (tenant_id, code).

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Tenant identifier for multi-tenancy
    pub tenant_id: Uuid,

    /// Opaque company code assigned by the external provider
    pub code: String,

    pub name: String,

    /// Whether the company is active at the provider; inactive companies are
    /// skipped when deriving sync scopes
    pub active: bool,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
