//! ProviderConfig entity model.
//!
//! Per-tenant credentials and filters for the external HR provider. A
//! synchronizer resolves this row before making any outbound call; a missing
//! or inactive row fails the job up front.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "provider_configs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning tenant; unique, a tenant has at most one configuration
    pub tenant_id: Uuid,

    /// API token used to authenticate against the external HR provider
    pub api_token: String,

    /// Optional per-tenant override of the provider base URL
    pub base_url: Option<String>,

    /// Whether this configuration may be used for sync runs
    pub active: bool,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
