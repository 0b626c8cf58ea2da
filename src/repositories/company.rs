//! # Company Repository
//!
//! Tenant-scoped persistence for companies mirrored from the provider.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use uuid::Uuid;

use crate::models::company::{ActiveModel, Column, Entity, Model};
use crate::provider::CompanyRecord;

/// Counters returned by an upsert pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertCounts {
    pub inserted: u64,
    pub updated: u64,
}

/// Repository for company database operations
pub struct CompanyRepository {
    db: DatabaseConnection,
}

impl CompanyRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Upsert provider records by (tenant_id, code).
    ///
    /// Existing rows keep their id, so employees and absences referencing the
    /// company stay attached across syncs.
    pub async fn upsert_all(
        &self,
        tenant_id: Uuid,
        records: &[CompanyRecord],
    ) -> Result<UpsertCounts, DbErr> {
        let now = Utc::now().fixed_offset();
        let mut counts = UpsertCounts::default();

        for record in records {
            let existing = Entity::find()
                .filter(Column::TenantId.eq(tenant_id))
                .filter(Column::Code.eq(&record.code))
                .one(&self.db)
                .await?;

            match existing {
                Some(model) => {
                    let mut active_model: ActiveModel = model.into();
                    active_model.name = Set(record.name.clone());
                    active_model.active = Set(record.active);
                    active_model.updated_at = Set(now);
                    active_model.update(&self.db).await?;
                    counts.updated += 1;
                }
                None => {
                    ActiveModel {
                        id: Set(Uuid::new_v4()),
                        tenant_id: Set(tenant_id),
                        code: Set(record.code.clone()),
                        name: Set(record.name.clone()),
                        active: Set(record.active),
                        created_at: Set(now),
                        updated_at: Set(now),
                    }
                    .insert(&self.db)
                    .await?;
                    counts.inserted += 1;
                }
            }
        }

        Ok(counts)
    }

    /// List active companies for a tenant, ordered by code.
    pub async fn list_active(&self, tenant_id: Uuid) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::TenantId.eq(tenant_id))
            .filter(Column::Active.eq(true))
            .order_by_asc(Column::Code)
            .all(&self.db)
            .await
    }

    /// Find one company by its provider code.
    pub async fn find_by_code(
        &self,
        tenant_id: Uuid,
        code: &str,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::TenantId.eq(tenant_id))
            .filter(Column::Code.eq(code))
            .one(&self.db)
            .await
    }
}
