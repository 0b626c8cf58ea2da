//! # Employee Repository
//!
//! Tenant-scoped persistence for employees mirrored from the provider.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use super::company::UpsertCounts;
use crate::models::employee::{ActiveModel, Column, Entity, Model};
use crate::provider::EmployeeRecord;

/// Repository for employee database operations
pub struct EmployeeRepository {
    db: DatabaseConnection,
}

impl EmployeeRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Upsert provider records by (tenant_id, registration_number).
    ///
    /// An employee reported under a different company than last time is moved
    /// to the new company rather than duplicated.
    pub async fn upsert_all(
        &self,
        tenant_id: Uuid,
        company_id: Uuid,
        records: &[EmployeeRecord],
    ) -> Result<UpsertCounts, DbErr> {
        let now = Utc::now().fixed_offset();
        let mut counts = UpsertCounts::default();

        for record in records {
            let existing = Entity::find()
                .filter(Column::TenantId.eq(tenant_id))
                .filter(Column::RegistrationNumber.eq(&record.registration_number))
                .one(&self.db)
                .await?;

            match existing {
                Some(model) => {
                    let mut active_model: ActiveModel = model.into();
                    active_model.company_id = Set(company_id);
                    active_model.name = Set(record.name.clone());
                    active_model.position = Set(record.position.clone());
                    active_model.admission_date = Set(record.admission_date);
                    active_model.active = Set(record.active);
                    active_model.updated_at = Set(now);
                    active_model.update(&self.db).await?;
                    counts.updated += 1;
                }
                None => {
                    ActiveModel {
                        id: Set(Uuid::new_v4()),
                        tenant_id: Set(tenant_id),
                        company_id: Set(company_id),
                        registration_number: Set(record.registration_number.clone()),
                        name: Set(record.name.clone()),
                        position: Set(record.position.clone()),
                        admission_date: Set(record.admission_date),
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

    /// Find one employee by registration number.
    pub async fn find_by_registration(
        &self,
        tenant_id: Uuid,
        registration_number: &str,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::TenantId.eq(tenant_id))
            .filter(Column::RegistrationNumber.eq(registration_number))
            .one(&self.db)
            .await
    }
}
