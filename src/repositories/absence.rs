//! # Absence Repository
//!
//! Window-replace persistence for absence records. Absences carry no natural
//! key at the provider, so a sync run deletes everything in its requested
//! window and inserts the fresh payload. Re-running the same job is
//! idempotent.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::models::absence::{ActiveModel, Column, Entity};
use crate::provider::AbsenceRecord;

/// Repository for absence database operations
pub struct AbsenceRepository {
    db: DatabaseConnection,
}

impl AbsenceRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Replace every absence of one company inside the inclusive date window
    /// with the given records. Returns the number of rows inserted.
    ///
    /// Delete and insert run in one transaction so readers never observe a
    /// half-replaced window.
    pub async fn replace_window(
        &self,
        tenant_id: Uuid,
        company_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        records: &[AbsenceRecord],
    ) -> Result<u64, DbErr> {
        let now = Utc::now().fixed_offset();
        let txn = self.db.begin().await?;

        Entity::delete_many()
            .filter(Column::TenantId.eq(tenant_id))
            .filter(Column::CompanyId.eq(company_id))
            .filter(Column::Date.between(start_date, end_date))
            .exec(&txn)
            .await?;

        let mut inserted = 0u64;
        for record in records {
            // Rows outside the requested window are the provider's mistake;
            // dropping them keeps the replace contract exact.
            if record.date < start_date || record.date > end_date {
                tracing::warn!(
                    tenant_id = %tenant_id,
                    company_id = %company_id,
                    date = %record.date,
                    "Provider returned absence outside requested window, skipping"
                );
                continue;
            }

            ActiveModel {
                id: Set(Uuid::new_v4()),
                tenant_id: Set(tenant_id),
                company_id: Set(company_id),
                employee_registration: Set(record.employee_registration.clone()),
                date: Set(record.date),
                absence_type: Set(record.absence_type.clone()),
                hours: Set(record.hours),
                justified: Set(record.justified),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?;
            inserted += 1;
        }

        txn.commit().await?;

        Ok(inserted)
    }

    /// Count absences of one company inside the inclusive date window.
    pub async fn count_in_window(
        &self,
        tenant_id: Uuid,
        company_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<u64, DbErr> {
        Entity::find()
            .filter(Column::TenantId.eq(tenant_id))
            .filter(Column::CompanyId.eq(company_id))
            .filter(Column::Date.between(start_date, end_date))
            .count(&self.db)
            .await
    }
}
