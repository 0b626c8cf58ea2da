//! # ProviderConfig Repository
//!
//! Resolves per-tenant provider credentials.

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::models::provider_config::{Column, Entity, Model};
use crate::provider::ProviderCredentials;

/// Repository for provider configuration lookups
pub struct ProviderConfigRepository {
    db: DatabaseConnection,
}

impl ProviderConfigRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Find the tenant's active provider configuration, if any.
    pub async fn find_active_by_tenant(&self, tenant_id: Uuid) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::TenantId.eq(tenant_id))
            .filter(Column::Active.eq(true))
            .one(&self.db)
            .await
    }
}

impl Model {
    /// Credentials for outbound provider calls.
    pub fn credentials(&self) -> ProviderCredentials {
        ProviderCredentials {
            api_token: self.api_token.clone(),
            base_url: self.base_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{provider_config, tenant};
    use chrono::Utc;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ActiveModelTrait, Database, Set};

    async fn setup() -> (DatabaseConnection, Uuid) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let tenant_id = Uuid::new_v4();
        tenant::ActiveModel {
            id: Set(tenant_id),
            name: Set(None),
            created_at: Set(Utc::now().fixed_offset()),
        }
        .insert(&db)
        .await
        .unwrap();

        (db, tenant_id)
    }

    #[tokio::test]
    async fn inactive_config_is_not_returned() {
        let (db, tenant_id) = setup().await;
        let now = Utc::now().fixed_offset();

        provider_config::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            api_token: Set("tok".to_string()),
            base_url: Set(None),
            active: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&db)
        .await
        .unwrap();

        let repo = ProviderConfigRepository::new(db);
        assert!(repo.find_active_by_tenant(tenant_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn credentials_carry_base_url_override() {
        let (db, tenant_id) = setup().await;
        let now = Utc::now().fixed_offset();

        provider_config::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            api_token: Set("secret".to_string()),
            base_url: Set(Some("https://tenant.example.com".to_string())),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&db)
        .await
        .unwrap();

        let repo = ProviderConfigRepository::new(db);
        let config = repo
            .find_active_by_tenant(tenant_id)
            .await
            .unwrap()
            .unwrap();
        let credentials = config.credentials();
        assert_eq!(credentials.api_token, "secret");
        assert_eq!(
            credentials.base_url.as_deref(),
            Some("https://tenant.example.com")
        );
    }
}
