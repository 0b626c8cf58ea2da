//! Migration to create the provider_configs table.
//!
//! Per-tenant credentials and filters for the external HR provider. A tenant
//! has at most one configuration row.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProviderConfigs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProviderConfigs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProviderConfigs::TenantId).uuid().not_null())
                    .col(ColumnDef::new(ProviderConfigs::ApiToken).text().not_null())
                    .col(ColumnDef::new(ProviderConfigs::BaseUrl).text().null())
                    .col(
                        ColumnDef::new(ProviderConfigs::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ProviderConfigs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ProviderConfigs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_provider_configs_tenant_id")
                            .from(ProviderConfigs::Table, ProviderConfigs::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_provider_configs_tenant_unique")
                    .table(ProviderConfigs::Table)
                    .col(ProviderConfigs::TenantId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_provider_configs_tenant_unique")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(ProviderConfigs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ProviderConfigs {
    Table,
    Id,
    TenantId,
    ApiToken,
    BaseUrl,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tenants {
    Table,
    Id,
}
