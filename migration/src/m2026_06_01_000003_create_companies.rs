//! Migration to create the companies table.
//!
//! Companies mirrored from the external HR provider, keyed by the provider's
//! company code and unique per tenant.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Companies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Companies::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Companies::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Companies::Code).text().not_null())
                    .col(ColumnDef::new(Companies::Name).text().not_null())
                    .col(
                        ColumnDef::new(Companies::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Companies::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Companies::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_companies_tenant_id")
                            .from(Companies::Table, Companies::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Upsert target: one row per provider company code within a tenant
        manager
            .create_index(
                Index::create()
                    .name("idx_companies_tenant_code_unique")
                    .table(Companies::Table)
                    .col(Companies::TenantId)
                    .col(Companies::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_companies_tenant_active")
                    .table(Companies::Table)
                    .col(Companies::TenantId)
                    .col(Companies::Active)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_companies_tenant_active").to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_companies_tenant_code_unique")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Companies::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Companies {
    Table,
    Id,
    TenantId,
    Code,
    Name,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tenants {
    Table,
    Id,
}
