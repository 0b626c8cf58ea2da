//! Migration to create the absences table.
//!
//! Absence records for a (tenant, company, date) window. Rows in a synced
//! window are replaced wholesale, so there is no natural-key unique index.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Absences::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Absences::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Absences::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Absences::CompanyId).uuid().not_null())
                    .col(
                        ColumnDef::new(Absences::EmployeeRegistration)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Absences::Date).date().not_null())
                    .col(ColumnDef::new(Absences::AbsenceType).text().null())
                    .col(ColumnDef::new(Absences::Hours).double().null())
                    .col(
                        ColumnDef::new(Absences::Justified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Absences::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_absences_tenant_id")
                            .from(Absences::Table, Absences::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_absences_company_id")
                            .from(Absences::Table, Absences::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Range replace and window counts both filter on (tenant, company, date)
        manager
            .create_index(
                Index::create()
                    .name("idx_absences_tenant_company_date")
                    .table(Absences::Table)
                    .col(Absences::TenantId)
                    .col(Absences::CompanyId)
                    .col(Absences::Date)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_absences_tenant_company_date")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Absences::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Absences {
    Table,
    Id,
    TenantId,
    CompanyId,
    EmployeeRegistration,
    Date,
    AbsenceType,
    Hours,
    Justified,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Tenants {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Companies {
    Table,
    Id,
}
