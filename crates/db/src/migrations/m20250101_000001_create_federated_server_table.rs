//! Create federated server table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FederatedServer::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FederatedServer::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FederatedServer::ServerName)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(FederatedServer::ApplicationType)
                            .string_len(255)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(FederatedServer::ApplicationVersion)
                            .string_len(255)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(FederatedServer::Status)
                            .string_len(32)
                            .not_null()
                            .default("federated"),
                    )
                    .col(ColumnDef::new(FederatedServer::Notes).text().null())
                    .col(
                        ColumnDef::new(FederatedServer::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(FederatedServer::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Sortable columns of the federation settings list
        manager
            .create_index(
                Index::create()
                    .name("idx_federated_server_created_at")
                    .table(FederatedServer::Table)
                    .col(FederatedServer::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_federated_server_application_type")
                    .table(FederatedServer::Table)
                    .col(FederatedServer::ApplicationType)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_federated_server_status")
                    .table(FederatedServer::Table)
                    .col(FederatedServer::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FederatedServer::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum FederatedServer {
    Table,
    Id,
    ServerName,
    ApplicationType,
    ApplicationVersion,
    Status,
    Notes,
    CreatedAt,
    UpdatedAt,
}
