use crate::entities::prelude::*;
use crate::entities::{search_history, search_log};
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(SearchHistory)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(SearchLog)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // One current row per term per user
        manager
            .create_index(
                Index::create()
                    .name("idx_search_history_user_hash_unique")
                    .table(SearchHistory)
                    .col(search_history::Column::UserId)
                    .col(search_history::Column::QueryHash)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_search_history_user_created_at")
                    .table(SearchHistory)
                    .col(search_history::Column::UserId)
                    .col(search_history::Column::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_search_log_user_created_at")
                    .table(SearchLog)
                    .col(search_log::Column::UserId)
                    .col(search_log::Column::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SearchLog).if_exists().to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(SearchHistory).if_exists().to_owned())
            .await
    }
}
