use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Offers {
    Table,
    UserId,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    CustomerUserId,
    BusinessUserId,
}

#[derive(DeriveIden)]
enum Reviews {
    Table,
    ReviewerId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Index on offers.user_id for fetching offers by owner
        manager
            .create_index(
                Index::create()
                    .name("idx_offers_user_id")
                    .table(Offers::Table)
                    .col(Offers::UserId)
                    .to_owned(),
            )
            .await?;

        // Indexes on both order parties for the per-user order list
        manager
            .create_index(
                Index::create()
                    .name("idx_orders_customer_user_id")
                    .table(Orders::Table)
                    .col(Orders::CustomerUserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_business_user_id")
                    .table(Orders::Table)
                    .col(Orders::BusinessUserId)
                    .to_owned(),
            )
            .await?;

        // Index on reviews.reviewer_id; business_user_id is covered by the unique index
        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_reviewer_id")
                    .table(Reviews::Table)
                    .col(Reviews::ReviewerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_offers_user_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_orders_customer_user_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_orders_business_user_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_reviews_reviewer_id").to_owned())
            .await?;

        Ok(())
    }
}
