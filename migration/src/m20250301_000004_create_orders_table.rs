use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `orders` table and its columns.
///
/// An order holds its own copy of the tier's terms and has no reference back
/// to `offer_details`.
#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    CustomerUserId,
    BusinessUserId,
    Title,
    Revisions,
    DeliveryTimeInDays,
    Price,
    Features,
    OfferType,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Orders::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Orders::CustomerUserId).uuid().null())
                    .col(ColumnDef::new(Orders::BusinessUserId).uuid().null())
                    .col(ColumnDef::new(Orders::Title).string_len(30).not_null())
                    .col(ColumnDef::new(Orders::Revisions).integer().not_null())
                    .col(
                        ColumnDef::new(Orders::DeliveryTimeInDays)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Orders::Price).big_integer().not_null())
                    .col(ColumnDef::new(Orders::Features).json_binary().not_null())
                    .col(ColumnDef::new(Orders::OfferType).string().not_null())
                    .col(
                        ColumnDef::new(Orders::Status)
                            .string()
                            .not_null()
                            .default("in_progress"),
                    )
                    .col(
                        ColumnDef::new(Orders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Orders::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    // Orders outlive the accounts that placed or fulfilled them.
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_customer_user_id")
                            .from(Orders::Table, Orders::CustomerUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_business_user_id")
                            .from(Orders::Table, Orders::BusinessUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await
    }
}
