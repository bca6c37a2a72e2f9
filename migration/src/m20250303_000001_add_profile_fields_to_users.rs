use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Users {
    Table,
    FirstName,
    LastName,
    Location,
    Tel,
    Description,
    WorkingHours,
    File,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Existing accounts start with an empty profile.
        manager
            .alter_table(
                Table::alter()
                    .table(Users::Table)
                    .add_column(ColumnDef::new(Users::FirstName).string().not_null().default(""))
                    .add_column(ColumnDef::new(Users::LastName).string().not_null().default(""))
                    .add_column(ColumnDef::new(Users::Location).string().not_null().default(""))
                    .add_column(ColumnDef::new(Users::Tel).string().not_null().default(""))
                    .add_column(
                        ColumnDef::new(Users::Description)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .add_column(
                        ColumnDef::new(Users::WorkingHours)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .add_column(ColumnDef::new(Users::File).string().null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Users::Table)
                    .drop_column(Users::FirstName)
                    .drop_column(Users::LastName)
                    .drop_column(Users::Location)
                    .drop_column(Users::Tel)
                    .drop_column(Users::Description)
                    .drop_column(Users::WorkingHours)
                    .drop_column(Users::File)
                    .to_owned(),
            )
            .await
    }
}
