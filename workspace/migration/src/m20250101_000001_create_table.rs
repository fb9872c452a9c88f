use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_uuid(Users::Id))
                    .col(string_len(Users::Email, 255).unique_key())
                    .col(string_len(Users::PasswordHash, 255))
                    .col(string_len(Users::Role, 20))
                    .col(string_len_null(Users::FullName, 255))
                    .col(string_len_null(Users::Phone, 50))
                    .col(timestamp_with_time_zone(Users::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Users::UpdatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        // Create restaurants table
        manager
            .create_table(
                Table::create()
                    .table(Restaurants::Table)
                    .if_not_exists()
                    .col(pk_uuid(Restaurants::Id))
                    .col(uuid(Restaurants::OwnerId))
                    .col(string_len(Restaurants::Name, 255))
                    .col(string_len(Restaurants::CuisineType, 100))
                    .col(string_len(Restaurants::Location, 255))
                    .col(text_null(Restaurants::Address))
                    .col(text(Restaurants::Description))
                    .col(string_len_null(Restaurants::ImageUrl, 500))
                    .col(timestamp_with_time_zone(Restaurants::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Restaurants::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_restaurant_owner")
                            .from(Restaurants::Table, Restaurants::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create campaigns table. The funding bounds are enforced by the
        // database as well as by the funding transaction.
        manager
            .create_table(
                Table::create()
                    .table(Campaigns::Table)
                    .if_not_exists()
                    .col(pk_uuid(Campaigns::Id))
                    .col(uuid(Campaigns::RestaurantId))
                    .col(string_len(Campaigns::Title, 255))
                    .col(text(Campaigns::Description))
                    .col(decimal_len(Campaigns::FundingGoal, 12, 2))
                    .col(decimal_len(Campaigns::CurrentFunding, 12, 2).default(0))
                    .col(decimal_len(Campaigns::InterestRate, 5, 2))
                    .col(integer(Campaigns::DurationMonths))
                    .col(string_len(Campaigns::Status, 20).default("active"))
                    .col(timestamp_with_time_zone(Campaigns::StartDate).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone_null(Campaigns::EndDate))
                    .col(timestamp_with_time_zone(Campaigns::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Campaigns::UpdatedAt).default(Expr::current_timestamp()))
                    .check(Expr::col(Campaigns::FundingGoal).gt(0))
                    .check(Expr::col(Campaigns::CurrentFunding).gte(0))
                    .check(Expr::col(Campaigns::CurrentFunding).lte(Expr::col(Campaigns::FundingGoal)))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_campaign_restaurant")
                            .from(Campaigns::Table, Campaigns::RestaurantId)
                            .to(Restaurants::Table, Restaurants::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create investments table
        manager
            .create_table(
                Table::create()
                    .table(Investments::Table)
                    .if_not_exists()
                    .col(pk_uuid(Investments::Id))
                    .col(uuid(Investments::CampaignId))
                    .col(uuid(Investments::InvestorId))
                    .col(decimal_len(Investments::Amount, 12, 2))
                    .col(timestamp_with_time_zone(Investments::InvestmentDate).default(Expr::current_timestamp()))
                    .col(string_len(Investments::Status, 20).default("completed"))
                    .col(timestamp_with_time_zone(Investments::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Investments::UpdatedAt).default(Expr::current_timestamp()))
                    .check(Expr::col(Investments::Amount).gt(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_investment_campaign")
                            .from(Investments::Table, Investments::CampaignId)
                            .to(Campaigns::Table, Campaigns::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_investment_investor")
                            .from(Investments::Table, Investments::InvestorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order to avoid foreign key constraints
        manager
            .drop_table(Table::drop().table(Investments::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Campaigns::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Restaurants::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    Id,
    Email,
    PasswordHash,
    Role,
    FullName,
    Phone,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Restaurants {
    Table,
    Id,
    OwnerId,
    Name,
    CuisineType,
    Location,
    Address,
    Description,
    ImageUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Campaigns {
    Table,
    Id,
    RestaurantId,
    Title,
    Description,
    FundingGoal,
    CurrentFunding,
    InterestRate,
    DurationMonths,
    Status,
    StartDate,
    EndDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Investments {
    Table,
    Id,
    CampaignId,
    InvestorId,
    Amount,
    InvestmentDate,
    Status,
    CreatedAt,
    UpdatedAt,
}
