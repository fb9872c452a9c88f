use sea_orm_migration::prelude::*;

use crate::m20250101_000001_create_table::{Campaigns, Investments, Restaurants};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_restaurants_owner")
                    .table(Restaurants::Table)
                    .col(Restaurants::OwnerId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_campaigns_restaurant")
                    .table(Campaigns::Table)
                    .col(Campaigns::RestaurantId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_campaigns_status")
                    .table(Campaigns::Table)
                    .col(Campaigns::Status)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_investments_campaign")
                    .table(Investments::Table)
                    .col(Investments::CampaignId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_investments_investor")
                    .table(Investments::Table)
                    .col(Investments::InvestorId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table) in [
            ("idx_investments_investor", Investments::Table),
            ("idx_investments_campaign", Investments::Table),
        ] {
            manager
                .drop_index(Index::drop().name(name).table(table).to_owned())
                .await?;
        }

        for (name, table) in [
            ("idx_campaigns_status", Campaigns::Table),
            ("idx_campaigns_restaurant", Campaigns::Table),
        ] {
            manager
                .drop_index(Index::drop().name(name).table(table).to_owned())
                .await?;
        }

        manager
            .drop_index(
                Index::drop()
                    .name("idx_restaurants_owner")
                    .table(Restaurants::Table)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
