//! Investor portfolios and per-campaign / per-restaurant aggregates.

use std::collections::{HashMap, HashSet};

use common::{potential_returns, projected_return};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use model::entities::{
    campaign::{self, CampaignStatus},
    investment::{self, InvestmentStatus},
    restaurant,
};

use crate::error::Result;

/// One investment together with the campaign and restaurant it funds.
#[derive(Debug, Clone)]
pub struct Holding {
    pub investment: investment::Model,
    pub campaign: campaign::Model,
    pub restaurant: restaurant::Model,
}

impl Holding {
    pub fn is_completed(&self) -> bool {
        self.investment.status == InvestmentStatus::Completed
    }

    /// Principal plus the promised interest.
    pub fn projected_return(&self) -> Decimal {
        projected_return(self.investment.amount, self.campaign.interest_rate)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortfolioSummary {
    pub total_investments: u64,
    pub total_invested: Decimal,
    pub potential_returns: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvestorStats {
    pub campaigns_invested: u64,
    pub total_investments: u64,
    pub total_invested: Decimal,
    pub avg_interest_rate: Decimal,
    pub successful_campaigns: u64,
    pub active_campaigns: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestaurantRollup {
    pub campaign_count: u64,
    pub total_funding: Decimal,
}

/// All investments made by `investor_id`, newest first.
#[instrument(skip(db))]
pub async fn investor_holdings<C: ConnectionTrait>(
    db: &C,
    investor_id: Uuid,
) -> Result<Vec<Holding>> {
    let rows = investment::Entity::find()
        .filter(investment::Column::InvestorId.eq(investor_id))
        .order_by_desc(investment::Column::InvestmentDate)
        .find_also_related(campaign::Entity)
        .all(db)
        .await?;

    let restaurant_ids: HashSet<Uuid> = rows
        .iter()
        .filter_map(|(_, campaign)| campaign.as_ref().map(|c| c.restaurant_id))
        .collect();

    let restaurants: HashMap<Uuid, restaurant::Model> = if restaurant_ids.is_empty() {
        HashMap::new()
    } else {
        restaurant::Entity::find()
            .filter(restaurant::Column::Id.is_in(restaurant_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|r| (r.id, r))
            .collect()
    };

    let mut holdings = Vec::with_capacity(rows.len());
    for (investment, campaign) in rows {
        let Some(campaign) = campaign else {
            warn!(investment_id = %investment.id, "Investment without campaign");
            continue;
        };
        let Some(restaurant) = restaurants.get(&campaign.restaurant_id).cloned() else {
            warn!(campaign_id = %campaign.id, "Campaign without restaurant");
            continue;
        };
        holdings.push(Holding {
            investment,
            campaign,
            restaurant,
        });
    }

    debug!(count = holdings.len(), "Loaded holdings");
    Ok(holdings)
}

/// Totals over completed holdings.
pub fn summarize(holdings: &[Holding]) -> PortfolioSummary {
    let completed: Vec<&Holding> = holdings.iter().filter(|h| h.is_completed()).collect();

    PortfolioSummary {
        total_investments: completed.len() as u64,
        total_invested: completed.iter().map(|h| h.investment.amount).sum(),
        potential_returns: potential_returns(
            completed
                .iter()
                .map(|h| (h.investment.amount, h.campaign.interest_rate)),
        ),
    }
}

/// Statistics over completed holdings. The average rate is taken per
/// investment row, so a campaign backed twice weighs twice.
pub fn investor_stats(holdings: &[Holding]) -> InvestorStats {
    let completed: Vec<&Holding> = holdings.iter().filter(|h| h.is_completed()).collect();
    if completed.is_empty() {
        return InvestorStats::default();
    }

    let campaigns: HashSet<Uuid> = completed.iter().map(|h| h.campaign.id).collect();
    let rate_sum: Decimal = completed.iter().map(|h| h.campaign.interest_rate).sum();
    let count = completed.len() as u64;

    InvestorStats {
        campaigns_invested: campaigns.len() as u64,
        total_investments: count,
        total_invested: completed.iter().map(|h| h.investment.amount).sum(),
        avg_interest_rate: (rate_sum / Decimal::from(count)).round_dp(2),
        successful_campaigns: completed
            .iter()
            .filter(|h| h.campaign.status == CampaignStatus::Funded)
            .count() as u64,
        active_campaigns: completed
            .iter()
            .filter(|h| h.campaign.status == CampaignStatus::Active)
            .count() as u64,
    }
}

/// Number of distinct investors per campaign. Campaigns without
/// investments are absent from the map.
#[instrument(skip(db, campaign_ids))]
pub async fn investor_counts<C: ConnectionTrait>(
    db: &C,
    campaign_ids: &[Uuid],
) -> Result<HashMap<Uuid, u64>> {
    if campaign_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let pairs: Vec<(Uuid, Uuid)> = investment::Entity::find()
        .select_only()
        .column(investment::Column::CampaignId)
        .column(investment::Column::InvestorId)
        .distinct()
        .filter(investment::Column::CampaignId.is_in(campaign_ids.iter().copied()))
        .into_tuple()
        .all(db)
        .await?;

    let mut counts = HashMap::new();
    for (campaign_id, _) in pairs {
        *counts.entry(campaign_id).or_insert(0) += 1;
    }
    Ok(counts)
}

/// Campaign count and summed current funding per restaurant. Restaurants
/// without campaigns are absent from the map.
#[instrument(skip(db, restaurant_ids))]
pub async fn restaurant_rollups<C: ConnectionTrait>(
    db: &C,
    restaurant_ids: &[Uuid],
) -> Result<HashMap<Uuid, RestaurantRollup>> {
    if restaurant_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(Uuid, Decimal)> = campaign::Entity::find()
        .select_only()
        .column(campaign::Column::RestaurantId)
        .column(campaign::Column::CurrentFunding)
        .filter(campaign::Column::RestaurantId.is_in(restaurant_ids.iter().copied()))
        .into_tuple()
        .all(db)
        .await?;

    let mut rollups: HashMap<Uuid, RestaurantRollup> = HashMap::new();
    for (restaurant_id, funding) in rows {
        let rollup = rollups.entry(restaurant_id).or_default();
        rollup.campaign_count += 1;
        rollup.total_funding += funding;
    }
    Ok(rollups)
}
