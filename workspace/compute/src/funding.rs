//! The funding transaction.
//!
//! An investment is accepted only while the campaign is `active` and the
//! amount fits under the goal. The read, the investment insert and the
//! funding update all run inside one database transaction. On backends that
//! support it the campaign row is locked with `SELECT ... FOR UPDATE`; the
//! update is additionally guarded on the status and funding that were read,
//! so a concurrent writer makes it affect zero rows and the whole
//! transaction rolls back instead of overshooting the goal.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbBackend, EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, trace, warn};
use uuid::Uuid;

use model::entities::{
    campaign::{self, CampaignStatus},
    investment::{self, InvestmentStatus},
};

use crate::error::{ComputeError, Result};

/// Result of an accepted investment: the stored row and the campaign as it
/// stands after the funding update.
#[derive(Debug, Clone)]
pub struct FundingOutcome {
    pub investment: investment::Model,
    pub campaign: campaign::Model,
}

/// Checks whether `amount` may be added to `campaign` and returns the new
/// funding total. Does not touch the database.
pub fn check_investment(campaign: &campaign::Model, amount: Decimal) -> Result<Decimal> {
    check_amount(amount)?;

    if !campaign.status.accepts_investments() {
        return Err(ComputeError::CampaignNotActive {
            campaign_id: campaign.id,
            status: campaign.status,
        });
    }

    match campaign.current_funding.checked_add(amount) {
        Some(new_total) if new_total <= campaign.funding_goal => Ok(new_total),
        _ => Err(ComputeError::ExceedsCapacity {
            requested: amount,
            remaining: campaign.remaining(),
        }),
    }
}

/// Amounts must be positive and stored exactly by the money columns.
pub fn check_amount(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO || !common::is_money(amount) {
        return Err(ComputeError::InvalidAmount(amount));
    }
    Ok(())
}

/// Status a campaign ends up in once its funding reaches `new_total`.
pub fn status_after(funding_goal: Decimal, new_total: Decimal) -> CampaignStatus {
    if new_total >= funding_goal {
        CampaignStatus::Funded
    } else {
        CampaignStatus::Active
    }
}

/// Records an investment of `amount` by `investor_id` into `campaign_id`.
///
/// Either both the investment row and the campaign funding update become
/// visible, or neither does.
#[instrument(skip(db))]
pub async fn invest(
    db: &DatabaseConnection,
    campaign_id: Uuid,
    investor_id: Uuid,
    amount: Decimal,
) -> Result<FundingOutcome> {
    if let Err(err) = check_amount(amount) {
        warn!(%amount, "Rejected investment amount");
        return Err(err);
    }

    trace!("Opening funding transaction");
    let txn = db.begin().await?;

    match apply_investment(&txn, campaign_id, investor_id, amount).await {
        Ok(outcome) => {
            txn.commit().await?;
            info!(
                investment_id = %outcome.investment.id,
                current_funding = %outcome.campaign.current_funding,
                status = %outcome.campaign.status,
                "Investment recorded"
            );
            Ok(outcome)
        }
        Err(err) => {
            debug!("Rolling back funding transaction");
            txn.rollback().await?;
            warn!(error = %err, "Investment rejected");
            Err(err)
        }
    }
}

async fn apply_investment(
    txn: &DatabaseTransaction,
    campaign_id: Uuid,
    investor_id: Uuid,
    amount: Decimal,
) -> Result<FundingOutcome> {
    let mut query = campaign::Entity::find_by_id(campaign_id);
    // SQLite has no row locks; its write lock already serializes writers.
    if txn.get_database_backend() != DbBackend::Sqlite {
        query = query.lock_exclusive();
    }

    let campaign = query
        .one(txn)
        .await?
        .ok_or(ComputeError::CampaignNotFound(campaign_id))?;
    debug!(
        current_funding = %campaign.current_funding,
        funding_goal = %campaign.funding_goal,
        status = %campaign.status,
        "Loaded campaign"
    );

    record_investment(txn, campaign, investor_id, amount).await
}

/// Inserts the investment and moves the campaign from the state it was read
/// in. Fails with `ConcurrentUpdate` when the row no longer matches `campaign`.
async fn record_investment(
    txn: &DatabaseTransaction,
    campaign: campaign::Model,
    investor_id: Uuid,
    amount: Decimal,
) -> Result<FundingOutcome> {
    let campaign_id = campaign.id;
    let new_total = check_investment(&campaign, amount)?;
    let new_status = status_after(campaign.funding_goal, new_total);

    let investment = investment::ActiveModel {
        campaign_id: Set(campaign_id),
        investor_id: Set(investor_id),
        amount: Set(amount),
        status: Set(InvestmentStatus::Completed),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    let now = Utc::now();
    let updated = campaign::Entity::update_many()
        .col_expr(campaign::Column::CurrentFunding, Expr::value(new_total))
        .col_expr(campaign::Column::Status, Expr::value(new_status))
        .col_expr(campaign::Column::UpdatedAt, Expr::value(now))
        .filter(campaign::Column::Id.eq(campaign_id))
        .filter(campaign::Column::Status.eq(CampaignStatus::Active))
        .filter(campaign::Column::CurrentFunding.eq(campaign.current_funding))
        .exec(txn)
        .await?;

    if updated.rows_affected != 1 {
        return Err(ComputeError::ConcurrentUpdate(campaign_id));
    }

    let campaign = campaign::Model {
        current_funding: new_total,
        status: new_status,
        updated_at: now,
        ..campaign
    };

    Ok(FundingOutcome {
        investment,
        campaign,
    })
}
