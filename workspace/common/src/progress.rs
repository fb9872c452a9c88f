use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Fraction of the goal raised so far, bounded to `[0, 1]`.
///
/// A non-positive goal yields zero rather than dividing by it.
pub fn funding_ratio(current_funding: Decimal, funding_goal: Decimal) -> Decimal {
    if funding_goal <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    current_funding
        .checked_div(funding_goal)
        .unwrap_or(Decimal::ZERO)
        .clamp(Decimal::ZERO, Decimal::ONE)
}

/// `funding_ratio` expressed in percent and rounded to two decimal places.
pub fn funding_percentage(current_funding: Decimal, funding_goal: Decimal) -> Decimal {
    (funding_ratio(current_funding, funding_goal) * Decimal::ONE_HUNDRED).round_dp(2)
}

/// Amount that can still be invested before the goal is met.
pub fn remaining_capacity(current_funding: Decimal, funding_goal: Decimal) -> Decimal {
    (funding_goal - current_funding).max(Decimal::ZERO)
}

/// Progress figures attached to every campaign response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CampaignProgress {
    /// Percent of the goal raised, 0 to 100
    pub funding_percentage: Decimal,
    /// Amount still accepted before the campaign is fully funded
    pub remaining: Decimal,
}

impl CampaignProgress {
    pub fn new(current_funding: Decimal, funding_goal: Decimal) -> Self {
        Self {
            funding_percentage: funding_percentage(current_funding, funding_goal),
            remaining: remaining_capacity(current_funding, funding_goal),
        }
    }
}
