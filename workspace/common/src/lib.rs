//! Display arithmetic shared by every campaign and investment response.
//!
//! The figures here carry no authority: the funding transaction decides
//! what is accepted, these helpers only describe the result the same way
//! everywhere it is shown.
//!
//! [`fits_column`] and its wrappers describe which decimals the money and
//! rate columns store exactly; request validation uses them before any write.

mod money;
mod progress;
mod returns;

pub use money::{
    MONEY_PRECISION, MONEY_SCALE, RATE_PRECISION, RATE_SCALE, fits_column, is_money, is_rate,
};
pub use progress::{CampaignProgress, funding_percentage, funding_ratio, remaining_capacity};
pub use returns::{potential_returns, projected_return};
