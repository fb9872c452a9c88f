//! Domain operations for DineFund that need the database.
//!
//! The funding transaction lives in [`funding`]. Ownership checks used by
//! every owner-only endpoint live in [`ownership`], and the investor and
//! restaurant aggregates live in [`portfolio`].

pub mod error;
pub mod funding;
pub mod ownership;
pub mod portfolio;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ComputeError, Result};
pub use funding::{invest, FundingOutcome};
