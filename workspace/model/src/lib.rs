//! SeaORM data model for the DineFund marketplace.
//!
//! Users own restaurants (restaurant owners) or make investments
//! (investors). Restaurants raise money through campaigns, and every
//! investment targets exactly one campaign.

pub mod entities;
