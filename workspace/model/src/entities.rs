//! Root of the SeaORM entity modules.
//!
//! Four tables: `users`, `restaurants`, `campaigns` and `investments`.
//! Campaign authority derives from the owning restaurant, which derives
//! from its owner.

pub mod campaign;
pub mod investment;
pub mod restaurant;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::campaign::{CampaignStatus, Entity as Campaign};
    pub use super::investment::{Entity as Investment, InvestmentStatus};
    pub use super::restaurant::Entity as Restaurant;
    pub use super::user::{Entity as User, UserRole};
}
