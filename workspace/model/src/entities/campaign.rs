use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle of a funding round.
///
/// The only edges are `Active -> Funded` and `Active -> Closed`. Both
/// `Funded` and `Closed` are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "funded")]
    Funded,
    #[sea_orm(string_value = "closed")]
    Closed,
}

impl CampaignStatus {
    /// Whether a campaign in this status may move to `next`.
    /// Staying in the same status is always allowed.
    pub fn can_transition_to(self, next: CampaignStatus) -> bool {
        match (self, next) {
            (current, next) if current == next => true,
            (CampaignStatus::Active, CampaignStatus::Funded) => true,
            (CampaignStatus::Active, CampaignStatus::Closed) => true,
            _ => false,
        }
    }

    /// Only active campaigns accept investments.
    pub fn accepts_investments(self) -> bool {
        self == CampaignStatus::Active
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, CampaignStatus::Funded | CampaignStatus::Closed)
    }
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CampaignStatus::Active => f.write_str("active"),
            CampaignStatus::Funded => f.write_str("funded"),
            CampaignStatus::Closed => f.write_str("closed"),
        }
    }
}

/// A funding round for one restaurant.
///
/// `current_funding` only ever changes through the funding transaction in
/// the `compute` crate, and stays within `0..=funding_goal`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "campaigns")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub funding_goal: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub current_funding: Decimal,
    /// Annual interest promised to investors, in percent.
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub interest_rate: Decimal,
    pub duration_months: i32,
    pub status: CampaignStatus,
    pub start_date: DateTimeUtc,
    pub end_date: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Amount still needed before the goal is reached.
    pub fn remaining(&self) -> Decimal {
        (self.funding_goal - self.current_funding).max(Decimal::ZERO)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::restaurant::Entity",
        from = "Column::RestaurantId",
        to = "super::restaurant::Column::Id",
        on_delete = "Cascade"
    )]
    Restaurant,
    #[sea_orm(has_many = "super::investment::Entity")]
    Investment,
}

impl Related<super::restaurant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Restaurant.def()
    }
}

impl Related<super::investment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Investment.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = Utc::now();
        if insert {
            if self.id.is_not_set() {
                self.id = Set(Uuid::new_v4());
            }
            if self.current_funding.is_not_set() {
                self.current_funding = Set(Decimal::ZERO);
            }
            if self.status.is_not_set() {
                self.status = Set(CampaignStatus::Active);
            }
            if self.start_date.is_not_set() {
                self.start_date = Set(now);
            }
            if self.created_at.is_not_set() {
                self.created_at = Set(now);
            }
        }
        self.updated_at = Set(now);
        Ok(self)
    }
}
