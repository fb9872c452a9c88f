use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The role a user signs up with. Fixed for the lifetime of the account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[sea_orm(string_value = "restaurant_owner")]
    RestaurantOwner,
    #[sea_orm(string_value = "investor")]
    Investor,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::RestaurantOwner => f.write_str("restaurant_owner"),
            UserRole::Investor => f.write_str("investor"),
        }
    }
}

/// A registered marketplace participant.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    /// Argon2 PHC string. Never serialized into API responses.
    pub password_hash: String,
    pub role: UserRole,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Restaurants owned by a `restaurant_owner`.
    #[sea_orm(has_many = "super::restaurant::Entity")]
    Restaurant,
    /// Investments made by an `investor`.
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
            if self.created_at.is_not_set() {
                self.created_at = Set(now);
            }
        }
        self.updated_at = Set(now);
        Ok(self)
    }
}
