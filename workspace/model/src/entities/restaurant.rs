use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::Set;

/// A restaurant listed on the marketplace by its owner.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "restaurants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// The `restaurant_owner` user who listed this restaurant.
    pub owner_id: Uuid,
    pub name: String,
    pub cuisine_type: String,
    pub location: String,
    pub address: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub image_url: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Owner,
    #[sea_orm(has_many = "super::campaign::Entity")]
    Campaign,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::campaign::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Campaign.def()
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
