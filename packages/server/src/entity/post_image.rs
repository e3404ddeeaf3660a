use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Inline image URL extracted from a post body. Uniqueness over
/// (post_id, url) is enforced by an index created at startup.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post_image")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub url: String,

    pub post_id: i32,
    #[sea_orm(belongs_to, from = "post_id", to = "id")]
    pub post: HasOne<super::post::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
