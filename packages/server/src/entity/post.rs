use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Post ID at the WordPress source. Sync upserts on this key.
    #[sea_orm(unique)]
    pub wp_id: i64,

    pub title: String,
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub content_html: String,
    /// Featured-image URL from the source, when the post has one.
    pub cover_image: Option<String>,
    /// Status string at the source ("publish", "draft", ...).
    pub wp_status: String,
    /// Local publish flag, set by editors. Never written by sync
    /// except when restoring a snapshot during a full resync.
    #[sea_orm(default_value = false)]
    pub is_published: bool,
    /// Editor-assigned display slot (1-based). Absent means unpinned.
    /// Not unique: collisions are resolved at read time.
    pub display_order: Option<i32>,

    #[sea_orm(has_many)]
    pub images: HasMany<super::post_image::Entity>,

    #[sea_orm(has_many, via = "post_category")]
    pub categories: HasMany<super::category::Entity>,

    #[sea_orm(has_many, via = "post_author")]
    pub authors: HasMany<super::author::Entity>,

    pub wp_created_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
