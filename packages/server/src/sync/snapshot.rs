use std::collections::HashMap;

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::entity::{post, post_category};
use crate::error::AppError;

/// Curation preserved for one published post across a full resync.
#[derive(Debug, Clone, Default)]
pub struct PreservedCuration {
    pub is_published: bool,
    pub category_ids: Vec<i32>,
}

/// Publish flags and category links of every published post, keyed by
/// WordPress id. Captured before a full resync truncates local storage
/// and consulted while reimporting. Author links and display orders are
/// not captured, so a full resync loses them.
#[derive(Debug, Default)]
pub struct CurationSnapshot {
    entries: HashMap<i64, PreservedCuration>,
}

impl CurationSnapshot {
    /// Empty snapshot, used by incremental runs.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Capture the publish flag and category links of all published posts.
    pub async fn capture<C: ConnectionTrait>(db: &C) -> Result<Self, AppError> {
        let published = post::Entity::find()
            .filter(post::Column::IsPublished.eq(true))
            .all(db)
            .await?;

        if published.is_empty() {
            return Ok(Self::default());
        }

        let wp_id_by_post: HashMap<i32, i64> =
            published.iter().map(|p| (p.id, p.wp_id)).collect();

        let mut entries: HashMap<i64, PreservedCuration> = published
            .iter()
            .map(|p| {
                (
                    p.wp_id,
                    PreservedCuration {
                        is_published: p.is_published,
                        category_ids: Vec::new(),
                    },
                )
            })
            .collect();

        let links = post_category::Entity::find()
            .filter(
                post_category::Column::PostId
                    .is_in(wp_id_by_post.keys().copied().collect::<Vec<_>>()),
            )
            .all(db)
            .await?;

        for link in links {
            if let Some(wp_id) = wp_id_by_post.get(&link.post_id)
                && let Some(entry) = entries.get_mut(wp_id)
            {
                entry.category_ids.push(link.category_id);
            }
        }

        Ok(Self { entries })
    }

    pub fn get(&self, wp_id: i64) -> Option<&PreservedCuration> {
        self.entries.get(&wp_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
