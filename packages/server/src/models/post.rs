use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{author, category, post};
use crate::utils::html;

/// Character budget for listing excerpts.
pub const EXCERPT_LENGTH: usize = 150;

/// Plain-text preview of an HTML body: tags stripped, whitespace
/// collapsed, truncated with a trailing ellipsis when over budget.
pub fn excerpt(html_body: &str) -> String {
    excerpt_with_budget(html_body, EXCERPT_LENGTH)
}

fn excerpt_with_budget(html_body: &str, budget: usize) -> String {
    let text = html::plain_text(html_body);
    match text.char_indices().nth(budget) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text,
    }
}

/// Query parameters for the public post listing.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListPostsQuery {
    /// Filter by category ID. Takes precedence over `category`.
    #[serde(rename = "categoryId")]
    #[param(example = 3)]
    pub category_id: Option<i32>,
    /// Filter by category name. "All" disables the filter.
    #[param(example = "Insights")]
    pub category: Option<String>,
    /// Display slots to fill (1-100, default 10).
    #[param(example = 10)]
    pub per_page: Option<u64>,
    /// When true, only published posts are candidates.
    #[param(example = true)]
    pub published: Option<bool>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CategorySummary {
    #[schema(example = 3)]
    pub id: i32,
    #[schema(example = "Insights")]
    pub name: String,
    #[schema(example = "insights")]
    pub slug: String,
}

impl From<category::Model> for CategorySummary {
    fn from(m: category::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            slug: m.slug,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AuthorSummary {
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = "Jane Cooper")]
    pub name: String,
}

impl From<author::Model> for AuthorSummary {
    fn from(m: author::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
        }
    }
}

/// One post in a listing, with curation summaries and a derived excerpt.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: i32,
    /// Post ID at the WordPress source.
    #[schema(example = 4211)]
    pub wp_id: i64,
    pub title: String,
    pub slug: String,
    pub cover_image: Option<String>,
    #[schema(example = "publish")]
    pub wp_status: String,
    pub is_published: bool,
    /// Editor-assigned display slot, when pinned.
    pub display_order: Option<i32>,
    pub wp_created_at: DateTime<Utc>,
    pub categories: Vec<CategorySummary>,
    pub authors: Vec<AuthorSummary>,
    pub excerpt: String,
}

impl PostSummary {
    pub fn from_parts(
        post: post::Model,
        categories: Vec<CategorySummary>,
        authors: Vec<AuthorSummary>,
    ) -> Self {
        Self {
            id: post.id,
            wp_id: post.wp_id,
            title: post.title,
            slug: post.slug,
            cover_image: post.cover_image,
            wp_status: post.wp_status,
            is_published: post.is_published,
            display_order: post.display_order,
            wp_created_at: post.wp_created_at,
            categories,
            authors,
            excerpt: excerpt(&post.content_html),
        }
    }
}

/// Public listing response. `total` counts the returned posts, after
/// order-merge resolution capped the set at `per_page`.
#[derive(Serialize, utoipa::ToSchema)]
pub struct PostListResponse {
    pub posts: Vec<PostSummary>,
    #[schema(example = 10)]
    pub total: u64,
}

/// Full post payload for the public detail endpoint.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    pub id: i32,
    pub wp_id: i64,
    pub title: String,
    pub slug: String,
    pub content_html: String,
    pub cover_image: Option<String>,
    pub wp_status: String,
    pub is_published: bool,
    pub display_order: Option<i32>,
    pub wp_created_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Inline image URLs extracted at sync time.
    pub images: Vec<String>,
    pub categories: Vec<CategorySummary>,
    pub authors: Vec<AuthorSummary>,
}

impl PostDetail {
    pub fn from_parts(
        post: post::Model,
        images: Vec<String>,
        categories: Vec<CategorySummary>,
        authors: Vec<AuthorSummary>,
    ) -> Self {
        Self {
            id: post.id,
            wp_id: post.wp_id,
            title: post.title,
            slug: post.slug,
            content_html: post.content_html,
            cover_image: post.cover_image,
            wp_status: post.wp_status,
            is_published: post.is_published,
            display_order: post.display_order,
            wp_created_at: post.wp_created_at,
            created_at: post.created_at,
            updated_at: post.updated_at,
            images,
            categories,
            authors,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PostDetailResponse {
    pub post: PostDetail,
}
