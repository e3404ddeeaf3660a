use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use sea_orm::sea_query::{Query as SeaQuery, SimpleExpr};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{author, category, post, post_author, post_category, post_image};
use crate::error::{AppError, ErrorBody};
use crate::models::post::*;
use crate::state::AppState;
use crate::utils::ordering::resolve_display_order;

#[utoipa::path(
    get,
    path = "/",
    tag = "Posts",
    operation_id = "listPosts",
    summary = "List posts with display-order merge",
    description = "Returns up to `per_page` posts. Pinned posts claim their display slots and the remaining slots are filled with unpinned posts, newest first; pins beyond the page append at the end. Supports filtering by category and publish state.",
    params(ListPostsQuery),
    responses(
        (status = 200, description = "Resolved post listing", body = PostListResponse),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<PostListResponse>, AppError> {
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100) as usize;

    let mut select = post::Entity::find();

    if query.published == Some(true) {
        select = select.filter(post::Column::IsPublished.eq(true));
    }

    if let Some(category_id) = query.category_id {
        select = select.filter(category_link(category_id));
    } else if let Some(ref name) = query.category
        && name != "All"
    {
        let Some(matched) = category::Entity::find()
            .filter(category::Column::Name.eq(name))
            .one(&state.db)
            .await?
        else {
            return Ok(Json(PostListResponse {
                posts: Vec::new(),
                total: 0,
            }));
        };
        select = select.filter(category_link(matched.id));
    }

    let candidates = select
        .order_by_desc(post::Column::WpCreatedAt)
        .order_by_asc(post::Column::Id)
        .all(&state.db)
        .await?;

    let resolved = resolve_display_order(candidates, per_page);
    let posts = load_summaries(&state.db, resolved).await?;
    let total = posts.len() as u64;

    Ok(Json(PostListResponse { posts, total }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Posts",
    operation_id = "getPost",
    summary = "Get a published post by ID",
    description = "Returns the full post payload, including content HTML, extracted image URLs, categories and authors. Unpublished posts are not visible here.",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post details", body = PostDetailResponse),
        (status = 404, description = "Post not found or unpublished (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PostDetailResponse>, AppError> {
    let model = post::Entity::find()
        .filter(post::Column::Id.eq(id))
        .filter(post::Column::IsPublished.eq(true))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;

    let images: Vec<String> = post_image::Entity::find()
        .filter(post_image::Column::PostId.eq(model.id))
        .order_by_asc(post_image::Column::Id)
        .all(&state.db)
        .await?
        .into_iter()
        .map(|img| img.url)
        .collect();

    let categories = load_category_summaries(&state.db, model.id).await?;
    let authors = load_author_summaries(&state.db, model.id).await?;

    Ok(Json(PostDetailResponse {
        post: PostDetail::from_parts(model, images, categories, authors),
    }))
}

/// Membership filter: posts linked to the given category.
fn category_link(category_id: i32) -> SimpleExpr {
    post::Column::Id.in_subquery(
        SeaQuery::select()
            .column(post_category::Column::PostId)
            .from(post_category::Entity)
            .and_where(post_category::Column::CategoryId.eq(category_id))
            .to_owned(),
    )
}

/// Build listing summaries for a batch of posts, loading their category
/// and author links in two queries.
pub(crate) async fn load_summaries<C: ConnectionTrait>(
    db: &C,
    posts: Vec<post::Model>,
) -> Result<Vec<PostSummary>, AppError> {
    let ids: Vec<i32> = posts.iter().map(|p| p.id).collect();

    let category_rows = post_category::Entity::find()
        .filter(post_category::Column::PostId.is_in(ids.clone()))
        .find_also_related(category::Entity)
        .all(db)
        .await?;
    let mut categories_by_post: HashMap<i32, Vec<CategorySummary>> = HashMap::new();
    for (link, matched) in category_rows {
        if let Some(matched) = matched {
            categories_by_post
                .entry(link.post_id)
                .or_default()
                .push(matched.into());
        }
    }

    let author_rows = post_author::Entity::find()
        .filter(post_author::Column::PostId.is_in(ids))
        .find_also_related(author::Entity)
        .all(db)
        .await?;
    let mut authors_by_post: HashMap<i32, Vec<AuthorSummary>> = HashMap::new();
    for (link, matched) in author_rows {
        if let Some(matched) = matched {
            authors_by_post
                .entry(link.post_id)
                .or_default()
                .push(matched.into());
        }
    }

    Ok(posts
        .into_iter()
        .map(|p| {
            let categories = categories_by_post.remove(&p.id).unwrap_or_default();
            let authors = authors_by_post.remove(&p.id).unwrap_or_default();
            PostSummary::from_parts(p, categories, authors)
        })
        .collect())
}

/// Summary for a single post with its curation links.
pub(crate) async fn load_summary<C: ConnectionTrait>(
    db: &C,
    model: post::Model,
) -> Result<PostSummary, AppError> {
    let categories = load_category_summaries(db, model.id).await?;
    let authors = load_author_summaries(db, model.id).await?;
    Ok(PostSummary::from_parts(model, categories, authors))
}

async fn load_category_summaries<C: ConnectionTrait>(
    db: &C,
    post_id: i32,
) -> Result<Vec<CategorySummary>, AppError> {
    Ok(post_category::Entity::find()
        .filter(post_category::Column::PostId.eq(post_id))
        .find_also_related(category::Entity)
        .all(db)
        .await?
        .into_iter()
        .filter_map(|(_, matched)| matched.map(Into::into))
        .collect())
}

async fn load_author_summaries<C: ConnectionTrait>(
    db: &C,
    post_id: i32,
) -> Result<Vec<AuthorSummary>, AppError> {
    Ok(post_author::Entity::find()
        .filter(post_author::Column::PostId.eq(post_id))
        .find_also_related(author::Entity)
        .all(db)
        .await?
        .into_iter()
        .filter_map(|(_, matched)| matched.map(Into::into))
        .collect())
}
