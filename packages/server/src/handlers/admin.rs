use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{author, category, post, post_author, post_category, post_image};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::admin::*;
use crate::models::shared::Pagination;
use crate::state::AppState;

use super::post::{load_summaries, load_summary};

#[utoipa::path(
    post,
    path = "/{id}/order",
    tag = "Curation",
    operation_id = "setDisplayOrder",
    summary = "Pin or unpin a post's display slot",
    description = "Sets the 1-based display slot of a post, or clears it with null. Slots are not unique: when several posts claim the same slot the listing places the first candidate and defers the rest.",
    params(("id" = i32, Path, description = "Post ID")),
    request_body = SetOrderRequest,
    responses(
        (status = 200, description = "Display order updated", body = SetOrderResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(id))]
pub async fn set_display_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<SetOrderRequest>,
) -> Result<Json<SetOrderResponse>, AppError> {
    let requested = validate_set_order(&payload)?;

    let model = find_post(&state.db, id).await?;
    let mut active: post::ActiveModel = model.into();
    active.display_order = Set(requested);
    active.updated_at = Set(chrono::Utc::now());
    active.update(&state.db).await?;

    let message = match requested {
        Some(slot) => format!("Post set to position {slot}"),
        None => "Display order cleared successfully".to_string(),
    };

    Ok(Json(SetOrderResponse {
        success: true,
        message,
        display_order: requested,
    }))
}

#[utoipa::path(
    get,
    path = "/{id}/order",
    tag = "Curation",
    operation_id = "getDisplayOrder",
    summary = "Get a post's display slot",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Current display order, null when unpinned", body = OrderResponse),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_display_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<OrderResponse>, AppError> {
    let model = find_post(&state.db, id).await?;
    Ok(Json(OrderResponse {
        display_order: model.display_order,
    }))
}

#[utoipa::path(
    post,
    path = "/{id}/approve",
    tag = "Curation",
    operation_id = "approvePost",
    summary = "Publish a post with its curation",
    description = "Replaces the post's category and author links and marks it published, all in one transaction. Every referenced category and author must exist; otherwise nothing changes.",
    params(("id" = i32, Path, description = "Post ID")),
    request_body = ApproveRequest,
    responses(
        (status = 200, description = "Post approved and published", body = CurationResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Post, category or author not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(id))]
pub async fn approve_post(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<ApproveRequest>,
) -> Result<Json<CurationResponse>, AppError> {
    validate_approve(&payload)?;

    let txn = state.db.begin().await?;
    let model = find_post(&txn, id).await?;

    let category_count = category::Entity::find()
        .filter(category::Column::Id.is_in(payload.category_ids.clone()))
        .count(&txn)
        .await?;
    if category_count != payload.category_ids.len() as u64 {
        return Err(AppError::NotFound("Category not found".into()));
    }

    if !payload.author_ids.is_empty() {
        let author_count = author::Entity::find()
            .filter(author::Column::Id.is_in(payload.author_ids.clone()))
            .count(&txn)
            .await?;
        if author_count != payload.author_ids.len() as u64 {
            return Err(AppError::NotFound("Author not found".into()));
        }
    }

    post_category::Entity::delete_many()
        .filter(post_category::Column::PostId.eq(id))
        .exec(&txn)
        .await?;
    for &category_id in &payload.category_ids {
        post_category::ActiveModel {
            post_id: Set(id),
            category_id: Set(category_id),
        }
        .insert(&txn)
        .await?;
    }

    post_author::Entity::delete_many()
        .filter(post_author::Column::PostId.eq(id))
        .exec(&txn)
        .await?;
    for &author_id in &payload.author_ids {
        post_author::ActiveModel {
            post_id: Set(id),
            author_id: Set(author_id),
        }
        .insert(&txn)
        .await?;
    }

    let mut active: post::ActiveModel = model.into();
    active.is_published = Set(true);
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    let summary = load_summary(&state.db, updated).await?;
    Ok(Json(CurationResponse {
        success: true,
        message: "Post approved and published".into(),
        post: summary,
    }))
}

#[utoipa::path(
    post,
    path = "/{id}/reapprove",
    tag = "Curation",
    operation_id = "reapprovePost",
    summary = "Unpublish a post, optionally detaching links",
    description = "Clears the publish flag. Unless `unpublishOnly` is set, also removes the named category and/or author link in the same transaction, so the post can be re-curated and approved again.",
    params(("id" = i32, Path, description = "Post ID")),
    request_body = ReapproveRequest,
    responses(
        (status = 200, description = "Post unpublished", body = CurationResponse),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(id))]
pub async fn reapprove_post(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<ReapproveRequest>,
) -> Result<Json<CurationResponse>, AppError> {
    let txn = state.db.begin().await?;
    let model = find_post(&txn, id).await?;

    if !payload.unpublish_only {
        if let Some(category_id) = payload.category_id {
            post_category::Entity::delete_many()
                .filter(post_category::Column::PostId.eq(id))
                .filter(post_category::Column::CategoryId.eq(category_id))
                .exec(&txn)
                .await?;
        }
        if let Some(author_id) = payload.author_id {
            post_author::Entity::delete_many()
                .filter(post_author::Column::PostId.eq(id))
                .filter(post_author::Column::AuthorId.eq(author_id))
                .exec(&txn)
                .await?;
        }
    }

    let mut active: post::ActiveModel = model.into();
    active.is_published = Set(false);
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    let message = if payload.unpublish_only {
        "Post unpublished successfully"
    } else {
        "Post unpublished and relations removed"
    };

    let summary = load_summary(&state.db, updated).await?;
    Ok(Json(CurationResponse {
        success: true,
        message: message.into(),
        post: summary,
    }))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Curation",
    operation_id = "deletePost",
    summary = "Delete a post permanently",
    description = "Removes the post along with its category links, author links and image rows. A later sync run may bring the post back from WordPress.",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    find_post(&txn, id).await?;

    post_category::Entity::delete_many()
        .filter(post_category::Column::PostId.eq(id))
        .exec(&txn)
        .await?;
    post_author::Entity::delete_many()
        .filter(post_author::Column::PostId.eq(id))
        .exec(&txn)
        .await?;
    post_image::Entity::delete_many()
        .filter(post_image::Column::PostId.eq(id))
        .exec(&txn)
        .await?;
    post::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/posts",
    tag = "Curation",
    operation_id = "listAdminPosts",
    summary = "List all posts for the curation table",
    description = "Returns every imported post regardless of publish state, newest first, with standard pagination.",
    params(AdminListQuery),
    responses(
        (status = 200, description = "Paginated posts", body = AdminPostListResponse),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_admin_posts(
    State(state): State<AppState>,
    Query(query): Query<AdminListQuery>,
) -> Result<Json<AdminPostListResponse>, AppError> {
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);

    let select = post::Entity::find();
    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;
    let total_pages = total.div_ceil(per_page);

    let rows = select
        .order_by_desc(post::Column::WpCreatedAt)
        .order_by_asc(post::Column::Id)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    let data = load_summaries(&state.db, rows).await?;

    Ok(Json(AdminPostListResponse {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

async fn find_post<C: ConnectionTrait>(db: &C, id: i32) -> Result<post::Model, AppError> {
    post::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))
}
