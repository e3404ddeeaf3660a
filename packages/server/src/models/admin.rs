use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::post::PostSummary;
use super::shared::{Pagination, double_option, validate_unique_ids};

/// Body for pinning or unpinning a post's display slot.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct SetOrderRequest {
    /// New 1-based slot, or null to unpin. The field itself is required.
    #[serde(default, rename = "displayOrder", deserialize_with = "double_option")]
    pub display_order: Option<Option<i32>>,
}

/// Extract the requested slot, rejecting absent fields and
/// non-positive values.
pub fn validate_set_order(req: &SetOrderRequest) -> Result<Option<i32>, AppError> {
    match req.display_order {
        Some(Some(value)) if value >= 1 => Ok(Some(value)),
        Some(None) => Ok(None),
        _ => Err(AppError::Validation(
            "displayOrder must be a positive integer or null".into(),
        )),
    }
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetOrderResponse {
    pub success: bool,
    #[schema(example = "Post set to position 3")]
    pub message: String,
    /// Present when a slot was set, omitted when it was cleared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub display_order: Option<i32>,
}

/// Body for publishing a post with its curation.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRequest {
    /// Categories to attach. At least one required.
    pub category_ids: Vec<i32>,
    /// Authors to attach.
    #[serde(default)]
    pub author_ids: Vec<i32>,
}

pub fn validate_approve(req: &ApproveRequest) -> Result<(), AppError> {
    if req.category_ids.is_empty() {
        return Err(AppError::Validation(
            "categoryIds must contain at least one category".into(),
        ));
    }
    validate_unique_ids(&req.category_ids, "categoryId")?;
    validate_unique_ids(&req.author_ids, "authorId")?;
    Ok(())
}

/// Body for unpublishing a post, optionally detaching one category
/// and/or one author.
#[derive(Deserialize, Default, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReapproveRequest {
    pub category_id: Option<i32>,
    pub author_id: Option<i32>,
    /// When true, only the publish flag is cleared.
    #[serde(default)]
    pub unpublish_only: bool,
}

/// Response for curation actions that return the updated post.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CurationResponse {
    pub success: bool,
    #[schema(example = "Post approved and published")]
    pub message: String,
    pub post: PostSummary,
}

/// Query parameters for the admin post table.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct AdminListQuery {
    #[param(example = 1)]
    pub page: Option<u64>,
    #[param(example = 10)]
    pub per_page: Option<u64>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AdminPostListResponse {
    pub data: Vec<PostSummary>,
    pub pagination: Pagination,
}
