use axum::Json;
use axum::extract::{Query, State};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::models::sync::{SyncQuery, SyncReport};
use crate::state::AppState;
use crate::sync::{Reconciler, SyncMode};

#[utoipa::path(
    get,
    path = "/",
    tag = "Sync",
    operation_id = "syncPosts",
    summary = "Import posts from WordPress",
    description = "Pulls every post from the configured WordPress site and reconciles it into local storage. Incremental runs upsert in place and never touch curation. With `full=true` the run snapshots curation, clears local storage and reimports, restoring publish flags and category links best-effort; links that cannot be restored are reported in `restoreFailures`.",
    params(SyncQuery),
    responses(
        (status = 200, description = "Sync report", body = SyncReport),
        (status = 502, description = "WordPress fetch failed (SOURCE_FETCH_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(full = query.full.unwrap_or(false)))]
pub async fn sync_posts(
    State(state): State<AppState>,
    Query(query): Query<SyncQuery>,
) -> Result<Json<SyncReport>, AppError> {
    let mode = if query.full.unwrap_or(false) {
        SyncMode::Full
    } else {
        SyncMode::Incremental
    };

    let reconciler = Reconciler::new(&state.db, &state.wp, state.config.sync.batch_size);
    let outcome = reconciler.run(mode).await?;

    Ok(Json(outcome.into()))
}
