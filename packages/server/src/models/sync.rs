use serde::{Deserialize, Serialize};

use crate::sync::{RestoreFailure, SyncOutcome};

/// Query parameters for triggering a sync run.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct SyncQuery {
    /// When true, runs a full resync: snapshot curation, truncate,
    /// reimport. Default: incremental.
    #[param(example = false)]
    pub full: Option<bool>,
}

/// One category restore that could not be applied during a full resync.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestoreFailureDto {
    /// Source identifier of the affected post.
    #[schema(example = 4211)]
    pub wp_id: i64,
    #[schema(example = 3)]
    pub category_id: i32,
    #[schema(example = "category no longer exists")]
    pub reason: String,
}

impl From<RestoreFailure> for RestoreFailureDto {
    fn from(f: RestoreFailure) -> Self {
        Self {
            wp_id: f.wp_id,
            category_id: f.category_id,
            reason: f.reason,
        }
    }
}

/// Wire shape of a completed sync run.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub success: bool,
    /// Posts upserted across all fetched pages.
    #[schema(example = 240)]
    pub imported: u64,
    /// Wall-clock milliseconds for the whole run.
    #[schema(example = 5125)]
    pub duration: u64,
    /// Milliseconds per post, 0 when nothing was imported.
    #[schema(example = 21.35)]
    pub average_per_post: f64,
    /// Category restores skipped during a full resync.
    pub restore_failures: Vec<RestoreFailureDto>,
}

impl From<SyncOutcome> for SyncReport {
    fn from(outcome: SyncOutcome) -> Self {
        Self {
            success: true,
            imported: outcome.imported,
            duration: outcome.duration_ms,
            average_per_post: outcome.average_per_post_ms,
            restore_failures: outcome
                .restore_failures
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}
