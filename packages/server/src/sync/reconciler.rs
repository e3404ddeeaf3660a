use std::time::Instant;

use chrono::Utc;
use futures::future::try_join_all;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use tracing::{info, warn};
use wp::{WpClient, WpPost};

use crate::entity::{post, post_author, post_category, post_image};
use crate::error::AppError;
use crate::utils::html;

use super::snapshot::CurationSnapshot;

/// How a sync run treats existing local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Upsert whatever WordPress returns, leave everything else alone.
    Incremental,
    /// Snapshot curation, clear local storage, reimport from scratch.
    Full,
}

/// One preserved category link that could not be reattached.
#[derive(Debug, Clone)]
pub struct RestoreFailure {
    pub wp_id: i64,
    pub category_id: i32,
    pub reason: String,
}

/// Counters and the restore report of a completed run.
#[derive(Debug, Default)]
pub struct SyncOutcome {
    pub imported: u64,
    pub duration_ms: u64,
    /// Milliseconds per post, rounded to 2 decimals, 0 when nothing
    /// was imported.
    pub average_per_post_ms: f64,
    pub restore_failures: Vec<RestoreFailure>,
}

/// Pulls posts from WordPress page by page and reconciles them into
/// local storage. Pages are processed sequentially; posts within a page
/// concurrently, in batches of `batch_size`.
pub struct Reconciler<'a> {
    db: &'a DatabaseConnection,
    wp: &'a WpClient,
    batch_size: usize,
}

impl<'a> Reconciler<'a> {
    pub fn new(db: &'a DatabaseConnection, wp: &'a WpClient, batch_size: usize) -> Self {
        Self {
            db,
            wp,
            batch_size: batch_size.max(1),
        }
    }

    /// Run one sync pass. Fetch or storage errors abort the run;
    /// category restore failures are reported instead.
    pub async fn run(&self, mode: SyncMode) -> Result<SyncOutcome, AppError> {
        let started = Instant::now();
        info!(
            "Sync started: {:?} mode, page size {}",
            mode,
            self.wp.page_size()
        );

        let snapshot = if mode == SyncMode::Full {
            let snapshot = CurationSnapshot::capture(self.db).await?;
            info!("Backed up curation of {} published posts", snapshot.len());
            self.truncate_local().await?;
            snapshot
        } else {
            CurationSnapshot::empty()
        };

        let mut outcome = SyncOutcome::default();
        let mut page = 1u32;

        loop {
            let fetch_started = Instant::now();
            let Some(posts) = self.wp.fetch_page(page).await? else {
                break;
            };
            if posts.is_empty() {
                break;
            }
            info!(
                "Fetched page {} ({} posts) in {}ms",
                page,
                posts.len(),
                fetch_started.elapsed().as_millis()
            );

            let process_started = Instant::now();
            let reports = try_join_all(
                posts
                    .chunks(self.batch_size)
                    .map(|batch| self.reconcile_batch(batch, &snapshot)),
            )
            .await?;
            for mut report in reports {
                outcome.restore_failures.append(&mut report);
            }

            outcome.imported += posts.len() as u64;
            info!(
                "Processed {} posts in {}ms (total {})",
                posts.len(),
                process_started.elapsed().as_millis(),
                outcome.imported
            );

            page += 1;
        }

        outcome.duration_ms = started.elapsed().as_millis() as u64;
        if outcome.imported > 0 {
            let raw = outcome.duration_ms as f64 / outcome.imported as f64;
            outcome.average_per_post_ms = (raw * 100.0).round() / 100.0;
        }
        if !outcome.restore_failures.is_empty() {
            warn!(
                "{} category links could not be restored",
                outcome.restore_failures.len()
            );
        }
        info!(
            "Sync completed: {} posts in {}ms ({}ms/post)",
            outcome.imported, outcome.duration_ms, outcome.average_per_post_ms
        );

        Ok(outcome)
    }

    async fn reconcile_batch(
        &self,
        batch: &[WpPost],
        snapshot: &CurationSnapshot,
    ) -> Result<Vec<RestoreFailure>, AppError> {
        let reports = try_join_all(
            batch
                .iter()
                .map(|wp_post| self.reconcile_post(wp_post, snapshot)),
        )
        .await?;

        Ok(reports.into_iter().flatten().collect())
    }

    /// Upsert one WordPress post and rebuild its image rows. On update
    /// only source-owned columns change; curation columns are never
    /// touched. Returns the category restores that could not be applied.
    async fn reconcile_post(
        &self,
        wp_post: &WpPost,
        snapshot: &CurationSnapshot,
    ) -> Result<Vec<RestoreFailure>, AppError> {
        let title = html::decode_entities(&wp_post.title.rendered);
        let cover = wp_post.cover_image_url().map(str::to_owned);
        let images = html::extract_image_urls(&wp_post.content.rendered);
        let preserved = snapshot.get(wp_post.id);

        let existing = post::Entity::find()
            .filter(post::Column::WpId.eq(wp_post.id))
            .one(self.db)
            .await?;

        let saved = match existing {
            Some(current) => {
                let mut active: post::ActiveModel = current.into();
                active.title = Set(title);
                active.slug = Set(wp_post.slug.clone());
                active.content_html = Set(wp_post.content.rendered.clone());
                active.cover_image = Set(cover);
                active.wp_status = Set(wp_post.status.clone());
                active.wp_created_at = Set(wp_post.created_at_utc());
                active.updated_at = Set(Utc::now());
                active.update(self.db).await?
            }
            None => {
                let now = Utc::now();
                post::ActiveModel {
                    wp_id: Set(wp_post.id),
                    title: Set(title),
                    slug: Set(wp_post.slug.clone()),
                    content_html: Set(wp_post.content.rendered.clone()),
                    cover_image: Set(cover),
                    wp_status: Set(wp_post.status.clone()),
                    is_published: Set(preserved.is_some_and(|p| p.is_published)),
                    wp_created_at: Set(wp_post.created_at_utc()),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(self.db)
                .await?
            }
        };

        self.replace_images(saved.id, &images).await?;

        match preserved {
            Some(preserved) if !preserved.category_ids.is_empty() => {
                self.restore_categories(saved.id, wp_post.id, &preserved.category_ids)
                    .await
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Drop and reinsert the image rows of one post. Duplicate URLs
    /// within the post collapse to a single row.
    async fn replace_images(&self, post_id: i32, urls: &[String]) -> Result<(), AppError> {
        post_image::Entity::delete_many()
            .filter(post_image::Column::PostId.eq(post_id))
            .exec(self.db)
            .await?;

        for url in urls {
            let model = post_image::ActiveModel {
                url: Set(url.clone()),
                post_id: Set(post_id),
                created_at: Set(Utc::now()),
                ..Default::default()
            };

            let result = post_image::Entity::insert(model)
                .on_conflict(
                    OnConflict::columns([post_image::Column::PostId, post_image::Column::Url])
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(self.db)
                .await;

            match result {
                Ok(_) => {}
                Err(DbErr::RecordNotInserted) => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }

    /// Reattach preserved category links. A link that no longer matches
    /// an existing category is reported, never fatal.
    async fn restore_categories(
        &self,
        post_id: i32,
        wp_id: i64,
        category_ids: &[i32],
    ) -> Result<Vec<RestoreFailure>, AppError> {
        post_category::Entity::delete_many()
            .filter(post_category::Column::PostId.eq(post_id))
            .exec(self.db)
            .await?;

        let mut failures = Vec::new();
        for &category_id in category_ids {
            let model = post_category::ActiveModel {
                post_id: Set(post_id),
                category_id: Set(category_id),
            };

            let result = post_category::Entity::insert(model)
                .on_conflict(
                    OnConflict::columns([
                        post_category::Column::PostId,
                        post_category::Column::CategoryId,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(self.db)
                .await;

            match result {
                Ok(_) => {}
                Err(DbErr::RecordNotInserted) => {}
                Err(err) => {
                    warn!(
                        "Could not restore category {} for post {}: {}",
                        category_id, wp_id, err
                    );
                    failures.push(RestoreFailure {
                        wp_id,
                        category_id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        Ok(failures)
    }

    /// Clear all post, association and image rows in one transaction.
    async fn truncate_local(&self) -> Result<(), AppError> {
        let txn = self.db.begin().await?;

        post_category::Entity::delete_many().exec(&txn).await?;
        post_author::Entity::delete_many().exec(&txn).await?;
        post_image::Entity::delete_many().exec(&txn).await?;
        post::Entity::delete_many().exec(&txn).await?;

        txn.commit().await?;
        info!("Cleared local post storage for full resync");
        Ok(())
    }
}
