use std::time::Duration;

use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::info;

use crate::entity::{post, post_image};

pub async fn init_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    // Set connection pool options
    opt.max_connections(100)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(8))
        .max_lifetime(Duration::from_secs(8))
        .sqlx_logging(true);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("server::entity::*")
        .sync(&db)
        .await?;

    ensure_indexes(&db).await?;

    Ok(db)
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite indexes, so we create
/// them manually on startup.
async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Unique (post_id, url): ON CONFLICT target for image inserts.
    // Sync cannot run without it, so failure here is fatal.
    let stmt = Index::create()
        .if_not_exists()
        .unique()
        .name("idx_post_image_post_url")
        .table(post_image::Entity)
        .col(post_image::Column::PostId)
        .col(post_image::Column::Url)
        .to_string(PostgresQueryBuilder);

    db.execute_unprepared(&stmt).await?;
    info!("Ensured index idx_post_image_post_url exists");

    // Composite index for listing queries:
    // SELECT ... FROM post WHERE is_published = ? ORDER BY wp_created_at DESC
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_post_published_created")
        .table(post::Entity)
        .col(post::Column::IsPublished)
        .col(post::Column::WpCreatedAt)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => {
            info!("Ensured index idx_post_published_created exists");
        }
        Err(e) => {
            tracing::warn!("Failed to create index idx_post_published_created: {}", e);
        }
    }

    Ok(())
}
