use std::time::Duration;

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use server::entity::{post, post_author, post_category, post_image};

use crate::common::{TestApp, days_ago, routes};

const WP_POSTS_PATH: &str = "/wp-json/wp/v2/posts";

/// One WordPress post fixture in the `?_embed` wire shape.
fn wp_post(id: i64, title: &str, date: &str, content: &str) -> Value {
    json!({
        "id": id,
        "date": date,
        "slug": format!("post-{id}"),
        "status": "publish",
        "title": { "rendered": title },
        "content": { "rendered": content },
        "_embedded": {
            "wp:featuredmedia": [
                { "source_url": format!("https://cdn.example.com/{id}.jpg") }
            ]
        }
    })
}

/// Mock WordPress serving the given pages, one posts array per page,
/// with the usual 400 past the last page.
async fn mock_wp(pages: &[Vec<Value>]) -> MockServer {
    let server = MockServer::start().await;
    for (index, posts) in pages.iter().enumerate() {
        Mock::given(method("GET"))
            .and(path(WP_POSTS_PATH))
            .and(query_param("page", (index + 1).to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(posts))
            .mount(&server)
            .await;
    }
    mount_past_last_page(&server, pages.len() as u32 + 1).await;
    server
}

async fn mount_past_last_page(server: &MockServer, page: u32) {
    Mock::given(method("GET"))
        .and(path(WP_POSTS_PATH))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "rest_post_invalid_page_number",
            "message": "The page number requested is larger than the number of pages available.",
            "data": { "status": 400 }
        })))
        .mount(server)
        .await;
}

async fn find_by_wp_id(app: &TestApp, wp_id: i64) -> Option<post::Model> {
    post::Entity::find()
        .filter(post::Column::WpId.eq(wp_id))
        .one(&app.db)
        .await
        .expect("query post")
}

async fn post_by_wp_id(app: &TestApp, wp_id: i64) -> post::Model {
    find_by_wp_id(app, wp_id).await.expect("post exists")
}

async fn post_count(app: &TestApp) -> u64 {
    post::Entity::find()
        .count(&app.db)
        .await
        .expect("count posts")
}

async fn image_urls_of(app: &TestApp, post_id: i32) -> Vec<String> {
    post_image::Entity::find()
        .filter(post_image::Column::PostId.eq(post_id))
        .order_by_asc(post_image::Column::Id)
        .all(&app.db)
        .await
        .expect("query post_image")
        .into_iter()
        .map(|row| row.url)
        .collect()
}

async fn category_ids_of(app: &TestApp, post_id: i32) -> Vec<i32> {
    let mut ids: Vec<i32> = post_category::Entity::find()
        .filter(post_category::Column::PostId.eq(post_id))
        .all(&app.db)
        .await
        .expect("query post_category")
        .into_iter()
        .map(|link| link.category_id)
        .collect();
    ids.sort_unstable();
    ids
}

async fn author_ids_of(app: &TestApp, post_id: i32) -> Vec<i32> {
    post_author::Entity::find()
        .filter(post_author::Column::PostId.eq(post_id))
        .all(&app.db)
        .await
        .expect("query post_author")
        .into_iter()
        .map(|link| link.author_id)
        .collect()
}

mod incremental_sync {
    use super::*;

    #[tokio::test]
    async fn imports_posts_from_all_pages() {
        let pages = vec![
            vec![
                wp_post(
                    101,
                    "Tips &amp; Tricks",
                    "2024-05-03T10:00:00",
                    r#"<p>Intro</p><img src="https://cdn.example.com/a.png"><img src="https://cdn.example.com/b.png">"#,
                ),
                wp_post(102, "Second", "2024-05-02T10:00:00", "<p>Two</p>"),
                wp_post(103, "Third", "2024-05-01T10:00:00", "<p>Three</p>"),
            ],
            vec![
                wp_post(104, "Fourth", "2024-04-30T10:00:00", "<p>Four</p>"),
                wp_post(105, "Fifth", "2024-04-29T10:00:00", "<p>Five</p>"),
            ],
        ];
        let server = mock_wp(&pages).await;
        let app = TestApp::spawn_with_wp(&server.uri()).await;

        let res = app.get(routes::SYNC).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["success"], true);
        assert_eq!(res.body["imported"], 5);
        assert_eq!(res.body["restoreFailures"], json!([]));
        assert!(res.body["duration"].is_number());

        assert_eq!(post_count(&app).await, 5);

        let first = post_by_wp_id(&app, 101).await;
        assert_eq!(first.title, "Tips & Tricks");
        assert_eq!(first.slug, "post-101");
        assert_eq!(
            first.cover_image.as_deref(),
            Some("https://cdn.example.com/101.jpg")
        );
        assert!(!first.is_published);
        assert_eq!(first.display_order, None);
        assert_eq!(
            image_urls_of(&app, first.id).await,
            vec!["https://cdn.example.com/a.png", "https://cdn.example.com/b.png"]
        );
    }

    #[tokio::test]
    async fn reimport_updates_content_without_touching_curation() {
        let server = MockServer::start().await;
        // First run sees v1, every later run sees v2.
        Mock::given(method("GET"))
            .and(path(WP_POSTS_PATH))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([wp_post(
                201,
                "Old title",
                "2024-05-01T09:00:00",
                "<p>old body</p>",
            )])))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(WP_POSTS_PATH))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([wp_post(
                201,
                "New title",
                "2024-05-01T09:00:00",
                r#"<p>new body</p><img src="https://cdn.example.com/new.png">"#,
            )])))
            .mount(&server)
            .await;
        mount_past_last_page(&server, 2).await;

        let app = TestApp::spawn_with_wp(&server.uri()).await;
        assert_eq!(app.get(routes::SYNC).await.status, 200);

        let imported = post_by_wp_id(&app, 201).await;
        let news = app.seed_category("News", "news").await;
        let approve = app
            .post(&routes::approve(imported.id), &json!({"categoryIds": [news]}))
            .await;
        assert_eq!(approve.status, 200);
        let pin = app
            .post(&routes::order(imported.id), &json!({"displayOrder": 1}))
            .await;
        assert_eq!(pin.status, 200);

        let res = app.get(routes::SYNC).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["imported"], 1);

        let updated = post_by_wp_id(&app, 201).await;
        assert_eq!(updated.id, imported.id);
        assert_eq!(updated.title, "New title");
        assert!(updated.content_html.contains("new body"));
        assert!(updated.is_published);
        assert_eq!(updated.display_order, Some(1));
        assert_eq!(category_ids_of(&app, updated.id).await, vec![news]);
        assert_eq!(
            image_urls_of(&app, updated.id).await,
            vec!["https://cdn.example.com/new.png"]
        );
    }

    #[tokio::test]
    async fn sync_is_idempotent() {
        let pages = vec![vec![
            wp_post(301, "Salt &amp; Pepper", "2024-05-01T08:00:00", "<p>a</p>"),
            wp_post(302, "Two", "2024-05-01T07:00:00", "<p>b</p>"),
        ]];
        let server = mock_wp(&pages).await;
        let app = TestApp::spawn_with_wp(&server.uri()).await;

        let first = app.get(routes::SYNC).await;
        let second = app.get(routes::SYNC).await;

        assert_eq!(first.status, 200);
        assert_eq!(second.status, 200);
        assert_eq!(first.body["imported"], 2);
        assert_eq!(second.body["imported"], 2);
        assert_eq!(post_count(&app).await, 2);

        // The second pass rewrites the same rows without mangling them.
        let reimported = post_by_wp_id(&app, 301).await;
        assert_eq!(reimported.title, "Salt & Pepper");
        assert_eq!(reimported.slug, "post-301");
        assert_eq!(reimported.content_html, "<p>a</p>");
        assert_eq!(
            reimported.cover_image.as_deref(),
            Some("https://cdn.example.com/301.jpg")
        );
    }

    #[tokio::test]
    async fn duplicate_image_urls_collapse() {
        let pages = vec![vec![wp_post(
            311,
            "Gallery",
            "2024-05-01T08:00:00",
            r#"<img src="https://cdn.example.com/one.png"><img src="https://cdn.example.com/one.png">"#,
        )]];
        let server = mock_wp(&pages).await;
        let app = TestApp::spawn_with_wp(&server.uri()).await;

        assert_eq!(app.get(routes::SYNC).await.status, 200);

        let imported = post_by_wp_id(&app, 311).await;
        assert_eq!(
            image_urls_of(&app, imported.id).await,
            vec!["https://cdn.example.com/one.png"]
        );
    }

    #[tokio::test]
    async fn aborts_on_source_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(WP_POSTS_PATH))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let app = TestApp::spawn_with_wp(&server.uri()).await;
        let res = app.get(routes::SYNC).await;

        assert_eq!(res.status, 502);
        assert_eq!(res.body["code"], "SOURCE_FETCH_ERROR");
        assert!(
            res.body["error"]
                .as_str()
                .expect("error message")
                .starts_with("Failed to fetch from WordPress")
        );
        assert_eq!(post_count(&app).await, 0);
    }
}

mod full_resync {
    use super::*;

    #[tokio::test]
    async fn preserves_publish_flag_and_categories() {
        let pages = vec![vec![
            wp_post(401, "Kept", "2024-05-01T08:00:00", "<p>a</p>"),
            wp_post(402, "Untouched", "2024-05-01T07:00:00", "<p>b</p>"),
        ]];
        let server = mock_wp(&pages).await;
        let app = TestApp::spawn_with_wp(&server.uri()).await;

        assert_eq!(app.get(routes::SYNC).await.status, 200);

        let kept = post_by_wp_id(&app, 401).await;
        let tech = app.seed_category("Tech", "tech").await;
        let life = app.seed_category("Life", "life").await;
        let approve = app
            .post(
                &routes::approve(kept.id),
                &json!({"categoryIds": [tech, life]}),
            )
            .await;
        assert_eq!(approve.status, 200);

        let res = app.get(routes::SYNC_FULL).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["imported"], 2);
        assert_eq!(res.body["restoreFailures"], json!([]));

        // Rows are rebuilt from scratch; curation survives via the snapshot.
        let kept = post_by_wp_id(&app, 401).await;
        assert!(kept.is_published);
        assert_eq!(category_ids_of(&app, kept.id).await, vec![tech, life]);

        let untouched = post_by_wp_id(&app, 402).await;
        assert!(!untouched.is_published);
        assert_eq!(category_ids_of(&app, untouched.id).await, Vec::<i32>::new());
    }

    #[tokio::test]
    async fn loses_display_order_and_authors() {
        let pages = vec![vec![wp_post(501, "Pinned", "2024-05-01T08:00:00", "<p>a</p>")]];
        let server = mock_wp(&pages).await;
        let app = TestApp::spawn_with_wp(&server.uri()).await;

        assert_eq!(app.get(routes::SYNC).await.status, 200);

        let pinned = post_by_wp_id(&app, 501).await;
        let news = app.seed_category("News", "news").await;
        let author = app.seed_author("Ada").await;
        let approve = app
            .post(
                &routes::approve(pinned.id),
                &json!({"categoryIds": [news], "authorIds": [author]}),
            )
            .await;
        assert_eq!(approve.status, 200);
        let pin = app
            .post(&routes::order(pinned.id), &json!({"displayOrder": 2}))
            .await;
        assert_eq!(pin.status, 200);

        assert_eq!(app.get(routes::SYNC_FULL).await.status, 200);

        let resynced = post_by_wp_id(&app, 501).await;
        assert!(resynced.is_published);
        assert_eq!(category_ids_of(&app, resynced.id).await, vec![news]);
        // Only the publish flag and category links are snapshotted.
        assert_eq!(resynced.display_order, None);
        assert_eq!(author_ids_of(&app, resynced.id).await, Vec::<i32>::new());
    }

    #[tokio::test]
    async fn removes_posts_deleted_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(WP_POSTS_PATH))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                wp_post(601, "Stays", "2024-05-01T08:00:00", "<p>a</p>"),
                wp_post(602, "Goes", "2024-05-01T07:00:00", "<p>b</p>"),
            ])))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(WP_POSTS_PATH))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([wp_post(
                601,
                "Stays",
                "2024-05-01T08:00:00",
                "<p>a</p>",
            )])))
            .mount(&server)
            .await;
        mount_past_last_page(&server, 2).await;

        let app = TestApp::spawn_with_wp(&server.uri()).await;
        assert_eq!(app.get(routes::SYNC).await.status, 200);
        assert_eq!(post_count(&app).await, 2);

        let res = app.get(routes::SYNC_FULL).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["imported"], 1);

        assert_eq!(post_count(&app).await, 1);
        assert!(find_by_wp_id(&app, 601).await.is_some());
        assert!(find_by_wp_id(&app, 602).await.is_none());
    }

    #[tokio::test]
    async fn deleted_category_is_lost_without_aborting() {
        let pages = vec![vec![wp_post(701, "Orphan", "2024-05-01T08:00:00", "<p>a</p>")]];
        let server = mock_wp(&pages).await;
        let app = TestApp::spawn_with_wp(&server.uri()).await;

        assert_eq!(app.get(routes::SYNC).await.status, 200);

        let orphan = post_by_wp_id(&app, 701).await;
        let doomed = app.seed_category("Doomed", "doomed").await;
        let approve = app
            .post(&routes::approve(orphan.id), &json!({"categoryIds": [doomed]}))
            .await;
        assert_eq!(approve.status, 200);

        // Category removed before the resync: link first, then the row.
        post_category::Entity::delete_many()
            .filter(post_category::Column::PostId.eq(orphan.id))
            .exec(&app.db)
            .await
            .expect("delete post_category");
        server::entity::category::Entity::delete_by_id(doomed)
            .exec(&app.db)
            .await
            .expect("delete category");

        let res = app.get(routes::SYNC_FULL).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["success"], true);
        assert_eq!(res.body["restoreFailures"], json!([]));

        let resynced = post_by_wp_id(&app, 701).await;
        assert!(resynced.is_published);
        assert_eq!(category_ids_of(&app, resynced.id).await, Vec::<i32>::new());
    }

    #[tokio::test]
    async fn category_deleted_mid_resync_is_reported_without_aborting() {
        let server = MockServer::start().await;
        // Page 1 held back long enough to delete the category mid-run.
        Mock::given(method("GET"))
            .and(path(WP_POSTS_PATH))
            .and(query_param("page", "1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([wp_post(
                        801,
                        "Racy",
                        "2024-05-01T08:00:00",
                        "<p>a</p>",
                    )]))
                    .set_delay(Duration::from_millis(600)),
            )
            .mount(&server)
            .await;
        mount_past_last_page(&server, 2).await;

        let app = TestApp::spawn_with_wp(&server.uri()).await;
        let id = app.seed_post(801, "Racy", days_ago(1)).await;
        app.publish_post(id).await;
        let doomed = app.seed_category("Doomed", "doomed").await;
        app.link_category(id, doomed).await;

        // Truncation clears the link rows before the delayed page arrives,
        // so the category row becomes deletable while the snapshot still
        // holds its id.
        let (res, _) = tokio::join!(app.get(routes::SYNC_FULL), async {
            for _ in 0..100 {
                if post_count(&app).await == 0 {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            server::entity::category::Entity::delete_by_id(doomed)
                .exec(&app.db)
                .await
                .expect("delete category");
        });

        assert_eq!(res.status, 200);
        assert_eq!(res.body["success"], true);
        assert_eq!(res.body["imported"], 1);

        let failures = res.body["restoreFailures"].as_array().expect("failures");
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0]["wpId"], 801);
        assert_eq!(failures[0]["categoryId"], doomed);
        assert!(!failures[0]["reason"].as_str().expect("reason").is_empty());

        // The post itself lands published, minus the dead link.
        let resynced = post_by_wp_id(&app, 801).await;
        assert!(resynced.is_published);
        assert_eq!(category_ids_of(&app, resynced.id).await, Vec::<i32>::new());
    }
}
