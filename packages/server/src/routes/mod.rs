use axum::{
    Router,
    routing::{get, post},
};
use utoipa_axum::router::OpenApiRouter;

use crate::handlers;
use crate::state::AppState;

pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/sync", sync_routes().into())
        .nest("/posts", post_routes().into())
        .nest("/admin", admin_routes().into())
}

fn sync_routes() -> Router<AppState> {
    Router::new().route("/", get(handlers::sync::sync_posts))
}

fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::post::list_posts))
        .route(
            "/{id}",
            get(handlers::post::get_post).delete(handlers::admin::delete_post),
        )
        .route(
            "/{id}/order",
            get(handlers::admin::get_display_order).post(handlers::admin::set_display_order),
        )
        .route("/{id}/approve", post(handlers::admin::approve_post))
        .route("/{id}/reapprove", post(handlers::admin::reapprove_post))
}

fn admin_routes() -> Router<AppState> {
    Router::new().route("/posts", get(handlers::admin::list_admin_posts))
}
