pub mod health;
pub mod posts;
pub mod votes;

pub use health::health_check;
pub use posts::{create_post, delete_post, get_post, list_posts};
pub use votes::cast_vote;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Build the API router
///
/// CORS is applied by the binary; tests drive this router directly.
pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/health", get(health_check))
        .route("/api/posts", post(create_post).get(list_posts))
        .route("/api/posts/{id}", get(get_post).delete(delete_post))
        .route("/api/votes", post(cast_vote));

    if state.config.log_requests {
        app = app.layer(TraceLayer::new_for_http());
    }

    app.with_state(state)
}
