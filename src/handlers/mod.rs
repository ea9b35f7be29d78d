pub mod pages;
pub mod public;
pub mod webhooks;

use axum::{Router, extract::DefaultBodyLimit};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// JSON request bodies up to 20 MB
const BODY_LIMIT: usize = 20 * 1024 * 1024;

/// The full gateway: catalog and checkout endpoints, the webhook receiver,
/// and optionally the storefront's result pages.
pub fn app(state: AppState, storefront_pages: bool) -> Router {
    let mut router = Router::new()
        .merge(public::router())
        .merge(webhooks::router());

    if storefront_pages {
        router = router.merge(pages::router());
    }

    router
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
