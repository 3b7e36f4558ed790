use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/recommendations",
            get(handlers::list_recommendations).post(handlers::create_recommendation),
        )
        .route("/recommendations/random", get(handlers::random_recommendation))
        .route("/recommendations/top/:amount", get(handlers::top_recommendations))
        .route("/recommendations/:id", get(handlers::get_recommendation))
        .route("/recommendations/:id/upvote", post(handlers::upvote))
        .route("/recommendations/:id/downvote", post(handlers::downvote));

    if state.enable_test_routes {
        router = router.route("/recommendations/reset", post(handlers::reset));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
