//! HTTP surface for the folio catalog.
//!
//! | Route                     | Method  | Operation                                   |
//! |---------------------------|---------|---------------------------------------------|
//! | `/items/{id}`             | `GET`   | Read an item, `?expanded=1` to denormalize. |
//! | `/items/{id}`             | `PATCH` | Whole-item update.                          |
//! | `/items/{id}/media`       | `PATCH` | Media-only update.                          |
//! | `/items/{id}/cover`       | `GET`   | Rendered cover (`width`, `height`, `format`). |
//!
//! Every route requires `Authorization: Bearer <token>`.

pub mod error;
mod handlers;
mod middleware;
mod state;

pub use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

pub fn router(state: AppState) -> Router {
    let cover = Router::new()
        .route("/items/{id}/cover", get(handlers::cover))
        .route_layer(axum::middleware::from_fn(middleware::require_cover));

    Router::new()
        .route("/items/{id}", get(handlers::find_item).patch(handlers::update_item))
        .route("/items/{id}/media", axum::routing::patch(handlers::update_media))
        .merge(cover)
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), middleware::load_item))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), middleware::authenticate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
