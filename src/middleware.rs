//! Request guards for the item routes.
//!
//! Layered outermost first: [`authenticate`] resolves the bearer token to an
//! [`Actor`], [`load_item`] resolves `{id}` to an item the actor may read, and
//! [`require_cover`] (cover route only) rejects items without a cover.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use folio_library::Actor;
use folio_library::error::ErrorKind;
use folio_model::LibraryItem;

const BEARER: &str = "Bearer ";

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub async fn authenticate(State(state): State<AppState>, mut request: Request, next: Next) -> Result<Response, ApiError> {
    let actor = bearer_token(&request)
        .and_then(|token| state.actor(token))
        .cloned()
        .ok_or(ApiError::Unauthorized)?;
    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

pub async fn load_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let actor = request.extensions().get::<Actor>().ok_or(ApiError::Unauthorized)?;
    let item = state.coordinator.load_for(actor, &item_id).await?;
    request.extensions_mut().insert(item);
    Ok(next.run(request).await)
}

pub async fn require_cover(request: Request, next: Next) -> Result<Response, ApiError> {
    let has_cover = request
        .extensions()
        .get::<LibraryItem>()
        .is_some_and(|item| item.media.has_cover());
    if !has_cover {
        return Err(exn::Exn::from(ErrorKind::NotFound).into());
    }
    Ok(next.run(request).await)
}
