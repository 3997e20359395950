use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::body::Body;
use axum::extract::{Extension, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use folio_library::{Actor, ItemView};
use folio_model::{ItemPatch, LibraryItem, MediaPatch};
use folio_render::{ImageFormat, RenderOptions};
use serde::Deserialize;
use std::num::NonZeroU32;

#[derive(Debug, Default, Deserialize)]
pub struct FindQuery {
    /// `1` or `true` to expand author and series references.
    #[serde(default)]
    pub expanded: Option<String>,
}
impl FindQuery {
    fn expanded(&self) -> bool {
        matches!(self.expanded.as_deref(), Some("1" | "true"))
    }
}

pub async fn find_item(
    State(state): State<AppState>,
    Extension(item): Extension<LibraryItem>,
    Query(query): Query<FindQuery>,
) -> Result<Json<ItemView>, ApiError> {
    Ok(Json(state.coordinator.view(item, query.expanded()).await?))
}

pub async fn update_item(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Extension(item): Extension<LibraryItem>,
    Json(patch): Json<ItemPatch>,
) -> Result<Json<LibraryItem>, ApiError> {
    Ok(Json(state.coordinator.update_item(&actor, &item, patch).await?))
}

pub async fn update_media(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Extension(item): Extension<LibraryItem>,
    Json(patch): Json<MediaPatch>,
) -> Result<Json<LibraryItem>, ApiError> {
    Ok(Json(state.coordinator.update_media(&actor, &item, patch).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct CoverQuery {
    #[serde(default)]
    pub width: Option<NonZeroU32>,
    #[serde(default)]
    pub height: Option<NonZeroU32>,
    /// Overrides `Accept` negotiation.
    #[serde(default)]
    pub format: Option<String>,
}
impl CoverQuery {
    fn options(&self, headers: &HeaderMap, max_dimension: u32) -> Result<RenderOptions, ApiError> {
        if let Some(size) = [self.width, self.height].into_iter().flatten().find(|size| size.get() > max_dimension) {
            return Err(ApiError::BadRequest(format!(
                "cover size {size} exceeds the maximum of {max_dimension}"
            )));
        }
        let format = match &self.format {
            Some(format) => format.parse().map_err(|err| ApiError::BadRequest(format!("{err}")))?,
            None => ImageFormat::negotiate(headers.get(header::ACCEPT).and_then(|v| v.to_str().ok())),
        };
        Ok(RenderOptions::new(format).with_width(self.width).with_height(self.height))
    }
}

pub async fn cover(
    State(state): State<AppState>,
    Extension(item): Extension<LibraryItem>,
    Query(query): Query<CoverQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let options = query.options(&headers, state.max_cover_dimension)?;
    let cover = state.coordinator.cover(&item, &options).await?;
    let etag = format!("\"{}\"", cover.etag);
    let not_modified = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|candidates| candidates.split(',').any(|candidate| candidate.trim() == etag));
    if not_modified {
        return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
    }
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, cover.format.mime_type().to_string()),
            (header::ETAG, etag),
            (header::CACHE_CONTROL, "private, max-age=86400".to_string()),
            (header::VARY, "Accept".to_string()),
        ],
        Body::from(cover.bytes),
    )
        .into_response())
}
