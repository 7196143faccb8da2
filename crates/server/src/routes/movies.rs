use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::Response,
};

use screenlog_core::models::{CreateMovie, Movie, UpdateMovie, validate_movie};
use screenlog_core::validator::Validator;

use crate::AppState;
use crate::codec::{JsonBody, json_envelope};
use crate::error::{ApiError, ApiResult};

/// Path identifiers that fail to parse are indistinguishable from absent
/// records, so both map to 404 before any repository call.
fn parse_id(raw: &str) -> ApiResult<i64> {
    match raw.parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(ApiError::not_found()),
    }
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    JsonBody(input): JsonBody<CreateMovie>,
) -> ApiResult<Response> {
    let movie = Movie::from(input);

    let mut v = Validator::new();
    validate_movie(&mut v, &movie);
    if !v.valid() {
        return Err(ApiError::failed_validation(v.into_errors()));
    }

    let movie = state.movie_service.create(&movie).await?;

    // Point the client at the canonical URL of the new resource
    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/v1/movies/{}", movie.id)) {
        headers.insert(header::LOCATION, location);
    }

    json_envelope(StatusCode::CREATED, "movie", &movie, Some(headers))
}

pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id = parse_id(&id)?;

    let movie = state.movie_service.get_by_id(id).await?;

    json_envelope(StatusCode::OK, "movie", &movie, None)
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<UpdateMovie>,
) -> ApiResult<Response> {
    let id = parse_id(&id)?;

    let mut movie = state.movie_service.get_by_id(id).await?;

    if let Some(title) = input.title {
        movie.title = title;
    }
    if let Some(year) = input.year {
        movie.year = year;
    }
    if let Some(runtime) = input.runtime {
        movie.runtime = runtime;
    }
    if let Some(genres) = input.genres {
        movie.genres = genres;
    }

    let mut v = Validator::new();
    validate_movie(&mut v, &movie);
    if !v.valid() {
        return Err(ApiError::failed_validation(v.into_errors()));
    }

    let movie = state.movie_service.update(&movie).await?;

    json_envelope(StatusCode::OK, "movie", &movie, None)
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id = parse_id(&id)?;

    state.movie_service.delete(id).await?;

    json_envelope(StatusCode::OK, "message", &"movie successfully deleted", None)
}
