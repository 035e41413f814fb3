//! Handlers for `/verses` and `/verses/{id}` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/verses` | `?page&limit&chapter&search&tags&status` |
//! | `POST`   | `/verses` | Body: [`VerseDraft`]; returns 201, malformed JSON 400 |
//! | `GET`    | `/verses/{id}` | Active or not; 404 if absent |
//! | `PUT`    | `/verses/{id}` | Full update |
//! | `PATCH`  | `/verses/{id}` | Partial update |
//! | `DELETE` | `/verses/{id}` | Soft delete (`active = false`) |
//! | `DELETE` | `/verses/{id}/permanent` | Hard delete |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use gita_core::{
  Error,
  filter::ListParams,
  page::Pagination,
  service::VerseService,
  store::VerseStore,
  verse::{VerseDraft, VerseRecord},
  view::ResolvedVerse,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{ApiError, JsonBody};

/// `{ "message": ..., "verse": ... }` envelope returned by every write.
#[derive(Debug, Serialize)]
pub struct Outcome {
  pub message: &'static str,
  pub verse:   ResolvedVerse,
}

impl Outcome {
  fn new(message: &'static str, record: VerseRecord) -> Self {
    Self { message, verse: record.into() }
  }
}

pub(crate) fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
  Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("invalid verse id {raw:?}")))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct VerseList {
  pub verses:     Vec<ResolvedVerse>,
  pub pagination: Pagination,
}

/// `GET /verses`
pub async fn list<S>(
  State(svc): State<Arc<VerseService<S>>>,
  Query(params): Query<ListParams>,
) -> Result<Json<VerseList>, ApiError>
where
  S: VerseStore + 'static,
  Error: From<S::Error>,
{
  let page = svc.list(&params).await?.map(ResolvedVerse::from);
  Ok(Json(VerseList { verses: page.items, pagination: page.pagination }))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /verses/{id}`
pub async fn get_one<S>(
  State(svc): State<Arc<VerseService<S>>>,
  Path(id): Path<String>,
) -> Result<Json<ResolvedVerse>, ApiError>
where
  S: VerseStore + 'static,
  Error: From<S::Error>,
{
  let record = svc
    .get(parse_id(&id)?)
    .await?
    .ok_or_else(ApiError::verse_not_found)?;
  Ok(Json(record.into()))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /verses`
pub async fn create<S>(
  State(svc): State<Arc<VerseService<S>>>,
  JsonBody(draft): JsonBody<VerseDraft>,
) -> Result<impl IntoResponse, ApiError>
where
  S: VerseStore + 'static,
  Error: From<S::Error>,
{
  let record = svc.create(draft).await?;
  tracing::info!(verse = %record.reference(), id = %record.id, "verse created");
  Ok((StatusCode::CREATED, Json(Outcome::new("Verse created successfully", record))))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /verses/{id}`
pub async fn replace<S>(
  State(svc): State<Arc<VerseService<S>>>,
  Path(id): Path<String>,
  JsonBody(draft): JsonBody<VerseDraft>,
) -> Result<Json<Outcome>, ApiError>
where
  S: VerseStore + 'static,
  Error: From<S::Error>,
{
  let record = svc
    .replace(parse_id(&id)?, draft)
    .await?
    .ok_or_else(ApiError::verse_not_found)?;
  Ok(Json(Outcome::new("Verse updated successfully", record)))
}

/// `PATCH /verses/{id}`
pub async fn patch<S>(
  State(svc): State<Arc<VerseService<S>>>,
  Path(id): Path<String>,
  JsonBody(draft): JsonBody<VerseDraft>,
) -> Result<Json<Outcome>, ApiError>
where
  S: VerseStore + 'static,
  Error: From<S::Error>,
{
  let record = svc
    .patch(parse_id(&id)?, draft)
    .await?
    .ok_or_else(ApiError::verse_not_found)?;
  Ok(Json(Outcome::new("Verse updated successfully", record)))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /verses/{id}`
pub async fn soft_delete<S>(
  State(svc): State<Arc<VerseService<S>>>,
  Path(id): Path<String>,
) -> Result<Json<Outcome>, ApiError>
where
  S: VerseStore + 'static,
  Error: From<S::Error>,
{
  let record = svc
    .soft_delete(parse_id(&id)?)
    .await?
    .ok_or_else(ApiError::verse_not_found)?;
  Ok(Json(Outcome::new("Verse deleted successfully", record)))
}

/// `DELETE /verses/{id}/permanent`
pub async fn hard_delete<S>(
  State(svc): State<Arc<VerseService<S>>>,
  Path(id): Path<String>,
) -> Result<Json<Outcome>, ApiError>
where
  S: VerseStore + 'static,
  Error: From<S::Error>,
{
  let record = svc
    .hard_delete(parse_id(&id)?)
    .await?
    .ok_or_else(ApiError::verse_not_found)?;
  tracing::info!(verse = %record.reference(), id = %record.id, "verse permanently deleted");
  Ok(Json(Outcome::new("Verse permanently deleted", record)))
}
