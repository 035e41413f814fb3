//! `GET /verses/stats/overview`

use std::sync::Arc;

use axum::{Json, extract::State};
use gita_core::{
  Error,
  service::{Stats, VerseService},
  store::VerseStore,
};

use crate::error::ApiError;

pub async fn overview<S>(
  State(svc): State<Arc<VerseService<S>>>,
) -> Result<Json<Stats>, ApiError>
where
  S: VerseStore + 'static,
  Error: From<S::Error>,
{
  Ok(Json(svc.stats().await?))
}
