//! Handlers addressing verses by chapter and verse number.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use gita_core::{
  Error,
  service::VerseService,
  store::VerseStore,
  verse::VerseRecord,
  view::{ResolvedVerse, VerseSummary},
};
use serde::Serialize;

use crate::error::ApiError;

const CHAPTER_RANGE: &str = "Chapter number must be between 1 and 18";

#[derive(Debug, Serialize)]
pub struct ChapterBody {
  pub chapter: u8,
  pub verses:  Vec<ResolvedVerse>,
  pub count:   usize,
}

/// The full shape with a retrieval message alongside the record fields.
#[derive(Debug, Serialize)]
pub struct FullVerse {
  #[serde(flatten)]
  pub verse:   ResolvedVerse,
  pub message: &'static str,
}

/// `GET /verses/chapter/{chapter}`
pub async fn by_chapter<S>(
  State(svc): State<Arc<VerseService<S>>>,
  Path(chapter): Path<String>,
) -> Result<Json<ChapterBody>, ApiError>
where
  S: VerseStore + 'static,
  Error: From<S::Error>,
{
  let chapter: i64 = chapter
    .trim()
    .parse()
    .map_err(|_| ApiError::BadRequest(CHAPTER_RANGE.into()))?;
  let listing = svc.by_chapter(chapter).await?;
  let count = listing.count();
  Ok(Json(ChapterBody {
    chapter: listing.chapter,
    verses: listing.verses.into_iter().map(ResolvedVerse::from).collect(),
    count,
  }))
}

/// `GET /verses/chapter/{chapter}/{verse}`, simplified shape.
pub async fn summary<S>(
  State(svc): State<Arc<VerseService<S>>>,
  Path(key): Path<(String, String)>,
) -> Result<Json<VerseSummary>, ApiError>
where
  S: VerseStore + 'static,
  Error: From<S::Error>,
{
  let record = lookup(&svc, &key).await?;
  Ok(Json(record.into()))
}

/// `GET /verses/chapter/{chapter}/{verse}/full`
pub async fn full<S>(
  State(svc): State<Arc<VerseService<S>>>,
  Path(key): Path<(String, String)>,
) -> Result<Json<FullVerse>, ApiError>
where
  S: VerseStore + 'static,
  Error: From<S::Error>,
{
  let record = lookup(&svc, &key).await?;
  Ok(Json(FullVerse {
    verse:   record.into(),
    message: "Full verse data with commentaries retrieved successfully",
  }))
}

/// Numbers that do not parse address no verse.
async fn lookup<S>(
  svc: &VerseService<S>,
  (chapter, verse): &(String, String),
) -> Result<VerseRecord, ApiError>
where
  S: VerseStore + 'static,
  Error: From<S::Error>,
{
  let (Ok(chapter), Ok(verse)) = (chapter.trim().parse::<u32>(), verse.trim().parse::<u32>()) else {
    return Err(ApiError::verse_not_found());
  };
  svc
    .by_reference(chapter, verse)
    .await?
    .ok_or_else(ApiError::verse_not_found)
}
