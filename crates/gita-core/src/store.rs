//! The `VerseStore` trait implemented by storage backends.
//!
//! Implemented by storage backends (e.g. `gita-store-sqlite`). The service
//! layer and the HTTP API depend on this abstraction, not on a backend.

use std::future::Future;

use serde::Serialize;
use uuid::Uuid;

use crate::{
  filter::{VerseFilter, Visibility},
  page::Window,
  verse::{NewVerse, VerseRecord},
};

/// Number of active records in one chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChapterCount {
  pub chapter: u8,
  pub count:   u64,
}

/// Whether an upsert wrote a new record or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
  Created,
  Updated,
}

/// Abstraction over a verse store backend.
///
/// Backends must enforce `(chapter, verse)` uniqueness across every record,
/// active or not, with a store-level constraint and report violations so
/// that they convert into [`crate::Error::Duplicate`]. Backends stamp `id`,
/// `created_at` and `updated_at`.
///
/// All methods return `Send` futures so the trait can be used behind `axum`.
pub trait VerseStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Insert a new record. Fails if `(chapter, verse)` is taken.
  fn insert(
    &self,
    verse: NewVerse,
  ) -> impl Future<Output = Result<VerseRecord, Self::Error>> + Send + '_;

  /// Overwrite the client-editable fields of record `id`, keeping its
  /// identity, `created_at` and archived `commentaries`. `None` if absent.
  fn replace(
    &self,
    id: Uuid,
    verse: NewVerse,
  ) -> impl Future<Output = Result<Option<VerseRecord>, Self::Error>> + Send + '_;

  /// Set the soft-delete flag. `None` if absent.
  fn set_active(
    &self,
    id: Uuid,
    active: bool,
  ) -> impl Future<Output = Result<Option<VerseRecord>, Self::Error>> + Send + '_;

  /// Permanently remove a record, returning it. `None` if absent.
  fn delete(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<VerseRecord>, Self::Error>> + Send + '_;

  /// Insert, or overwrite every field (including `commentaries`) of the record
  /// already holding `(chapter, verse)`.
  fn upsert(
    &self,
    verse: NewVerse,
  ) -> impl Future<Output = Result<(VerseRecord, Upsert), Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Lookup by surrogate id, regardless of `active`.
  fn get(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<VerseRecord>, Self::Error>> + Send + '_;

  /// Lookup by natural key, honouring `visibility`.
  fn find_by_key(
    &self,
    chapter: u8,
    verse: u32,
    visibility: Visibility,
  ) -> impl Future<Output = Result<Option<VerseRecord>, Self::Error>> + Send + '_;

  /// Records matching `filter`, ordered by `(chapter, verse)` ascending, then
  /// sliced by `window` if given.
  fn find<'a>(
    &'a self,
    filter: &'a VerseFilter,
    window: Option<Window>,
  ) -> impl Future<Output = Result<Vec<VerseRecord>, Self::Error>> + Send + 'a;

  fn count<'a>(
    &'a self,
    filter: &'a VerseFilter,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  /// Active record counts grouped by chapter, chapters ascending.
  fn chapter_counts(
    &self,
  ) -> impl Future<Output = Result<Vec<ChapterCount>, Self::Error>> + Send + '_;
}
