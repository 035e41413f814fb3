//! CRUD operations over an injected [`VerseStore`], exposed as [`VerseService`].
//!
//! Validation happens here, before the store is touched; uniqueness is left
//! to the store's constraint. Lookups that find nothing return `Ok(None)`.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  filter::{ListParams, VerseFilter, Visibility},
  migrate::{self, MigrationReport},
  page::{DEFAULT_MAX_LIMIT, Page, PageRequest, Pagination},
  store::{ChapterCount, VerseStore},
  verse::{self, VerseDraft, VerseRecord},
};

/// Active verses of one chapter, ordered by verse.
#[derive(Debug, Clone)]
pub struct ChapterListing {
  pub chapter: u8,
  pub verses:  Vec<VerseRecord>,
}

impl ChapterListing {
  pub fn count(&self) -> usize { self.verses.len() }
}

/// Aggregate counts over active records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
  pub total_records:      u64,
  pub total_chapters:     usize,
  pub per_chapter_counts: Vec<ChapterCount>,
}

/// Verse operations bound to one store handle.
pub struct VerseService<S> {
  store:     Arc<S>,
  max_limit: u32,
}

impl<S> VerseService<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store, max_limit: DEFAULT_MAX_LIMIT } }

  /// Cap applied to the `limit` list parameter.
  pub fn with_max_limit(self, max_limit: u32) -> Self { Self { max_limit, ..self } }

  pub fn store(&self) -> &Arc<S> { &self.store }
}

impl<S> VerseService<S>
where
  S: VerseStore,
  Error: From<S::Error>,
{
  // ── Queries ───────────────────────────────────────────────────────────

  /// Filtered, ordered, paginated listing. Pages past the end are empty.
  pub async fn list(&self, params: &ListParams) -> Result<Page<VerseRecord>> {
    let filter = VerseFilter::from_params(params)?;
    let request = PageRequest::new(params.page, params.limit)?.capped(self.max_limit);

    let total = self.store.count(&filter).await?;
    let items = if request.skip() >= total {
      Vec::new()
    } else {
      self.store.find(&filter, Some(request.window())).await?
    };

    Ok(Page { items, pagination: Pagination::new(request, total) })
  }

  /// Lookup by id, active or not.
  pub async fn get(&self, id: Uuid) -> Result<Option<VerseRecord>> {
    Ok(self.store.get(id).await?)
  }

  /// Every active verse of `chapter`, ordered by verse.
  pub async fn by_chapter(&self, chapter: i64) -> Result<ChapterListing> {
    if !verse::is_valid_chapter(chapter) {
      return Err(Error::InvalidArgument(
        "Chapter number must be between 1 and 18".into(),
      ));
    }
    let chapter = chapter as u8;
    let verses = self.store.find(&VerseFilter::for_chapter(chapter), None).await?;
    Ok(ChapterListing { chapter, verses })
  }

  /// The active verse at `chapter.verse`.
  pub async fn by_reference(&self, chapter: u32, verse: u32) -> Result<Option<VerseRecord>> {
    let Ok(chapter) = u8::try_from(chapter) else {
      return Ok(None);
    };
    if !verse::is_valid_chapter(i64::from(chapter)) {
      return Ok(None);
    }
    Ok(self.store.find_by_key(chapter, verse, Visibility::Active).await?)
  }

  pub async fn stats(&self) -> Result<Stats> {
    let per_chapter_counts = self.store.chapter_counts().await?;
    Ok(Stats {
      total_records: per_chapter_counts.iter().map(|c| c.count).sum(),
      total_chapters: per_chapter_counts.len(),
      per_chapter_counts,
    })
  }

  // ── Writes ────────────────────────────────────────────────────────────

  pub async fn create(&self, draft: VerseDraft) -> Result<VerseRecord> {
    let verse = draft.validate()?;
    Ok(self.store.insert(verse).await?)
  }

  /// Full update: every required field must be supplied. Fields that are
  /// not supplied are reset (tags and sources to empty), except `active`
  /// which is kept.
  pub async fn replace(&self, id: Uuid, mut draft: VerseDraft) -> Result<Option<VerseRecord>> {
    let Some(existing) = self.store.get(id).await? else {
      return Ok(None);
    };
    draft.active = draft.active.or(Some(existing.active));
    let verse = draft.validate()?;
    Ok(self.store.replace(id, verse).await?)
  }

  /// Partial update: only supplied fields change.
  pub async fn patch(&self, id: Uuid, draft: VerseDraft) -> Result<Option<VerseRecord>> {
    let Some(existing) = self.store.get(id).await? else {
      return Ok(None);
    };
    let verse = draft.merged_over(&existing).validate()?;
    Ok(self.store.replace(id, verse).await?)
  }

  /// Mark inactive; the record stays in storage.
  pub async fn soft_delete(&self, id: Uuid) -> Result<Option<VerseRecord>> {
    Ok(self.store.set_active(id, false).await?)
  }

  /// Remove permanently. A second call for the same id returns `None`.
  pub async fn hard_delete(&self, id: Uuid) -> Result<Option<VerseRecord>> {
    Ok(self.store.delete(id).await?)
  }

  /// Run the legacy batch transform against this service's store.
  pub async fn migrate<I>(&self, records: I) -> MigrationReport
  where
    I: IntoIterator<Item = serde_json::Value>,
  {
    migrate::run(self.store.as_ref(), records).await
  }
}
