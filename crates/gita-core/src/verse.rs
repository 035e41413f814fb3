//! Verse records, one canonical entity per `(chapter, verse)` pair.
//!
//! Clients submit a [`VerseDraft`]; [`VerseDraft::validate`] turns it into a
//! [`NewVerse`] the store can write. Only the store produces a
//! [`VerseRecord`], stamping the identity and timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, source::CommentarySources};

// ─── Bounds ──────────────────────────────────────────────────────────────────

pub const MIN_CHAPTER: u8 = 1;
pub const MAX_CHAPTER: u8 = 18;

/// Known per-chapter verse counts. Chapters not listed are unbounded.
pub const VERSE_CEILINGS: &[(u8, u32)] = &[(1, 47), (2, 72)];

pub fn verse_ceiling(chapter: u8) -> Option<u32> {
  VERSE_CEILINGS
    .iter()
    .find(|(c, _)| *c == chapter)
    .map(|(_, max)| *max)
}

pub fn is_valid_chapter(chapter: i64) -> bool {
  (i64::from(MIN_CHAPTER)..=i64::from(MAX_CHAPTER)).contains(&chapter)
}

// ─── Stored record ───────────────────────────────────────────────────────────

/// A persisted verse. Derived display fields are not stored here; see
/// [`crate::resolve`] and [`crate::view`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerseRecord {
  pub id:                 Uuid,
  pub chapter:            u8,
  pub verse:              u32,
  pub original_text:      String,
  pub transliteration:    String,
  pub commentary_sources: CommentarySources,
  pub tags:               Vec<String>,
  pub active:             bool,
  /// Raw legacy commentary objects kept verbatim by the batch transform.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub commentaries:       Option<serde_json::Value>,
  pub created_at:         DateTime<Utc>,
  pub updated_at:         DateTime<Utc>,
}

impl VerseRecord {
  /// `"<chapter>.<verse>"`, e.g. `"2.47"`.
  pub fn reference(&self) -> String { format!("{}.{}", self.chapter, self.verse) }
}

// ─── Validated input ─────────────────────────────────────────────────────────

/// A validated, normalized verse ready to be written.
/// Built only by [`VerseDraft::validate`] or the batch transform.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVerse {
  pub chapter:            u8,
  pub verse:              u32,
  pub original_text:      String,
  pub transliteration:    String,
  pub commentary_sources: CommentarySources,
  pub tags:               Vec<String>,
  pub active:             bool,
  pub commentaries:       Option<serde_json::Value>,
}

// ─── Client input ────────────────────────────────────────────────────────────

/// Verse fields as submitted by a client. Every field is optional so that
/// presence is reported by validation rather than by the JSON decoder.
///
/// Identity and timestamp fields (`_id`, `id`, `createdAt`, `updatedAt`) have
/// no slot here and are dropped on decode.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerseDraft {
  pub chapter:            Option<i64>,
  pub verse:              Option<i64>,
  #[serde(alias = "sanskrit")]
  pub original_text:      Option<String>,
  pub transliteration:    Option<String>,
  pub commentary_sources: Option<CommentarySources>,
  pub tags:               Option<Vec<String>>,
  pub active:             Option<bool>,
}

impl VerseDraft {
  /// Check and normalize the draft.
  ///
  /// Order: required fields, trimming, chapter/verse range, chapter-specific
  /// verse ceiling, per-source commentary fields. The first failure wins.
  pub fn validate(self) -> Result<NewVerse> {
    let chapter = self
      .chapter
      .ok_or_else(|| Error::validation("chapter", "Chapter number is required"))?;
    let verse = self
      .verse
      .ok_or_else(|| Error::validation("verse", "Verse number is required"))?;
    let original_text = required_text(
      self.original_text,
      "originalText",
      "Original text is required",
    )?;
    let transliteration = required_text(
      self.transliteration,
      "transliteration",
      "Transliteration is required",
    )?;
    let tags = normalize_tags(self.tags.unwrap_or_default());

    if chapter < i64::from(MIN_CHAPTER) {
      return Err(Error::validation("chapter", "Chapter number must be at least 1"));
    }
    if chapter > i64::from(MAX_CHAPTER) {
      return Err(Error::validation("chapter", "Chapter number cannot exceed 18"));
    }
    if verse < 1 {
      return Err(Error::validation("verse", "Verse number must be at least 1"));
    }
    let chapter = chapter as u8;
    let verse = u32::try_from(verse)
      .map_err(|_| Error::validation("verse", "Verse number is too large"))?;

    if let Some(max) = verse_ceiling(chapter)
      && verse > max
    {
      return Err(Error::validation(
        "verse",
        format!("Chapter {chapter} cannot have more than {max} verses"),
      ));
    }

    let commentary_sources = self.commentary_sources.unwrap_or_default().normalized();
    commentary_sources.check_fields()?;

    Ok(NewVerse {
      chapter,
      verse,
      original_text,
      transliteration,
      commentary_sources,
      tags,
      active: self.active.unwrap_or(true),
      commentaries: None,
    })
  }

  /// Fill every absent field from `existing` (partial update).
  pub fn merged_over(self, existing: &VerseRecord) -> Self {
    Self {
      chapter:            self.chapter.or(Some(i64::from(existing.chapter))),
      verse:              self.verse.or(Some(i64::from(existing.verse))),
      original_text:      self.original_text.or_else(|| Some(existing.original_text.clone())),
      transliteration:    self.transliteration.or_else(|| Some(existing.transliteration.clone())),
      commentary_sources: self
        .commentary_sources
        .or_else(|| Some(existing.commentary_sources.clone())),
      tags:               self.tags.or_else(|| Some(existing.tags.clone())),
      active:             self.active.or(Some(existing.active)),
    }
  }
}

fn required_text(
  value: Option<String>,
  field: &'static str,
  message: &'static str,
) -> Result<String> {
  value
    .map(|s| s.trim().to_owned())
    .filter(|s| !s.is_empty())
    .ok_or_else(|| Error::validation(field, message))
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
  tags
    .into_iter()
    .map(|t| t.trim().to_owned())
    .filter(|t| !t.is_empty())
    .collect()
}

#[cfg(test)]
mod tests {
  use crate::source::{CommentaryEntry, SourceKey};

  use super::*;

  fn draft(chapter: i64, verse: i64) -> VerseDraft {
    VerseDraft {
      chapter: Some(chapter),
      verse: Some(verse),
      original_text: Some("कर्मण्येवाधिकारस्ते".into()),
      transliteration: Some("karmaṇy evādhikāras te".into()),
      ..Default::default()
    }
  }

  fn field_of(err: Error) -> String {
    match err {
      Error::Validation { field, .. } => field,
      other => panic!("expected validation error, got {other:?}"),
    }
  }

  #[test]
  fn valid_draft_is_trimmed_and_defaults_active() {
    let mut d = draft(2, 47);
    d.original_text = Some("  text  ".into());
    d.tags = Some(vec![" karma ".into(), "".into(), "duty".into()]);

    let v = d.validate().unwrap();
    assert_eq!(v.chapter, 2);
    assert_eq!(v.verse, 47);
    assert_eq!(v.original_text, "text");
    assert_eq!(v.tags, vec!["karma", "duty"]);
    assert!(v.active);
    assert!(v.commentaries.is_none());
  }

  #[test]
  fn missing_fields_reported_in_order() {
    let err = VerseDraft::default().validate().unwrap_err();
    assert_eq!(field_of(err), "chapter");

    let mut d = draft(1, 1);
    d.verse = None;
    assert_eq!(field_of(d.validate().unwrap_err()), "verse");

    let mut d = draft(1, 1);
    d.original_text = Some("   ".into());
    assert_eq!(field_of(d.validate().unwrap_err()), "originalText");

    let mut d = draft(1, 1);
    d.transliteration = None;
    assert_eq!(field_of(d.validate().unwrap_err()), "transliteration");
  }

  #[test]
  fn presence_is_checked_before_range() {
    let mut d = draft(40, 1);
    d.transliteration = None;
    assert_eq!(field_of(d.validate().unwrap_err()), "transliteration");
  }

  #[test]
  fn chapter_and_verse_ranges() {
    assert_eq!(field_of(draft(0, 1).validate().unwrap_err()), "chapter");
    assert_eq!(field_of(draft(19, 1).validate().unwrap_err()), "chapter");
    assert_eq!(field_of(draft(3, 0).validate().unwrap_err()), "verse");
    assert!(draft(18, 1).validate().is_ok());
  }

  #[test]
  fn chapter_ceilings() {
    assert!(draft(1, 47).validate().is_ok());
    let err = draft(1, 48).validate().unwrap_err();
    assert_eq!(err.to_string(), "Chapter 1 cannot have more than 47 verses");
    assert!(draft(2, 72).validate().is_ok());
    assert!(draft(2, 73).validate().is_err());
    // Other chapters are unbounded.
    assert!(draft(3, 500).validate().is_ok());
  }

  #[test]
  fn commentary_fields_checked_per_source() {
    let mut d = draft(1, 1);
    d.commentary_sources = Some(
      [(SourceKey::Jaya, CommentaryEntry { ht: Some("x".into()), ..Default::default() })]
        .into_iter()
        .collect(),
    );
    assert_eq!(field_of(d.validate().unwrap_err()), "commentarySources.jaya.ht");
  }

  #[test]
  fn sanskrit_alias_and_client_identity_fields_ignored() {
    let d: VerseDraft = serde_json::from_value(serde_json::json!({
      "_id": "abc",
      "createdAt": "2020-01-01T00:00:00Z",
      "chapter": 4,
      "verse": 7,
      "sanskrit": "yadā yadā hi",
      "transliteration": "yada yada hi",
    }))
    .unwrap();
    let v = d.validate().unwrap();
    assert_eq!(v.original_text, "yadā yadā hi");
  }

  #[test]
  fn merged_over_keeps_existing_fields() {
    let now = Utc::now();
    let existing = VerseRecord {
      id:                 Uuid::new_v4(),
      chapter:            2,
      verse:              48,
      original_text:      "योग: कर्मसु कौशलम्".into(),
      transliteration:    "yogaḥ karmasu kauśalam".into(),
      commentary_sources: CommentarySources::new(),
      tags:               vec!["yoga".into()],
      active:             false,
      commentaries:       None,
      created_at:         now,
      updated_at:         now,
    };

    let patch = VerseDraft { tags: Some(vec!["skill".into()]), ..Default::default() };
    let v = patch.merged_over(&existing).validate().unwrap();
    assert_eq!(v.chapter, 2);
    assert_eq!(v.verse, 48);
    assert_eq!(v.transliteration, existing.transliteration);
    assert_eq!(v.tags, vec!["skill"]);
    assert!(!v.active);
  }
}
