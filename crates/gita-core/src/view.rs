//! Read models returned to the presentation layer. Never stored.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{resolve::Resolved, verse::VerseRecord};

/// The full shape: every stored field, every raw commentary source, plus the
/// reference and the resolved display fields.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedVerse {
  #[serde(flatten)]
  pub record:    VerseRecord,
  pub reference: String,
  #[serde(flatten)]
  pub resolved:  Resolved,
}

impl From<VerseRecord> for ResolvedVerse {
  fn from(record: VerseRecord) -> Self {
    let resolved = Resolved::from_sources(&record.commentary_sources);
    Self { reference: record.reference(), record, resolved }
  }
}

/// The simplified shape: resolved fields only, with the fixed
/// `["chapter-N", "verse-M"]` tags instead of the stored ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerseSummary {
  pub id:              Uuid,
  pub chapter:         u8,
  pub verse:           u32,
  pub reference:       String,
  pub original_text:   String,
  pub transliteration: String,
  pub translation:     String,
  pub meaning:         String,
  pub commentary:      String,
  pub tags:            Vec<String>,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

impl From<VerseRecord> for VerseSummary {
  fn from(record: VerseRecord) -> Self {
    let Resolved { translation, meaning, commentary } =
      Resolved::from_sources(&record.commentary_sources);
    Self {
      id: record.id,
      chapter: record.chapter,
      verse: record.verse,
      reference: record.reference(),
      tags: vec![format!("chapter-{}", record.chapter), format!("verse-{}", record.verse)],
      original_text: record.original_text,
      transliteration: record.transliteration,
      translation,
      meaning,
      commentary,
      created_at: record.created_at,
      updated_at: record.updated_at,
    }
  }
}
