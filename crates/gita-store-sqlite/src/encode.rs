//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, UUIDs hyphenated lowercase strings, and
//! nested documents compact JSON.

use chrono::{DateTime, Utc};
use gita_core::{
  source::{CommentarySources, FieldRef},
  verse::{NewVerse, VerseRecord},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── JSON paths ──────────────────────────────────────────────────────────────

/// `json_extract` path of a commentary field, e.g. `$.tej.et`.
pub fn json_path(at: FieldRef) -> String {
  format!("$.{}.{}", at.source.as_str(), at.field.as_str())
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawVerse::from_row`], prefixed with the `v` alias.
pub const VERSE_COLUMNS: &str = "v.id, v.chapter, v.verse, v.original_text, \
  v.transliteration, v.commentary_sources, v.commentaries, v.tags, v.active, \
  v.created_at, v.updated_at";

/// Raw values read directly from a `verses` row.
pub struct RawVerse {
  pub id:                 String,
  pub chapter:            i64,
  pub verse:              i64,
  pub original_text:      String,
  pub transliteration:    String,
  pub commentary_sources: String,
  pub commentaries:       Option<String>,
  pub tags:               String,
  pub active:             bool,
  pub created_at:         String,
  pub updated_at:         String,
}

impl RawVerse {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                 row.get(0)?,
      chapter:            row.get(1)?,
      verse:              row.get(2)?,
      original_text:      row.get(3)?,
      transliteration:    row.get(4)?,
      commentary_sources: row.get(5)?,
      commentaries:       row.get(6)?,
      tags:               row.get(7)?,
      active:             row.get(8)?,
      created_at:         row.get(9)?,
      updated_at:         row.get(10)?,
    })
  }

  pub fn into_record(self) -> Result<VerseRecord> {
    let chapter = u8::try_from(self.chapter)
      .map_err(|_| Error::Corrupt(format!("chapter {} out of range", self.chapter)))?;
    let verse = u32::try_from(self.verse)
      .map_err(|_| Error::Corrupt(format!("verse {} out of range", self.verse)))?;
    let commentary_sources: CommentarySources =
      serde_json::from_str(&self.commentary_sources)?;
    let commentaries = self
      .commentaries
      .as_deref()
      .map(serde_json::from_str)
      .transpose()?;

    Ok(VerseRecord {
      id: decode_uuid(&self.id)?,
      chapter,
      verse,
      original_text: self.original_text,
      transliteration: self.transliteration,
      commentary_sources,
      tags: serde_json::from_str(&self.tags)?,
      active: self.active,
      commentaries,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Column values of a [`NewVerse`], ready to move into a connection call.
pub struct EncodedVerse {
  pub chapter:            i64,
  pub verse:              i64,
  pub original_text:      String,
  pub transliteration:    String,
  pub commentary_sources: String,
  pub commentaries:       Option<String>,
  pub tags:               String,
  pub active:             bool,
}

impl EncodedVerse {
  pub fn new(v: &NewVerse) -> Result<Self> {
    Ok(Self {
      chapter:            i64::from(v.chapter),
      verse:              i64::from(v.verse),
      original_text:      v.original_text.clone(),
      transliteration:    v.transliteration.clone(),
      commentary_sources: serde_json::to_string(&v.commentary_sources)?,
      commentaries:       v.commentaries.as_ref().map(serde_json::to_string).transpose()?,
      tags:               serde_json::to_string(&v.tags)?,
      active:             v.active,
    })
  }
}
