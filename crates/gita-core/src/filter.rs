//! Query parameters and the structured filter built from them.
//!
//! [`VerseFilter`] is backend-neutral; each [`crate::store::VerseStore`]
//! translates it into its own query language.

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  resolve::{MEANING_PRIORITY, TRANSLATION_PRIORITY},
  source::FieldRef,
};

/// Which records a query may see, based on the soft-delete flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
  /// Only records with `active = true`. Normal operation.
  #[default]
  Active,
  /// Only soft-deleted records (administrative).
  Inactive,
  /// Everything (administrative).
  All,
}

/// Raw list parameters as they arrive from the presentation layer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
  pub page:   Option<u32>,
  pub limit:  Option<u32>,
  /// Parsed to an integer by [`VerseFilter::from_params`].
  pub chapter: Option<String>,
  pub search: Option<String>,
  /// Comma-separated; a record matches if it shares at least one tag.
  pub tags:   Option<String>,
  pub status: Option<Visibility>,
}

/// A conjunction of optional conditions over verse records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerseFilter {
  /// Exact chapter match.
  pub chapter:    Option<i64>,
  /// Case-insensitive substring over [`search_fields`].
  pub search:     Option<String>,
  /// Tag intersection; empty means no tag condition.
  pub tags:       Vec<String>,
  pub visibility: Visibility,
}

impl VerseFilter {
  pub fn from_params(params: &ListParams) -> Result<Self> {
    let chapter = non_blank(params.chapter.as_deref())
      .map(|c| {
        c.parse::<i64>().map_err(|_| {
          Error::InvalidArgument(format!("chapter must be an integer, got {c:?}"))
        })
      })
      .transpose()?;

    Ok(Self {
      chapter,
      search: non_blank(params.search.as_deref()).map(str::to_owned),
      tags: params.tags.as_deref().map(split_tags).unwrap_or_default(),
      visibility: params.status.unwrap_or_default(),
    })
  }

  /// Active records of a single chapter.
  pub fn for_chapter(chapter: u8) -> Self {
    Self { chapter: Some(i64::from(chapter)), ..Self::default() }
  }
}

/// Split a comma-separated tag list, trimming and dropping blanks.
pub fn split_tags(raw: &str) -> Vec<String> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .map(str::to_owned)
    .collect()
}

fn non_blank(s: Option<&str>) -> Option<&str> {
  s.map(str::trim).filter(|s| !s.is_empty())
}

/// Text columns matched by free-text search, besides the record's own
/// `originalText` and `transliteration`.
///
/// These are the two most-preferred translation fields followed by the two
/// most-preferred meaning fields.
pub fn search_fields() -> impl Iterator<Item = FieldRef> {
  TRANSLATION_PRIORITY[..2]
    .iter()
    .chain(&MEANING_PRIORITY[..2])
    .copied()
}
