//! One-shot conversion of legacy records into canonical verses.
//!
//! Legacy documents carry the scripture text as `slok` and every commentator
//! as a top-level object (`tej`, `siva`, ...). Each record is transformed and
//! upserted on its own; a failure is logged and counted, never fatal.

use serde::Deserialize;
use tracing::{info, warn};

use crate::{
  Error, Result,
  resolve::Resolved,
  source::{CommentaryEntry, CommentarySources, SourceKey},
  store::{Upsert, VerseStore},
  verse::{NewVerse, VerseDraft},
};

/// Tag attached to every migrated record, alongside `chapter-N`/`verse-M`.
pub const CORPUS_TAG: &str = "bhagwat-gita";
pub const MIGRATED_TAG: &str = "migrated";

// ─── Legacy shape ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct LegacyVerse {
  #[serde(rename = "_id", default)]
  pub legacy_id:       Option<serde_json::Value>,
  #[serde(default)]
  pub chapter:         Option<i64>,
  #[serde(default)]
  pub verse:           Option<i64>,
  #[serde(default)]
  pub slok:            Option<String>,
  #[serde(default)]
  pub transliteration: Option<String>,
  /// Everything else, commentator objects included.
  #[serde(flatten)]
  pub rest:            serde_json::Map<String, serde_json::Value>,
}

impl LegacyVerse {
  /// Known commentator objects exactly as stored.
  pub fn raw_sources(&self) -> serde_json::Map<String, serde_json::Value> {
    self
      .rest
      .iter()
      .filter(|(k, v)| k.parse::<SourceKey>().is_ok() && !v.is_null())
      .map(|(k, v)| (k.clone(), v.clone()))
      .collect()
  }

  /// Known commentator objects decoded into entries. Fields a source does
  /// not define are dropped rather than rejected.
  pub fn sources(&self) -> Result<CommentarySources> {
    let mut sources = CommentarySources::new();
    for (key, value) in self.raw_sources() {
      let Ok(key) = key.parse::<SourceKey>() else { continue };
      let mut entry: CommentaryEntry = serde_json::from_value(value)?;
      entry.retain_fields_of(key);
      sources.insert(key, entry);
    }
    Ok(sources.normalized())
  }

  fn label(&self) -> String {
    match (self.chapter, self.verse) {
      (Some(c), Some(v)) => format!("{c}.{v}"),
      _ => "<unknown>".into(),
    }
  }
}

// ─── Transform ───────────────────────────────────────────────────────────────

/// A canonical verse built from a legacy record, with its display fields as
/// they resolve at migration time.
#[derive(Debug, Clone)]
pub struct MigratedVerse {
  pub verse:    NewVerse,
  pub resolved: Resolved,
}

pub fn transform(legacy: LegacyVerse) -> Result<MigratedVerse> {
  let sources = legacy.sources()?;
  let resolved = Resolved::from_sources(&sources);
  let commentaries = serde_json::Value::Object(legacy.raw_sources());

  let mut verse = VerseDraft {
    chapter: legacy.chapter,
    verse: legacy.verse,
    original_text: Some(legacy.slok.unwrap_or_default()),
    transliteration: Some(legacy.transliteration.unwrap_or_default()),
    commentary_sources: Some(sources),
    tags: None,
    active: Some(true),
  }
  .validate()?;

  verse.tags = vec![
    CORPUS_TAG.to_owned(),
    format!("chapter-{}", verse.chapter),
    format!("verse-{}", verse.verse),
    MIGRATED_TAG.to_owned(),
  ];
  verse.commentaries = Some(commentaries);

  Ok(MigratedVerse { verse, resolved })
}

// ─── Batch ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
  pub created: usize,
  pub updated: usize,
  pub failed:  usize,
}

impl MigrationReport {
  pub fn succeeded(&self) -> usize { self.created + self.updated }
}

/// Transform and upsert every record in order.
pub async fn run<S, I>(store: &S, records: I) -> MigrationReport
where
  S: VerseStore,
  Error: From<S::Error>,
  I: IntoIterator<Item = serde_json::Value>,
{
  let mut report = MigrationReport::default();

  for (index, raw) in records.into_iter().enumerate() {
    let legacy: LegacyVerse = match serde_json::from_value(raw) {
      Ok(l) => l,
      Err(e) => {
        warn!(index, error = %e, "skipping undecodable legacy record");
        report.failed += 1;
        continue;
      }
    };
    let label = legacy.label();

    match migrate_one(store, legacy).await {
      Ok(Upsert::Created) => {
        info!(verse = %label, "created verse");
        report.created += 1;
      }
      Ok(Upsert::Updated) => {
        info!(verse = %label, "updated verse");
        report.updated += 1;
      }
      Err(e) => {
        warn!(verse = %label, error = %e, "failed to migrate verse");
        report.failed += 1;
      }
    }
  }

  info!(
    succeeded = report.succeeded(),
    failed = report.failed,
    "migration finished"
  );
  report
}

async fn migrate_one<S>(store: &S, legacy: LegacyVerse) -> Result<Upsert>
where
  S: VerseStore,
  Error: From<S::Error>,
{
  let MigratedVerse { verse, .. } = transform(legacy)?;
  let (_, outcome) = store.upsert(verse).await?;
  Ok(outcome)
}
