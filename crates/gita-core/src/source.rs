//! Commentary sources: the named commentators whose sub-records carry
//! translation, gloss and commentary text.
//!
//! Each source labels its text with short field codes (`et`, `ht`, `sc`, ...).
//! Which codes a source may carry is fixed per source key, not per record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};

use crate::{Error, Result};

// ─── Text fields ─────────────────────────────────────────────────────────────

/// A labeled text slot inside a commentary sub-record.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TextField {
  /// Hindi translation.
  Ht,
  /// English translation.
  Et,
  /// English commentary.
  Ec,
  /// Hindi commentary.
  Hc,
  /// Sanskrit commentary.
  Sc,
}

impl TextField {
  pub fn as_str(self) -> &'static str { self.into() }
}

// ─── Source keys ─────────────────────────────────────────────────────────────

/// The known commentators. The serialized name is the key used in stored
/// documents and in legacy records.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize, EnumIter, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SourceKey {
  Tej,
  Siva,
  Purohit,
  Chinmay,
  San,
  Adi,
  Gambir,
  Madhav,
  Anand,
  Rams,
  Raman,
  Abhinav,
  Sankar,
  Jaya,
  Vallabh,
  Ms,
  Srid,
  Dhan,
  Venkat,
  Puru,
  Neel,
  Prabhu,
}

impl SourceKey {
  pub fn as_str(self) -> &'static str { self.into() }

  /// The text fields this source may carry.
  pub fn fields(self) -> &'static [TextField] {
    use TextField::*;
    match self {
      Self::Tej => &[Ht, Et],
      Self::Siva | Self::Prabhu => &[Et, Ec],
      Self::Purohit | Self::San | Self::Adi | Self::Gambir => &[Et],
      Self::Chinmay => &[Hc, Et],
      Self::Rams => &[Ht, Hc, Et],
      Self::Raman | Self::Abhinav => &[Sc, Et],
      Self::Sankar => &[Ht, Sc, Et],
      Self::Madhav
      | Self::Anand
      | Self::Jaya
      | Self::Vallabh
      | Self::Ms
      | Self::Srid
      | Self::Dhan
      | Self::Venkat
      | Self::Puru
      | Self::Neel => &[Sc],
    }
  }

  pub fn provides(self, field: TextField) -> bool {
    self.fields().contains(&field)
  }
}

/// A `(source, field)` coordinate into a [`CommentarySources`] map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldRef {
  pub source: SourceKey,
  pub field:  TextField,
}

impl FieldRef {
  pub const fn new(source: SourceKey, field: TextField) -> Self {
    Self { source, field }
  }
}

impl std::fmt::Display for FieldRef {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}.{}", self.source.as_str(), self.field.as_str())
  }
}

// ─── Entries ─────────────────────────────────────────────────────────────────

/// One commentator's sub-record. Unknown keys are ignored on input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentaryEntry {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub author: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ht:     Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub et:     Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ec:     Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub hc:     Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sc:     Option<String>,
}

impl CommentaryEntry {
  pub fn text(&self, field: TextField) -> Option<&str> {
    self.slot(field).as_deref()
  }

  fn slot(&self, field: TextField) -> &Option<String> {
    match field {
      TextField::Ht => &self.ht,
      TextField::Et => &self.et,
      TextField::Ec => &self.ec,
      TextField::Hc => &self.hc,
      TextField::Sc => &self.sc,
    }
  }

  fn slot_mut(&mut self, field: TextField) -> &mut Option<String> {
    match field {
      TextField::Ht => &mut self.ht,
      TextField::Et => &mut self.et,
      TextField::Ec => &mut self.ec,
      TextField::Hc => &mut self.hc,
      TextField::Sc => &mut self.sc,
    }
  }

  /// Fields that currently hold a value.
  pub fn present_fields(&self) -> impl Iterator<Item = TextField> + '_ {
    <TextField as strum::IntoEnumIterator>::iter()
      .filter(|f| self.slot(*f).is_some())
  }

  /// Drop text fields `key` does not define.
  pub fn retain_fields_of(&mut self, key: SourceKey) {
    for field in <TextField as strum::IntoEnumIterator>::iter() {
      if !key.provides(field) {
        *self.slot_mut(field) = None;
      }
    }
  }

  /// Trim every string; strings that end up empty become `None`.
  fn normalize(&mut self) {
    trim_in_place(&mut self.author);
    for field in <TextField as strum::IntoEnumIterator>::iter() {
      trim_in_place(self.slot_mut(field));
    }
  }
}

fn trim_in_place(value: &mut Option<String>) {
  *value = value
    .take()
    .map(|s| s.trim().to_owned())
    .filter(|s| !s.is_empty());
}

// ─── Source map ──────────────────────────────────────────────────────────────

/// Commentary sub-records keyed by source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentarySources(BTreeMap<SourceKey, CommentaryEntry>);

impl CommentarySources {
  pub fn new() -> Self { Self::default() }

  pub fn get(&self, key: SourceKey) -> Option<&CommentaryEntry> { self.0.get(&key) }

  pub fn insert(&mut self, key: SourceKey, entry: CommentaryEntry) {
    self.0.insert(key, entry);
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn iter(&self) -> impl Iterator<Item = (SourceKey, &CommentaryEntry)> {
    self.0.iter().map(|(k, v)| (*k, v))
  }

  /// The raw value at `at`, if the source is present and carries the field.
  pub fn text(&self, at: FieldRef) -> Option<&str> {
    self.get(at.source).and_then(|e| e.text(at.field))
  }

  /// Trim all text and drop entries left with neither author nor text.
  pub fn normalized(mut self) -> Self {
    for entry in self.0.values_mut() {
      entry.normalize();
    }
    self.0.retain(|_, e| *e != CommentaryEntry::default());
    self
  }

  /// Reject text fields a source does not define.
  pub fn check_fields(&self) -> Result<()> {
    for (key, entry) in self.iter() {
      if let Some(field) = entry.present_fields().find(|f| !key.provides(*f)) {
        let at = FieldRef::new(key, field);
        return Err(Error::validation(
          format!("commentarySources.{at}"),
          format!("Source {} does not provide a {} text", key.as_str(), field.as_str()),
        ));
      }
    }
    Ok(())
  }
}

impl FromIterator<(SourceKey, CommentaryEntry)> for CommentarySources {
  fn from_iter<I: IntoIterator<Item = (SourceKey, CommentaryEntry)>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}
