//! Fallback resolution of the derived display fields.
//!
//! Each derived field walks a fixed, curated list of `(source, field)` pairs
//! and takes the first value that is present and non-blank. The tables are
//! literal data: their order is the precedence chosen by the content curators
//! and must not be reshuffled.

use serde::Serialize;

use crate::source::{
  CommentarySources, FieldRef,
  SourceKey::{self, *},
  TextField::{self, *},
};

const fn at(source: SourceKey, field: TextField) -> FieldRef { FieldRef::new(source, field) }

pub static TRANSLATION_PRIORITY: [FieldRef; 12] = [
  at(Tej, Et),
  at(Siva, Et),
  at(Purohit, Et),
  at(Chinmay, Et),
  at(San, Et),
  at(Adi, Et),
  at(Gambir, Et),
  at(Rams, Et),
  at(Raman, Et),
  at(Abhinav, Et),
  at(Sankar, Et),
  at(Prabhu, Et),
];

pub static MEANING_PRIORITY: [FieldRef; 5] = [
  at(Tej, Ht),
  at(Siva, Ec),
  at(Chinmay, Hc),
  at(Rams, Ht),
  at(Sankar, Ht),
];

pub static COMMENTARY_PRIORITY: [FieldRef; 13] = [
  at(Sankar, Sc),
  at(Anand, Sc),
  at(Rams, Hc),
  at(Raman, Sc),
  at(Abhinav, Sc),
  at(Jaya, Sc),
  at(Vallabh, Sc),
  at(Ms, Sc),
  at(Srid, Sc),
  at(Dhan, Sc),
  at(Venkat, Sc),
  at(Puru, Sc),
  at(Neel, Sc),
];

// ─── Derived fields ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedField {
  Translation,
  Meaning,
  Commentary,
}

impl DerivedField {
  pub const ALL: [Self; 3] = [Self::Translation, Self::Meaning, Self::Commentary];

  pub fn priority(self) -> &'static [FieldRef] {
    match self {
      Self::Translation => &TRANSLATION_PRIORITY,
      Self::Meaning => &MEANING_PRIORITY,
      Self::Commentary => &COMMENTARY_PRIORITY,
    }
  }

  pub fn fallback(self) -> &'static str {
    match self {
      Self::Translation => "Translation not available",
      Self::Meaning => "Meaning not available",
      Self::Commentary => "Commentary not available",
    }
  }

  /// The first non-blank value along this field's priority list, or the
  /// field's fallback literal.
  pub fn resolve<'a>(self, sources: &'a CommentarySources) -> &'a str {
    first_present(sources, self.priority()).unwrap_or(self.fallback())
  }
}

pub fn first_present<'a>(
  sources: &'a CommentarySources,
  priority: &[FieldRef],
) -> Option<&'a str> {
  priority
    .iter()
    .find_map(|at| sources.text(*at).filter(|t| !t.trim().is_empty()))
}

// ─── Resolved triple ─────────────────────────────────────────────────────────

/// The three derived display values. Computed on every read, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolved {
  pub translation: String,
  pub meaning:     String,
  pub commentary:  String,
}

impl Resolved {
  pub fn from_sources(sources: &CommentarySources) -> Self {
    Self {
      translation: DerivedField::Translation.resolve(sources).to_owned(),
      meaning:     DerivedField::Meaning.resolve(sources).to_owned(),
      commentary:  DerivedField::Commentary.resolve(sources).to_owned(),
    }
  }
}
