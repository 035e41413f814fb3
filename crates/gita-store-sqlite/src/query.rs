//! Translation of a [`VerseFilter`] into a parameterised SQL `WHERE` clause.

use gita_core::filter::{VerseFilter, Visibility, search_fields};
use rusqlite::{functions::FunctionFlags, types::Value};

use crate::encode::json_path;

/// A `WHERE ...` fragment (possibly empty) and its positional parameters.
#[derive(Debug, Default)]
pub struct SqlFilter {
  pub clause: String,
  pub params: Vec<Value>,
}

pub fn where_clause(filter: &VerseFilter) -> SqlFilter {
  let mut conds: Vec<String> = Vec::new();
  let mut params: Vec<Value> = Vec::new();

  if let Some(cond) = visibility_condition(filter.visibility) {
    conds.push(cond.into());
  }

  if let Some(chapter) = filter.chapter {
    conds.push("v.chapter = ?".into());
    params.push(Value::Integer(chapter));
  }

  if let Some(search) = &filter.search {
    let pattern = like_pattern(&search.to_lowercase());
    let mut columns = vec!["v.original_text".to_owned(), "v.transliteration".to_owned()];
    columns.extend(
      search_fields()
        .map(|at| format!("json_extract(v.commentary_sources, '{}')", json_path(at))),
    );
    let ors: Vec<String> = columns
      .iter()
      .map(|col| format!("{FOLD_CASE}({col}) LIKE ? ESCAPE '\\'"))
      .collect();
    params.extend(columns.iter().map(|_| Value::Text(pattern.clone())));
    conds.push(format!("({})", ors.join(" OR ")));
  }

  if !filter.tags.is_empty() {
    let placeholders = vec!["?"; filter.tags.len()].join(", ");
    conds.push(format!(
      "EXISTS (SELECT 1 FROM json_each(v.tags) t WHERE t.value IN ({placeholders}))"
    ));
    params.extend(filter.tags.iter().cloned().map(Value::Text));
  }

  let clause = if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(" AND "))
  };

  SqlFilter { clause, params }
}

pub fn visibility_condition(visibility: Visibility) -> Option<&'static str> {
  match visibility {
    Visibility::Active => Some("v.active = 1"),
    Visibility::Inactive => Some("v.active = 0"),
    Visibility::All => None,
  }
}

/// Name of the SQL function lowercasing text with Unicode rules. SQLite's own
/// `lower()` and `LIKE` only fold ASCII, which misses IAST capitals (`Ś`, `Ā`).
pub const FOLD_CASE: &str = "fold_case";

/// Register [`FOLD_CASE`] on `conn`. NULL passes through.
pub fn register_fold_case(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
  conn.create_scalar_function(
    FOLD_CASE,
    1,
    FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
    |ctx| {
      let text: Option<String> = ctx.get(0)?;
      Ok(text.map(|t| t.to_lowercase()))
    },
  )
}

/// `%needle%` with LIKE wildcards in the needle escaped. The caller folds
/// case on both sides.
fn like_pattern(needle: &str) -> String {
  let escaped = needle
    .replace('\\', "\\\\")
    .replace('%', "\\%")
    .replace('_', "\\_");
  format!("%{escaped}%")
}
