//! The SQLite implementation of [`VerseStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use gita_core::{
  filter::{VerseFilter, Visibility},
  page::Window,
  store::{ChapterCount, Upsert, VerseStore},
  verse::{NewVerse, VerseRecord},
};

use crate::{
  Error, Result,
  encode::{EncodedVerse, RawVerse, VERSE_COLUMNS, encode_dt, encode_uuid},
  error::classify_write,
  query::{SqlFilter, register_fold_case, visibility_condition, where_clause},
  schema::SCHEMA,
};

const INSERT_SQL: &str = "INSERT INTO verses (
    id, chapter, verse, original_text, transliteration,
    commentary_sources, commentaries, tags, active, created_at, updated_at
  ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A verse store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, used by tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Close the underlying connection. Every clone shares it, so other clones
  /// fail with a closed-connection error afterwards.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        register_fold_case(conn)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run raw SQL on the connection thread.
  #[cfg(test)]
  pub(crate) async fn execute_batch(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Row helpers (run on the connection thread) ──────────────────────────────

fn select_by_id(
  conn: &rusqlite::Connection,
  id: &str,
) -> rusqlite::Result<Option<RawVerse>> {
  conn
    .query_row(
      &format!("SELECT {VERSE_COLUMNS} FROM verses v WHERE v.id = ?1"),
      rusqlite::params![id],
      RawVerse::from_row,
    )
    .optional()
}

fn insert_row(
  conn: &rusqlite::Connection,
  id: &str,
  verse: &EncodedVerse,
  at: &str,
) -> rusqlite::Result<()> {
  conn.execute(
    INSERT_SQL,
    rusqlite::params![
      id,
      verse.chapter,
      verse.verse,
      verse.original_text,
      verse.transliteration,
      verse.commentary_sources,
      verse.commentaries,
      verse.tags,
      verse.active,
      at,
    ],
  )?;
  Ok(())
}

fn decode_opt(raw: Option<RawVerse>) -> Result<Option<VerseRecord>> {
  raw.map(RawVerse::into_record).transpose()
}

fn to_sql_int(n: u64) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }

// ─── VerseStore impl ─────────────────────────────────────────────────────────

impl VerseStore for SqliteStore {
  type Error = Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn insert(&self, verse: NewVerse) -> Result<VerseRecord> {
    let encoded = EncodedVerse::new(&verse)?;
    let now = Utc::now();
    let record = VerseRecord {
      id:                 Uuid::new_v4(),
      chapter:            verse.chapter,
      verse:              verse.verse,
      original_text:      verse.original_text,
      transliteration:    verse.transliteration,
      commentary_sources: verse.commentary_sources,
      tags:               verse.tags,
      active:             verse.active,
      commentaries:       verse.commentaries,
      created_at:         now,
      updated_at:         now,
    };

    let id_str = encode_uuid(record.id);
    let at_str = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        insert_row(conn, &id_str, &encoded, &at_str)?;
        Ok(())
      })
      .await
      .map_err(|e| classify_write(e, record.chapter, record.verse))?;

    Ok(record)
  }

  async fn replace(&self, id: Uuid, verse: NewVerse) -> Result<Option<VerseRecord>> {
    let encoded = EncodedVerse::new(&verse)?;
    let id_str  = encode_uuid(id);
    let at_str  = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE verses SET
             chapter = ?2, verse = ?3, original_text = ?4, transliteration = ?5,
             commentary_sources = ?6, tags = ?7, active = ?8, updated_at = ?9
           WHERE id = ?1",
          rusqlite::params![
            id_str,
            encoded.chapter,
            encoded.verse,
            encoded.original_text,
            encoded.transliteration,
            encoded.commentary_sources,
            encoded.tags,
            encoded.active,
            at_str,
          ],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(select_by_id(conn, &id_str)?)
      })
      .await
      .map_err(|e| classify_write(e, verse.chapter, verse.verse))?;

    decode_opt(raw)
  }

  async fn set_active(&self, id: Uuid, active: bool) -> Result<Option<VerseRecord>> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE verses SET active = ?2, updated_at = ?3 WHERE id = ?1",
          rusqlite::params![id_str, active, at_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(select_by_id(conn, &id_str)?)
      })
      .await?;

    decode_opt(raw)
  }

  async fn delete(&self, id: Uuid) -> Result<Option<VerseRecord>> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let raw = select_by_id(&tx, &id_str)?;
        if raw.is_some() {
          tx.execute("DELETE FROM verses WHERE id = ?1", rusqlite::params![id_str])?;
        }
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    decode_opt(raw)
  }

  async fn upsert(&self, verse: NewVerse) -> Result<(VerseRecord, Upsert)> {
    let encoded = EncodedVerse::new(&verse)?;
    let new_id  = encode_uuid(Uuid::new_v4());
    let at_str  = encode_dt(Utc::now());

    let (raw, outcome) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let existing: Option<String> = tx
          .query_row(
            "SELECT id FROM verses WHERE chapter = ?1 AND verse = ?2",
            rusqlite::params![encoded.chapter, encoded.verse],
            |r| r.get(0),
          )
          .optional()?;

        let (id, outcome) = match existing {
          Some(id) => {
            tx.execute(
              "UPDATE verses SET
                 original_text = ?2, transliteration = ?3, commentary_sources = ?4,
                 commentaries = ?5, tags = ?6, active = ?7, updated_at = ?8
               WHERE id = ?1",
              rusqlite::params![
                id,
                encoded.original_text,
                encoded.transliteration,
                encoded.commentary_sources,
                encoded.commentaries,
                encoded.tags,
                encoded.active,
                at_str,
              ],
            )?;
            (id, Upsert::Updated)
          }
          None => {
            insert_row(&tx, &new_id, &encoded, &at_str)?;
            (new_id, Upsert::Created)
          }
        };

        let raw = select_by_id(&tx, &id)?;
        tx.commit()?;
        Ok((raw, outcome))
      })
      .await
      .map_err(|e| classify_write(e, verse.chapter, verse.verse))?;

    let record = decode_opt(raw)?.ok_or_else(|| {
      Error::Corrupt(format!("upserted verse {}.{} not found", verse.chapter, verse.verse))
    })?;
    Ok((record, outcome))
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get(&self, id: Uuid) -> Result<Option<VerseRecord>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| Ok(select_by_id(conn, &id_str)?))
      .await?;
    decode_opt(raw)
  }

  async fn find_by_key(
    &self,
    chapter:    u8,
    verse:      u32,
    visibility: Visibility,
  ) -> Result<Option<VerseRecord>> {
    let visible = visibility_condition(visibility)
      .map(|c| format!("AND {c}"))
      .unwrap_or_default();
    let sql = format!(
      "SELECT {VERSE_COLUMNS} FROM verses v
       WHERE v.chapter = ?1 AND v.verse = ?2 {visible}"
    );

    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![chapter, verse], RawVerse::from_row)
            .optional()?,
        )
      })
      .await?;

    decode_opt(raw)
  }

  async fn find(
    &self,
    filter: &VerseFilter,
    window: Option<Window>,
  ) -> Result<Vec<VerseRecord>> {
    let SqlFilter { clause, mut params } = where_clause(filter);
    let (limit, offset) = window
      .map(|w| (to_sql_int(w.limit), to_sql_int(w.offset)))
      .unwrap_or((-1, 0));
    params.push(rusqlite::types::Value::Integer(limit));
    params.push(rusqlite::types::Value::Integer(offset));

    // Order before slicing; pagination depends on it.
    let sql = format!(
      "SELECT {VERSE_COLUMNS} FROM verses v
       {clause}
       ORDER BY v.chapter ASC, v.verse ASC
       LIMIT ? OFFSET ?"
    );

    let raws: Vec<RawVerse> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), RawVerse::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVerse::into_record).collect()
  }

  async fn count(&self, filter: &VerseFilter) -> Result<u64> {
    let SqlFilter { clause, params } = where_clause(filter);
    let sql = format!("SELECT COUNT(*) FROM verses v {clause}");

    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&sql, rusqlite::params_from_iter(params.iter()), |r| r.get(0))?)
      })
      .await?;

    Ok(u64::try_from(n).unwrap_or(0))
  }

  async fn chapter_counts(&self) -> Result<Vec<ChapterCount>> {
    let rows: Vec<(i64, i64)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT chapter, COUNT(*) FROM verses
           WHERE active = 1
           GROUP BY chapter
           ORDER BY chapter ASC",
        )?;
        let rows = stmt
          .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(chapter, count)| {
        Ok(ChapterCount {
          chapter: u8::try_from(chapter)
            .map_err(|_| Error::Corrupt(format!("chapter {chapter} out of range")))?,
          count:   u64::try_from(count).unwrap_or(0),
        })
      })
      .collect()
  }
}
