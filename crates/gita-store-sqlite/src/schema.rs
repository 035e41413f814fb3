//! SQL schema for the verse store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS verses (
    id                 TEXT PRIMARY KEY,
    chapter            INTEGER NOT NULL CHECK (chapter BETWEEN 1 AND 18),
    verse              INTEGER NOT NULL CHECK (verse >= 1),
    original_text      TEXT NOT NULL,
    transliteration    TEXT NOT NULL,
    commentary_sources TEXT NOT NULL DEFAULT '{}',  -- JSON object keyed by source
    commentaries       TEXT,                        -- raw legacy JSON or NULL
    tags               TEXT NOT NULL DEFAULT '[]',  -- JSON array
    active             INTEGER NOT NULL DEFAULT 1,
    created_at         TEXT NOT NULL,               -- ISO 8601 UTC; server-assigned
    updated_at         TEXT NOT NULL,
    -- Spans active and inactive rows alike.
    UNIQUE (chapter, verse)
);

CREATE INDEX IF NOT EXISTS verses_active_order_idx ON verses(active, chapter, verse);

PRAGMA user_version = 1;
";
