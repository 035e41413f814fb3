//! Integration tests for `SqliteStore` against an in-memory database, driven
//! through `VerseService` where the behaviour is a service-level one.

use std::sync::Arc;

use gita_core::{
  Error as CoreError,
  filter::{ListParams, VerseFilter, Visibility},
  migrate::MigrationReport,
  service::VerseService,
  source::{CommentaryEntry, CommentarySources, SourceKey},
  store::{Upsert, VerseStore},
  verse::{NewVerse, VerseDraft},
};
use serde_json::json;
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn service() -> VerseService<SqliteStore> { VerseService::new(Arc::new(store().await)) }

fn draft(chapter: i64, verse: i64) -> VerseDraft {
  VerseDraft {
    chapter: Some(chapter),
    verse: Some(verse),
    original_text: Some(format!("श्लोक {chapter}.{verse}")),
    transliteration: Some(format!("śloka {chapter}.{verse}")),
    ..Default::default()
  }
}

fn new_verse(chapter: u8, verse: u32) -> NewVerse {
  NewVerse {
    chapter,
    verse,
    original_text: "text".into(),
    transliteration: "translit".into(),
    commentary_sources: CommentarySources::new(),
    tags: Vec::new(),
    active: true,
    commentaries: None,
  }
}

fn with_translation(mut d: VerseDraft, et: &str) -> VerseDraft {
  let entry = CommentaryEntry {
    author: Some("Swami Sivananda".into()),
    et: Some(et.into()),
    ..Default::default()
  };
  d.commentary_sources = Some([(SourceKey::Siva, entry)].into_iter().collect());
  d
}

// ─── Create / read ───────────────────────────────────────────────────────────

#[tokio::test]
async fn create_then_fetch_by_reference() {
  let svc = service().await;
  let created = svc
    .create(with_translation(draft(2, 47), "Thy right is to work only"))
    .await
    .unwrap();
  assert!(created.active);
  assert_eq!(created.created_at, created.updated_at);

  let fetched = svc.by_reference(2, 47).await.unwrap().unwrap();
  assert_eq!(fetched.id, created.id);
  assert_eq!(fetched.original_text, "श्लोक 2.47");
  assert_eq!(
    fetched
      .commentary_sources
      .get(SourceKey::Siva)
      .and_then(|e| e.et.as_deref()),
    Some("Thy right is to work only")
  );

  let by_id = svc.get(created.id).await.unwrap().unwrap();
  assert_eq!(by_id.reference(), "2.47");
}

#[tokio::test]
async fn get_missing_returns_none() {
  let svc = service().await;
  assert!(svc.get(Uuid::new_v4()).await.unwrap().is_none());
  assert!(svc.by_reference(3, 1).await.unwrap().is_none());
  assert!(svc.by_reference(19, 1).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_create_is_rejected() {
  let svc = service().await;
  svc.create(draft(1, 1)).await.unwrap();

  let err = svc.create(draft(1, 1)).await.unwrap_err();
  assert!(matches!(err, CoreError::Duplicate { chapter: 1, verse: 1 }));
}

#[tokio::test]
async fn invalid_draft_never_reaches_the_store() {
  let svc = service().await;
  let err = svc.create(draft(1, 48)).await.unwrap_err();
  assert!(matches!(err, CoreError::Validation { .. }));

  let everything = VerseFilter { visibility: Visibility::All, ..Default::default() };
  assert_eq!(svc.store().count(&everything).await.unwrap(), 0);
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn pagination_is_ordered_and_stable() {
  let svc = service().await;
  for v in (1..=25).rev() {
    svc.create(draft(1, v)).await.unwrap();
  }

  let page = |n| ListParams { page: Some(n), ..Default::default() };

  let first = svc.list(&page(1)).await.unwrap();
  let verses: Vec<u32> = first.items.iter().map(|r| r.verse).collect();
  assert_eq!(verses, (1..=10).collect::<Vec<_>>());
  assert_eq!(first.pagination.total_items, 25);
  assert_eq!(first.pagination.total_pages, 3);

  let third = svc.list(&page(3)).await.unwrap();
  let verses: Vec<u32> = third.items.iter().map(|r| r.verse).collect();
  assert_eq!(verses, (21..=25).collect::<Vec<_>>());

  let fourth = svc.list(&page(4)).await.unwrap();
  assert!(fourth.items.is_empty());
  assert_eq!(fourth.pagination.total_pages, 3);
  assert_eq!(fourth.pagination.current_page, 4);
}

#[tokio::test]
async fn list_orders_by_chapter_then_verse() {
  let svc = service().await;
  svc.create(draft(2, 1)).await.unwrap();
  svc.create(draft(1, 2)).await.unwrap();
  svc.create(draft(1, 1)).await.unwrap();

  let page = svc.list(&ListParams::default()).await.unwrap();
  let refs: Vec<String> = page.items.iter().map(|r| r.reference()).collect();
  assert_eq!(refs, ["1.1", "1.2", "2.1"]);
}

#[tokio::test]
async fn limit_is_capped_by_service() {
  let svc = VerseService::new(Arc::new(store().await)).with_max_limit(2);
  for v in 1..=3 {
    svc.create(draft(1, v)).await.unwrap();
  }
  let page = svc
    .list(&ListParams { limit: Some(50), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(page.items.len(), 2);
  assert_eq!(page.pagination.items_per_page, 2);
  assert_eq!(page.pagination.total_pages, 2);
}

#[tokio::test]
async fn search_is_case_insensitive_across_fields() {
  let svc = service().await;
  svc
    .create(with_translation(draft(2, 47), "Thy right is to KARMA only"))
    .await
    .unwrap();
  let mut plain = draft(2, 48);
  plain.transliteration = Some("mā karma-phala-hetur bhūḥ".into());
  svc.create(plain).await.unwrap();
  svc.create(draft(3, 1)).await.unwrap();

  let found = svc
    .list(&ListParams { search: Some("karma".into()), ..Default::default() })
    .await
    .unwrap();
  let refs: Vec<String> = found.items.iter().map(|r| r.reference()).collect();
  assert_eq!(refs, ["2.47", "2.48"]);
}

#[tokio::test]
async fn search_treats_wildcards_literally() {
  let svc = service().await;
  svc.create(draft(1, 1)).await.unwrap();
  let found = svc
    .list(&ListParams { search: Some("%".into()), ..Default::default() })
    .await
    .unwrap();
  assert!(found.items.is_empty());
}

#[tokio::test]
async fn search_folds_non_ascii_capitals() {
  let svc = service().await;
  let mut d = draft(4, 1);
  d.transliteration = Some("Śrī Bhagavān uvāca".into());
  svc.create(d).await.unwrap();
  svc.create(draft(4, 2)).await.unwrap();

  for needle in ["śrī", "ŚRĪ", "BHAGAV", "bhagavān"] {
    let found = svc
      .list(&ListParams { search: Some(needle.into()), ..Default::default() })
      .await
      .unwrap();
    let refs: Vec<String> = found.items.iter().map(|r| r.reference()).collect();
    assert_eq!(refs, ["4.1"], "search {needle:?}");
  }
}

#[tokio::test]
async fn tags_match_on_any_shared_tag() {
  let svc = service().await;
  let mut a = draft(2, 1);
  a.tags = Some(vec!["karma".into(), "duty".into()]);
  let mut b = draft(2, 2);
  b.tags = Some(vec!["bhakti".into()]);
  let mut c = draft(2, 3);
  c.tags = Some(vec!["jnana".into()]);
  for d in [a, b, c] {
    svc.create(d).await.unwrap();
  }

  let found = svc
    .list(&ListParams { tags: Some("duty, bhakti".into()), ..Default::default() })
    .await
    .unwrap();
  let verses: Vec<u32> = found.items.iter().map(|r| r.verse).collect();
  assert_eq!(verses, [1, 2]);
}

#[tokio::test]
async fn chapter_filter_rejects_garbage() {
  let svc = service().await;
  let err = svc
    .list(&ListParams { chapter: Some("two".into()), ..Default::default() })
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::InvalidArgument(_)));
}

// ─── Soft / hard delete ──────────────────────────────────────────────────────

#[tokio::test]
async fn soft_deleted_verse_is_hidden_but_retained() {
  let svc = service().await;
  let keep = svc.create(draft(4, 1)).await.unwrap();
  let gone = svc.create(draft(4, 2)).await.unwrap();

  let deleted = svc.soft_delete(gone.id).await.unwrap().unwrap();
  assert!(!deleted.active);
  assert!(deleted.updated_at >= gone.updated_at);

  let chapter = svc.by_chapter(4).await.unwrap();
  assert_eq!(chapter.count(), 1);
  assert_eq!(chapter.verses[0].id, keep.id);

  assert!(svc.by_reference(4, 2).await.unwrap().is_none());
  let still_there = svc.get(gone.id).await.unwrap().unwrap();
  assert!(!still_there.active);
}

#[tokio::test]
async fn status_selects_visibility() {
  let svc = service().await;
  svc.create(draft(5, 1)).await.unwrap();
  let hidden = svc.create(draft(5, 2)).await.unwrap();
  svc.soft_delete(hidden.id).await.unwrap();

  let list = |status| ListParams { status: Some(status), ..Default::default() };
  assert_eq!(svc.list(&list(Visibility::Active)).await.unwrap().items.len(), 1);
  assert_eq!(svc.list(&list(Visibility::All)).await.unwrap().items.len(), 2);

  let inactive = svc.list(&list(Visibility::Inactive)).await.unwrap();
  assert_eq!(inactive.items.len(), 1);
  assert_eq!(inactive.items[0].id, hidden.id);

  let direct = svc.store().find_by_key(5, 2, Visibility::Inactive).await.unwrap();
  assert_eq!(direct.map(|r| r.id), Some(hidden.id));
}

#[tokio::test]
async fn soft_delete_missing_returns_none() {
  let svc = service().await;
  assert!(svc.soft_delete(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn hard_delete_removes_the_row() {
  let svc = service().await;
  let v = svc.create(draft(6, 1)).await.unwrap();

  let removed = svc.hard_delete(v.id).await.unwrap().unwrap();
  assert_eq!(removed.id, v.id);
  assert!(svc.get(v.id).await.unwrap().is_none());
  assert!(svc.hard_delete(v.id).await.unwrap().is_none());

  // The key is free again.
  svc.create(draft(6, 1)).await.unwrap();
}

#[tokio::test]
async fn invalid_chapter_listing_is_rejected() {
  let svc = service().await;
  for bad in [0, 19, -1] {
    let err = svc.by_chapter(bad).await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidArgument(_)));
  }
  assert_eq!(svc.by_chapter(18).await.unwrap().count(), 0);
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn replace_resets_unsupplied_fields_but_keeps_active() {
  let svc = service().await;
  let mut original = with_translation(draft(7, 1), "first");
  original.tags = Some(vec!["karma".into()]);
  let v = svc.create(original).await.unwrap();
  svc.soft_delete(v.id).await.unwrap();

  let updated = svc.replace(v.id, draft(7, 2)).await.unwrap().unwrap();
  assert_eq!(updated.id, v.id);
  assert_eq!(updated.verse, 2);
  assert!(!updated.active);
  assert!(updated.tags.is_empty());
  assert!(updated.commentary_sources.is_empty());
  assert_eq!(updated.created_at, v.created_at);
  assert!(updated.updated_at >= v.updated_at);
}

#[tokio::test]
async fn replace_missing_returns_none() {
  let svc = service().await;
  assert!(svc.replace(Uuid::new_v4(), draft(1, 1)).await.unwrap().is_none());
}

#[tokio::test]
async fn update_onto_taken_key_is_duplicate() {
  let svc = service().await;
  svc.create(draft(8, 1)).await.unwrap();
  let other = svc.create(draft(8, 2)).await.unwrap();

  let err = svc.replace(other.id, draft(8, 1)).await.unwrap_err();
  assert!(matches!(err, CoreError::Duplicate { chapter: 8, verse: 1 }));

  let patch = VerseDraft { verse: Some(1), ..Default::default() };
  let err = svc.patch(other.id, patch).await.unwrap_err();
  assert!(matches!(err, CoreError::Duplicate { .. }));
}

#[tokio::test]
async fn patch_changes_only_supplied_fields() {
  let svc = service().await;
  let v = svc
    .create(with_translation(draft(9, 1), "keep me"))
    .await
    .unwrap();

  let patch = VerseDraft {
    tags: Some(vec![" devotion ".into()]),
    ..Default::default()
  };
  let patched = svc.patch(v.id, patch).await.unwrap().unwrap();
  assert_eq!(patched.tags, ["devotion"]);
  assert_eq!(patched.original_text, v.original_text);
  assert_eq!(patched.commentary_sources, v.commentary_sources);

  let bad = VerseDraft { chapter: Some(19), ..Default::default() };
  let err = svc.patch(v.id, bad).await.unwrap_err();
  assert!(matches!(err, CoreError::Validation { .. }));
}

// ─── Stats ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn stats_count_active_records_per_chapter() {
  let svc = service().await;
  for (c, v) in [(1, 1), (1, 2), (1, 3), (2, 1), (2, 2)] {
    svc.create(draft(c, v)).await.unwrap();
  }
  let hidden = svc.create(draft(3, 1)).await.unwrap();
  svc.soft_delete(hidden.id).await.unwrap();

  let stats = svc.stats().await.unwrap();
  assert_eq!(stats.total_records, 5);
  assert_eq!(stats.total_chapters, 2);
  let counts: Vec<(u8, u64)> = stats
    .per_chapter_counts
    .iter()
    .map(|c| (c.chapter, c.count))
    .collect();
  assert_eq!(counts, [(1, 3), (2, 2)]);
}

#[tokio::test]
async fn stats_on_empty_store() {
  let stats = service().await.stats().await.unwrap();
  assert_eq!(stats.total_records, 0);
  assert_eq!(stats.total_chapters, 0);
  assert!(stats.per_chapter_counts.is_empty());
}

// ─── Upsert / migration ──────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_creates_then_updates_in_place() {
  let s = store().await;
  let (first, outcome) = s.upsert(new_verse(10, 1)).await.unwrap();
  assert_eq!(outcome, Upsert::Created);

  let mut changed = new_verse(10, 1);
  changed.original_text = "revised".into();
  changed.commentaries = Some(json!({ "tej": { "ht": "x" } }));
  let (second, outcome) = s.upsert(changed).await.unwrap();
  assert_eq!(outcome, Upsert::Updated);
  assert_eq!(second.id, first.id);
  assert_eq!(second.original_text, "revised");
  assert_eq!(second.created_at, first.created_at);
  assert_eq!(second.commentaries, Some(json!({ "tej": { "ht": "x" } })));
}

#[tokio::test]
async fn migration_isolates_failures_and_is_rerunnable() {
  let svc = service().await;
  let records = vec![
    json!({
      "_id": "BG2.47", "chapter": 2, "verse": 47,
      "slok": "कर्मण्येवाधिकारस्ते", "transliteration": "karmaṇy evādhikāras te",
      "siva": { "author": "Swami Sivananda", "et": "Thy right is to work only", "extra": true },
    }),
    json!({ "_id": "BG1.99", "chapter": 1, "verse": 99, "slok": "x", "transliteration": "x" }),
    json!({ "_id": "BG3.1", "chapter": 3, "verse": 1, "slok": "ज्यायसी", "transliteration": "jyāyasī" }),
    json!("not an object"),
  ];

  let report = svc.migrate(records.clone()).await;
  assert_eq!(report, MigrationReport { created: 2, updated: 0, failed: 2 });

  let rerun = svc.migrate(records).await;
  assert_eq!(rerun, MigrationReport { created: 0, updated: 2, failed: 2 });

  let v = svc.by_reference(2, 47).await.unwrap().unwrap();
  assert_eq!(v.tags, ["bhagwat-gita", "chapter-2", "verse-47", "migrated"]);
  let archive = v.commentaries.unwrap();
  assert_eq!(archive["siva"]["extra"], true);
  assert_eq!(
    v.commentary_sources.get(SourceKey::Siva).and_then(|e| e.et.as_deref()),
    Some("Thy right is to work only")
  );
}

#[tokio::test]
async fn replace_preserves_archived_commentaries() {
  let svc = service().await;
  svc
    .migrate([json!({ "chapter": 11, "verse": 1, "slok": "s", "transliteration": "t",
                      "tej": { "ht": "अर्थ" } })])
    .await;
  let v = svc.by_reference(11, 1).await.unwrap().unwrap();

  let updated = svc.replace(v.id, draft(11, 1)).await.unwrap().unwrap();
  assert_eq!(updated.commentaries, Some(json!({ "tej": { "ht": "अर्थ" } })));
}

#[tokio::test]
async fn migration_counts_failed_writes_and_continues() {
  let s = store().await;
  s.execute_batch(
    "CREATE TRIGGER reject_4_2 BEFORE INSERT ON verses
     WHEN NEW.chapter = 4 AND NEW.verse = 2
     BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
  )
  .await
  .unwrap();
  let svc = VerseService::new(Arc::new(s));

  let record = |verse: u32| {
    json!({ "chapter": 4, "verse": verse, "slok": "s", "transliteration": "t" })
  };
  let report = svc.migrate([record(1), record(2), record(3)]).await;
  assert_eq!(report, MigrationReport { created: 2, updated: 0, failed: 1 });

  assert!(svc.by_reference(4, 1).await.unwrap().is_some());
  assert!(svc.by_reference(4, 2).await.unwrap().is_none());
  assert!(svc.by_reference(4, 3).await.unwrap().is_some());
}
