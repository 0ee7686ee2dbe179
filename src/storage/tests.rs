use std::sync::Arc;

use tempfile::TempDir;

use crate::embedding::MockEncoder;
use crate::ranking::{Document, DocumentId, RankingEngine, RankingResultSet};

use super::*;

fn ranked(query_id: &str, candidates: &[(&str, &str)]) -> RankingResultSet {
    let engine = RankingEngine::new(MockEncoder::new());
    let docs: Vec<Document> = candidates
        .iter()
        .map(|(id, text)| Document::candidate(*id, *text))
        .collect();
    engine
        .rank(&Document::query(query_id, "python backend developer"), &docs)
        .unwrap()
}

fn stores() -> (TempDir, Vec<Box<dyn RankingStore>>) {
    let dir = TempDir::new().unwrap();
    let file = FileRankingStore::open(dir.path().join("results")).unwrap();
    (dir, vec![Box::new(MemoryRankingStore::new()), Box::new(file)])
}

#[test]
fn test_get_missing_returns_none() {
    let (_dir, stores) = stores();
    for store in &stores {
        assert!(store.get(&"nope".into()).unwrap().is_none(), "{}", store.kind());
    }
}

#[test]
fn test_replace_then_get() {
    let (_dir, stores) = stores();
    let set = ranked("job-1", &[("r1", "python developer"), ("r2", "chef")]);

    for store in &stores {
        assert!(store.replace(set.clone()).unwrap().is_none());
        let loaded = store.get(&"job-1".into()).unwrap().unwrap();
        assert_eq!(loaded, set, "{}", store.kind());
    }
}

#[test]
fn test_rerun_supersedes_previous_set() {
    let (_dir, stores) = stores();
    let first = ranked(
        "job-1",
        &[("r1", "python"), ("r2", "java"), ("r3", "react")],
    );
    let second = ranked("job-1", &[("r4", "python backend")]);

    for store in &stores {
        store.replace(first.clone()).unwrap();
        let previous = store.replace(second.clone()).unwrap().unwrap();
        assert_eq!(previous.run_id, first.run_id);

        let current = store.get(&"job-1".into()).unwrap().unwrap();
        assert_eq!(current.run_id, second.run_id);
        assert_eq!(current.len(), 1, "{}: rows must not merge", store.kind());
        assert_eq!(current.scores[0].candidate_id.as_str(), "r4");
    }
}

#[test]
fn test_queries_are_independent() {
    let (_dir, stores) = stores();

    for store in &stores {
        store.replace(ranked("job-a", &[("r1", "x")])).unwrap();
        store.replace(ranked("job-b", &[("r2", "y")])).unwrap();
        store.replace(ranked("job-a", &[("r3", "z")])).unwrap();

        let ids = store.query_ids().unwrap();
        assert_eq!(ids, vec![DocumentId::from("job-a"), DocumentId::from("job-b")]);

        let b = store.get(&"job-b".into()).unwrap().unwrap();
        assert_eq!(b.scores[0].candidate_id.as_str(), "r2");
    }
}

#[test]
fn test_remove() {
    let (_dir, stores) = stores();

    for store in &stores {
        store.replace(ranked("job-1", &[("r1", "x")])).unwrap();
        assert!(store.remove(&"job-1".into()).unwrap());
        assert!(!store.remove(&"job-1".into()).unwrap());
        assert!(store.get(&"job-1".into()).unwrap().is_none());
        assert!(store.query_ids().unwrap().is_empty());
    }
}

#[test]
fn test_invalid_set_is_rejected() {
    let (_dir, stores) = stores();
    let mut broken = ranked("job-1", &[("r1", "python"), ("r2", "java")]);
    broken.scores[1].rank = 5;

    for store in &stores {
        let err = store.replace(broken.clone()).unwrap_err();
        assert!(matches!(err, StorageError::InvalidResultSet { .. }));
        assert!(store.get(&"job-1".into()).unwrap().is_none());
    }
}

#[test]
fn test_file_store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let set = ranked("job/../weird id", &[("r1", "python"), ("r2", "go")]);

    {
        let store = FileRankingStore::open(dir.path()).unwrap();
        store.replace(set.clone()).unwrap();
    }

    let reopened = FileRankingStore::open(dir.path()).unwrap();
    assert_eq!(reopened.get(&set.query_id).unwrap().unwrap(), set);
    assert_eq!(reopened.query_ids().unwrap(), vec![set.query_id.clone()]);
}

#[test]
fn test_file_store_leaves_no_temp_files() {
    let dir = TempDir::new().unwrap();
    let store = FileRankingStore::open(dir.path()).unwrap();

    store.replace(ranked("job-1", &[("r1", "x")])).unwrap();
    store.replace(ranked("job-1", &[("r2", "y")])).unwrap();

    let names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(names.len(), 1);
    assert!(names[0].to_string_lossy().ends_with(".json"));
}

#[test]
fn test_file_store_rejects_file_root() {
    let dir = TempDir::new().unwrap();
    let file_path = dir.path().join("not-a-dir");
    std::fs::write(&file_path, b"x").unwrap();

    let err = FileRankingStore::open(&file_path).unwrap_err();
    assert!(matches!(err, StorageError::StorageUnavailable { .. }));
}

#[test]
fn test_concurrent_replace_keeps_one_whole_set() {
    let store = Arc::new(MemoryRankingStore::new());
    let sets: Vec<RankingResultSet> = (0..8)
        .map(|i| {
            let id = format!("r{}", i);
            ranked("job-1", &[(id.as_str(), "python"), ("shared", "java")])
        })
        .collect();

    let handles: Vec<_> = sets
        .iter()
        .cloned()
        .map(|set| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || match store.replace(set) {
                Ok(_) | Err(StorageError::StaleResultSet { .. }) => {}
                Err(e) => panic!("unexpected store error: {e}"),
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let current = store.get(&"job-1".into()).unwrap().unwrap();
    let newest = sets.iter().map(|s| s.ranked_at).max().unwrap();
    assert!(sets.contains(&current));
    assert_eq!(current.ranked_at, newest);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_older_run_does_not_overwrite_newer() {
    let (_dir, stores) = stores();
    let newer = ranked("job-1", &[("r1", "python")]);
    let mut older = ranked("job-1", &[("r2", "java")]);
    older.ranked_at = newer.ranked_at - chrono::Duration::seconds(5);

    for store in &stores {
        store.replace(newer.clone()).unwrap();

        let err = store.replace(older.clone()).unwrap_err();
        match err {
            StorageError::StaleResultSet {
                query_id,
                run_id,
                stored_run_id,
            } => {
                assert_eq!(query_id.as_str(), "job-1");
                assert_eq!(run_id, older.run_id);
                assert_eq!(stored_run_id, newer.run_id);
            }
            other => panic!("{}: expected stale error, got {other}", store.kind()),
        }

        let current = store.get(&"job-1".into()).unwrap().unwrap();
        assert_eq!(current.run_id, newer.run_id, "{}", store.kind());
    }
}

#[test]
fn test_older_run_for_other_query_is_stored() {
    let (_dir, stores) = stores();
    let newer = ranked("job-a", &[("r1", "python")]);
    let mut older = ranked("job-b", &[("r2", "java")]);
    older.ranked_at = newer.ranked_at - chrono::Duration::seconds(5);

    for store in &stores {
        store.replace(newer.clone()).unwrap();
        assert!(store.replace(older.clone()).unwrap().is_none());
        assert_eq!(store.query_ids().unwrap().len(), 2, "{}", store.kind());
    }
}

#[test]
fn test_file_store_concurrent_replace_across_queries() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileRankingStore::open(dir.path()).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                let query_id = format!("job-{}", i);
                for round in 0..3 {
                    let candidate = format!("r{}", round);
                    let set = ranked(&query_id, &[(candidate.as_str(), "python")]);
                    store.replace(set).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let ids = store.query_ids().unwrap();
    assert_eq!(ids.len(), 8);
    for id in &ids {
        let current = store.get(id).unwrap().unwrap();
        assert_eq!(current.scores[0].candidate_id.as_str(), "r2");
    }
}
