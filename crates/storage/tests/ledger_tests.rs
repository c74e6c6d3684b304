//! Ledger integration tests
//!
//! Covers the properties every backend must hold:
//! - versions of a document are exactly 1..=N with no gaps or duplicates
//! - the pointer equals the highest stored version
//! - concurrent appends each get a distinct number
//! - the durable ledger replays to the same state and survives a torn tail
//! - damage before an intact record refuses to open and leaves the log alone

use proptest::prelude::*;
use std::io::Write;
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;
use verso_core::{DocumentId, ErrorKind, OrgId, Value, VersionMeta, VersionNumber, VersoError};
use verso_durability::DurabilityMode;
use verso_storage::{DurableLedger, MemoryLedger, VersionLedger};

// ============================================================================
// Helpers
// ============================================================================

fn dashboard(title: &str, panels: i64) -> Value {
    let mut snapshot = Value::object();
    snapshot.insert("title", title);
    snapshot.insert("panels", Value::Array((0..panels).map(Value::Int).collect()));
    snapshot
}

fn assert_contiguous<L: VersionLedger>(ledger: &L, doc: DocumentId, count: u64) {
    let history = ledger.list_all(doc).unwrap();
    let mut numbers: Vec<u64> = history.iter().map(|v| v.version().as_u64()).collect();
    numbers.reverse();
    assert_eq!(numbers, (1..=count).collect::<Vec<_>>());
    assert_eq!(ledger.current_version(doc), VersionNumber::new(count));
    for v in history.iter() {
        assert_eq!(v.parent_version(), v.version().prev());
    }
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_concurrent_appends_get_distinct_numbers() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 25;

    let ledger = Arc::new(MemoryLedger::new().with_append_retries(u32::MAX));
    let doc = DocumentId::new();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let ledger = Arc::clone(&ledger);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (0..PER_THREAD)
                    .map(|i| {
                        ledger
                            .append(
                                doc,
                                OrgId::new(1),
                                dashboard(&format!("t{}-{}", t, i), 1),
                                VersionMeta::by(format!("writer-{}", t)),
                            )
                            .unwrap()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut claimed: Vec<u64> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .map(|v| v.as_u64())
        .collect();
    claimed.sort_unstable();

    let total = (THREADS * PER_THREAD) as u64;
    assert_eq!(claimed, (1..=total).collect::<Vec<_>>());
    assert_contiguous(ledger.as_ref(), doc, total);
    assert_eq!(ledger.version_count(), total as usize);
}

#[test]
fn test_racing_optimistic_saves_one_wins() {
    const THREADS: usize = 6;

    let ledger = Arc::new(MemoryLedger::new());
    let doc = DocumentId::new();
    ledger
        .append(doc, OrgId::new(1), dashboard("base", 0), VersionMeta::default())
        .unwrap();

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let ledger = Arc::clone(&ledger);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                ledger.append_expecting(
                    doc,
                    OrgId::new(1),
                    dashboard("edit", t as i64),
                    VersionMeta::default(),
                    VersionNumber::FIRST,
                )
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1);
    for r in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(matches!(r, VersoError::VersionConflict { .. }));
        assert!(r.is_conflict());
    }
    assert_contiguous(ledger.as_ref(), doc, 2);
}

#[test]
fn test_documents_number_independently() {
    let ledger = MemoryLedger::new();
    let a = DocumentId::new();
    let b = DocumentId::new();
    for _ in 0..3 {
        ledger.append(a, OrgId::new(1), Value::Null, VersionMeta::default()).unwrap();
    }
    let first_b = ledger
        .append(b, OrgId::new(2), Value::Null, VersionMeta::default())
        .unwrap();
    assert_eq!(first_b, VersionNumber::FIRST);
    assert_eq!(ledger.document_count(), 2);
    assert_eq!(ledger.version_count(), 4);
}

// ============================================================================
// Durable ledger
// ============================================================================

#[test]
fn test_durable_replay_matches_memory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("versions.wal");
    let docs: Vec<_> = (0..3).map(|_| DocumentId::new()).collect();

    {
        let ledger = DurableLedger::open(&path, DurabilityMode::Always).unwrap();
        for (i, doc) in docs.iter().enumerate() {
            for n in 0..=i {
                ledger
                    .append(
                        *doc,
                        OrgId::new(i as u64),
                        dashboard(&format!("doc {} rev {}", i, n), n as i64),
                        VersionMeta::by("alice").with_message(format!("rev {}", n)),
                    )
                    .unwrap();
            }
        }
    }

    let ledger = DurableLedger::open(&path, DurabilityMode::Always).unwrap();
    assert_eq!(ledger.document_count(), 3);
    assert_eq!(ledger.version_count(), 6);
    for (i, doc) in docs.iter().enumerate() {
        assert_contiguous(&ledger, *doc, i as u64 + 1);
        let row = ledger.document(*doc).unwrap();
        assert_eq!(row.org_id, OrgId::new(i as u64));
        assert_eq!(row.title, format!("doc {} rev {}", i, i));
        let latest = ledger.get(*doc, row.current_version).unwrap();
        assert_eq!(latest.message(), Some(format!("rev {}", i).as_str()));
    }
}

#[test]
fn test_durable_discards_torn_tail_and_continues() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("versions.wal");
    let doc = DocumentId::new();

    {
        let ledger = DurableLedger::open(&path, DurabilityMode::Always).unwrap();
        ledger
            .append(doc, OrgId::new(1), dashboard("one", 1), VersionMeta::default())
            .unwrap();
        ledger
            .append(doc, OrgId::new(1), dashboard("two", 2), VersionMeta::default())
            .unwrap();
    }

    let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(&[200, 0, 0, 0, 1, 9, 9]).unwrap();
    drop(file);

    {
        let ledger = DurableLedger::open(&path, DurabilityMode::Always).unwrap();
        assert_contiguous(&ledger, doc, 2);
        let v = ledger
            .append(doc, OrgId::new(1), dashboard("three", 3), VersionMeta::default())
            .unwrap();
        assert_eq!(v, VersionNumber::new(3));
    }

    let ledger = DurableLedger::open(&path, DurabilityMode::Always).unwrap();
    assert_contiguous(&ledger, doc, 3);
    assert_eq!(ledger.document(doc).unwrap().title, "three");
}

#[test]
fn test_durable_refuses_damaged_length_in_the_middle() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("versions.wal");
    let doc = DocumentId::new();
    {
        let ledger = DurableLedger::open(&path, DurabilityMode::Always).unwrap();
        for i in 0..3 {
            ledger
                .append(doc, OrgId::new(1), dashboard("v", i), VersionMeta::default())
                .unwrap();
        }
    }

    // Byte 18 is inside the length prefix of the first record.
    let mut bytes = std::fs::read(&path).unwrap();
    bytes[18] ^= 0x10;
    std::fs::write(&path, &bytes).unwrap();

    let err = match DurableLedger::open(&path, DurabilityMode::Always) {
        Ok(_) => panic!("damaged log opened"),
        Err(e) => VersoError::from(e),
    };
    assert_eq!(err.kind(), ErrorKind::StorageFailure);
    assert_eq!(std::fs::read(&path).unwrap(), bytes);
}

#[test]
fn test_durable_rejects_cross_tenant_write() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("versions.wal");
    let doc = DocumentId::new();
    let ledger = DurableLedger::open(&path, DurabilityMode::Always).unwrap();
    ledger
        .append(doc, OrgId::new(1), Value::Null, VersionMeta::default())
        .unwrap();

    let err = ledger
        .append(doc, OrgId::new(2), Value::Null, VersionMeta::default())
        .unwrap_err();
    assert!(matches!(err, VersoError::TenantMismatch { .. }));
    assert!(err.is_not_found());
    // Nothing reached the log.
    assert_eq!(ledger.wal_counters().wal_appends, 1);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_sequential_appends_are_contiguous(counts in prop::collection::vec(1u64..12, 1..5)) {
        let ledger = MemoryLedger::new();
        let docs: Vec<_> = counts.iter().map(|_| DocumentId::new()).collect();

        // Interleave writes across documents.
        let max = counts.iter().copied().max().unwrap_or(0);
        for round in 0..max {
            for (doc, count) in docs.iter().zip(&counts) {
                if round < *count {
                    let v = ledger
                        .append(*doc, OrgId::new(1), Value::Int(round as i64), VersionMeta::default())
                        .unwrap();
                    prop_assert_eq!(v, VersionNumber::new(round + 1));
                }
            }
        }

        for (doc, count) in docs.iter().zip(&counts) {
            assert_contiguous(&ledger, *doc, *count);
        }
        prop_assert_eq!(ledger.version_count() as u64, counts.iter().sum::<u64>());
    }

    #[test]
    fn prop_pages_partition_history(total in 1u64..30, page in 1usize..8) {
        let ledger = MemoryLedger::new();
        let doc = DocumentId::new();
        for i in 0..total {
            ledger
                .append(doc, OrgId::new(1), Value::Int(i as i64), VersionMeta::default())
                .unwrap();
        }

        let mut seen = Vec::new();
        let mut offset = 0;
        while let Ok(chunk) = ledger.list_page(doc, Some(page), offset) {
            prop_assert!(chunk.len() <= page);
            seen.extend(chunk.version_numbers());
            offset += page;
        }
        prop_assert_eq!(seen, ledger.list_all(doc).unwrap().version_numbers());
    }
}
