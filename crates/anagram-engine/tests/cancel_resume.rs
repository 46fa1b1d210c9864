mod common;

use std::fs;

use anagram_core::Token;
use anagram_engine::{
    CancelToken, Coordinator, FileCheckpointStore, FileSink, MemoryCheckpointStore, MemorySink,
    PartitionState, RunMode, RunStatus, WorkerStatus,
};
use common::{assert_exact_anagrams, test_config, CancelAfter};

const WORD: &str = "aabbccdde";
const PARTITIONS: u8 = 5;
const ANAGRAMS: u64 = 22_680;

#[test]
fn cancelling_before_start_checkpoints_every_first_position() {
    let coordinator = Coordinator::new(Token::new("abc").unwrap(), test_config());
    let cancel = CancelToken::new();
    cancel.cancel();
    let mut sink = MemorySink::new();
    let store = MemoryCheckpointStore::new();

    let report = coordinator
        .run(&mut sink, &store, &cancel, RunMode::Fresh)
        .unwrap();
    assert_eq!(report.status, RunStatus::Cancelled);
    assert_eq!(report.found, 0);
    assert!(sink.lines().is_empty());

    let records = store.records();
    assert_eq!(records.len(), 3);
    for (partition, record) in records {
        assert_eq!(record.position, 0);
        assert_eq!(record.digits, vec![partition, 0, 0]);
        assert_eq!(record.state, PartitionState::Pending);
    }

    let mut resumed_sink = MemorySink::with_lines(sink.into_lines());
    let report = coordinator
        .run(&mut resumed_sink, &store, &CancelToken::new(), RunMode::Resume)
        .unwrap();
    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.found, 6);
    assert_exact_anagrams("abc", resumed_sink.lines());
    assert!(store.records().is_empty());
}

#[test]
fn repeated_cancel_and_resume_covers_every_anagram_once() {
    let coordinator = Coordinator::new(Token::new(WORD).unwrap(), test_config());
    let store = MemoryCheckpointStore::new();
    let mut lines: Vec<String> = Vec::new();
    let mut mode = RunMode::Fresh;

    for _ in 0..1_000 {
        let cancel = CancelToken::new();
        let mut sink = CancelAfter::new(MemorySink::with_lines(lines.clone()), cancel.clone(), 500);
        let report = coordinator.run(&mut sink, &store, &cancel, mode).unwrap();
        lines = sink.inner.into_lines();
        assert_eq!(report.found, lines.len() as u64);
        match report.status {
            RunStatus::Completed => break,
            RunStatus::Cancelled => {
                assert_eq!(store.records().len(), usize::from(PARTITIONS));
                for worker in &report.workers {
                    let record = &store.records()[&worker.partition];
                    assert_eq!(record.position, worker.position);
                    match worker.status {
                        WorkerStatus::Completed => {
                            assert_eq!(record.state, PartitionState::Exhausted)
                        }
                        _ => assert_eq!(record.state, PartitionState::Pending),
                    }
                }
                mode = RunMode::Resume;
            }
        }
    }

    assert!(store.records().is_empty());
    assert_exact_anagrams(WORD, &lines);
}

#[test]
fn file_backed_round_trip_leaves_no_duplicate_lines() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("output.txt");
    let store = FileCheckpointStore::new(dir.path().join("state"), "worker-state-");
    let coordinator = Coordinator::new(Token::new(WORD).unwrap(), test_config());

    let cancel = CancelToken::new();
    let mut sink = CancelAfter::new(FileSink::create(&output).unwrap(), cancel.clone(), 2_000);
    let first = coordinator
        .run(&mut sink, &store, &cancel, RunMode::Fresh)
        .unwrap();
    drop(sink);

    if first.status == RunStatus::Cancelled {
        for partition in 0..PARTITIONS {
            assert!(store.path(partition).exists());
        }
        let mut sink = FileSink::append(&output).unwrap();
        let resumed = coordinator
            .run(&mut sink, &store, &CancelToken::new(), RunMode::Resume)
            .unwrap();
        assert_eq!(resumed.status, RunStatus::Completed);
        assert_eq!(resumed.found, ANAGRAMS);
    }

    let text = fs::read_to_string(&output).unwrap();
    let lines: Vec<String> = text.lines().map(str::to_string).collect();
    assert_exact_anagrams(WORD, &lines);
    for partition in 0..PARTITIONS {
        assert!(!store.path(partition).exists());
    }
}
