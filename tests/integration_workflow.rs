//! Integration tests for the sorting workflow.
//!
//! These drive whole sessions with a scripted presenter and a fake
//! fingerprinter:
//! - Duplicate routing (exact and near-duplicate)
//! - Quit and resume
//! - Interrupted and externally changed sessions
//! - Fatal persisted-state errors

use photo_sorter::core::hasher::{Fingerprint, FingerprintAlgorithm, Fingerprinter};
use photo_sorter::core::resolver::{select_strategy, DuplicateResolver, DuplicateVerdict};
use photo_sorter::core::scanner::{PhotoFile, PhotoScanner, ScanResult};
use photo_sorter::core::session::SessionStorage;
use photo_sorter::core::store::HashStore;
use photo_sorter::core::viewer::NoopViewer;
use photo_sorter::core::workflow::{
    CandidateContext, Disposition, Notice, Presenter, SortConfig, SortWorkflow,
};
use photo_sorter::core::workspace::SortWorkspace;
use photo_sorter::error::{HashError, ScanError, SorterError, StoreError};
use photo_sorter::events::{
    Event, EventChannel, EventReceiver, EventSender, FinishReason, SessionSummary, SortEvent,
};
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Replays a fixed list of dispositions; quits when it runs out
#[derive(Default)]
struct ScriptedPresenter {
    decisions: VecDeque<Disposition>,
    prompted: Vec<(String, DuplicateVerdict)>,
    notices: Vec<Notice>,
}

impl ScriptedPresenter {
    fn new(decisions: Vec<Disposition>) -> Self {
        Self {
            decisions: decisions.into(),
            ..Self::default()
        }
    }

    fn prompted_paths(&self) -> Vec<&str> {
        self.prompted.iter().map(|(p, _)| p.as_str()).collect()
    }
}

impl Presenter for ScriptedPresenter {
    fn prompt_decision(&mut self, context: &CandidateContext<'_>) -> io::Result<Disposition> {
        self.prompted
            .push((context.relative_path.to_string(), context.verdict.clone()));
        Ok(self.decisions.pop_front().unwrap_or(Disposition::Quit))
    }

    fn confirm(&mut self, _question: &str) -> bool {
        true
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    fn print_summary(&mut self, _summary: &SessionSummary) {}
}

/// Fingerprints by file name
struct FakeFingerprinter(HashMap<String, u64>);

impl FakeFingerprinter {
    fn boxed(entries: &[(&str, u64)]) -> Box<dyn Fingerprinter> {
        Box::new(Self(
            entries.iter().map(|(n, v)| (n.to_string(), *v)).collect(),
        ))
    }
}

impl Fingerprinter for FakeFingerprinter {
    fn fingerprint_file(&self, path: &Path) -> Result<Fingerprint, HashError> {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        self.0
            .get(name)
            .map(|&bits| Fingerprint::new(bits))
            .ok_or_else(|| HashError::DecodeError {
                path: path.to_path_buf(),
                reason: "not a test image".to_string(),
            })
    }

    fn algorithm(&self) -> FingerprintAlgorithm {
        FingerprintAlgorithm::Perceptual
    }
}

/// Returns a fixed list of paths, existing or not
struct ListedScanner(Vec<PathBuf>);

impl PhotoScanner for ListedScanner {
    fn scan(&self, _root: &Path) -> Result<ScanResult, ScanError> {
        Ok(ScanResult {
            photos: self
                .0
                .iter()
                .map(|path| PhotoFile {
                    path: path.clone(),
                    size: 0,
                })
                .collect(),
            errors: Vec::new(),
        })
    }

    fn scan_with_events(&self, root: &Path, _events: &EventSender) -> Result<ScanResult, ScanError> {
        self.scan(root)
    }
}

fn write(root: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = root.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, bytes).unwrap();
    path
}

fn config(threshold: u32) -> SortConfig {
    SortConfig {
        threshold,
        preview: false,
        ..SortConfig::default()
    }
}

fn run(
    root: &Path,
    config: SortConfig,
    fingerprints: &[(&str, u64)],
    presenter: &mut ScriptedPresenter,
) -> (Result<SessionSummary, SorterError>, EventReceiver) {
    let (sender, receiver) = EventChannel::new();
    let result = SortWorkflow::builder(root)
        .config(config)
        .resolver(DuplicateResolver::new(select_strategy(Some(
            FakeFingerprinter::boxed(fingerprints),
        ))))
        .previewer(Box::new(NoopViewer))
        .events(sender)
        .build()
        .and_then(|workflow| workflow.run(presenter));
    (result, receiver)
}

fn index(root: &Path) -> HashStore {
    HashStore::open_json(&SortWorkspace::new(root).index_file()).unwrap()
}

fn sort_events(receiver: &EventReceiver) -> Vec<SortEvent> {
    receiver
        .drain()
        .into_iter()
        .filter_map(|event| match event {
            Event::Sort(event) => Some(event),
            _ => None,
        })
        .collect()
}

#[test]
fn three_identical_photos_file_one_and_route_two() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("Event1")).unwrap();
    for name in ["a.jpg", "b.jpg", "c.jpg"] {
        write(dir.path(), name, b"identical bytes");
    }
    let mut presenter = ScriptedPresenter::new(vec![Disposition::MoveToEvent { index: 0 }]);

    let (result, _events) = run(dir.path(), config(5), &[], &mut presenter);
    let summary = result.unwrap();

    assert_eq!(presenter.prompted_paths(), ["a.jpg"]);
    assert_eq!(summary.sorted, 1);
    assert_eq!(summary.duplicates, 2);
    assert_eq!(summary.reason, Some(FinishReason::Exhausted));

    let store = index(dir.path());
    assert_eq!(store.len(), 1);
    assert!(store.get("Event1/a.jpg").is_some());
    assert!(dir.path().join("Duplicates/b.jpg").exists());
    assert!(dir.path().join("Duplicates/c.jpg").exists());
}

#[test]
fn near_duplicate_within_threshold_is_routed() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("Event1")).unwrap();
    write(dir.path(), "a.jpg", b"original");
    write(dir.path(), "b.jpg", b"resized copy");
    let fingerprints = [("a.jpg", 0u64), ("b.jpg", 0b111)];
    let mut presenter = ScriptedPresenter::new(vec![Disposition::MoveToEvent { index: 0 }]);

    let (result, events) = run(dir.path(), config(5), &fingerprints, &mut presenter);
    let summary = result.unwrap();

    assert_eq!(summary.duplicates, 1);
    assert!(dir.path().join("Duplicates/b.jpg").exists());
    let routed = sort_events(&events).into_iter().find_map(|event| match event {
        SortEvent::DuplicateRouted { verdict, .. } => Some(verdict),
        _ => None,
    });
    assert_eq!(
        routed,
        Some(DuplicateVerdict::LikelyDuplicate {
            of: "Event1/a.jpg".to_string(),
            distance: 3,
        })
    );
    // The filed photo carries its fingerprint
    assert_eq!(
        index(dir.path()).get("Event1/a.jpg").unwrap().fingerprint,
        Some(Fingerprint::new(0))
    );
}

#[test]
fn near_duplicate_beyond_threshold_is_prompted() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("Event1")).unwrap();
    write(dir.path(), "a.jpg", b"original");
    write(dir.path(), "b.jpg", b"resized copy");
    let fingerprints = [("a.jpg", 0u64), ("b.jpg", 0b111)];
    let mut presenter = ScriptedPresenter::new(vec![
        Disposition::MoveToEvent { index: 0 },
        Disposition::MoveToEvent { index: 0 },
    ]);

    let (result, _events) = run(dir.path(), config(2), &fingerprints, &mut presenter);
    let summary = result.unwrap();

    assert_eq!(presenter.prompted_paths(), ["a.jpg", "b.jpg"]);
    assert_eq!(presenter.prompted[1].1, DuplicateVerdict::NotDuplicate);
    assert_eq!(summary.sorted, 2);
    assert_eq!(index(dir.path()).len(), 2);
}

#[test]
fn quit_then_resume_continues_at_the_same_photo() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("zoo")).unwrap();
    write(dir.path(), "m.jpg", b"m");
    write(dir.path(), "n.jpg", b"n");
    write(dir.path(), "z.jpg", b"z");

    let mut first = ScriptedPresenter::new(vec![
        Disposition::MoveToEvent { index: 0 },
        Disposition::Quit,
    ]);
    let (result, _events) = run(dir.path(), config(5), &[], &mut first);
    let summary = result.unwrap();
    assert_eq!(summary.reason, Some(FinishReason::UserQuit));
    assert_eq!(summary.cursor, 1);

    let state = SessionStorage::new(SortWorkspace::new(dir.path()).state_file())
        .load()
        .unwrap();
    assert_eq!(state.cursor(), 1);
    assert_eq!(state.sorted_count(), 1);

    // A rescan would now list zoo/m.jpg last and shift n.jpg to position 0
    let mut second = ScriptedPresenter::new(vec![Disposition::Skip, Disposition::Skip]);
    let (result, events) = run(dir.path(), config(5), &[], &mut second);
    let summary = result.unwrap();

    assert_eq!(second.prompted_paths(), ["n.jpg", "z.jpg"]);
    assert!(sort_events(&events).iter().any(|event| matches!(
        event,
        SortEvent::Loaded {
            cursor: 1,
            total: 3,
            resumed: true
        }
    )));
    assert_eq!(summary.sorted, 1);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.cursor, 3);
    assert_eq!(summary.reason, Some(FinishReason::Exhausted));
}

#[test]
fn interrupted_move_is_not_filed_twice() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("Event1")).unwrap();
    write(dir.path(), "a.jpg", b"a");
    write(dir.path(), "b.jpg", b"b");

    let mut first = ScriptedPresenter::new(vec![
        Disposition::MoveToEvent { index: 0 },
        Disposition::Quit,
    ]);
    run(dir.path(), config(5), &[], &mut first).0.unwrap();

    // Lose the session as if the process died after the move was indexed
    let workspace = SortWorkspace::new(dir.path());
    fs::remove_file(workspace.state_file()).unwrap();

    let mut second = ScriptedPresenter::new(vec![Disposition::Skip]);
    let (result, events) = run(dir.path(), config(5), &[], &mut second);
    let summary = result.unwrap();

    assert_eq!(second.prompted_paths(), ["b.jpg"]);
    assert!(sort_events(&events).iter().any(|event| matches!(
        event,
        SortEvent::AlreadyFiled { path } if path.ends_with("Event1/a.jpg")
    )));
    assert_eq!(summary.duplicates, 0);
    assert_eq!(index(dir.path()).len(), 1);
}

#[test]
fn vanished_photo_is_passed_over_without_counting() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.jpg", b"a");
    let gone = dir.path().join("gone.jpg");
    let mut presenter = ScriptedPresenter::new(vec![Disposition::Skip]);

    let (sender, receiver) = EventChannel::new();
    let summary = SortWorkflow::builder(dir.path())
        .config(config(5))
        .resolver(DuplicateResolver::exact_only())
        .scanner(Box::new(ListedScanner(vec![gone.clone(), a])))
        .previewer(Box::new(NoopViewer))
        .events(sender)
        .build()
        .unwrap()
        .run(&mut presenter)
        .unwrap();

    assert_eq!(presenter.prompted_paths(), ["a.jpg"]);
    assert_eq!(summary.missing, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.duplicates + summary.deleted + summary.sorted, 0);
    assert_eq!(summary.cursor, 2);
    assert!(sort_events(&receiver)
        .iter()
        .any(|event| matches!(event, SortEvent::CandidateMissing { path } if *path == gone)));
}

#[test]
fn corrupt_index_stops_before_touching_photos() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("Event1")).unwrap();
    let a = write(dir.path(), "a.jpg", b"a");
    let workspace = SortWorkspace::new(dir.path());
    fs::create_dir_all(workspace.index_file().parent().unwrap()).unwrap();
    fs::write(workspace.index_file(), "{ this is not json").unwrap();
    let mut presenter = ScriptedPresenter::new(vec![Disposition::MoveToEvent { index: 0 }]);

    let (result, _events) = run(dir.path(), config(5), &[], &mut presenter);

    assert!(matches!(
        result,
        Err(SorterError::Store(StoreError::CorruptIndex { .. }))
    ));
    assert!(presenter.prompted.is_empty());
    assert!(a.exists());
    assert!(!workspace.state_file().exists());
}

#[test]
fn invalid_threshold_is_rejected_at_build() {
    let dir = TempDir::new().unwrap();

    let result = SortWorkflow::builder(dir.path()).config(config(65)).build();

    assert!(matches!(result, Err(SorterError::Config(_))));
}
