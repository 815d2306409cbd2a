//! Sorting workflow execution.

use super::config::{CorruptStatePolicy, SortConfig};
use super::presenter::{CandidateContext, Disposition, Notice, Presenter};
use crate::core::folders::{FolderOps, FsFolderOps};
use crate::core::hasher::check_fingerprinter;
use crate::core::resolver::{select_strategy, DuplicateResolver, Inspection};
use crate::core::scanner::{PhotoScanner, ScanConfig, WalkDirScanner};
use crate::core::session::{CandidateList, CandidateSnapshot, SessionState, SessionStorage};
use crate::core::store::{HashStore, IndexBackend, JsonIndexFile};
use crate::core::viewer::{NoopViewer, Previewer, SystemViewer};
use crate::core::workspace::SortWorkspace;
use crate::error::{FolderError, Result, SessionError};
use crate::events::{null_sender, Event, EventSender, FinishReason, SessionSummary, SortEvent, SortPhase};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Builder for a sorting workflow
pub struct SortWorkflowBuilder {
    workspace: SortWorkspace,
    config: SortConfig,
    resolver: Option<DuplicateResolver>,
    scanner: Option<Box<dyn PhotoScanner>>,
    folders: Option<Box<dyn FolderOps>>,
    previewer: Option<Box<dyn Previewer>>,
    index: Option<Box<dyn IndexBackend>>,
    events: EventSender,
}

impl SortWorkflowBuilder {
    /// Create a builder for sorting `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            workspace: SortWorkspace::new(root),
            config: SortConfig::default(),
            resolver: None,
            scanner: None,
            folders: None,
            previewer: None,
            index: None,
            events: null_sender(),
        }
    }

    pub fn config(mut self, config: SortConfig) -> Self {
        self.config = config;
        self
    }

    /// Use this resolver instead of probing for one.
    /// The configured threshold still applies.
    pub fn resolver(mut self, resolver: DuplicateResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn scanner(mut self, scanner: Box<dyn PhotoScanner>) -> Self {
        self.scanner = Some(scanner);
        self
    }

    pub fn folders(mut self, folders: Box<dyn FolderOps>) -> Self {
        self.folders = Some(folders);
        self
    }

    pub fn previewer(mut self, previewer: Box<dyn Previewer>) -> Self {
        self.previewer = Some(previewer);
        self
    }

    /// Set the hash index backend (default: the JSON file in the workspace)
    pub fn index(mut self, index: Box<dyn IndexBackend>) -> Self {
        self.index = Some(index);
        self
    }

    pub fn events(mut self, events: EventSender) -> Self {
        self.events = events;
        self
    }

    /// Validate the configuration and pick the detection strategy.
    ///
    /// Fingerprinting is checked here, once. If it is unavailable the
    /// workflow runs exact-only and warns when it starts.
    pub fn build(self) -> Result<SortWorkflow> {
        self.config.validate()?;
        let config = self.config;
        let workspace = self.workspace;
        let mut warnings = Vec::new();

        let resolver = match self.resolver {
            Some(resolver) => resolver,
            None if config.exact_only => DuplicateResolver::exact_only(),
            None => {
                let fingerprinter = match check_fingerprinter(config.algorithm) {
                    Ok(fingerprinter) => Some(fingerprinter),
                    Err(e) => {
                        warnings.push(format!("{}. Only exact duplicates will be detected.", e));
                        None
                    }
                };
                DuplicateResolver::new(select_strategy(fingerprinter))
            }
        }
        .with_threshold(config.threshold);

        let scanner = self.scanner.unwrap_or_else(|| {
            Box::new(WalkDirScanner::new(ScanConfig {
                excluded_folders: vec![config.duplicates_folder.clone()],
                ..ScanConfig::default()
            }))
        });
        let folders = self.folders.unwrap_or_else(|| {
            Box::new(
                FsFolderOps::new(workspace.clone())
                    .with_duplicates_folder(config.duplicates_folder.clone()),
            )
        });
        let previewer = self.previewer.unwrap_or_else(|| {
            if config.preview {
                Box::new(SystemViewer::new())
            } else {
                Box::new(NoopViewer)
            }
        });
        let index = self
            .index
            .unwrap_or_else(|| Box::new(JsonIndexFile::new(workspace.index_file())));

        Ok(SortWorkflow {
            session: SessionStorage::new(workspace.state_file()),
            snapshot: CandidateSnapshot::new(workspace.candidates_file()),
            workspace,
            config,
            resolver,
            scanner,
            folders,
            previewer,
            index,
            events: self.events,
            warnings,
        })
    }
}

/// The sorting state machine, configured and ready to run.
///
/// ```text
/// Loading -> Iterating -> [Resolving -> AwaitingDecision -> Applying] -> Iterating ... -> Finished
/// ```
///
/// Every disposition is applied to the file system first, then registered
/// in the hash index, then recorded in the saved session. A crash between
/// the steps re-presents the same photo on resume, where the index already
/// knows it; the reverse can never happen.
pub struct SortWorkflow {
    workspace: SortWorkspace,
    config: SortConfig,
    resolver: DuplicateResolver,
    scanner: Box<dyn PhotoScanner>,
    folders: Box<dyn FolderOps>,
    previewer: Box<dyn Previewer>,
    index: Box<dyn IndexBackend>,
    session: SessionStorage,
    snapshot: CandidateSnapshot,
    events: EventSender,
    warnings: Vec<String>,
}

impl SortWorkflow {
    /// Create a new workflow builder
    pub fn builder(root: impl Into<PathBuf>) -> SortWorkflowBuilder {
        SortWorkflowBuilder::new(root)
    }

    pub fn workspace(&self) -> &SortWorkspace {
        &self.workspace
    }

    /// Name of the detection strategy chosen at build time
    pub fn strategy_name(&self) -> &'static str {
        self.resolver.strategy_name()
    }

    /// Run until the candidate list is exhausted or the user quits.
    ///
    /// Fatal errors: a corrupt hash index, a corrupt session (unless the
    /// policy is to start over), an unscannable root, and failures to
    /// persist the index or the session.
    pub fn run(self, presenter: &mut dyn Presenter) -> Result<SessionSummary> {
        let started = Instant::now();
        let mut active = ActiveSession::open(self, presenter)?;
        let reason = active.iterate(presenter)?;
        active.finish(reason, started, presenter)
    }
}

/// Outcome of one candidate
enum Step {
    Next(SessionState),
    Quit,
}

/// Outcome of applying one disposition
enum Applied {
    Done(SessionState),
    Retry,
    Quit,
}

/// A workflow with its stores loaded
struct ActiveSession {
    workspace: SortWorkspace,
    config: SortConfig,
    resolver: DuplicateResolver,
    folders: Box<dyn FolderOps>,
    previewer: Box<dyn Previewer>,
    session: SessionStorage,
    events: EventSender,
    store: HashStore,
    state: SessionState,
    candidates: CandidateList,
    missing: usize,
}

impl ActiveSession {
    fn open(workflow: SortWorkflow, presenter: &mut dyn Presenter) -> Result<Self> {
        let SortWorkflow {
            workspace,
            config,
            resolver,
            scanner,
            folders,
            previewer,
            index,
            session,
            snapshot,
            events,
            warnings,
        } = workflow;

        enter(&events, SortPhase::Loading);
        tracing::info!(
            root = %workspace.root().display(),
            started_at = %chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            strategy = resolver.strategy_name(),
            threshold = resolver.threshold(),
            auto_duplicates = config.auto_duplicates,
            "Photo sorter session started"
        );
        for warning in warnings {
            tracing::warn!("{}", warning);
            presenter.notify(Notice::Warning(warning));
        }

        let store = HashStore::open(index)?;

        let mut state = match session.load() {
            Ok(state) => state,
            Err(e) => discard_or_abort(e, config.corrupt_state, presenter)?,
        };

        let saved = if state.cursor() > 0 {
            match snapshot.load(workspace.root()) {
                Ok(Some(list)) => Some(list),
                Ok(None) => {
                    let message =
                        "No saved candidate list; rescanning. Resume position may have shifted.";
                    tracing::warn!("{}", message);
                    presenter.notify(Notice::Warning(message.to_string()));
                    None
                }
                Err(e) => {
                    state = discard_or_abort(e, config.corrupt_state, presenter)?;
                    None
                }
            }
        } else {
            None
        };

        let candidates = match saved {
            Some(list) => list,
            None => {
                let result = scanner.scan_with_events(workspace.root(), &events)?;
                for error in &result.errors {
                    tracing::warn!(error = %error, "Skipped during scan");
                }
                let list = CandidateList::from_paths(workspace.root(), &result.paths());
                snapshot.save(&list)?;
                list
            }
        };

        let state = state.clamped_to(candidates.len());
        let resumed = state.cursor() > 0;

        events.send(Event::Sort(SortEvent::Loaded {
            cursor: state.cursor(),
            total: candidates.len(),
            resumed,
        }));
        tracing::info!(
            photos = candidates.len(),
            cursor = state.cursor(),
            indexed = store.len(),
            "Candidates loaded"
        );
        if resumed {
            presenter.notify(Notice::Info(format!(
                "Resuming from photo {} of {}. Previous session: {} sorted, {} skipped, {} deleted, {} duplicates.",
                state.cursor() + 1,
                candidates.len(),
                state.sorted_count(),
                state.skipped_count(),
                state.deleted_count(),
                state.duplicate_count()
            )));
        }

        Ok(Self {
            workspace,
            config,
            resolver,
            folders,
            previewer,
            session,
            events,
            store,
            state,
            candidates,
            missing: 0,
        })
    }

    fn iterate(&mut self, presenter: &mut dyn Presenter) -> Result<FinishReason> {
        loop {
            enter(&self.events, SortPhase::Iterating);

            let index = self.state.cursor();
            let (Some(key), Some(path)) = (
                self.candidates.key(index).map(str::to_string),
                self.candidates.path(index),
            ) else {
                return Ok(FinishReason::Exhausted);
            };

            match self.process(&key, &path, presenter)? {
                Step::Next(state) => {
                    self.session.save(&state)?;
                    self.state = state;
                }
                Step::Quit => {
                    self.session.save(&self.state)?;
                    return Ok(FinishReason::UserQuit);
                }
            }
        }
    }

    /// Decide and apply one candidate. Returns the next state without
    /// saving it.
    fn process(&mut self, key: &str, path: &Path, presenter: &mut dyn Presenter) -> Result<Step> {
        let state = self.state.clone();

        if !path.is_file() {
            tracing::warn!(path = %path.display(), "File no longer exists");
            self.events.send(Event::Sort(SortEvent::CandidateMissing {
                path: path.to_path_buf(),
            }));
            self.missing += 1;
            return Ok(Step::Next(state.advance()));
        }

        enter(&self.events, SortPhase::Resolving);
        let inspection = match self.resolver.resolve(path, &self.store) {
            Ok(inspection) => inspection,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Unreadable photo passed over");
                self.events.send(Event::Sort(SortEvent::CandidateUnreadable {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }));
                presenter.notify(Notice::Warning(format!("Could not read {}: {}", key, e)));
                return Ok(Step::Next(state.advance()));
            }
        };

        if inspection.verdict.matched_path() == Some(key) {
            tracing::debug!(path = key, "Already filed");
            self.events.send(Event::Sort(SortEvent::AlreadyFiled {
                path: path.to_path_buf(),
            }));
            return Ok(Step::Next(state.advance()));
        }

        if inspection.verdict.is_duplicate() && self.config.auto_duplicates {
            enter(&self.events, SortPhase::Applying);
            match self.route_duplicate(path) {
                Ok(destination) => {
                    tracing::info!(
                        "DUPLICATE: {} -> {} ({})",
                        key,
                        destination,
                        inspection.verdict
                    );
                    presenter.notify(Notice::Info(format!(
                        "Duplicate ({}) moved to {}",
                        inspection.verdict, self.config.duplicates_folder
                    )));
                    self.events.send(Event::Sort(SortEvent::DuplicateRouted {
                        path: path.to_path_buf(),
                        verdict: inspection.verdict.clone(),
                        destination,
                    }));
                    return Ok(Step::Next(state.record_duplicate().advance()));
                }
                Err(e) => {
                    // Fall back to asking
                    self.report_failure(path, &e.to_string(), presenter);
                }
            }
        }

        self.previewer.open_preview(path);
        let step = self.decide(key, path, &inspection, presenter);
        self.previewer.close_preview();
        step
    }

    fn decide(
        &mut self,
        key: &str,
        path: &Path,
        inspection: &Inspection,
        presenter: &mut dyn Presenter,
    ) -> Result<Step> {
        loop {
            enter(&self.events, SortPhase::AwaitingDecision);

            let event_folders = self.folders.list_event_folders().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Could not list event folders");
                Vec::new()
            });
            let context = CandidateContext {
                path,
                relative_path: key,
                position: self.state.cursor(),
                total: self.candidates.len(),
                event_folders: &event_folders,
                verdict: &inspection.verdict,
            };

            let disposition = match presenter.prompt_decision(&context) {
                Ok(disposition) => disposition,
                Err(e) => {
                    tracing::warn!(error = %e, "Input closed; quitting");
                    Disposition::Quit
                }
            };

            enter(&self.events, SortPhase::Applying);
            match self.apply(disposition, key, path, inspection, &event_folders, presenter)? {
                Applied::Done(state) => return Ok(Step::Next(state)),
                Applied::Quit => return Ok(Step::Quit),
                Applied::Retry => continue,
            }
        }
    }

    fn apply(
        &mut self,
        disposition: Disposition,
        key: &str,
        path: &Path,
        inspection: &Inspection,
        event_folders: &[String],
        presenter: &mut dyn Presenter,
    ) -> Result<Applied> {
        let state = self.state.clone();

        match disposition {
            Disposition::MoveToEvent { index } => {
                let Some(folder) = event_folders.get(index) else {
                    presenter.notify(Notice::Warning("Invalid folder number.".to_string()));
                    return Ok(Applied::Retry);
                };
                if self.file_into(folder, key, path, inspection, presenter)? {
                    Ok(Applied::Done(state.record_sorted().advance()))
                } else {
                    Ok(Applied::Retry)
                }
            }
            Disposition::CreateFolder { name } => {
                let folder = match self.folders.create_folder(&name) {
                    Ok(folder) => folder,
                    Err(e) => {
                        self.report_failure(path, &e.to_string(), presenter);
                        return Ok(Applied::Retry);
                    }
                };
                presenter.notify(Notice::Info(format!("Created folder '{}'", folder)));
                if self.file_into(&folder, key, path, inspection, presenter)? {
                    Ok(Applied::Done(state.record_sorted().advance()))
                } else {
                    Ok(Applied::Retry)
                }
            }
            Disposition::Skip => {
                tracing::info!("SKIPPED: {}", key);
                self.events.send(Event::Sort(SortEvent::Skipped {
                    path: path.to_path_buf(),
                }));
                Ok(Applied::Done(state.record_skipped(key).advance()))
            }
            Disposition::Delete => {
                if !presenter.confirm("Are you sure you want to delete this photo?") {
                    presenter.notify(Notice::Info("Deletion cancelled.".to_string()));
                    return Ok(Applied::Retry);
                }
                if let Err(e) = self.folders.delete(path) {
                    self.report_failure(path, &e.to_string(), presenter);
                    return Ok(Applied::Retry);
                }
                tracing::warn!("DELETED: {}", key);
                self.events.send(Event::Sort(SortEvent::Deleted {
                    path: path.to_path_buf(),
                }));
                presenter.notify(Notice::Info("Photo deleted.".to_string()));
                Ok(Applied::Done(state.record_deleted().advance()))
            }
            Disposition::MarkDuplicate => match self.route_duplicate(path) {
                Ok(destination) => {
                    tracing::info!("DUPLICATE: {} -> {} (marked by user)", key, destination);
                    self.events.send(Event::Sort(SortEvent::MarkedDuplicate {
                        path: path.to_path_buf(),
                        destination,
                    }));
                    Ok(Applied::Done(state.record_duplicate().advance()))
                }
                Err(e) => {
                    self.report_failure(path, &e.to_string(), presenter);
                    Ok(Applied::Retry)
                }
            },
            Disposition::Quit => {
                tracing::info!(cursor = state.cursor(), "User quit");
                Ok(Applied::Quit)
            }
        }
    }

    /// Move into an event folder and register in the index.
    ///
    /// `Ok(false)` when the move failed and the candidate stays unresolved;
    /// an error when the index could not be written after the move.
    fn file_into(
        &mut self,
        folder: &str,
        key: &str,
        path: &Path,
        inspection: &Inspection,
        presenter: &mut dyn Presenter,
    ) -> Result<bool> {
        // Fingerprint at the original location, before the move
        let fingerprint = self.resolver.filing_fingerprint(path, inspection);

        let destination = match self.folders.move_to(path, folder) {
            Ok(destination) => destination,
            Err(e) => {
                self.report_failure(path, &e.to_string(), presenter);
                return Ok(false);
            }
        };

        self.store.put(&destination, inspection.digest, fingerprint)?;

        tracing::info!("MOVED: {} -> {}", key, folder);
        self.events.send(Event::Sort(SortEvent::Filed {
            path: path.to_path_buf(),
            destination,
        }));
        presenter.notify(Notice::Info(format!("Moved to: {}", folder)));
        Ok(true)
    }

    fn route_duplicate(&self, path: &Path) -> std::result::Result<String, FolderError> {
        self.folders.ensure_folder(&self.config.duplicates_folder)?;
        self.folders.move_to(path, &self.config.duplicates_folder)
    }

    fn report_failure(&self, path: &Path, message: &str, presenter: &mut dyn Presenter) {
        tracing::error!(path = %path.display(), error = message, "Action failed");
        self.events.send(Event::Sort(SortEvent::ActionFailed {
            path: path.to_path_buf(),
            message: message.to_string(),
        }));
        presenter.notify(Notice::Error(message.to_string()));
    }

    fn finish(
        self,
        reason: FinishReason,
        started: Instant,
        presenter: &mut dyn Presenter,
    ) -> Result<SessionSummary> {
        enter(&self.events, SortPhase::Finished(reason));

        let summary = SessionSummary {
            sorted: self.state.sorted_count(),
            skipped: self.state.skipped_count(),
            deleted: self.state.deleted_count(),
            duplicates: self.state.duplicate_count(),
            missing: self.missing,
            cursor: self.state.cursor(),
            total: self.candidates.len(),
            reason: Some(reason),
            duration_ms: started.elapsed().as_millis() as u64,
        };

        tracing::info!(
            root = %self.workspace.root().display(),
            sorted = summary.sorted,
            skipped = summary.skipped,
            deleted = summary.deleted,
            duplicates = summary.duplicates,
            missing = summary.missing,
            progress = %format!("{}/{}", summary.cursor, summary.total),
            duration_ms = summary.duration_ms,
            "Session finished"
        );
        self.events.send(Event::Sort(SortEvent::Finished {
            summary: summary.clone(),
        }));
        presenter.print_summary(&summary);

        Ok(summary)
    }
}

fn enter(events: &EventSender, phase: SortPhase) {
    tracing::trace!(%phase, "Phase");
    events.send(Event::Sort(SortEvent::PhaseChanged { phase }));
}

/// Apply the corrupt-state policy to a session load error
fn discard_or_abort(
    error: SessionError,
    policy: CorruptStatePolicy,
    presenter: &mut dyn Presenter,
) -> Result<SessionState> {
    match (&error, policy) {
        (SessionError::CorruptState { .. }, CorruptStatePolicy::StartOver) => {
            let message = format!("{}. Starting over from the first photo.", error);
            tracing::warn!("{}", message);
            presenter.notify(Notice::Warning(message));
            Ok(SessionState::new())
        }
        _ => Err(error.into()),
    }
}
