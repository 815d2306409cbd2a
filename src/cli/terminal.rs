//! Interactive terminal front end for the sorting workflow.

use console::{style, Key, Term};
use photo_sorter::core::workflow::{CandidateContext, Disposition, Notice, Presenter};
use photo_sorter::events::{FinishReason, SessionSummary};
use std::io;

/// Event folders offered on the number keys
const MAX_LISTED_FOLDERS: usize = 9;

const PROGRESS_BAR_WIDTH: usize = 40;

/// [`Presenter`] that draws one screen per candidate and reads single keys
pub struct TerminalPresenter {
    term: Term,
    /// Notices shown on the next screen; drawing clears the terminal
    pending: Vec<Notice>,
}

impl TerminalPresenter {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
            pending: Vec::new(),
        }
    }

    fn render(&mut self, context: &CandidateContext<'_>) -> io::Result<()> {
        let term = &self.term;
        term.clear_screen()?;

        let (percent, filled) = progress(context.position, context.total);
        let rule = "=".repeat(60);
        term.write_line(&rule)?;
        term.write_line(&format!(
            "  {} - [{}/{}] ({}%)",
            style("Photo Sorter").bold().cyan(),
            context.position + 1,
            context.total,
            percent
        ))?;
        term.write_line(&format!(
            "  {}{}",
            style("█".repeat(filled)).green(),
            style("░".repeat(PROGRESS_BAR_WIDTH - filled)).dim()
        ))?;
        term.write_line(&rule)?;
        term.write_line("")?;

        for notice in self.pending.drain(..) {
            term.write_line(&format_notice(&notice))?;
        }

        let file_name = context
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| context.relative_path.to_string());
        term.write_line(&format!("Current Photo: {}", style(file_name).bold()))?;
        term.write_line(&format!("Full Path: {}", context.path.display()))?;
        term.write_line("")?;

        if context.verdict.is_duplicate() {
            term.write_line(&format!(
                "{} {}",
                style("⚠").yellow().bold(),
                style(format!("This looks like a {}", context.verdict)).yellow()
            ))?;
            term.write_line("")?;
        }

        let folders = listed_folders(context.event_folders);
        if !folders.is_empty() {
            term.write_line("Event Folders:")?;
            for (i, folder) in folders.iter().enumerate() {
                term.write_line(&format!("  {}) {}", i + 1, folder))?;
            }
            term.write_line("")?;
        }

        term.write_line("Actions:")?;
        if !folders.is_empty() {
            term.write_line("  [1-9] Move to event folder")?;
        }
        term.write_line("  [N]   Create new event folder")?;
        term.write_line("  [S]   Skip this photo")?;
        term.write_line("  [D]   Delete this photo")?;
        term.write_line("  [U]   Mark as duplicate")?;
        term.write_line("  [Q]   Quit and save progress")?;
        term.write_line("")?;
        term.write_str("Choose action: ")?;
        term.flush()
    }

    fn read_folder_name(&self) -> io::Result<Option<String>> {
        self.term.write_line("")?;
        self.term
            .write_str("Enter new folder name (or press Enter to cancel): ")?;
        let name = self.term.read_line()?;
        let name = name.trim();
        Ok((!name.is_empty()).then(|| name.to_string()))
    }
}

impl Default for TerminalPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Presenter for TerminalPresenter {
    fn prompt_decision(&mut self, context: &CandidateContext<'_>) -> io::Result<Disposition> {
        let listed = listed_folders(context.event_folders).len();

        loop {
            self.render(context)?;

            let key = match self.term.read_key() {
                Ok(key) => key,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => return Ok(Disposition::Quit),
                Err(e) => return Err(e),
            };

            let disposition = match interpret_key(&key, listed) {
                KeyAction::Decided(disposition) => Some(disposition),
                KeyAction::AskFolderName => self
                    .read_folder_name()?
                    .map(|name| Disposition::CreateFolder { name }),
                KeyAction::Ignored => None,
            };

            if let Some(disposition) = disposition {
                return Ok(disposition);
            }
        }
    }

    fn confirm(&mut self, question: &str) -> bool {
        let asked = self
            .term
            .write_str(&format!("\n{} (Y/N): ", question))
            .and_then(|_| self.term.flush());
        if asked.is_err() {
            return false;
        }

        match self.term.read_key() {
            Ok(Key::Char(c)) => {
                let _ = self.term.write_line(&c.to_string());
                c.eq_ignore_ascii_case(&'y')
            }
            _ => false,
        }
    }

    fn notify(&mut self, notice: Notice) {
        self.pending.push(notice);
    }

    fn print_summary(&mut self, summary: &SessionSummary) {
        let term = &self.term;
        let rule = "=".repeat(60);
        let mut lines = vec![String::new()];
        lines.extend(self.pending.drain(..).map(|n| format_notice(&n)));
        lines.push(rule.clone());
        lines.push(format!("  {}", style("Sorting Session Summary").bold()));
        lines.push(rule.clone());
        lines.push(format!("  Photos sorted:    {}", style(summary.sorted).cyan()));
        lines.push(format!("  Photos skipped:   {}", style(summary.skipped).cyan()));
        lines.push(format!("  Photos deleted:   {}", style(summary.deleted).cyan()));
        if summary.duplicates > 0 {
            lines.push(format!("  Duplicates found: {}", style(summary.duplicates).yellow()));
        }
        if summary.missing > 0 {
            lines.push(format!("  Missing files:    {}", style(summary.missing).yellow()));
        }
        lines.push(format!("  Progress:         {}/{}", summary.cursor, summary.total));
        match summary.reason {
            Some(FinishReason::Exhausted) => {
                lines.push(format!("  {}", style("All photos processed.").green()))
            }
            Some(FinishReason::UserQuit) => lines.push(format!(
                "  {}",
                style("Progress saved. Run again to continue.").dim()
            )),
            None => {}
        }
        lines.push(rule);
        lines.push(String::new());

        for line in lines {
            let _ = term.write_line(&line);
        }
    }
}

/// What a key press on the decision screen asks for
#[derive(Debug, PartialEq, Eq)]
enum KeyAction {
    Decided(Disposition),
    /// `N`: the folder name is read on its own line
    AskFolderName,
    Ignored,
}

/// Map a key to an action; `listed` is the number of folders on screen
fn interpret_key(key: &Key, listed: usize) -> KeyAction {
    let c = match key {
        Key::CtrlC => return KeyAction::Decided(Disposition::Quit),
        Key::Char(c) => c.to_ascii_uppercase(),
        _ => return KeyAction::Ignored,
    };

    match c {
        '1'..='9' => {
            let index = c as usize - '1' as usize;
            if index < listed {
                KeyAction::Decided(Disposition::MoveToEvent { index })
            } else {
                KeyAction::Ignored
            }
        }
        'N' => KeyAction::AskFolderName,
        'S' => KeyAction::Decided(Disposition::Skip),
        'D' => KeyAction::Decided(Disposition::Delete),
        'U' => KeyAction::Decided(Disposition::MarkDuplicate),
        'Q' => KeyAction::Decided(Disposition::Quit),
        _ => KeyAction::Ignored,
    }
}

fn listed_folders(folders: &[String]) -> &[String] {
    &folders[..folders.len().min(MAX_LISTED_FOLDERS)]
}

/// Percentage done and filled bar cells for a zero-based position
fn progress(position: usize, total: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    let position = position.min(total);
    (
        position * 100 / total,
        position * PROGRESS_BAR_WIDTH / total,
    )
}

fn format_notice(notice: &Notice) -> String {
    match notice {
        Notice::Info(m) => format!("{} {}", style("ℹ").cyan(), m),
        Notice::Warning(m) => format!("{} {}", style("⚠").yellow().bold(), style(m).yellow()),
        Notice::Error(m) => format!("{} {}", style("✗").red().bold(), style(m).red()),
    }
}
