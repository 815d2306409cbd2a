//! # Viewer Module
//!
//! Shows the current candidate in the system image viewer while the user
//! decides. Previewing is fire-and-forget: failures are logged and never
//! interrupt sorting.

use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;

/// Opens and closes a visual preview of a photo.
pub trait Previewer: Send + Sync {
    fn open_preview(&self, path: &Path);

    fn close_preview(&self);
}

/// Does nothing. Used with `--no-preview` and in tests.
#[derive(Debug, Default)]
pub struct NoopViewer;

impl Previewer for NoopViewer {
    fn open_preview(&self, _path: &Path) {}

    fn close_preview(&self) {}
}

/// Previews in the platform's default viewer.
///
/// - macOS: Preview, opened in the background; closed via AppleScript
/// - Linux: `xdg-open`; closed by terminating the spawned process
/// - Windows: `start`
#[derive(Debug, Default)]
pub struct SystemViewer {
    child: Mutex<Option<Child>>,
}

impl SystemViewer {
    pub fn new() -> Self {
        Self::default()
    }

    fn command(path: &Path) -> Option<Command> {
        if cfg!(target_os = "macos") {
            let mut cmd = Command::new("open");
            cmd.args(["-g", "-a", "Preview"]).arg(path);
            Some(cmd)
        } else if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", ""]).arg(path);
            Some(cmd)
        } else if cfg!(unix) {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(path);
            Some(cmd)
        } else {
            None
        }
    }

    fn close_front_preview_window() {
        const SCRIPT: &str = r#"tell application "Preview"
    if (count of windows) > 0 then
        close front window
    end if
end tell"#;

        let result = Command::new("osascript")
            .args(["-e", SCRIPT])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        if let Err(e) = result {
            tracing::debug!(error = %e, "Could not close Preview window");
        }
    }
}

impl Previewer for SystemViewer {
    fn open_preview(&self, path: &Path) {
        self.close_preview();

        let Some(mut cmd) = Self::command(path) else {
            tracing::warn!("No image viewer available on this platform");
            return;
        };

        match cmd.stdout(Stdio::null()).stderr(Stdio::null()).spawn() {
            Ok(child) => {
                if let Ok(mut slot) = self.child.lock() {
                    *slot = Some(child);
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to open image viewer");
            }
        }
    }

    fn close_preview(&self) {
        let Ok(mut slot) = self.child.lock() else {
            return;
        };
        let Some(mut child) = slot.take() else {
            return;
        };

        if cfg!(target_os = "macos") {
            Self::close_front_preview_window();
        } else if let Ok(None) = child.try_wait() {
            let _ = child.kill();
        }
        // Reap so no zombie is left behind
        let _ = child.wait();
    }
}

impl Drop for SystemViewer {
    fn drop(&mut self) {
        self.close_preview();
    }
}
