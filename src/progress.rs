//! Progress reporting for the identification driver.
//!
//! [`ProgressCallback`] is the seam; [`Progress`] renders it as an
//! `indicatif` bar on stderr.

use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Receives progress updates while files are identified.
///
/// Called concurrently from worker threads.
pub trait ProgressCallback: Send + Sync {
    /// A phase starts with `total` items.
    fn on_phase_start(&self, phase: &str, total: usize);

    /// One item finished; `bytes` is its size.
    fn on_item_completed(&self, path: &str, bytes: u64);

    /// The phase is over.
    fn on_phase_end(&self, phase: &str);
}

/// Terminal progress bar.
pub struct Progress {
    bar: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a reporter. A quiet reporter draws nothing.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            quiet,
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        let guard = self.bar.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(ref pb) = *guard {
            f(pb);
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }
        let pb = ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::stderr());
        pb.set_style(Self::style());
        pb.set_message(phase.to_string());
        *self.bar.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = Some(pb);
    }

    fn on_item_completed(&self, path: &str, _bytes: u64) {
        if self.quiet {
            return;
        }
        let msg = truncate_path(path, 30);
        self.with_bar(|pb| {
            pb.inc(1);
            pb.set_message(msg);
        });
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }
        let taken = self
            .bar
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
        if let Some(pb) = taken {
            pb.finish_with_message(format!("{} complete", phase));
        }
    }
}

/// Shorten a path to at most `max_len` characters, keeping the file name.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let name_len = file_name.chars().count();
    if name_len + 4 > max_len {
        let keep = max_len.saturating_sub(3);
        let tail: String = file_name.chars().skip(name_len.saturating_sub(keep)).collect();
        return format!("...{}", tail);
    }

    format!(".../{}", file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_path_unchanged() {
        assert_eq!(truncate_path("/a/b.txt", 30), "/a/b.txt");
    }

    #[test]
    fn test_truncate_keeps_file_name() {
        let path = "/very/long/directory/structure/that/goes/on/file.txt";
        assert_eq!(truncate_path(path, 30), ".../file.txt");
    }

    #[test]
    fn test_truncate_long_unicode_name() {
        let path = "/dir/ääääääääääääääääääääääääääääääääääää.bin";
        let out = truncate_path(path, 10);
        assert!(out.starts_with("..."));
        assert_eq!(out.chars().count(), 10);
    }

    #[test]
    fn test_quiet_progress_is_inert() {
        let progress = Progress::new(true);
        progress.on_phase_start("hash", 3);
        progress.on_item_completed("/x", 1);
        progress.on_phase_end("hash");
        assert!(progress.bar.lock().unwrap().is_none());
    }

    #[test]
    fn test_progress_lifecycle() {
        let progress = Progress::new(false);
        progress.on_phase_start("hash", 2);
        progress.on_item_completed("/a", 10);
        progress.on_item_completed("/b", 20);
        progress.with_bar(|pb| assert_eq!(pb.position(), 2));
        progress.on_phase_end("hash");
        assert!(progress.bar.lock().unwrap().is_none());
    }
}
