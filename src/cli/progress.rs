//! Progress display for inventory downloads
//!
//! One progress bar per inventory, drawn on stderr. When stderr is not a
//! terminal or progress is disabled the bar is hidden but still counts, so
//! the summary printed afterwards stays accurate.

use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::app::orchestrator::ProgressObserver;

const BAR_TEMPLATE: &str =
    "{spinner:.green} {prefix} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Progress bar implementing the orchestrator's observer
pub struct ProgressDisplay {
    bar: Mutex<Option<ProgressBar>>,
    visible: bool,
}

impl ProgressDisplay {
    /// Create a display; bars are only drawn when `enabled` and stderr is a terminal
    pub fn new(enabled: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            visible: enabled && atty::is(atty::Stream::Stderr),
        }
    }

    /// Whether bars are drawn at all
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Position of the current bar, if a run has started
    pub fn position(&self) -> Option<u64> {
        self.current().map(|bar| bar.position())
    }

    fn current(&self) -> Option<ProgressBar> {
        self.bar.lock().ok().and_then(|guard| guard.clone())
    }

    fn create_bar(&self, identifier: &str, total: usize) -> ProgressBar {
        let target = if self.visible {
            ProgressDrawTarget::stderr()
        } else {
            ProgressDrawTarget::hidden()
        };

        let bar = ProgressBar::with_draw_target(Some(total as u64), target);
        let style = ProgressStyle::default_bar()
            .template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-");
        bar.set_style(style);
        bar.set_prefix(identifier.to_string());
        bar
    }
}

impl ProgressObserver for ProgressDisplay {
    fn on_start(&self, identifier: &str, total: usize) {
        let bar = self.create_bar(identifier, total);
        if let Ok(mut guard) = self.bar.lock() {
            *guard = Some(bar);
        }
    }

    // Counts may arrive out of order across tasks
    fn on_file_completed(&self, name: &str, _completed: usize) {
        if let Some(bar) = self.current() {
            bar.inc(1);
            bar.set_message(format!("{}.jpg", name));
        }
    }

    fn on_file_failed(&self, name: &str) {
        if let Some(bar) = self.current() {
            bar.println(format!("  {} failed after all retries", name));
        }
    }

    fn on_finish(&self) {
        if let Some(bar) = self.current() {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_display_is_hidden() {
        let display = ProgressDisplay::new(false);
        assert!(!display.is_visible());
        assert_eq!(display.position(), None);
    }

    #[test]
    fn test_hidden_bar_still_counts() {
        let display = ProgressDisplay::new(false);

        display.on_start("355857", 3);
        display.on_file_completed("001", 1);
        display.on_file_failed("002");
        display.on_file_completed("003", 2);

        assert_eq!(display.position(), Some(2));
        display.on_finish();
    }

    #[test]
    fn test_out_of_order_completions_never_rewind() {
        let display = ProgressDisplay::new(false);

        display.on_start("355857", 3);
        display.on_file_completed("003", 2);
        display.on_file_completed("002", 3);
        display.on_file_completed("001", 1);

        assert_eq!(display.position(), Some(3));
    }

    #[test]
    fn test_new_run_replaces_bar() {
        let display = ProgressDisplay::new(false);

        display.on_start("1", 2);
        display.on_file_completed("001", 2);
        display.on_finish();
        display.on_start("2", 5);

        assert_eq!(display.position(), Some(0));
    }
}
