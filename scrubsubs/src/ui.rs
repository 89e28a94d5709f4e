//! Application UI. For now, this is just a spinner for long ffmpeg runs.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Application UI state.
#[derive(Clone, Debug, Default)]
pub struct Ui {
    quiet: bool,
}

impl Ui {
    /// Create a new UI. This sets up logging, so call it only once, and only
    /// from a binary.
    pub fn init() -> Ui {
        env_logger::init();
        Ui { quiet: false }
    }

    /// A UI which never draws anything, for use from library code and tests.
    pub fn quiet() -> Ui {
        Ui { quiet: true }
    }

    /// Create a new spinner with default settings, already ticking.
    pub fn new_spinner(&self, msg: &str) -> ProgressBar {
        if self.quiet {
            return ProgressBar::hidden();
        }
        let sp = ProgressBar::new_spinner().with_style(default_spinner_style());
        sp.set_message(msg.to_owned());
        sp.enable_steady_tick(Duration::from_millis(120));
        sp
    }
}

pub(crate) fn default_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner} {msg} {elapsed_precise}")
        .expect("bad progress bar template")
}
