pub use crate::traits::Progress;

impl Progress for indicatif::ProgressBar {
    fn inc(&self, i: u64) {
        indicatif::ProgressBar::inc(self, i)
    }

    fn finish(&self) {
        indicatif::ProgressBar::finish(self)
    }
}

impl Progress for logbar::ProgressBar {
    fn inc(&self, i: u64) {
        logbar::ProgressBar::inc(self, i as usize)
    }

    fn finish(&self) {
        logbar::ProgressBar::finish(self)
    }
}

/// Dummy progress indicator
pub struct NoProgress {}
impl Progress for NoProgress {
    fn inc(&self, _i: u64) {}

    fn finish(&self) {}
}

/// Don't show any progress indicator
pub const NO_PROGRESS: NoProgress = NoProgress {};

/// Progress bar over input bytes or events
///
/// The style depends on whether standard error is an interactive
/// terminal. While the bar is shown, logging is suspended.
pub struct ProgressBar {
    bar: Box<dyn Progress>,
    restore_level: Option<log::LevelFilter>,
}

impl Default for ProgressBar {
    fn default() -> Self {
        Self {
            bar: Box::new(NO_PROGRESS),
            restore_level: None,
        }
    }
}

impl Progress for ProgressBar {
    fn inc(&self, i: u64) {
        self.bar.inc(i);
    }

    fn finish(&self) {
        self.bar.finish();
        if let Some(level) = self.restore_level {
            log::set_max_level(level);
        }
    }
}

impl ProgressBar {
    /// A new progress bar with the given maximum progress and message
    ///
    /// Nothing is shown unless the log level is exactly `info`.
    pub fn new(len: u64, message: &str) -> Self {
        if log::max_level().to_level() != Some(log::Level::Info) {
            ProgressBar::default()
        } else if console::Term::stderr().features().is_attended() {
            ProgressBar::indicatif(len, message)
        } else {
            ProgressBar::logbar(len, message)
        }
    }

    fn indicatif(len: u64, message: &str) -> Self {
        let bar = indicatif::ProgressBar::new(len);
        let style = indicatif::ProgressStyle::default_bar()
            .template("{bar:60.cyan/cyan} {msg} {pos}/{len} [{elapsed}]");
        if let Ok(style) = style {
            bar.set_style(style);
        }
        bar.set_message(message.to_owned());
        Self::suspend_logging(Box::new(bar))
    }

    fn logbar(len: u64, message: &str) -> Self {
        let style = logbar::Style::new().indicator('█');
        eprintln!("{message}");
        let bar = logbar::ProgressBar::with_style(len as usize, style);
        Self::suspend_logging(Box::new(bar))
    }

    fn suspend_logging(bar: Box<dyn Progress>) -> Self {
        let restore_level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        ProgressBar {
            bar,
            restore_level: Some(restore_level),
        }
    }
}

impl Drop for ProgressBar {
    fn drop(&mut self) {
        // restore logging if we bail out early
        if let Some(level) = self.restore_level {
            log::set_max_level(level);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_outside_info_level() {
        log::set_max_level(log::LevelFilter::Warn);
        let bar = ProgressBar::new(10, "nothing to see");
        assert!(bar.restore_level.is_none());
        bar.inc(5);
        bar.finish();
    }
}
