#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for the panic-report toolchain.
//!
//! Provides [`init_logger`], which sets up `indicatif-log-bridge` so that
//! `log::info!` and friends are suspended while progress bars redraw, and
//! [`CountdownBar`], the bar shown while a panic recording window runs.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

/// A bar counting down a fixed recording window in whole seconds.
pub struct CountdownBar {
    bar: ProgressBar,
    total: Duration,
}

impl CountdownBar {
    /// Adds a countdown for `total` to `multi`.
    #[must_use]
    pub fn new(multi: &MultiProgress, message: &str, total: Duration) -> Self {
        let bar = multi.add(ProgressBar::new(total.as_secs().max(1)));
        bar.set_style(
            ProgressStyle::with_template("{prefix:.red.bold} {msg} {wide_bar:.red/dim} {pos}/{len}s")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##-"),
        );
        bar.set_prefix("●");
        bar.set_message(message.to_string());
        Self { bar, total }
    }

    /// Moves the bar to `elapsed` and shows the time left.
    pub fn update(&self, elapsed: Duration) {
        self.bar.set_position(elapsed.as_secs().min(self.total.as_secs()));
        self.bar
            .set_prefix(format!("● {}s", remaining_secs(self.total, elapsed)));
    }

    /// Completes the bar.
    pub fn finish(&self, msg: impl Into<String>) {
        self.bar.set_position(self.total.as_secs().max(1));
        self.bar.finish_with_message(msg.into());
    }

    /// Stops the bar where it is.
    pub fn abandon(&self, msg: impl Into<String>) {
        self.bar.abandon_with_message(msg.into());
    }
}

/// Whole seconds left in a window of `total` after `elapsed`, rounded up.
#[must_use]
pub fn remaining_secs(total: Duration, elapsed: Duration) -> u64 {
    let left = total.saturating_sub(elapsed);
    left.as_secs() + u64::from(left.subsec_nanos() > 0)
}

/// Initializes the global logger wrapped in `indicatif-log-bridge` so that
/// `log::info!` and friends are suspended while progress bars redraw.
///
/// Returns the [`MultiProgress`] that all progress bars must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok(); // already set (tests)

    log::set_max_level(level);

    multi
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_rounds_up() {
        let total = Duration::from_secs(30);
        assert_eq!(remaining_secs(total, Duration::ZERO), 30);
        assert_eq!(remaining_secs(total, Duration::from_millis(500)), 30);
        assert_eq!(remaining_secs(total, Duration::from_secs(29)), 1);
        assert_eq!(remaining_secs(total, Duration::from_secs(31)), 0);
    }

    #[test]
    fn countdown_tracks_elapsed_time() {
        let multi = MultiProgress::with_draw_target(indicatif::ProgressDrawTarget::hidden());
        let bar = CountdownBar::new(&multi, "Recording", Duration::from_secs(30));
        bar.update(Duration::from_secs(12));
        assert_eq!(bar.bar.position(), 12);
        bar.update(Duration::from_secs(45));
        assert_eq!(bar.bar.position(), 30);
        bar.finish("done");
        assert!(bar.bar.is_finished());
    }
}
