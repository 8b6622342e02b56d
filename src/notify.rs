//! User-facing notifications and run progress.
//!
//! Hosts with a real UI implement these over their toast/dialog surface;
//! the bundled implementations log through `tracing` so headless runs
//! still report what happened.

use tracing::{info, warn};

/// End-of-run and per-item notifications.
pub trait Notifier: Send + Sync {
    /// One provider failed while gathering for an item.
    fn provider_error(&self, provider: &str, message: &str);

    /// An item could not be identified. Only raised for manually
    /// triggered single-item runs; `is_set` selects the movie-set wording.
    fn no_id(&self, label: &str, is_set: bool);

    /// Aggregate end-of-run summary. Zero means nothing was updated.
    fn summary(&self, updated_items: usize);
}

/// Informational progress surface for a batch run. Never affects control
/// flow.
pub trait ProgressReporter: Send + Sync {
    fn create(&self, total: usize);
    fn update(&self, current: usize, label: &str);
    fn close(&self);
}

/// Notifier that reports through the log.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn provider_error(&self, provider: &str, message: &str) {
        warn!(provider, message, "artwork provider error");
    }

    fn no_id(&self, label: &str, is_set: bool) {
        if is_set {
            warn!(label, "movie set could not be matched to a known collection");
        } else {
            warn!(label, "item has no external id, cannot look up artwork");
        }
    }

    fn summary(&self, updated_items: usize) {
        if updated_items > 0 {
            info!(updated_items, "artwork updated");
        } else {
            info!("no artwork updated");
        }
    }
}

/// Progress reporter that logs item-by-item progress.
#[derive(Debug, Default)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn create(&self, total: usize) {
        info!(total, "starting artwork run");
    }

    fn update(&self, current: usize, label: &str) {
        info!(current, label, "processing");
    }

    fn close(&self) {}
}
