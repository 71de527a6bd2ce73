//! User-visible confirmations
//!
//! Notifications are fire-and-forget: the caller never waits on or inspects
//! the result of delivering one.

use tracing::info;

/// Delivers a short title/message pair to the user
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str);
}

/// Writes notifications to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, message: &str) {
        info!(title, "{}", message);
    }
}

impl<F> Notifier for F
where
    F: Fn(&str, &str) + Send + Sync,
{
    fn notify(&self, title: &str, message: &str) {
        self(title, message)
    }
}
