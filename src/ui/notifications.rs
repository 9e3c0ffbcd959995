//! Toast notifications.

use eframe::egui;
use egui_notify::{Anchor, Toast, Toasts};
use std::time::Duration;

/// Notification severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Neutral feedback
    Info,
    /// Completed action
    Success,
    /// Rejected action
    Warning,
    /// Failed I/O
    Error,
}

/// Thin wrapper around [`Toasts`] that also remembers the latest message.
pub struct Notifications {
    toasts: Toasts,
    last: Option<(NotificationLevel, String)>,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifications {
    /// Toasts stacked in the top-right corner.
    pub fn new() -> Self {
        let toasts = Toasts::new()
            .with_anchor(Anchor::TopRight)
            .with_margin(egui::vec2(8.0, 8.0));
        Self { toasts, last: None }
    }

    /// Show a notification
    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        let message = message.into();

        let mut toast = match level {
            NotificationLevel::Info => Toast::info(message.clone()),
            NotificationLevel::Success => Toast::success(message.clone()),
            NotificationLevel::Warning => Toast::warning(message.clone()),
            NotificationLevel::Error => Toast::error(message.clone()),
        };
        let secs = match level {
            NotificationLevel::Info => 3,
            NotificationLevel::Success => 3,
            NotificationLevel::Warning => 4,
            NotificationLevel::Error => 6,
        };
        toast.duration(Some(Duration::from_secs(secs)));

        self.toasts.add(toast);
        self.last = Some((level, message));
    }

    /// Show info notification
    pub fn info(&mut self, message: impl Into<String>) {
        self.notify(NotificationLevel::Info, message);
    }

    /// Show success notification
    pub fn success(&mut self, message: impl Into<String>) {
        self.notify(NotificationLevel::Success, message);
    }

    /// Show warning notification
    pub fn warning(&mut self, message: impl Into<String>) {
        self.notify(NotificationLevel::Warning, message);
    }

    /// Show error notification
    pub fn error(&mut self, message: impl Into<String>) {
        self.notify(NotificationLevel::Error, message);
    }

    /// The most recent notification.
    pub fn last(&self) -> Option<(NotificationLevel, &str)> {
        self.last.as_ref().map(|(level, msg)| (*level, msg.as_str()))
    }

    /// Render notifications (call once per frame)
    pub fn show(&mut self, ctx: &egui::Context) {
        self.toasts.show(ctx);
    }
}
