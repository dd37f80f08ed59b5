//! Transient user notifications (toasts)
//!
//! A notification is shown for [`DISPLAY_DURATION`], then plays its exit
//! animation for [`EXIT_DURATION`] and is removed.

use crate::html_escape;
use colored::Colorize;
use std::cell::RefCell;
use std::time::Duration;

pub const DISPLAY_DURATION: Duration = Duration::from_millis(3000);
pub const EXIT_DURATION: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Error,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
        }
    }

    fn background(self) -> &'static str {
        match self {
            NotificationKind::Success => "#10b981",
            NotificationKind::Error => "#ef4444",
            NotificationKind::Info => "#3b82f6",
        }
    }
}

/// Where a toast is in its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPhase {
    Visible,
    Exiting,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, message)
    }

    /// Phase of the toast `elapsed` after it was shown
    pub fn phase_at(&self, elapsed: Duration) -> ToastPhase {
        if elapsed < DISPLAY_DURATION {
            ToastPhase::Visible
        } else if elapsed < DISPLAY_DURATION + EXIT_DURATION {
            ToastPhase::Exiting
        } else {
            ToastPhase::Removed
        }
    }

    /// Toast markup; the slide-out animation starts after the display duration
    /// and the element stays hidden once it finishes.
    pub fn to_html(&self) -> String {
        format!(
            r#"<div class="notification notification-{kind}" style="background:{bg};animation:slideIn .3s ease,slideOut {exit}ms ease {show}ms forwards">{msg}</div>"#,
            kind = self.kind.as_str(),
            bg = self.kind.background(),
            exit = EXIT_DURATION.as_millis(),
            show = DISPLAY_DURATION.as_millis(),
            msg = html_escape(&self.message),
        )
    }
}

/// Sink for user-facing notifications
pub trait Notifier {
    fn notify(&self, notification: Notification);
}

/// Prints notifications to stderr with colored labels
pub struct ConsoleNotifier {
    quiet: bool,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self { quiet: false }
    }

    /// Only errors are printed in quiet mode
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Error => {
                eprintln!("{}: {}", "Error".red().bold(), notification.message)
            }
            NotificationKind::Success if !self.quiet => {
                eprintln!("{}: {}", "Done".green().bold(), notification.message)
            }
            NotificationKind::Info if !self.quiet => {
                eprintln!("{}: {}", "Info".blue(), notification.message)
            }
            _ => {}
        }
    }
}

/// Keeps every notification; used to embed toasts in rendered pages and in tests
#[derive(Default)]
pub struct RecordingNotifier {
    notifications: RefCell<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.borrow().clone()
    }

    pub fn has_errors(&self) -> bool {
        self.notifications
            .borrow()
            .iter()
            .any(|n| n.kind == NotificationKind::Error)
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.borrow_mut().push(notification);
    }
}

/// Forwards to several notifiers
pub struct Tee<'a>(pub &'a dyn Notifier, pub &'a dyn Notifier);

impl Notifier for Tee<'_> {
    fn notify(&self, notification: Notification) {
        self.0.notify(notification.clone());
        self.1.notify(notification);
    }
}
