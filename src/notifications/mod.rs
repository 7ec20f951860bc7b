//! Email notifications sent to portal users

mod models;
mod notifier;
mod templates;

pub use models::{DocumentNotice, Notification, StatusNoticeKind};
pub use notifier::{LogNotifier, MailRelayNotifier, MemoryNotifier, NotificationError, Notifier};
pub use templates::{render, RenderedEmail, PORTAL_NAME};
