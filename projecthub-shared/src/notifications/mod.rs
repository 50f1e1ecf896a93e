/// Notifications derived from project, task and comment mutations
///
/// See [`fanout`] for the rules. Stored notifications are read back through
/// [`crate::models::notification::Notification`]; clients poll for them.

pub mod fanout;

pub use fanout::{deliver, NotificationSink, PendingNotification};
