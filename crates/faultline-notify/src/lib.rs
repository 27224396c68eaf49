//! Operator notification for high-severity failures
//!
//! Provides the [`NotificationStage`] that plugs into the error chain, the
//! [`NotificationTransport`] seam and an HTTP mail-relay implementation.

#![allow(clippy::missing_errors_doc, clippy::must_use_candidate)]

mod error;
mod mail;
mod stage;
mod transport;

pub use error::NotifyError;
pub use mail::HttpMailTransport;
pub use stage::{NotificationStage, notification_stage};
pub use transport::{Notification, NotificationTransport};
