//! Notification dispatch: render a template, attempt delivery, and append
//! exactly one audit row describing the outcome. Dispatch is best-effort by
//! contract; nothing here ever fails the operation that triggered it.

pub mod smtp;
pub mod templates;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{NewNotificationLog, NotificationStatus};
use crate::store::Store;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("message could not be built: {0}")]
    Build(String),

    #[error("delivery failed: {0}")]
    Transport(String),

    #[error("delivery timed out")]
    Timeout,
}

#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Delivery seam. The production implementation is [`smtp::SmtpMailer`];
/// tests substitute fakes. Swapping in an asynchronous queue later only
/// requires another implementation of this trait.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

pub struct Dispatcher {
    store: Arc<dyn Store>,
    transport: Arc<dyn MailTransport>,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn Store>, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            store,
            transport,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sends one notification and records the attempt. Returns whether the
    /// message was delivered; callers ignore the result except for logging.
    ///
    /// Blank recipients are dropped. An empty recipient list is a no-op
    /// with no audit row, matching the behavior of skipping a notification
    /// for a user with no email on file.
    pub async fn dispatch(
        &self,
        subject: &str,
        body: askama::Result<String>,
        recipients: Vec<String>,
        event_id: Option<Uuid>,
    ) -> bool {
        let recipients: Vec<String> =
            recipients.into_iter().filter(|r| !r.trim().is_empty()).collect();
        if recipients.is_empty() {
            return false;
        }
        let to_emails = recipients.join(",");

        let body = match body {
            Ok(body) => body,
            Err(err) => {
                // Template failure counts as a failed dispatch attempt.
                self.record(to_emails, subject, err.to_string(), event_id, Some(err.to_string()))
                    .await;
                return false;
            }
        };

        let email = OutgoingEmail {
            to: recipients,
            subject: subject.to_string(),
            body: body.clone(),
        };

        let outcome = match tokio::time::timeout(self.timeout, self.transport.deliver(&email)).await
        {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(err),
            Err(_) => Err(MailError::Timeout),
        };

        match outcome {
            Ok(()) => {
                self.record(to_emails, subject, body, event_id, None).await;
                true
            }
            Err(err) => {
                tracing::warn!(subject, error = %err, "Notification delivery failed");
                self.record(to_emails, subject, err.to_string(), event_id, Some(err.to_string()))
                    .await;
                false
            }
        }
    }

    async fn record(
        &self,
        to_emails: String,
        subject: &str,
        body: String,
        event_id: Option<Uuid>,
        error: Option<String>,
    ) {
        let status = if error.is_some() {
            NotificationStatus::Failed
        } else {
            NotificationStatus::Sent
        };
        let result = self
            .store
            .append_notification_log(NewNotificationLog {
                to_emails,
                subject: subject.to_string(),
                body,
                event_id,
                status,
                error: error.unwrap_or_default(),
            })
            .await;
        if let Err(err) = result {
            // The audit row is all we can do; there is no caller to fail.
            tracing::error!(subject, error = %err, "Failed to append notification log");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStore;

    struct OkMailer;

    #[async_trait]
    impl MailTransport for OkMailer {
        async fn deliver(&self, _email: &OutgoingEmail) -> Result<(), MailError> {
            Ok(())
        }
    }

    struct BrokenMailer;

    #[async_trait]
    impl MailTransport for BrokenMailer {
        async fn deliver(&self, _email: &OutgoingEmail) -> Result<(), MailError> {
            Err(MailError::Transport("connection refused".into()))
        }
    }

    fn dispatcher(transport: Arc<dyn MailTransport>) -> (Arc<MemStore>, Dispatcher) {
        let store = Arc::new(MemStore::new());
        let dispatcher = Dispatcher::new(store.clone(), transport);
        (store, dispatcher)
    }

    #[tokio::test]
    async fn success_appends_one_sent_row_with_the_body() {
        let (store, dispatcher) = dispatcher(Arc::new(OkMailer));
        let sent = dispatcher
            .dispatch(
                "Registration confirmed: Chess Open",
                Ok("see you there".to_string()),
                vec!["student@school.example".to_string()],
                None,
            )
            .await;
        assert!(sent);

        let logs = store.list_notification_logs().await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, NotificationStatus::Sent);
        assert_eq!(logs[0].body, "see you there");
        assert_eq!(logs[0].to_emails, "student@school.example");
        assert!(logs[0].error.is_empty());
    }

    #[tokio::test]
    async fn failure_appends_one_failed_row_with_the_error() {
        let (store, dispatcher) = dispatcher(Arc::new(BrokenMailer));
        let sent = dispatcher
            .dispatch(
                "Registration confirmed: Chess Open",
                Ok("see you there".to_string()),
                vec!["student@school.example".to_string()],
                None,
            )
            .await;
        assert!(!sent);

        let logs = store.list_notification_logs().await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, NotificationStatus::Failed);
        assert!(logs[0].error.contains("connection refused"));
    }

    #[tokio::test]
    async fn blank_recipients_are_dropped_and_empty_list_is_a_silent_noop() {
        let (store, dispatcher) = dispatcher(Arc::new(OkMailer));
        let sent = dispatcher
            .dispatch("subject", Ok("body".to_string()), vec!["".to_string()], None)
            .await;
        assert!(!sent);
        assert!(store.list_notification_logs().await.unwrap().is_empty());
    }
}
