//! Reward/notification collaborator client
//!
//! The engine never delivers notifications itself; it hands them to an
//! external collaborator through the `Notifier` trait. Dispatch is
//! fire-and-forget: a failed or slow delivery is logged and counted, never
//! propagated to the operation that triggered it.

use crate::config::NotifierConfig;
use crate::errors::{AppError, Result};
use crate::metrics;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

/// Kinds of events the collaborator accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    ReviewAssigned,
    ReviewReceived,
    XpAwarded,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::ReviewAssigned => "REVIEW_ASSIGNED",
            NotificationKind::ReviewReceived => "REVIEW_RECEIVED",
            NotificationKind::XpAwarded => "XP_AWARDED",
        }
    }
}

/// One notification request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub recipient_id: Uuid,
    pub payload: serde_json::Value,
}

/// External notification collaborator
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification. Implementations may fail; callers go
    /// through [`dispatch`] so failures never reach the primary operation.
    async fn notify(&self, notification: Notification) -> Result<()>;
}

/// Webhook-backed notifier
pub struct HttpNotifier {
    client: reqwest::Client,
    url: String,
}

impl HttpNotifier {
    pub fn new(url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("Failed to build notifier client: {}", e),
            })?;

        Ok(Self { client, url })
    }
}

#[async_trait::async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, notification: Notification) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(&notification)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::NotifyError {
                message: format!("collaborator returned {}", response.status()),
            });
        }

        Ok(())
    }
}

/// Notifier used when no webhook is configured: logs and drops
pub struct NoopNotifier;

#[async_trait::async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, notification: Notification) -> Result<()> {
        debug!(
            kind = notification.kind.as_str(),
            recipient_id = %notification.recipient_id,
            "Notification dropped (no collaborator configured)"
        );
        Ok(())
    }
}

/// Build a notifier from configuration
pub fn from_config(config: &NotifierConfig) -> Result<Arc<dyn Notifier>> {
    match &config.webhook_url {
        Some(url) => Ok(Arc::new(HttpNotifier::new(
            url.clone(),
            Duration::from_secs(config.timeout_secs),
        )?)),
        None => Ok(Arc::new(NoopNotifier)),
    }
}

/// Fire-and-forget dispatch. Spawns the delivery so the caller's
/// transaction path never blocks on the collaborator; failures are logged
/// at warn and counted.
pub fn dispatch(notifier: Arc<dyn Notifier>, notification: Notification) {
    tokio::spawn(async move {
        let kind = notification.kind.as_str();
        let recipient_id = notification.recipient_id;

        match notifier.notify(notification).await {
            Ok(()) => {
                metrics::record_notification(kind, true);
                debug!(kind, recipient_id = %recipient_id, "Notification delivered");
            }
            Err(e) => {
                metrics::record_notification(kind, false);
                warn!(
                    kind,
                    recipient_id = %recipient_id,
                    error = %e,
                    "Notification dispatch failed"
                );
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_notifier_always_succeeds() {
        let notifier = NoopNotifier;
        let result = notifier
            .notify(Notification {
                kind: NotificationKind::XpAwarded,
                recipient_id: Uuid::new_v4(),
                payload: serde_json::json!({ "xp": 50 }),
            })
            .await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_kind_serialization() {
        let n = Notification {
            kind: NotificationKind::ReviewAssigned,
            recipient_id: Uuid::new_v4(),
            payload: serde_json::json!({}),
        };
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "REVIEW_ASSIGNED");
    }

    #[test]
    fn test_from_config_defaults_to_noop() {
        let config = NotifierConfig {
            webhook_url: None,
            timeout_secs: 5,
        };
        assert!(from_config(&config).is_ok());
    }
}
