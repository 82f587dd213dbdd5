mod smtp;
mod templates;

pub use smtp::SmtpNotifier;
pub use templates::EmailTemplate;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Alert types that trigger notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AlertType {
    /// First alert for a symbol that also carries news.
    NewStock {
        symbol: String,
        change_percentage: String,
        detected_at: String,
    },
    /// A stream message that could not be processed, with its raw payload.
    ProcessingError { message: String, payload: String },
}

/// A notification alert to be dispatched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub alert_type: AlertType,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(
        alert_type: AlertType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            alert_type,
            timestamp: chrono::Utc::now(),
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn new_stock(
        symbol: impl Into<String>,
        change_percentage: impl Into<String>,
        detected_at: impl Into<String>,
    ) -> Self {
        let symbol = symbol.into();
        let change_percentage = change_percentage.into();
        let title = format!("New Stock Added: {}", symbol);
        let message = format!("{} has been added with a {} change.", symbol, change_percentage);
        Self::new(
            AlertType::NewStock {
                symbol,
                change_percentage,
                detected_at: detected_at.into(),
            },
            title,
            message,
        )
    }

    pub fn processing_error(message: impl Into<String>, payload: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(
            AlertType::ProcessingError {
                message: message.clone(),
                payload: payload.into(),
            },
            "[momentum-scanner] Error Occurred in Stock Processing",
            message,
        )
    }
}

/// Trait for notification channels.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn send(&self, alert: &Alert) -> Result<(), NotificationError>;
    fn name(&self) -> &str;
}

/// Errors from the notification system.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("SMTP error: {0}")]
    Smtp(String),
    #[error("Webhook error: {0}")]
    Webhook(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Where alerts go. A channel that is `None` is not built.
#[derive(Debug, Clone, Default)]
pub struct NotificationConfig {
    pub smtp: Option<SmtpConfig>,
    pub webhook_url: Option<String>,
}

/// Mail relay settings; only present when a relay, a sender and at least
/// one recipient are all configured.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Username and password, sent only as a pair.
    pub credentials: Option<(String, String)>,
    pub from: String,
    pub to: Vec<String>,
    pub tls: SmtpTls,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SmtpTls {
    #[default]
    StartTls,
    Tls,
    None,
}

impl NotificationConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let to: Vec<String> = get("SCANNER_ALERT_EMAILS")
            .map(|list| {
                list.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let smtp = match (get("SCANNER_SMTP_HOST"), get("SCANNER_SMTP_FROM")) {
            (Some(host), Some(from)) if !to.is_empty() => Some(SmtpConfig {
                host,
                port: get("SCANNER_SMTP_PORT")
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(587),
                credentials: get("SCANNER_SMTP_USERNAME").zip(get("SCANNER_SMTP_PASSWORD")),
                from,
                to,
                tls: match get("SCANNER_SMTP_TLS").as_deref() {
                    Some("tls") => SmtpTls::Tls,
                    Some("none") => SmtpTls::None,
                    _ => SmtpTls::StartTls,
                },
            }),
            _ => None,
        };

        Self {
            smtp,
            webhook_url: get("SCANNER_WEBHOOK_URL"),
        }
    }
}

/// Dispatches alerts to all configured channels.
#[derive(Clone)]
pub struct NotificationService {
    channels: std::sync::Arc<Vec<Box<dyn NotificationChannel>>>,
}

impl NotificationService {
    /// A channel that fails to build is logged and left out.
    pub fn new(config: &NotificationConfig) -> Self {
        let mut channels: Vec<Box<dyn NotificationChannel>> = Vec::new();

        if let Some(smtp) = &config.smtp {
            match SmtpNotifier::new(smtp) {
                Ok(notifier) => channels.push(Box::new(notifier)),
                Err(e) => tracing::warn!("Mail alerts disabled: {}", e),
            }
        }
        if let Some(url) = &config.webhook_url {
            channels.push(Box::new(WebhookNotifier::new(url.clone())));
        }

        let names: Vec<&str> = channels.iter().map(|c| c.name()).collect();
        tracing::info!(channels = ?names, "Notification channels ready");
        Self::with_channels(channels)
    }

    pub fn with_channels(channels: Vec<Box<dyn NotificationChannel>>) -> Self {
        Self {
            channels: std::sync::Arc::new(channels),
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Send an alert to all configured channels (fire-and-forget via tokio::spawn).
    /// Failures are logged and dropped; nothing is retried.
    pub fn send_alert(&self, alert: Alert) {
        if self.channels.is_empty() {
            return;
        }
        let service = self.clone();
        tokio::spawn(async move {
            service.send_alert_async(&alert).await;
        });
    }

    /// Send alert to all channels, awaiting completion.
    pub async fn send_alert_async(&self, alert: &Alert) {
        for channel in self.channels.iter() {
            match channel.send(alert).await {
                Ok(()) => tracing::debug!("Sent notification via {}", channel.name()),
                Err(e) => {
                    tracing::warn!("Failed to send notification via {}: {}", channel.name(), e)
                }
            }
        }
    }
}

/// Discord-compatible webhook notifier.
struct WebhookNotifier {
    webhook_url: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    fn new(webhook_url: String) -> Self {
        Self {
            webhook_url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl NotificationChannel for WebhookNotifier {
    async fn send(&self, alert: &Alert) -> Result<(), NotificationError> {
        let (color, description) = match &alert.alert_type {
            AlertType::NewStock { detected_at, .. } => {
                (0x22c55e, format!("{}\nDetected at {}", alert.message, detected_at))
            }
            AlertType::ProcessingError { payload, .. } => (
                0xef4444,
                format!("{}\n```json\n{}\n```", alert.message, truncate(payload, 1500)),
            ),
        };

        let payload = serde_json::json!({
            "embeds": [{
                "title": alert.title,
                "description": description,
                "color": color,
                "timestamp": alert.timestamp.to_rfc3339(),
            }]
        });

        self.client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| NotificationError::Webhook(e.to_string()))?;

        Ok(())
    }

    fn name(&self) -> &str {
        "webhook"
    }
}

/// Cut `s` to at most `max` bytes on a char boundary.
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
