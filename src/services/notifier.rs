// src/services/notifier.rs

//! Push delivery via the Telegram Bot API.
//!
//! Transport failures are converted into a [`DeliveryStatus`] and never
//! surface as errors: a lost message is logged by the caller and the cycle
//! moves on. Retry policy, if any, belongs to the caller.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::TelegramConfig;

/// Outcome of one send attempt.
#[derive(Debug, Clone)]
pub struct DeliveryStatus {
    /// Whether the message was accepted by the transport
    pub success: bool,
    /// Optional detail about the delivery or its failure
    pub detail: Option<String>,
}

impl DeliveryStatus {
    /// Create a successful delivery status.
    pub fn delivered() -> Self {
        Self {
            success: true,
            detail: None,
        }
    }

    /// Create a failed delivery status.
    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            detail: Some(detail.into()),
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.success { "SENT" } else { "FAILED" };
        write!(f, "{status}")?;
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}

/// Trait for push-notification destinations.
#[async_trait]
pub trait Notify: Send + Sync {
    /// Send a text message, reporting the outcome without erroring.
    async fn send(&self, text: &str) -> DeliveryStatus;
}

/// Notifier posting messages to a single Telegram chat.
pub struct TelegramNotifier {
    endpoint: String,
    chat_id: String,
    client: Client,
}

impl TelegramNotifier {
    /// Create a notifier from Telegram settings.
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        if config.bot_token.trim().is_empty() {
            return Err(AppError::config("telegram.bot_token is empty"));
        }
        if config.chat_id.trim().is_empty() {
            return Err(AppError::config("telegram.chat_id is empty"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            endpoint: format!(
                "{}/bot{}/sendMessage",
                config.api_base.trim_end_matches('/'),
                config.bot_token
            ),
            chat_id: config.chat_id.clone(),
            client,
        })
    }
}

#[async_trait]
impl Notify for TelegramNotifier {
    async fn send(&self, text: &str) -> DeliveryStatus {
        let payload = serde_json::json!({
            "chat_id": self.chat_id,
            "text": text,
        });

        match self.client.post(&self.endpoint).json(&payload).send().await {
            Ok(response) if response.status().is_success() => DeliveryStatus::delivered(),
            Ok(response) => {
                let status = response.status();
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unreadable response body".to_string());
                DeliveryStatus::failed(format!("HTTP {status}: {body}"))
            }
            Err(e) => DeliveryStatus::failed(e.to_string()),
        }
    }
}
