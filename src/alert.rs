//! 一致通知
//!
//! 通知は投げっぱなし。配信の失敗はログに残すだけでパイプラインには返さない。

use crate::error::{ListingAiError, Result};
use async_trait::async_trait;
use listing_ai_common::ItemId;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

#[async_trait]
pub trait AlertDispatcher: Send + Sync {
    async fn notify(&self, item_id: &ItemId);
}

#[async_trait]
impl AlertDispatcher for Box<dyn AlertDispatcher> {
    async fn notify(&self, item_id: &ItemId) {
        (**self).notify(item_id).await
    }
}

/// 標準出力への通知
pub struct ConsoleAlert {
    item_url_base: String,
}

impl ConsoleAlert {
    pub fn new(item_url_base: impl Into<String>) -> Self {
        Self {
            item_url_base: item_url_base.into(),
        }
    }
}

#[async_trait]
impl AlertDispatcher for ConsoleAlert {
    async fn notify(&self, item_id: &ItemId) {
        tracing::info!(item_id = %item_id, "match alert");
        println!("🔔 一致: {}{}", self.item_url_base, item_id);
    }
}

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct WebhookPayload<'a> {
    item_id: &'a str,
    url: String,
    text: String,
}

/// Webhook（JSON POST）への通知
pub struct WebhookAlert {
    http_client: Client,
    webhook_url: String,
    item_url_base: String,
}

impl WebhookAlert {
    pub fn new(webhook_url: impl Into<String>, item_url_base: impl Into<String>) -> Result<Self> {
        let webhook_url = webhook_url.into();
        if webhook_url.trim().is_empty() {
            return Err(ListingAiError::Config("alert_webhook が空です".into()));
        }

        let http_client = Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .map_err(|e| ListingAiError::Config(format!("HTTPクライアント生成エラー: {}", e)))?;

        Ok(Self {
            http_client,
            webhook_url,
            item_url_base: item_url_base.into(),
        })
    }

    fn payload<'a>(&self, item_id: &'a ItemId) -> WebhookPayload<'a> {
        let url = format!("{}{}", self.item_url_base, item_id);
        WebhookPayload {
            item_id: item_id.as_str(),
            text: format!("Matching listing found: {}", url),
            url,
        }
    }
}

#[async_trait]
impl AlertDispatcher for WebhookAlert {
    async fn notify(&self, item_id: &ItemId) {
        let result = self
            .http_client
            .post(&self.webhook_url)
            .json(&self.payload(item_id))
            .send()
            .await
            .and_then(|r| r.error_for_status());

        match result {
            Ok(_) => tracing::info!(item_id = %item_id, "webhook alert delivered"),
            Err(e) => tracing::warn!(item_id = %item_id, error = %e, "webhook alert failed"),
        }
    }
}
