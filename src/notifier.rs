//! Webhook notifications for detected release changes

use crate::error::NotifyError;
use crate::models::{Channel, VersionMetadata};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;

/// Webhook services reject messages longer than this
const MAX_CONTENT_CHARS: usize = 2000;

/// Outbound message sink
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> Result<(), NotifyError>;
}

/// JSON body posted to the webhook
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
}

/// Posts `{"content": ...}` to a chat webhook URL
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: Url,
}

impl WebhookNotifier {
    pub fn new(client: Client, url: Url) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        let content = truncate(message, MAX_CONTENT_CHARS);
        let response = self
            .client
            .post(self.url.clone())
            .json(&WebhookPayload { content })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }
        Ok(())
    }
}

/// Message announcing a change on `channel`
pub fn change_message(channel: Channel, metadata: &VersionMetadata) -> String {
    match channel {
        Channel::Production => format!(
            "🚀 New **Production** version detected!\n`{}` -> `{}`",
            metadata.production_previous_version, metadata.production_version
        ),
        Channel::Staging => format!(
            "🧪 New **Staging** version detected!\n`{}`",
            metadata.staging_version
        ),
    }
}

/// Message sent once a run of consecutive failures reaches the alert threshold
pub fn failure_alert_message(consecutive_failures: u32, stage: &str, error: &str) -> String {
    format!(
        "⚠️ Revision check has failed {consecutive_failures} times in a row ({stage} stage).\n```\n{}\n```",
        truncate(error, MAX_CONTENT_CHARS / 2)
    )
}

/// Message sent when checks succeed again after an alert went out
pub fn recovery_message(failed_runs: u32) -> String {
    format!("✅ Revision check recovered after {failed_runs} failed run(s).")
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn metadata() -> VersionMetadata {
        VersionMetadata {
            production_id: "P2".to_string(),
            production_version: "232.1".to_string(),
            production_previous_version: "231.4".to_string(),
            staging_id: "S7".to_string(),
            staging_version: "233.0-rc1".to_string(),
        }
    }

    fn notifier(server: &MockServer) -> WebhookNotifier {
        let url = Url::parse(&format!("{}/hook", server.uri())).unwrap();
        let client = Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        WebhookNotifier::new(client, url)
    }

    #[test]
    fn test_production_message_shows_previous_and_new() {
        let message = change_message(Channel::Production, &metadata());
        assert!(message.contains("Production"));
        assert!(message.contains("`231.4` -> `232.1`"));
    }

    #[test]
    fn test_staging_message_shows_only_new_version() {
        let message = change_message(Channel::Staging, &metadata());
        assert!(message.contains("Staging"));
        assert!(message.contains("`233.0-rc1`"));
        assert!(!message.contains("->"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("short", 100), "short");
    }

    #[test]
    fn test_failure_alert_mentions_count_and_stage() {
        let message = failure_alert_message(3, "fetch", "connection refused");
        assert!(message.contains("3 times"));
        assert!(message.contains("fetch"));
        assert!(message.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_webhook_posts_json_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({ "content": "hello" })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        notifier(&server).notify("hello").await.unwrap();
    }

    #[tokio::test]
    async fn test_webhook_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = notifier(&server).notify("hello").await.unwrap_err();
        assert!(matches!(err, NotifyError::Status(429)));
    }
}
