//! # Message Router (DMaaP)
//!
//! Topic listing, publishing and batch fetching, plus a background
//! [`TopicConsumer`] that drains a topic into a FIFO queue.

mod consumer;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{json_body, parse_json, ApiClient};
use crate::config::Settings;
use crate::domain::TopicName;
use crate::error::{OnapError, ValidationError};
use crate::http_client::{HttpClient, HttpMethod};

pub use consumer::{ConsumerHandle, TopicConsumer};

/// Long-poll parameters of a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// How long the router may hold the request open waiting for messages.
    pub timeout_ms: u64,
    /// Most messages returned by one fetch.
    pub limit: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 15_000,
            limit: 100,
        }
    }
}

/// Acknowledgement returned by a publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishReceipt {
    #[serde(default)]
    pub server_time_ms: u64,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Deserialize)]
struct TopicList {
    #[serde(default)]
    topics: Vec<String>,
}

/// Message router client rooted at `DMAAP_URL`.
#[derive(Debug, Clone)]
pub struct DmaapClient {
    api: ApiClient,
}

impl DmaapClient {
    pub fn new(http: Arc<dyn HttpClient>, settings: &Settings) -> Self {
        let api = ApiClient::new(http, settings.dmaap_url.as_str())
            .with_timeout_ms(settings.default_timeout_ms);
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub async fn topics(&self) -> Result<Vec<String>, OnapError> {
        let list: TopicList = self.api.get_json("dmaap.topics", "topics").await?;
        Ok(list.topics)
    }

    /// Publish `messages` to `topic` as one JSON array.
    pub async fn publish<M: Serialize>(
        &self,
        topic: &TopicName,
        messages: &[M],
    ) -> Result<PublishReceipt, OnapError> {
        let response = self
            .api
            .send_json(
                "dmaap.publish",
                HttpMethod::Post,
                &format!("events/{topic}"),
                messages,
            )
            .await?;
        if response.body.trim().is_empty() {
            return Ok(PublishReceipt {
                server_time_ms: 0,
                count: messages.len() as u64,
            });
        }
        parse_json("dmaap.publish", &response.body)
    }

    /// Fetch the next batch for the consumer `group`/`consumer_id`; an empty
    /// vector means the long poll timed out.
    pub async fn fetch(
        &self,
        topic: &TopicName,
        group: &str,
        consumer_id: &str,
        options: FetchOptions,
    ) -> Result<Vec<String>, OnapError> {
        validate_consumer(group, consumer_id)?;

        let path = format!(
            "events/{topic}/{}/{}?timeout={}&limit={}",
            urlencoding::encode(group),
            urlencoding::encode(consumer_id),
            options.timeout_ms,
            options.limit
        );
        let request = self
            .api
            .request(HttpMethod::Get, &path)
            .with_timeout_ms(options.timeout_ms + self.api.timeout_ms());
        let response = self.api.send("dmaap.fetch", request).await?;
        let messages: Vec<serde_json::Value> = parse_json("dmaap.fetch", &response.body)?;
        debug!(topic = %topic, count = messages.len(), "fetched messages");

        messages
            .into_iter()
            .map(|message| match message {
                serde_json::Value::String(text) => Ok(text),
                other => json_body("dmaap.fetch", &other),
            })
            .collect()
    }
}

/// Group and consumer id must both be non-blank.
pub(crate) fn validate_consumer(group: &str, consumer_id: &str) -> Result<(), ValidationError> {
    if group.trim().is_empty() {
        return Err(ValidationError::EmptyField {
            field: "consumer group",
        });
    }
    if consumer_id.trim().is_empty() {
        return Err(ValidationError::EmptyField { field: "consumer id" });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OnapErrorKind;
    use crate::http_client::{HttpResponse, ScriptedHttpClient};

    fn dmaap(scripted: Arc<ScriptedHttpClient>) -> DmaapClient {
        DmaapClient::new(scripted, &Settings::default())
    }

    fn topic() -> TopicName {
        TopicName::parse("unauthenticated.VES_MEASUREMENT_OUTPUT").expect("valid topic")
    }

    #[tokio::test]
    async fn lists_topics() {
        let scripted = Arc::new(ScriptedHttpClient::new().on(
            HttpMethod::Get,
            "/topics",
            HttpResponse::ok_json(r#"{"topics":["a","b"]}"#),
        ));

        assert_eq!(dmaap(scripted).topics().await.expect("topics"), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn fetch_flattens_object_messages_and_sets_long_poll() {
        let scripted = Arc::new(ScriptedHttpClient::new().on(
            HttpMethod::Get,
            "/events/unauthenticated.VES_MEASUREMENT_OUTPUT/grp/c1",
            HttpResponse::ok_json(r#"["plain",{"k":1}]"#),
        ));
        let options = FetchOptions {
            timeout_ms: 5_000,
            limit: 10,
        };

        let messages = dmaap(scripted.clone())
            .fetch(&topic(), "grp", "c1", options)
            .await
            .expect("fetch");

        assert_eq!(messages, vec![String::from("plain"), String::from(r#"{"k":1}"#)]);
        let request = &scripted.recorded_requests()[0];
        assert!(request.url.ends_with("?timeout=5000&limit=10"));
        assert!(request.timeout_ms > 5_000);
    }

    #[tokio::test]
    async fn publish_posts_array_and_reads_receipt() {
        let scripted = Arc::new(ScriptedHttpClient::new().on(
            HttpMethod::Post,
            "/events/unauthenticated.VES_MEASUREMENT_OUTPUT",
            HttpResponse::ok_json(r#"{"serverTimeMs":3,"count":2}"#),
        ));

        let receipt = dmaap(scripted.clone())
            .publish(&topic(), &["one", "two"])
            .await
            .expect("publish");

        assert_eq!(receipt.count, 2);
        let body = scripted.recorded_requests()[0].body.clone().expect("body");
        assert_eq!(body, r#"["one","two"]"#);
    }

    #[tokio::test]
    async fn fetch_rejects_blank_consumer_group() {
        let scripted = Arc::new(ScriptedHttpClient::new());

        let error = dmaap(scripted.clone())
            .fetch(&topic(), " ", "c1", FetchOptions::default())
            .await
            .expect_err("blank group");
        assert_eq!(error.kind(), OnapErrorKind::Validation);
        assert_eq!(scripted.request_count(), 0);
    }
}
