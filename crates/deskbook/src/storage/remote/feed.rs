//! Server-sent-events change feed.
//!
//! Opens `GET {url}/realtime/v1/changes?table=...` and turns each `data:`
//! payload into a [`ChangeEvent`].

use async_trait::async_trait;
use reqwest::Method;

use deskbook_core::realtime::{
    parse_change_event, ChangeFeed, ChangeStream, SseDecoder, SubscriptionError,
};

use super::client::RestClient;

/// Change feed backed by the hosted realtime endpoint.
#[derive(Debug, Clone)]
pub struct SseChangeFeed {
    client: RestClient,
}

impl SseChangeFeed {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChangeFeed for SseChangeFeed {
    async fn subscribe(&self, table: &str) -> Result<ChangeStream, SubscriptionError> {
        let url = format!("{}/realtime/v1/changes", self.client.base_url());

        let response = self
            .client
            .request(Method::GET, &url)
            .query(&[("table", table)])
            .header("Accept", "text/event-stream")
            .send()
            .await
            .map_err(|e| SubscriptionError::Connect(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SubscriptionError::Connect(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }

        tracing::info!(%table, "Change feed connected");

        let stream = async_stream::stream! {
            use tokio_stream::StreamExt;

            let mut byte_stream = response.bytes_stream();
            let mut decoder = SseDecoder::new();

            while let Some(chunk) = byte_stream.next().await {
                match chunk {
                    Ok(bytes) => {
                        for msg in decoder.push(&bytes) {
                            // Skip keepalives
                            if msg.is_heartbeat() {
                                continue;
                            }
                            yield parse_change_event(&msg.data);
                        }
                    }
                    Err(e) => {
                        yield Err(SubscriptionError::Stream(e.to_string()));
                        break;
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}
