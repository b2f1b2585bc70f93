//! Thin PostgREST client shared by the remote repository and change feed.

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use deskbook_core::storage::{status_code_to_persistence_error, PersistenceError};

use crate::config::RemoteSettings;

/// `Prefer` header for upserts that return the stored rows.
const PREFER_UPSERT: &str = "resolution=merge-duplicates,return=representation";

/// HTTP access to the hosted database.
#[derive(Debug, Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestClient {
    pub fn new(settings: &RemoteSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: settings.url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// A request carrying the key in both headers the service expects.
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// `GET /rest/v1/{table}` with PostgREST filter parameters.
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>, PersistenceError> {
        let response = self
            .request(Method::GET, &self.table_url(table))
            .query(&[("select", "*")])
            .query(filters)
            .send()
            .await
            .map_err(network_error)?;
        decode_rows(response).await
    }

    /// `POST /rest/v1/{table}?on_conflict=...` with merge-duplicates.
    pub async fn upsert<B, T>(
        &self,
        table: &str,
        on_conflict: &str,
        body: &B,
    ) -> Result<Vec<T>, PersistenceError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::POST, &self.table_url(table))
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", PREFER_UPSERT)
            .json(body)
            .send()
            .await
            .map_err(network_error)?;
        decode_rows(response).await
    }

    /// `DELETE /rest/v1/{table}` returning the deleted rows.
    pub async fn delete<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>, PersistenceError> {
        let response = self
            .request(Method::DELETE, &self.table_url(table))
            .query(filters)
            .header("Prefer", "return=representation")
            .send()
            .await
            .map_err(network_error)?;
        decode_rows(response).await
    }
}

/// PostgREST equality filter value.
pub fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{value}")
}

pub fn network_error(err: reqwest::Error) -> PersistenceError {
    PersistenceError::Network(err.to_string())
}

/// Maps a non-2xx response to a persistence error, otherwise decodes rows.
async fn decode_rows<T: DeserializeOwned>(response: Response) -> Result<Vec<T>, PersistenceError> {
    let status = response.status();
    if !status.is_success() {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(status_code_to_persistence_error(status.as_u16(), &message));
    }

    let body = response.bytes().await.map_err(network_error)?;
    serde_json::from_slice(&body).map_err(|e| PersistenceError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url_strips_trailing_slash() {
        let client = RestClient::new(&RemoteSettings {
            url: "https://db.example.com/".to_string(),
            api_key: "key".to_string(),
        });

        assert_eq!(
            client.table_url("desk_bookings"),
            "https://db.example.com/rest/v1/desk_bookings"
        );
    }

    #[test]
    fn test_eq_filter() {
        assert_eq!(eq("D1"), "eq.D1");
    }
}
