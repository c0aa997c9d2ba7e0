//! The authenticated server session shared by all fetchers.

use crate::error::FetchError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

/// A relative API request. The session resolves it against its server.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            ..Self::get(path)
        }
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn query_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Comma separated list parameter. Empty lists are omitted.
    pub fn query_list<I, T>(self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        let joined = values
            .into_iter()
            .map(|value| value.to_string())
            .collect::<Vec<_>>()
            .join(",");
        if joined.is_empty() {
            self
        } else {
            self.query(key, joined)
        }
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        serde_json::from_slice(&self.body).map_err(|err| FetchError::Decode(err.to_string()))
    }
}

/// Current user, server endpoint, and a way to talk to it.
///
/// Shared read-only between every paging session and fetcher.
#[async_trait]
pub trait AuthenticatedSession: Send + Sync + Debug {
    fn user_id(&self) -> &str;

    fn server_url(&self) -> &Url;

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_parameters_are_comma_joined_and_skipped_when_empty() {
        let request = ApiRequest::get("/Items")
            .query_list("Genres", ["Drama", "Crime"])
            .query_list("Tags", Vec::<String>::new())
            .query_opt("SearchTerm", None::<String>);
        assert_eq!(request.query_value("Genres"), Some("Drama,Crime"));
        assert_eq!(request.query_value("Tags"), None);
        assert_eq!(request.query.len(), 1);
    }
}
