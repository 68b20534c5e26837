pub mod schema;

use std::fmt;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ureq::{Agent, AgentBuilder, Request, Response};

use crate::config::Config;

/// Rows returned by the backend, or the error object it sent instead.
#[derive(Debug, Default)]
pub struct QueryResult {
    pub data: Vec<Value>,
    pub error: Option<ApiError>,
}

/// Error object of the REST interface.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct ApiError {
    #[serde(skip)]
    pub status: u16,
    pub code: Option<String>,
    pub message: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl ApiError {
    pub fn from_body(status: u16, body: &str) -> ApiError {
        match serde_json::from_str::<ApiError>(body) {
            Ok(error) => ApiError { status, ..error },
            Err(_) => ApiError {
                status,
                message: Some(body.trim().to_string()).filter(|m| !m.is_empty()),
                ..ApiError::default()
            },
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.message.as_deref().unwrap_or("request rejected")
        )?;
        if let Some(code) = &self.code {
            write!(f, " (code {})", code)?;
        }
        write!(f, " [HTTP {}]", self.status)?;
        if let Some(details) = &self.details {
            write!(f, "; details: {}", details)?;
        }
        if let Some(hint) = &self.hint {
            write!(f, "; hint: {}", hint)?;
        }
        Ok(())
    }
}

pub trait Backend {
    /// Inserts one row and returns the rows the backend created.
    fn insert<T: Serialize>(&mut self, table: &str, row: &T) -> Result<QueryResult>;

    /// Selects `columns` from `table` where `column` equals `value`.
    fn select_eq(
        &mut self,
        table: &str,
        columns: &str,
        column: &str,
        value: &Value,
    ) -> Result<QueryResult>;
}

pub struct RestClient {
    agent: Agent,
    base_url: String,
    service_key: String,
}

impl RestClient {
    /// Builds a session bound to the credentials. No request is made here.
    pub fn connect(config: &Config) -> Result<RestClient> {
        Ok(RestClient {
            agent: AgentBuilder::new().build(),
            base_url: rest_base_url(&config.url),
            service_key: config.service_key.clone(),
        })
    }

    fn authorize(&self, request: Request) -> Request {
        request
            .set("apikey", &self.service_key)
            .set("Authorization", &format!("Bearer {}", self.service_key))
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.base_url, table)
    }
}

impl Backend for RestClient {
    fn insert<T: Serialize>(&mut self, table: &str, row: &T) -> Result<QueryResult> {
        let url = self.table_url(table);
        log::debug!("POST {}", url);

        let response = self
            .authorize(self.agent.post(&url))
            .set("Prefer", "return=representation")
            .send_json(row);
        into_query_result(response).with_context(|| format!("insert into {} failed", table))
    }

    fn select_eq(
        &mut self,
        table: &str,
        columns: &str,
        column: &str,
        value: &Value,
    ) -> Result<QueryResult> {
        let url = self.table_url(table);
        let filter = format!("eq.{}", literal(value));
        log::debug!("GET {}?select={}&{}={}", url, columns, column, filter);

        let response = self
            .authorize(self.agent.get(&url))
            .query("select", columns)
            .query(column, &filter)
            .call();
        into_query_result(response).with_context(|| format!("select from {} failed", table))
    }
}

fn into_query_result(response: Result<Response, ureq::Error>) -> Result<QueryResult> {
    match response {
        Ok(response) => {
            let status = response.status();
            let data = response
                .into_json::<Vec<Value>>()
                .context("could not decode rows")?;
            log::debug!("HTTP {} with {} row(s)", status, data.len());
            Ok(QueryResult { data, error: None })
        }
        Err(ureq::Error::Status(status, response)) => {
            let body = response.into_string().unwrap_or_default();
            let error = ApiError::from_body(status, &body);
            log::warn!("request rejected: {}", error);
            Ok(QueryResult {
                data: Vec::new(),
                error: Some(error),
            })
        }
        Err(error) => Err(error.into()),
    }
}

fn rest_base_url(url: &str) -> String {
    format!("{}/rest/v1", url.trim_end_matches('/'))
}

/// Renders a value as plain text; strings go out without JSON quotes.
pub fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
