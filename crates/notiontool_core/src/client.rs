use std::thread::sleep;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{Error, Result, classify_api_error};

/// One page of a paged listing endpoint, exactly as the gateway shapes
/// it: raw items plus the continuation state.
#[derive(Debug, Clone, Default)]
pub struct QueryPage {
    pub results: Vec<Value>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// The remote workspace gateway. Everything the command layer needs goes
/// through this trait so tests can substitute a scripted gateway.
pub trait WorkspaceApi {
    fn search(
        &mut self,
        query: &str,
        object_filter: Option<&str>,
        page_size: Option<u32>,
        cursor: Option<&str>,
    ) -> Result<QueryPage>;
    fn retrieve_database(&mut self, database_id: &str) -> Result<Value>;
    fn query_database(
        &mut self,
        database_id: &str,
        page_size: Option<u32>,
        cursor: Option<&str>,
    ) -> Result<QueryPage>;
    fn retrieve_page(&mut self, page_id: &str) -> Result<Value>;
    fn create_page(&mut self, database_id: &str, properties: Value) -> Result<Value>;
    fn update_page(&mut self, page_id: &str, properties: Value) -> Result<Value>;
    fn retrieve_block(&mut self, block_id: &str) -> Result<Value>;
    fn update_block(&mut self, block_id: &str, payload: Value) -> Result<Value>;
    fn list_block_children(
        &mut self,
        block_id: &str,
        page_size: Option<u32>,
        cursor: Option<&str>,
    ) -> Result<QueryPage>;
    fn append_block_children(&mut self, block_id: &str, children: Vec<Value>) -> Result<Value>;
    fn delete_block(&mut self, block_id: &str) -> Result<Value>;
    fn request_count(&self) -> usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

pub struct NotionClient {
    client: Client,
    config: ClientConfig,
    request_count: usize,
}

impl NotionClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|error| Error::Transport(format!("failed to build HTTP client: {error}")))?;

        Ok(Self {
            client,
            config,
            request_count: 0,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Issue one API call, classifying any failure into the error
    /// taxonomy. Retries are transport-level only: connect/timeout
    /// failures and transient statuses, with linear backoff.
    fn request_json(
        &mut self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
        identifier: &str,
    ) -> Result<Value> {
        let url = self.endpoint(path);

        for attempt in 0..=self.config.max_retries {
            self.request_count += 1;
            debug!(method = method.as_str(), %url, attempt, "api request");

            let mut builder = match method {
                Method::Get => self.client.get(&url),
                Method::Post => self.client.post(&url),
                Method::Patch => self.client.patch(&url),
                Method::Delete => self.client.delete(&url),
            };
            builder = builder
                .header("Authorization", format!("Bearer {}", self.config.token))
                .header("Notion-Version", self.config.api_version.clone());
            if !query.is_empty() {
                builder = builder.query(query);
            }
            if let Some(body) = body {
                builder = builder.json(body);
            }

            let response = match builder.send() {
                Ok(response) => response,
                Err(error) => {
                    if attempt < self.config.max_retries && is_retryable_error(&error) {
                        self.wait_before_retry(attempt);
                        continue;
                    }
                    return Err(Error::Transport(format!("failed to call {url}: {error}")));
                }
            };

            let status = response.status();
            if status.is_success() {
                return response.json::<Value>().map_err(|error| {
                    Error::Transport(format!("failed to decode API response: {error}"))
                });
            }

            let classified = classify_error_response(status, response, identifier);
            let retryable = matches!(classified, Error::Transient { .. });
            if retryable && attempt < self.config.max_retries {
                warn!(%url, status = status.as_u16(), attempt, "retrying transient failure");
                self.wait_before_retry(attempt);
                continue;
            }
            return Err(classified);
        }

        Err(Error::Transport(format!(
            "request to {url} exhausted retry budget"
        )))
    }

    fn wait_before_retry(&self, attempt: usize) {
        sleep(Duration::from_millis(
            self.config
                .retry_delay_ms
                .saturating_mul(attempt as u64 + 1),
        ));
    }
}

fn classify_error_response(
    status: StatusCode,
    response: reqwest::blocking::Response,
    identifier: &str,
) -> Error {
    let payload = response.json::<Value>().unwrap_or(Value::Null);
    let code = payload
        .get("code")
        .and_then(Value::as_str)
        .unwrap_or("unknown_error");
    let message = payload
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("no error detail provided");
    classify_api_error(status.as_u16(), code, message, identifier)
}

fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request()
}

fn parse_query_page(payload: Value) -> QueryPage {
    let results = payload
        .get("results")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let next_cursor = payload
        .get("next_cursor")
        .and_then(Value::as_str)
        .map(ToString::to_string);
    let has_more = payload
        .get("has_more")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    QueryPage {
        results,
        next_cursor,
        has_more,
    }
}

impl WorkspaceApi for NotionClient {
    fn search(
        &mut self,
        query: &str,
        object_filter: Option<&str>,
        page_size: Option<u32>,
        cursor: Option<&str>,
    ) -> Result<QueryPage> {
        let mut body = json!({ "query": query });
        if let Some(value) = object_filter {
            body["filter"] = json!({ "property": "object", "value": value });
        }
        if let Some(size) = page_size {
            body["page_size"] = json!(size);
        }
        if let Some(cursor) = cursor {
            body["start_cursor"] = json!(cursor);
        }
        let payload = self.request_json(Method::Post, "search", &[], Some(&body), query)?;
        Ok(parse_query_page(payload))
    }

    fn retrieve_database(&mut self, database_id: &str) -> Result<Value> {
        self.request_json(
            Method::Get,
            &format!("databases/{database_id}"),
            &[],
            None,
            database_id,
        )
    }

    fn query_database(
        &mut self,
        database_id: &str,
        page_size: Option<u32>,
        cursor: Option<&str>,
    ) -> Result<QueryPage> {
        let mut body = json!({});
        if let Some(size) = page_size {
            body["page_size"] = json!(size);
        }
        if let Some(cursor) = cursor {
            body["start_cursor"] = json!(cursor);
        }
        let payload = self.request_json(
            Method::Post,
            &format!("databases/{database_id}/query"),
            &[],
            Some(&body),
            database_id,
        )?;
        Ok(parse_query_page(payload))
    }

    fn retrieve_page(&mut self, page_id: &str) -> Result<Value> {
        self.request_json(
            Method::Get,
            &format!("pages/{page_id}"),
            &[],
            None,
            page_id,
        )
    }

    fn create_page(&mut self, database_id: &str, properties: Value) -> Result<Value> {
        let body = json!({
            "parent": { "database_id": database_id },
            "properties": properties,
        });
        self.request_json(Method::Post, "pages", &[], Some(&body), database_id)
    }

    fn update_page(&mut self, page_id: &str, properties: Value) -> Result<Value> {
        let body = json!({ "properties": properties });
        self.request_json(
            Method::Patch,
            &format!("pages/{page_id}"),
            &[],
            Some(&body),
            page_id,
        )
    }

    fn retrieve_block(&mut self, block_id: &str) -> Result<Value> {
        self.request_json(
            Method::Get,
            &format!("blocks/{block_id}"),
            &[],
            None,
            block_id,
        )
    }

    fn update_block(&mut self, block_id: &str, payload: Value) -> Result<Value> {
        self.request_json(
            Method::Patch,
            &format!("blocks/{block_id}"),
            &[],
            Some(&payload),
            block_id,
        )
    }

    fn list_block_children(
        &mut self,
        block_id: &str,
        page_size: Option<u32>,
        cursor: Option<&str>,
    ) -> Result<QueryPage> {
        let mut query = Vec::new();
        if let Some(size) = page_size {
            query.push(("page_size", size.to_string()));
        }
        if let Some(cursor) = cursor {
            query.push(("start_cursor", cursor.to_string()));
        }
        let payload = self.request_json(
            Method::Get,
            &format!("blocks/{block_id}/children"),
            &query,
            None,
            block_id,
        )?;
        Ok(parse_query_page(payload))
    }

    fn append_block_children(&mut self, block_id: &str, children: Vec<Value>) -> Result<Value> {
        let body = json!({ "children": children });
        self.request_json(
            Method::Patch,
            &format!("blocks/{block_id}/children"),
            &[],
            Some(&body),
            block_id,
        )
    }

    fn delete_block(&mut self, block_id: &str) -> Result<Value> {
        self.request_json(
            Method::Delete,
            &format!("blocks/{block_id}"),
            &[],
            None,
            block_id,
        )
    }

    fn request_count(&self) -> usize {
        self.request_count
    }
}
