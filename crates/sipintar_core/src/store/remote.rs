//! Remote adapter for the hosted relational backend.
//!
//! This adapter owns transport details only: URL building, authentication
//! headers, HTTP error mapping and JSON decoding into storage rows. Field
//! translation to domain entities happens in the repository via the mapper.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Url};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

const REST_PATH: &str = "rest/v1/";
const MAX_ERROR_BODY_CHARS: usize = 200;
const UPSERT_PREFERENCE: &str = "resolution=merge-duplicates,return=minimal";

pub type RemoteResult<T> = Result<T, RemoteError>;

#[derive(Debug)]
pub enum RemoteError {
    InvalidEndpoint(String),
    InvalidCredential,
    Transport(reqwest::Error),
    Status { status: u16, body: String },
    Decode(String),
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEndpoint(reason) => write!(f, "invalid remote endpoint: {reason}"),
            Self::InvalidCredential => write!(f, "remote credential is not a valid header value"),
            Self::Transport(err) => write!(f, "remote transport failed: {err}"),
            Self::Status { status, body } => write!(f, "remote returned status {status}: {body}"),
            Self::Decode(reason) => write!(f, "remote response could not be decoded: {reason}"),
        }
    }
}

impl Error for RemoteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value)
    }
}

/// Row ordering requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteOrder<'a> {
    pub column: &'a str,
    pub descending: bool,
}

/// Collection-oriented access to remote storage rows.
#[async_trait]
pub trait RemoteAdapter: Send + Sync {
    /// Stable adapter name used in log events.
    fn adapter_tag(&self) -> &'static str;

    /// Returns every row of `table`, optionally ordered.
    async fn select_all(
        &self,
        table: &str,
        order: Option<RemoteOrder<'_>>,
    ) -> RemoteResult<Vec<Value>>;

    /// Inserts `row`, or replaces the row whose `key_column` matches.
    async fn upsert(&self, table: &str, key_column: &str, row: Value) -> RemoteResult<()>;

    /// Deletes rows whose `key_column` equals `key`. Zero matches is success.
    async fn delete_eq(&self, table: &str, key_column: &str, key: &str) -> RemoteResult<()>;
}

/// REST adapter speaking the PostgREST dialect of the hosted backend.
pub struct PostgrestAdapter {
    client: Client,
    rest_root: Url,
}

impl PostgrestAdapter {
    /// Builds an adapter for `endpoint`, authenticating every call with `api_key`.
    ///
    /// Only constructs the HTTP client; reachability is not probed.
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> RemoteResult<Self> {
        let rest_root = rest_root(endpoint)?;
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(auth_headers(api_key)?)
            .build()?;
        Ok(Self { client, rest_root })
    }

    fn table_url(&self, table: &str) -> RemoteResult<Url> {
        self.rest_root
            .join(table)
            .map_err(|err| RemoteError::InvalidEndpoint(err.to_string()))
    }

    /// URL for reading a whole table.
    pub fn select_url(&self, table: &str, order: Option<RemoteOrder<'_>>) -> RemoteResult<Url> {
        let mut url = self.table_url(table)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("select", "*");
            if let Some(order) = order {
                let direction = if order.descending { "desc" } else { "asc" };
                query.append_pair("order", &format!("{}.{direction}", order.column));
            }
        }
        Ok(url)
    }

    /// URL for upserting into a table keyed by `key_column`.
    pub fn upsert_url(&self, table: &str, key_column: &str) -> RemoteResult<Url> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut().append_pair("on_conflict", key_column);
        Ok(url)
    }

    /// URL for deleting the rows matching one key.
    pub fn delete_url(&self, table: &str, key_column: &str, key: &str) -> RemoteResult<Url> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut()
            .append_pair(key_column, &format!("eq.{key}"));
        Ok(url)
    }
}

#[async_trait]
impl RemoteAdapter for PostgrestAdapter {
    fn adapter_tag(&self) -> &'static str {
        "postgrest"
    }

    async fn select_all(
        &self,
        table: &str,
        order: Option<RemoteOrder<'_>>,
    ) -> RemoteResult<Vec<Value>> {
        let url = self.select_url(table, order)?;
        let response = ensure_success(self.client.get(url).send().await?).await?;
        response
            .json::<Vec<Value>>()
            .await
            .map_err(|err| RemoteError::Decode(err.to_string()))
    }

    async fn upsert(&self, table: &str, key_column: &str, row: Value) -> RemoteResult<()> {
        let url = self.upsert_url(table, key_column)?;
        let response = self
            .client
            .post(url)
            .header("Prefer", UPSERT_PREFERENCE)
            .json(&row)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn delete_eq(&self, table: &str, key_column: &str, key: &str) -> RemoteResult<()> {
        let url = self.delete_url(table, key_column, key)?;
        ensure_success(self.client.delete(url).send().await?).await?;
        Ok(())
    }
}

fn rest_root(endpoint: &str) -> RemoteResult<Url> {
    let trimmed = endpoint.trim().trim_end_matches('/');
    let base = Url::parse(&format!("{trimmed}/"))
        .map_err(|err| RemoteError::InvalidEndpoint(format!("`{trimmed}`: {err}")))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(RemoteError::InvalidEndpoint(format!(
            "`{trimmed}`: unsupported scheme `{}`",
            base.scheme()
        )));
    }
    base.join(REST_PATH)
        .map_err(|err| RemoteError::InvalidEndpoint(err.to_string()))
}

fn auth_headers(api_key: &str) -> RemoteResult<HeaderMap> {
    let key = api_key.trim();
    let mut api_key_value =
        HeaderValue::from_str(key).map_err(|_| RemoteError::InvalidCredential)?;
    api_key_value.set_sensitive(true);
    let mut bearer = HeaderValue::from_str(&format!("Bearer {key}"))
        .map_err(|_| RemoteError::InvalidCredential)?;
    bearer.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert("apikey", api_key_value);
    headers.insert(AUTHORIZATION, bearer);
    Ok(headers)
}

async fn ensure_success(response: reqwest::Response) -> RemoteResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RemoteError::Status {
        status: status.as_u16(),
        body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
    })
}
