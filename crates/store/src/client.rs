//! Authenticated REST client for the hosted store.
//!
//! The store speaks the PostgREST dialect: tables live under
//! `{base}/rest/v1/{table}`, filters are query parameters
//! (`column=op.value`), and write behavior is selected through the
//! `Prefer` header.

use reqwest::header::{AUTHORIZATION, RANGE};
use serde::Serialize;
use serde::de::DeserializeOwned;

use dripcast_common::{AppError, AppResult};

const PREFER_MINIMAL: &str = "return=minimal";
const PREFER_REPRESENTATION: &str = "return=representation";
const PREFER_IGNORE_DUPLICATES: &str = "resolution=ignore-duplicates,return=minimal";
const PREFER_COUNT_EXACT: &str = "count=exact";

/// Thin REST client carrying the service-role credential.
#[derive(Debug, Clone)]
pub struct RestClient {
    base_url: String,
    service_key: String,
    http: reqwest::Client,
}

impl RestClient {
    /// Create a client for the given store base URL.
    #[must_use]
    pub fn new(base_url: &str, service_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Base URL of the hosted store (no trailing slash).
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.service_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.service_key))
    }

    async fn check(response: reqwest::Response, context: &str) -> AppResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Store(format!("{context}: {status}: {body}")))
    }

    /// Select rows matching the given filters.
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> AppResult<Vec<T>> {
        let response = self
            .authed(self.http.get(self.table_url(table)).query(query))
            .send()
            .await
            .map_err(|e| AppError::Store(format!("select from {table} failed: {e}")))?;

        Self::check(response, &format!("select from {table}"))
            .await?
            .json::<Vec<T>>()
            .await
            .map_err(|e| AppError::Store(format!("decoding rows from {table} failed: {e}")))
    }

    /// Count rows matching the given filters without fetching them.
    ///
    /// Uses `Prefer: count=exact` with an empty range; the total comes back
    /// in the `Content-Range` header.
    pub async fn count(&self, table: &str, query: &[(&str, String)]) -> AppResult<u64> {
        let response = self
            .authed(self.http.get(self.table_url(table)).query(query))
            .header("Prefer", PREFER_COUNT_EXACT)
            .header(RANGE, "0-0")
            .send()
            .await
            .map_err(|e| AppError::Store(format!("count on {table} failed: {e}")))?;

        let response = Self::check(response, &format!("count on {table}")).await?;
        let header = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Store(format!("count on {table}: missing content-range")))?;

        content_range_total(header)
            .ok_or_else(|| AppError::Store(format!("count on {table}: bad content-range {header}")))
    }

    /// Insert rows. `rows` serializes to a JSON array for bulk inserts or a
    /// single object for one row.
    pub async fn insert<T: Serialize + ?Sized>(&self, table: &str, rows: &T) -> AppResult<()> {
        let response = self
            .authed(self.http.post(self.table_url(table)).json(rows))
            .header("Prefer", PREFER_MINIMAL)
            .send()
            .await
            .map_err(|e| AppError::Store(format!("insert into {table} failed: {e}")))?;

        Self::check(response, &format!("insert into {table}")).await?;
        Ok(())
    }

    /// Insert one row, silently keeping the existing row on a key conflict.
    pub async fn upsert_ignore_duplicates<T: Serialize>(
        &self,
        table: &str,
        on_conflict: &str,
        row: &T,
    ) -> AppResult<()> {
        let response = self
            .authed(
                self.http
                    .post(self.table_url(table))
                    .query(&[("on_conflict", on_conflict)])
                    .json(row),
            )
            .header("Prefer", PREFER_IGNORE_DUPLICATES)
            .send()
            .await
            .map_err(|e| AppError::Store(format!("upsert into {table} failed: {e}")))?;

        Self::check(response, &format!("upsert into {table}")).await?;
        Ok(())
    }

    /// Patch rows matching the filters and return the updated rows.
    pub async fn update_returning<T: DeserializeOwned, P: Serialize>(
        &self,
        table: &str,
        query: &[(&str, String)],
        patch: &P,
    ) -> AppResult<Vec<T>> {
        let response = self
            .authed(self.http.patch(self.table_url(table)).query(query).json(patch))
            .header("Prefer", PREFER_REPRESENTATION)
            .send()
            .await
            .map_err(|e| AppError::Store(format!("update on {table} failed: {e}")))?;

        Self::check(response, &format!("update on {table}"))
            .await?
            .json::<Vec<T>>()
            .await
            .map_err(|e| AppError::Store(format!("decoding rows from {table} failed: {e}")))
    }
}

/// Parse the total out of a `Content-Range` header (`0-0/42` or `*/42`).
fn content_range_total(header: &str) -> Option<u64> {
    header.rsplit_once('/')?.1.parse().ok()
}

/// Quote a list of values for a PostgREST `in.(...)` filter.
#[must_use]
pub fn in_filter(values: &[String]) -> String {
    let quoted: Vec<String> = values
        .iter()
        .map(|v| format!("\"{}\"", v.replace('"', "")))
        .collect();
    format!("in.({})", quoted.join(","))
}
