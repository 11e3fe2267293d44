//! Google Sheets API v4 row source
//!
//! Uses `spreadsheets.values.get` with formatted values, so every cell comes
//! back the way the sheet displays it.
//!
//! See <https://developers.google.com/sheets/api/reference/rest/v4/spreadsheets.values/get>

use super::RowSource;
use crate::auth::{self, Credentials, SHEETS_READONLY_SCOPE};
use crate::error::{FeedError, FeedResult};
use crate::types::RawRowSet;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Clone)]
enum Authorization {
    Bearer(String),
    ApiKey(String),
}

/// Row source backed by one remote spreadsheet
pub struct SheetsSource {
    client: reqwest::Client,
    spreadsheet_id: String,
    authorization: Authorization,
}

impl SheetsSource {
    /// Build the HTTP client and authorize it.
    ///
    /// Service account credentials are exchanged for an access token here,
    /// once, before any sheet is fetched.
    pub async fn connect(
        spreadsheet_id: &str,
        credentials: &Credentials,
        timeout: Duration,
    ) -> FeedResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sheetfeed/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FeedError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let authorization = match credentials {
            Credentials::ServiceAccount(key) => {
                debug!(client_email = %key.client_email, "requesting access token");
                let token = auth::fetch_access_token(&client, key, SHEETS_READONLY_SCOPE).await?;
                Authorization::Bearer(token)
            }
            Credentials::ApiKey(key) => Authorization::ApiKey(key.clone()),
        };

        Ok(Self {
            client,
            spreadsheet_id: spreadsheet_id.to_string(),
            authorization,
        })
    }
}

/// A1 notation for a column range on a named sheet.
///
/// Names other than plain identifiers are single-quoted, with embedded
/// quotes doubled.
pub fn a1_range(sheet: &str, range: &str) -> String {
    let plain = !sheet.is_empty() && sheet.chars().all(|c| c.is_alphanumeric() || c == '_');
    if plain {
        format!("{}!{}", sheet, range)
    } else {
        format!("'{}'!{}", sheet.replace('\'', "''"), range)
    }
}

/// Full `values.get` URL for a spreadsheet and A1 range
pub fn values_url(base: &str, spreadsheet_id: &str, a1: &str) -> FeedResult<Url> {
    let mut url =
        Url::parse(base).map_err(|e| FeedError::Config(format!("Invalid API base URL: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| FeedError::Config(format!("API base URL cannot be a base: {}", base)))?
        .extend([spreadsheet_id, "values", a1]);
    url.query_pairs_mut()
        .append_pair("majorDimension", "ROWS")
        .append_pair("valueRenderOption", "FORMATTED_VALUE");
    Ok(url)
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Option<Vec<Vec<serde_json::Value>>>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    status: Option<String>,
    message: String,
}

fn cell_to_string(cell: serde_json::Value) -> String {
    match cell {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Parse a `ValueRange` response body. An absent `values` field means the
/// range holds no data.
pub fn parse_value_range(body: &str) -> FeedResult<Option<RawRowSet>> {
    let range: ValueRange = serde_json::from_str(body)?;
    Ok(range
        .values
        .filter(|rows| !rows.is_empty())
        .map(|rows| {
            rows.into_iter()
                .map(|row| row.into_iter().map(cell_to_string).collect())
                .collect()
        }))
}

/// Human-readable message from an API error body, falling back to the raw text
fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => match parsed.error.status {
            Some(status) => format!("{} ({})", parsed.error.message, status),
            None => parsed.error.message,
        },
        Err(_) => body.trim().to_string(),
    }
}

#[async_trait]
impl RowSource for SheetsSource {
    async fn fetch_rows(&self, sheet: &str, range: &str) -> FeedResult<Option<RawRowSet>> {
        let a1 = a1_range(sheet, range);
        let url = values_url(SHEETS_API_BASE, &self.spreadsheet_id, &a1)?;
        debug!(sheet, range = %a1, "fetching values");

        let request = match &self.authorization {
            Authorization::Bearer(token) => self.client.get(url).bearer_auth(token),
            Authorization::ApiKey(key) => self.client.get(url).query(&[("key", key.as_str())]),
        };

        let response = request
            .send()
            .await
            .map_err(|e| FeedError::fetch(sheet, e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FeedError::fetch(sheet, e.to_string()))?;

        if !status.is_success() {
            return Err(FeedError::fetch(
                sheet,
                format!("HTTP {}: {}", status.as_u16(), api_error_message(&body)),
            ));
        }

        parse_value_range(&body)
            .map_err(|e| FeedError::fetch(sheet, format!("Malformed response: {}", e)))
    }

    fn describe(&self) -> String {
        format!("Google Sheets spreadsheet {}", self.spreadsheet_id)
    }
}
