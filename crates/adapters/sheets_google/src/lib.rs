//! # cardtrail-adapter-sheets
//!
//! [`MovementSink`] implementation that appends rows to a Google Sheet.
//!
//! Each append checks the first row of the sheet and writes the header there
//! when it is empty, then appends the records below the existing data. The
//! sheet is never read back for dedup; records are filtered before they get
//! here.
//!
//! Authentication is pluggable through [`AccessTokenSource`]; production use
//! goes through [`ServiceAccountTokenSource`].

mod auth;
mod error;

use serde::{Deserialize, Serialize};

use cardtrail_app::ports::MovementSink;
use cardtrail_domain::error::TrackerError;
use cardtrail_domain::movement::{HEADER, MovementRecord};

pub use auth::{
    AccessTokenSource, SPREADSHEETS_SCOPE, ServiceAccountKey, ServiceAccountTokenSource,
    StaticToken,
};
pub use error::SheetsError;

/// Public Sheets API root.
pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4";

/// Default tab written to.
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Target spreadsheet and tab.
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub base_url: String,
    pub spreadsheet_id: String,
    pub sheet_name: String,
}

impl SheetsConfig {
    #[must_use]
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Default)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Appends movement rows to one sheet.
pub struct GoogleSheetsWriter<T> {
    http: reqwest::Client,
    config: SheetsConfig,
    tokens: T,
}

impl<T: AccessTokenSource + Sync> GoogleSheetsWriter<T> {
    pub fn new(http: reqwest::Client, config: SheetsConfig, tokens: T) -> Self {
        Self {
            http,
            config,
            tokens,
        }
    }

    /// `…/spreadsheets/{id}/values/{sheet}!{range}`, with the id and the
    /// A1 notation escaped as single path segments.
    fn values_url(&self, range: &str) -> Result<reqwest::Url, SheetsError> {
        let invalid = || SheetsError::BaseUrl(self.config.base_url.clone());
        let mut url = reqwest::Url::parse(&self.config.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|()| invalid())?
            .pop_if_empty()
            .extend(["spreadsheets", self.config.spreadsheet_id.as_str(), "values"])
            .push(&format!("{}!{range}", self.config.sheet_name));
        Ok(url)
    }

    async fn has_header(&self, token: &str) -> Result<bool, SheetsError> {
        let response = self
            .http
            .get(self.values_url("A1:Z1")?)
            .bearer_auth(token)
            .send()
            .await?;
        let range: ValueRange = check(response, "header lookup").await?.json().await?;
        Ok(range.values.iter().any(|row| !row.is_empty()))
    }

    async fn write_header(&self, token: &str) -> Result<(), SheetsError> {
        let body = ValueRange {
            values: vec![HEADER.iter().map(ToString::to_string).collect()],
        };
        let response = self
            .http
            .put(self.values_url("A1")?)
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        check(response, "header write").await?;
        tracing::info!(sheet = %self.config.sheet_name, "wrote header row");
        Ok(())
    }

    async fn append_rows(&self, token: &str, records: &[MovementRecord]) -> Result<(), SheetsError> {
        let body = ValueRange {
            values: records
                .iter()
                .map(|record| record.to_row().to_vec())
                .collect(),
        };
        let response = self
            .http
            .post(self.values_url("A1:append")?)
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        check(response, "append").await?;
        Ok(())
    }

    async fn write(&self, records: &[MovementRecord]) -> Result<(), SheetsError> {
        let token = self.tokens.access_token().await?;
        if !self.has_header(&token).await? {
            self.write_header(&token).await?;
        }
        self.append_rows(&token, records).await
    }
}

async fn check(
    response: reqwest::Response,
    context: &'static str,
) -> Result<reqwest::Response, SheetsError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(SheetsError::Status {
        context,
        status: status.as_u16(),
        body: response.text().await.unwrap_or_default(),
    })
}

impl<T: AccessTokenSource + Sync> MovementSink for GoogleSheetsWriter<T> {
    async fn append(&self, records: &[MovementRecord]) -> Result<(), TrackerError> {
        if records.is_empty() {
            return Ok(());
        }
        self.write(records).await?;
        tracing::info!(
            spreadsheet_id = %self.config.spreadsheet_id,
            count = records.len(),
            "appended rows to sheet"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, Query, State};
    use axum::http::{HeaderMap, Method, StatusCode};
    use axum::routing::any;
    use axum::{Json, Router};
    use cardtrail_domain::location::Location;
    use chrono::{TimeZone, Utc};
    use serde_json::{Value, json};

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Call {
        method: Method,
        range: String,
        input: Option<String>,
        auth: Option<String>,
        body: Value,
    }

    #[derive(Clone, Default)]
    struct FakeSheet {
        header: Option<Vec<String>>,
        status: Option<StatusCode>,
        calls: Arc<Mutex<Vec<Call>>>,
    }

    async fn handle(
        State(sheet): State<FakeSheet>,
        method: Method,
        headers: HeaderMap,
        Path((_id, range)): Path<(String, String)>,
        Query(query): Query<HashMap<String, String>>,
        body: String,
    ) -> (StatusCode, Json<Value>) {
        sheet.calls.lock().unwrap().push(Call {
            method: method.clone(),
            range,
            input: query.get("valueInputOption").cloned(),
            auth: headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body: serde_json::from_str(&body).unwrap_or(Value::Null),
        });
        if let Some(status) = sheet.status {
            return (status, Json(json!({"error": {"code": status.as_u16()}})));
        }
        match (method, &sheet.header) {
            (Method::GET, Some(header)) => (StatusCode::OK, Json(json!({"values": [header]}))),
            _ => (StatusCode::OK, Json(json!({"majorDimension": "ROWS"}))),
        }
    }

    async fn serve(sheet: FakeSheet) -> String {
        let router = Router::new()
            .route("/spreadsheets/{id}/values/{range}", any(handle))
            .with_state(sheet);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn writer(base_url: String) -> GoogleSheetsWriter<StaticToken> {
        let config = SheetsConfig {
            base_url,
            ..SheetsConfig::new("sheet-1")
        };
        GoogleSheetsWriter::new(
            reqwest::Client::new(),
            config,
            StaticToken("test-token".to_string()),
        )
    }

    fn record() -> MovementRecord {
        MovementRecord {
            card_id: None,
            card_name: "Fix bug".to_string(),
            old_location: Location::placed("Sprint", "Backlog"),
            new_location: Location::placed("Sprint", "Done"),
            timestamp: Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn should_write_header_then_rows_into_empty_sheet() {
        let sheet = FakeSheet::default();
        let writer = writer(serve(sheet.clone()).await);

        writer.append(&[record()]).await.unwrap();

        let calls = sheet.calls.lock().unwrap().clone();
        let summary: Vec<(Method, &str)> = calls
            .iter()
            .map(|c| (c.method.clone(), c.range.as_str()))
            .collect();
        assert_eq!(
            summary,
            [
                (Method::GET, "Sheet1!A1:Z1"),
                (Method::PUT, "Sheet1!A1"),
                (Method::POST, "Sheet1!A1:append"),
            ]
        );
        assert_eq!(calls[1].body, json!({"values": [HEADER]}));
        assert_eq!(
            calls[2].body,
            json!({"values": [["Fix bug", "Sprint / Backlog", "Sprint / Done", "2025-01-02T00:00:00.000Z"]]})
        );
        assert!(calls[1..].iter().all(|c| c.input.as_deref() == Some("RAW")));
        assert!(
            calls
                .iter()
                .all(|c| c.auth.as_deref() == Some("Bearer test-token"))
        );
    }

    #[tokio::test]
    async fn should_skip_header_when_present() {
        let sheet = FakeSheet {
            header: Some(HEADER.iter().map(ToString::to_string).collect()),
            ..FakeSheet::default()
        };
        let writer = writer(serve(sheet.clone()).await);

        writer.append(&[record()]).await.unwrap();

        let methods: Vec<Method> = sheet
            .calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.method.clone())
            .collect();
        assert_eq!(methods, [Method::GET, Method::POST]);
    }

    #[tokio::test]
    async fn should_escape_sheet_name_in_request_path() {
        let sheet = FakeSheet::default();
        let base_url = serve(sheet.clone()).await;
        let config = SheetsConfig {
            base_url: format!("{base_url}/"),
            sheet_name: "Moves/2025 #1?".to_string(),
            ..SheetsConfig::new("sheet-1")
        };
        let writer = GoogleSheetsWriter::new(
            reqwest::Client::new(),
            config,
            StaticToken("test-token".to_string()),
        );

        writer.append(&[record()]).await.unwrap();

        let ranges: Vec<String> = sheet
            .calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.range.clone())
            .collect();
        assert_eq!(
            ranges,
            [
                "Moves/2025 #1?!A1:Z1",
                "Moves/2025 #1?!A1",
                "Moves/2025 #1?!A1:append",
            ]
        );
    }

    #[tokio::test]
    async fn should_reject_unusable_base_url() {
        let config = SheetsConfig {
            base_url: "not a url".to_string(),
            ..SheetsConfig::new("sheet-1")
        };
        let writer = GoogleSheetsWriter::new(
            reqwest::Client::new(),
            config,
            StaticToken("test-token".to_string()),
        );

        let result = writer.append(&[record()]).await;

        let Err(TrackerError::Storage(source)) = result else {
            panic!("expected storage error");
        };
        assert_eq!(source.to_string(), "invalid sheets base URL not a url");
    }

    #[tokio::test]
    async fn should_map_rejection_to_storage_error() {
        let sheet = FakeSheet {
            status: Some(StatusCode::FORBIDDEN),
            ..FakeSheet::default()
        };
        let writer = writer(serve(sheet.clone()).await);

        let result = writer.append(&[record()]).await;

        assert!(matches!(result, Err(TrackerError::Storage(_))));
        assert_eq!(sheet.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_not_call_api_for_empty_batch() {
        let sheet = FakeSheet::default();
        let writer = writer(serve(sheet.clone()).await);

        writer.append(&[]).await.unwrap();

        assert!(sheet.calls.lock().unwrap().is_empty());
    }
}
