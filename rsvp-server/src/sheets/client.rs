//! Google Sheets REST v4 values client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Row, ServiceAccountAuth, SheetValues, SheetsError};

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const VALUE_INPUT_OPTION: &str = "USER_ENTERED";
const INSERT_DATA_OPTION: &str = "INSERT_ROWS";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRangeBody<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: &'a [Row],
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// [`SheetValues`] against one spreadsheet
pub struct GoogleSheetsClient {
    http: reqwest::Client,
    auth: ServiceAccountAuth,
    sheet_id: String,
    base_url: String,
}

impl GoogleSheetsClient {
    pub fn new(sheet_id: String, auth: ServiceAccountAuth, http: reqwest::Client) -> Self {
        Self {
            http,
            auth,
            sheet_id,
            base_url: SHEETS_API_BASE.to_string(),
        }
    }

    /// Point the client at another API root (local fakes)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// `{base}/{sheet_id}/values/{range}[:{action}]` with the range
    /// percent-encoded as one path segment
    fn values_url(&self, range: &str, action: Option<&str>) -> Result<reqwest::Url, SheetsError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| SheetsError::InvalidUrl(e.to_string()))?;
        let segment = match action {
            Some(action) => format!("{range}:{action}"),
            None => range.to_string(),
        };
        url.path_segments_mut()
            .map_err(|_| SheetsError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push(&self.sheet_id)
            .push("values")
            .push(&segment);
        Ok(url)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, SheetsError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(SheetsError::Api {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl SheetValues for GoogleSheetsClient {
    async fn get_values(&self, range: &str) -> Result<Vec<Row>, SheetsError> {
        let token = self.auth.access_token().await?;
        let response = self
            .http
            .get(self.values_url(range, None)?)
            .bearer_auth(token)
            .send()
            .await?;

        let body: ValueRange = Self::check(response).await?.json().await?;
        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    async fn update_values(&self, range: &str, rows: &[Row]) -> Result<(), SheetsError> {
        let token = self.auth.access_token().await?;
        let response = self
            .http
            .put(self.values_url(range, None)?)
            .bearer_auth(token)
            .query(&[("valueInputOption", VALUE_INPUT_OPTION)])
            .json(&ValueRangeBody {
                range,
                major_dimension: "ROWS",
                values: rows,
            })
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn append_values(&self, range: &str, rows: &[Row]) -> Result<(), SheetsError> {
        let token = self.auth.access_token().await?;
        let response = self
            .http
            .post(self.values_url(range, Some("append"))?)
            .bearer_auth(token)
            .query(&[
                ("valueInputOption", VALUE_INPUT_OPTION),
                ("insertDataOption", INSERT_DATA_OPTION),
            ])
            .json(&ValueRangeBody {
                range,
                major_dimension: "ROWS",
                values: rows,
            })
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceAccountKey;
    use axum::extract::{Path, Query};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use http::HeaderMap;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    const PRIVATE_KEY: &str = include_str!("../../tests/fixtures/service_account_key.pem");

    #[derive(Default)]
    struct Recorded {
        requests: Mutex<Vec<(String, String, HashMap<String, String>, serde_json::Value)>>,
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            == Some("Bearer ya29.test-token")
    }

    async fn fake_google(recorded: Arc<Recorded>) -> String {
        let on_get = {
            let recorded = recorded.clone();
            move |Path((_, range)): Path<(String, String)>, headers: HeaderMap| {
                let recorded = recorded.clone();
                async move {
                    if !authorized(&headers) {
                        return (http::StatusCode::UNAUTHORIZED, Json(serde_json::json!({})));
                    }
                    recorded.requests.lock().unwrap().push((
                        "GET".into(),
                        range,
                        HashMap::new(),
                        serde_json::Value::Null,
                    ));
                    (
                        http::StatusCode::OK,
                        Json(serde_json::json!({
                            "range": "photo!A2",
                            "majorDimension": "ROWS",
                            "values": [["https://photos.example/album", 42]]
                        })),
                    )
                }
            }
        };
        let on_write = |method: &'static str| {
            let recorded = recorded.clone();
            move |Path((_, range)): Path<(String, String)>,
                  Query(query): Query<HashMap<String, String>>,
                  Json(body): Json<serde_json::Value>| {
                let recorded = recorded.clone();
                async move {
                    recorded
                        .requests
                        .lock()
                        .unwrap()
                        .push((method.into(), range, query, body));
                    Json(serde_json::json!({}))
                }
            }
        };

        let router = Router::new()
            .route(
                "/token",
                post(|| async {
                    Json(serde_json::json!({"access_token": "ya29.test-token", "expires_in": 3599}))
                }),
            )
            .route(
                "/v4/spreadsheets/{id}/values/{range}",
                get(on_get)
                    .put(on_write("PUT"))
                    .post(on_write("POST")),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn client(base: &str) -> GoogleSheetsClient {
        let http = reqwest::Client::new();
        let key = ServiceAccountKey {
            project_id: None,
            client_email: "rsvp@wedding-1234.iam.gserviceaccount.com".into(),
            private_key: PRIVATE_KEY.into(),
            token_uri: Some(format!("{base}/token")),
        };
        let auth = ServiceAccountAuth::new(key, http.clone()).unwrap();
        GoogleSheetsClient::new("sheet-1".into(), auth, http)
            .with_base_url(format!("{base}/v4/spreadsheets"))
    }

    #[tokio::test]
    async fn test_get_values_stringifies_cells() {
        let recorded = Arc::new(Recorded::default());
        let base = fake_google(recorded.clone()).await;
        let client = client(&base).await;

        let rows = client.get_values("photo!A2").await.unwrap();
        assert_eq!(rows, vec![vec!["https://photos.example/album", "42"]]);
        assert_eq!(recorded.requests.lock().unwrap()[0].1, "photo!A2");
    }

    #[tokio::test]
    async fn test_append_uses_insert_rows() {
        let recorded = Arc::new(Recorded::default());
        let base = fake_google(recorded.clone()).await;
        let client = client(&base).await;

        let rows = vec![vec!["Иванов Иван".to_string(), "89991234567".to_string()]];
        client.append_values("Гости!A1", &rows).await.unwrap();

        let requests = recorded.requests.lock().unwrap();
        let (method, range, query, body) = &requests[0];
        assert_eq!(method, "POST");
        assert_eq!(range, "Гости!A1:append");
        assert_eq!(query.get("valueInputOption").unwrap(), "USER_ENTERED");
        assert_eq!(query.get("insertDataOption").unwrap(), "INSERT_ROWS");
        assert_eq!(body["values"][0][0], "Иванов Иван");
        assert_eq!(body["majorDimension"], "ROWS");
    }

    #[tokio::test]
    async fn test_update_overwrites_range() {
        let recorded = Arc::new(Recorded::default());
        let base = fake_google(recorded.clone()).await;
        let client = client(&base).await;

        client
            .update_values("guests!A1:G1", &[vec!["ФИО".to_string()]])
            .await
            .unwrap();

        let requests = recorded.requests.lock().unwrap();
        let (method, range, query, _) = &requests[0];
        assert_eq!(method, "PUT");
        assert_eq!(range, "guests!A1:G1");
        assert!(!query.contains_key("insertDataOption"));
    }

    #[tokio::test]
    async fn test_api_error_keeps_status_and_body() {
        let recorded = Arc::new(Recorded::default());
        let base = fake_google(recorded).await;
        let client = client(&base)
            .await
            .with_base_url(format!("{base}/missing"));

        let err = client.get_values("photo!A2").await.unwrap_err();
        assert!(matches!(err, SheetsError::Api { status: 404, .. }));
    }
}
