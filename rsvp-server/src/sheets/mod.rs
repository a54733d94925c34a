//! Spreadsheet-backed guest store
//!
//! Two layers:
//! - [`SheetValues`]: raw values get / update / append against one
//!   spreadsheet ([`GoogleSheetsClient`] talks to the Sheets REST API).
//! - [`GuestStore`]: what the submission pipeline needs, implemented by
//!   [`SheetStore`] on top of any [`SheetValues`].

mod auth;
mod client;

pub use auth::ServiceAccountAuth;
pub use client::GoogleSheetsClient;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::SheetsConfig;

/// One spreadsheet row, cells in column order
pub type Row = Vec<String>;

#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    #[error("spreadsheet store is not configured")]
    NotConfigured,

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sheets API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("invalid range URL: {0}")]
    InvalidUrl(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<jsonwebtoken::errors::Error> for SheetsError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        SheetsError::Auth(e.to_string())
    }
}

/// Values access to a single spreadsheet. Ranges are A1 notation.
#[async_trait]
pub trait SheetValues: Send + Sync {
    async fn get_values(&self, range: &str) -> Result<Vec<Row>, SheetsError>;

    /// Overwrite the cells of `range`
    async fn update_values(&self, range: &str, rows: &[Row]) -> Result<(), SheetsError>;

    /// Insert `rows` after the last row of the table found at `range`
    async fn append_values(&self, range: &str, rows: &[Row]) -> Result<(), SheetsError>;
}

/// Storage operations used by the RSVP pipeline
#[async_trait]
pub trait GuestStore: Send + Sync {
    /// Read one cell. Returns `""` when the store is unconfigured or the
    /// read fails.
    async fn get_single_cell(&self, sheet: &str, cell: &str) -> String;

    /// Append `rows` to `sheet` in one call, making sure the first row is
    /// `header` beforehand.
    async fn append_rows(&self, sheet: &str, header: &[&str], rows: Vec<Row>)
    -> Result<(), SheetsError>;
}

/// A1 range for `cells` on `sheet`, quoting the sheet name when needed
pub fn a1_range(sheet: &str, cells: &str) -> String {
    if sheet.chars().all(|c| c.is_alphanumeric() || c == '_') {
        format!("{sheet}!{cells}")
    } else {
        format!("'{}'!{cells}", sheet.replace('\'', "''"))
    }
}

/// Last column letter for a header of `width` columns (1 → A, 7 → G)
fn column_letter(width: usize) -> String {
    let mut n = width.max(1);
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// [`GuestStore`] over a spreadsheet. Without a backing [`SheetValues`]
/// reads come back empty and writes fail with [`SheetsError::NotConfigured`].
#[derive(Clone)]
pub struct SheetStore {
    values: Option<Arc<dyn SheetValues>>,
}

impl SheetStore {
    pub fn new(values: Arc<dyn SheetValues>) -> Self {
        Self {
            values: Some(values),
        }
    }

    pub fn unconfigured() -> Self {
        Self { values: None }
    }

    /// Build the production store. Missing or malformed credentials leave
    /// the store unconfigured.
    pub fn from_config(config: &SheetsConfig, http: reqwest::Client) -> Self {
        let (Some(sheet_id), Some(key)) = (&config.sheet_id, &config.credentials) else {
            tracing::warn!("Google Sheets is not configured, RSVPs cannot be saved");
            return Self::unconfigured();
        };

        match ServiceAccountAuth::new(key.clone(), http.clone()) {
            Ok(auth) => Self::new(Arc::new(GoogleSheetsClient::new(
                sheet_id.clone(),
                auth,
                http,
            ))),
            Err(e) => {
                tracing::error!(error = %e, "Invalid service account private key");
                Self::unconfigured()
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.values.is_some()
    }

    /// Rewrite the first row unless it already equals `header` exactly.
    /// Returns whether a write happened.
    async fn reconcile_header(
        values: &dyn SheetValues,
        sheet: &str,
        header: &[&str],
    ) -> Result<bool, SheetsError> {
        let range = a1_range(sheet, &format!("A1:{}1", column_letter(header.len())));
        let existing = values.get_values(&range).await?;

        let matches = existing.first().is_some_and(|row| {
            row.len() == header.len() && row.iter().zip(header).all(|(a, b)| a == b)
        });
        if matches {
            return Ok(false);
        }

        tracing::info!(sheet, "Writing header row");
        let row: Row = header.iter().map(|h| h.to_string()).collect();
        values.update_values(&range, &[row]).await?;
        Ok(true)
    }
}

#[async_trait]
impl GuestStore for SheetStore {
    async fn get_single_cell(&self, sheet: &str, cell: &str) -> String {
        let Some(values) = &self.values else {
            tracing::warn!(sheet, cell, "Sheets not configured, returning empty cell");
            return String::new();
        };

        match values.get_values(&a1_range(sheet, cell)).await {
            Ok(rows) => rows
                .into_iter()
                .next()
                .and_then(|row| row.into_iter().next())
                .unwrap_or_default(),
            Err(e) => {
                tracing::error!(sheet, cell, error = %e, "Failed to read cell");
                String::new()
            }
        }
    }

    async fn append_rows(
        &self,
        sheet: &str,
        header: &[&str],
        rows: Vec<Row>,
    ) -> Result<(), SheetsError> {
        let values = self.values.as_deref().ok_or(SheetsError::NotConfigured)?;

        // Not transactional; concurrent submissions may both rewrite the same header
        if let Err(e) = Self::reconcile_header(values, sheet, header).await {
            tracing::warn!(sheet, error = %e, "Header check failed, appending anyway");
        }

        if rows.is_empty() {
            tracing::debug!(sheet, "No rows to append");
            return Ok(());
        }

        values.append_values(&a1_range(sheet, "A1"), &rows).await?;
        tracing::info!(sheet, rows = rows.len(), "Rows appended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const HEADER: [&str; 3] = ["ФИО", "Номер телефона", "Присутствие"];

    #[derive(Default)]
    struct FakeSheet {
        rows: Mutex<Vec<Row>>,
        updates: AtomicUsize,
        appends: AtomicUsize,
        fail_reads: bool,
        fail_appends: bool,
        last_range: Mutex<Option<String>>,
    }

    impl FakeSheet {
        fn with_rows(rows: Vec<Row>) -> Self {
            Self {
                rows: Mutex::new(rows),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl SheetValues for FakeSheet {
        async fn get_values(&self, range: &str) -> Result<Vec<Row>, SheetsError> {
            *self.last_range.lock().unwrap() = Some(range.to_string());
            if self.fail_reads {
                return Err(SheetsError::Api {
                    status: 500,
                    body: "backend error".into(),
                });
            }
            Ok(self.rows.lock().unwrap().iter().take(1).cloned().collect())
        }

        async fn update_values(&self, _range: &str, rows: &[Row]) -> Result<(), SheetsError> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            let mut sheet = self.rows.lock().unwrap();
            match sheet.first_mut() {
                Some(first) => *first = rows[0].clone(),
                None => sheet.push(rows[0].clone()),
            }
            Ok(())
        }

        async fn append_values(&self, _range: &str, rows: &[Row]) -> Result<(), SheetsError> {
            self.appends.fetch_add(1, Ordering::SeqCst);
            if self.fail_appends {
                return Err(SheetsError::Api {
                    status: 403,
                    body: "forbidden".into(),
                });
            }
            self.rows.lock().unwrap().extend_from_slice(rows);
            Ok(())
        }
    }

    fn header_row() -> Row {
        HEADER.iter().map(|s| s.to_string()).collect()
    }

    fn guest_row(name: &str) -> Row {
        vec![name.into(), "89991234567".into(), "да".into()]
    }

    #[tokio::test]
    async fn test_missing_header_is_written_first() {
        let sheet = Arc::new(FakeSheet::default());
        let store = SheetStore::new(sheet.clone());

        store
            .append_rows("guests", &HEADER, vec![guest_row("Иванов Иван")])
            .await
            .unwrap();

        assert_eq!(sheet.updates.load(Ordering::SeqCst), 1);
        assert_eq!(sheet.appends.load(Ordering::SeqCst), 1);
        let rows = sheet.rows.lock().unwrap();
        assert_eq!(rows[0], header_row());
        assert_eq!(rows[1][0], "Иванов Иван");
    }

    #[tokio::test]
    async fn test_matching_header_is_left_alone() {
        let sheet = Arc::new(FakeSheet::with_rows(vec![header_row()]));
        let store = SheetStore::new(sheet.clone());

        store
            .append_rows("guests", &HEADER, vec![guest_row("Петрова Анна")])
            .await
            .unwrap();

        assert_eq!(sheet.updates.load(Ordering::SeqCst), 0);
        assert_eq!(sheet.appends.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_header_is_rewritten() {
        let mut stale = header_row();
        stale[2] = "Attendance".into();
        let sheet = Arc::new(FakeSheet::with_rows(vec![stale]));
        let store = SheetStore::new(sheet.clone());

        store.append_rows("guests", &HEADER, vec![]).await.unwrap();

        assert_eq!(sheet.updates.load(Ordering::SeqCst), 1);
        assert_eq!(sheet.rows.lock().unwrap()[0], header_row());
        assert_eq!(sheet.appends.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_header_failure_does_not_block_append() {
        let sheet = Arc::new(FakeSheet {
            fail_reads: true,
            ..Default::default()
        });
        let store = SheetStore::new(sheet.clone());

        store
            .append_rows("guests", &HEADER, vec![guest_row("Иванов Иван")])
            .await
            .unwrap();
        assert_eq!(sheet.appends.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_append_failure_propagates() {
        let sheet = Arc::new(FakeSheet {
            fail_appends: true,
            ..Default::default()
        });
        let store = SheetStore::new(sheet);

        let err = store
            .append_rows("guests", &HEADER, vec![guest_row("Иванов Иван")])
            .await
            .unwrap_err();
        assert!(matches!(err, SheetsError::Api { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_unconfigured_store() {
        let store = SheetStore::unconfigured();
        assert!(!store.is_configured());
        assert_eq!(store.get_single_cell("photo", "A2").await, "");

        let err = store
            .append_rows("guests", &HEADER, vec![guest_row("Иванов Иван")])
            .await
            .unwrap_err();
        assert!(matches!(err, SheetsError::NotConfigured));
    }

    #[tokio::test]
    async fn test_get_single_cell() {
        let sheet = Arc::new(FakeSheet::with_rows(vec![vec![
            "https://photos.example/album".into(),
        ]]));
        let store = SheetStore::new(sheet.clone());

        assert_eq!(
            store.get_single_cell("photo", "A2").await,
            "https://photos.example/album"
        );
        assert_eq!(sheet.last_range.lock().unwrap().as_deref(), Some("photo!A2"));

        let failing = SheetStore::new(Arc::new(FakeSheet {
            fail_reads: true,
            ..Default::default()
        }));
        assert_eq!(failing.get_single_cell("photo", "A2").await, "");
    }

    #[test]
    fn test_a1_range() {
        assert_eq!(a1_range("guests", "A1:G1"), "guests!A1:G1");
        assert_eq!(a1_range("Гости", "A1"), "Гости!A1");
        assert_eq!(a1_range("Guest list", "A1"), "'Guest list'!A1");
        assert_eq!(a1_range("Ann's", "A2"), "'Ann''s'!A2");
    }

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(1), "A");
        assert_eq!(column_letter(7), "G");
        assert_eq!(column_letter(26), "Z");
        assert_eq!(column_letter(27), "AA");
    }
}
