use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use super::{StorageError, SubscriberBackend};
use crate::domain::{Categories, Subscriber};

/// Column titles written to a sheet that has no header row yet.
const HEADER: [&str; 3] = ["name", "email", "categories"];

/// Sheet row of the subscriber at list position 0. Rows are 1-based and row 1
/// holds the header.
const HEADER_OFFSET: usize = 2;

/// Where the bearer token for the spreadsheet service comes from.
#[derive(Debug, Clone)]
pub enum SpreadsheetCredentials {
    Token(Secret<String>),
    File(PathBuf),
    Missing,
}

/// Keeps the subscribers in one sheet of a remote spreadsheet, speaking the
/// Sheets v4 values API.
#[derive(Debug)]
pub struct SpreadsheetBackend {
    http_client: Client,
    base_url: String,
    spreadsheet_id: String,
    sheet_name: String,
    sheet_id: u64,
    credentials: SpreadsheetCredentials,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRangeBody<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: Vec<Vec<String>>,
}

/// Zero-based positions of the subscriber fields, located by the header
/// titles. Other columns are left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    name: usize,
    email: usize,
    categories: usize,
    width: usize,
}

impl Columns {
    fn standard() -> Self {
        Self {
            name: 0,
            email: 1,
            categories: 2,
            width: HEADER.len(),
        }
    }

    fn from_header(header: &[String]) -> Result<Self, anyhow::Error> {
        let find = |title: &str| {
            header
                .iter()
                .position(|cell| cell.trim().eq_ignore_ascii_case(title))
                .with_context(|| {
                    format!(
                        "The subscriber sheet header {:?} has no {:?} column.",
                        header, title
                    )
                })
        };
        Ok(Self {
            name: find("name")?,
            email: find("email")?,
            categories: find("categories")?,
            width: header.len(),
        })
    }

    fn last_column(&self) -> String {
        column_letter(self.width - 1)
    }

    fn read(&self, row: &[String]) -> Subscriber {
        let cell = |index: usize| row.get(index).cloned().unwrap_or_default();
        Subscriber {
            name: cell(self.name),
            email: cell(self.email),
            categories: Categories::parse_joined(&cell(self.categories)),
        }
    }

    /// Lays the subscriber over `row`, keeping whatever the other columns hold.
    fn write(&self, subscriber: &Subscriber, mut row: Vec<String>) -> Vec<String> {
        row.resize(self.width, String::new());
        row[self.name] = subscriber.name.clone();
        row[self.email] = subscriber.email.clone();
        row[self.categories] = subscriber.categories.joined();
        row
    }
}

/// `0` is `A`, `25` is `Z`, `26` is `AA`.
fn column_letter(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let remainder = (n - 1) % 26;
        letters.push(char::from(b'A' + remainder as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// The header row, its column layout and the data rows below it.
struct SheetContents {
    header: Vec<String>,
    columns: Columns,
    rows: Vec<Vec<String>>,
}

/// `None` for a sheet without any rows, which has no header yet.
fn split_header(rows: Vec<Vec<String>>) -> Result<Option<SheetContents>, anyhow::Error> {
    let mut rows = rows.into_iter();
    let header = match rows.next() {
        Some(header) => header,
        None => return Ok(None),
    };
    let columns = Columns::from_header(&header)?;
    Ok(Some(SheetContents {
        header,
        columns,
        rows: rows.collect(),
    }))
}

/// Turns sheet rows (header first) into subscribers. An empty sheet has no
/// subscribers; a header without `name`, `email` and `categories` columns is
/// rejected rather than guessed at.
pub(crate) fn subscribers_from_rows(
    rows: Vec<Vec<String>>,
) -> Result<Vec<Subscriber>, anyhow::Error> {
    Ok(match split_header(rows)? {
        Some(sheet) => sheet
            .rows
            .iter()
            .map(|row| sheet.columns.read(row))
            .collect(),
        None => Vec::new(),
    })
}

impl SpreadsheetBackend {
    pub fn new(
        base_url: String,
        spreadsheet_id: String,
        sheet_name: String,
        sheet_id: u64,
        credentials: SpreadsheetCredentials,
        timeout: Duration,
    ) -> Result<Self, anyhow::Error> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build the spreadsheet HTTP client.")?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            spreadsheet_id,
            sheet_name,
            sheet_id,
            credentials,
        })
    }

    async fn access_token(&self) -> Result<String, anyhow::Error> {
        let token = match &self.credentials {
            SpreadsheetCredentials::Token(token) => token.expose_secret().trim().to_owned(),
            SpreadsheetCredentials::File(path) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| {
                    format!(
                        "Failed to read spreadsheet credentials from {}.",
                        path.display()
                    )
                })?
                .trim()
                .to_owned(),
            SpreadsheetCredentials::Missing => {
                anyhow::bail!("No credentials are configured for the spreadsheet service.")
            }
        };
        if token.is_empty() {
            anyhow::bail!("The spreadsheet service credentials are empty.");
        }
        Ok(token)
    }

    fn range(&self, cells: &str) -> String {
        format!("{}!{}", self.sheet_name, cells)
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.base_url,
            self.spreadsheet_id,
            urlencoding::encode(range)
        )
    }

    /// Every non-empty row of the sheet, header first.
    async fn read_rows(&self) -> Result<Vec<Vec<String>>, anyhow::Error> {
        let token = self.access_token().await?;
        let response = self
            .http_client
            .get(self.values_url(&self.sheet_name))
            .bearer_auth(token)
            .query(&[("majorDimension", "ROWS")])
            .send()
            .await
            .context("Failed to reach the spreadsheet service.")?
            .error_for_status()
            .context("The spreadsheet service refused to list the subscribers.")?;
        let body: ValueRange = response
            .json()
            .await
            .context("The spreadsheet service sent an unexpected response.")?;
        Ok(body.values)
    }

    async fn read_sheet(&self) -> Result<Option<SheetContents>, anyhow::Error> {
        split_header(self.read_rows().await?)
    }

    async fn write_rows(&self, range: &str, values: Vec<Vec<String>>) -> Result<(), anyhow::Error> {
        let token = self.access_token().await?;
        self.http_client
            .put(self.values_url(range))
            .bearer_auth(token)
            .query(&[("valueInputOption", "RAW")])
            .json(&ValueRangeBody {
                range,
                major_dimension: "ROWS",
                values,
            })
            .send()
            .await
            .context("Failed to reach the spreadsheet service.")?
            .error_for_status()
            .context("The spreadsheet service refused to update the subscribers.")?;
        Ok(())
    }

    async fn clear_rows(&self, range: &str) -> Result<(), anyhow::Error> {
        let token = self.access_token().await?;
        self.http_client
            .post(format!("{}:clear", self.values_url(range)))
            .bearer_auth(token)
            .send()
            .await
            .context("Failed to reach the spreadsheet service.")?
            .error_for_status()
            .context("The spreadsheet service refused to clear the subscriber sheet.")?;
        Ok(())
    }
}

#[async_trait]
impl SubscriberBackend for SpreadsheetBackend {
    #[tracing::instrument(name = "Read subscriber sheet", skip(self))]
    async fn list(&self) -> Result<Vec<Subscriber>, StorageError> {
        let rows = self.read_rows().await?;
        Ok(subscribers_from_rows(rows)?)
    }

    /// On a sheet without rows the header is written together with the first
    /// subscriber, so the new row never takes the header's place.
    #[tracing::instrument(name = "Append subscriber row", skip(self, subscriber))]
    async fn append(&self, subscriber: &Subscriber) -> Result<(), StorageError> {
        let sheet = match self.read_sheet().await? {
            Some(sheet) => sheet,
            None => {
                let columns = Columns::standard();
                let values = vec![
                    HEADER.iter().map(|title| title.to_string()).collect(),
                    columns.write(subscriber, Vec::new()),
                ];
                let range = self.range(&format!("A1:{}2", columns.last_column()));
                self.write_rows(&range, values).await?;
                return Ok(());
            }
        };

        let token = self.access_token().await?;
        let range = self.range(&format!("A1:{}", sheet.columns.last_column()));
        self.http_client
            .post(format!("{}:append", self.values_url(&range)))
            .bearer_auth(token)
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&ValueRangeBody {
                range: &range,
                major_dimension: "ROWS",
                values: vec![sheet.columns.write(subscriber, Vec::new())],
            })
            .send()
            .await
            .context("Failed to reach the spreadsheet service.")?
            .error_for_status()
            .context("The spreadsheet service refused to add the subscriber.")?;
        Ok(())
    }

    /// Writes the header and every subscriber in one request, then clears the
    /// rows left over below them. A failed write leaves the sheet untouched.
    #[tracing::instrument(name = "Rewrite subscriber sheet", skip(self, subscribers))]
    async fn replace_all(&self, subscribers: &[Subscriber]) -> Result<(), StorageError> {
        let (header, columns) = match self.read_sheet().await? {
            Some(sheet) => (sheet.header, sheet.columns),
            None => (
                HEADER.iter().map(|title| title.to_string()).collect(),
                Columns::standard(),
            ),
        };
        let last_column = columns.last_column();

        let mut values = vec![header];
        values.extend(subscribers.iter().map(|s| columns.write(s, Vec::new())));
        let written = values.len();
        let range = self.range(&format!("A1:{}{}", last_column, written));
        self.write_rows(&range, values).await?;

        let stale = self.range(&format!("A{}:{}", written + 1, last_column));
        self.clear_rows(&stale).await?;
        Ok(())
    }

    #[tracing::instrument(name = "Update subscriber row", skip(self, subscriber))]
    async fn replace_at(
        &self,
        position: usize,
        subscriber: &Subscriber,
    ) -> Result<(), StorageError> {
        let sheet = self
            .read_sheet()
            .await?
            .context("The subscriber sheet has no header row.")?;
        let current = sheet
            .rows
            .get(position)
            .cloned()
            .with_context(|| format!("No subscriber is stored at position {}.", position))?;
        let row = position + HEADER_OFFSET;
        let range = self.range(&format!(
            "A{row}:{last}{row}",
            row = row,
            last = sheet.columns.last_column()
        ));
        self.write_rows(&range, vec![sheet.columns.write(subscriber, current)])
            .await?;
        Ok(())
    }

    /// Deletes the matching rows in a single batch, bottom row first so the
    /// earlier indexes stay valid.
    #[tracing::instrument(name = "Delete subscriber rows", skip(self, predicate))]
    async fn remove_where(
        &self,
        predicate: &(dyn for<'s> Fn(&'s Subscriber) -> bool + Send + Sync),
    ) -> Result<usize, StorageError> {
        let subscribers = self.list().await?;
        let mut positions: Vec<usize> = subscribers
            .iter()
            .enumerate()
            .filter(|(_, s)| predicate(s))
            .map(|(position, _)| position)
            .collect();
        if positions.is_empty() {
            return Ok(0);
        }
        positions.reverse();
        let requests: Vec<_> = positions
            .iter()
            .map(|position| {
                // Zero-based, end-exclusive dimension range of the subscriber's row.
                let start = position + HEADER_OFFSET - 1;
                serde_json::json!({
                    "deleteDimension": {
                        "range": {
                            "sheetId": self.sheet_id,
                            "dimension": "ROWS",
                            "startIndex": start,
                            "endIndex": start + 1,
                        }
                    }
                })
            })
            .collect();

        let token = self.access_token().await?;
        self.http_client
            .post(format!(
                "{}/v4/spreadsheets/{}:batchUpdate",
                self.base_url, self.spreadsheet_id
            ))
            .bearer_auth(token)
            .json(&serde_json::json!({ "requests": requests }))
            .send()
            .await
            .context("Failed to reach the spreadsheet service.")?
            .error_for_status()
            .context("The spreadsheet service refused to delete the subscriber.")?;
        Ok(positions.len())
    }
}
