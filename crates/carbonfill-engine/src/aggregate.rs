//! Paginated aggregation over the emission-factor search.
//!
//! Pages are fetched strictly in order. The page count is taken from the
//! first page and never re-read, and a failed page aborts the whole run:
//! a partial export would silently drop factors.

use std::collections::{HashMap, HashSet};

use carbonfill_types::{Cell, FailureMarker, Outcome, Table};
use serde_json::{Map, Value};

use crate::config::types::ExtractSettings;
use crate::dispatch::Dispatcher;
use crate::request::build_search_query;

/// One page of search results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub page: u32,
    pub last_page: u32,
    pub records: Vec<Map<String, Value>>,
}

impl Page {
    /// Parse a search response body.
    ///
    /// # Errors
    ///
    /// Returns [`AggregateError::Shape`] if `last_page` or `results` is
    /// missing or mistyped.
    pub fn from_body(page: u32, body: &Value) -> Result<Self, AggregateError> {
        let shape = |reason: &str| AggregateError::Shape {
            page,
            reason: reason.to_string(),
        };
        let last_page = body
            .get("last_page")
            .and_then(Value::as_u64)
            .ok_or_else(|| shape("missing or invalid last_page"))?;
        let last_page = u32::try_from(last_page).map_err(|_| shape("last_page out of range"))?;
        let results = body
            .get("results")
            .and_then(Value::as_array)
            .ok_or_else(|| shape("missing results array"))?;
        let records = results
            .iter()
            .map(|r| r.as_object().cloned().ok_or_else(|| shape("result is not an object")))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            page,
            last_page,
            records,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    /// The page request itself failed.
    #[error("search page {page} failed ({marker}): {detail}")]
    Fetch {
        page: u32,
        marker: FailureMarker,
        detail: String,
    },

    /// The page was fetched but could not be read.
    #[error("search page {page} has an unexpected shape: {reason}")]
    Shape { page: u32, reason: String },
}

/// Source of search pages, 1-based.
#[allow(async_fn_in_trait)]
pub trait PageFetcher {
    async fn fetch(&self, page: u32) -> Outcome;
}

/// Fetches pages from the search endpoint, pacing after each request.
pub struct SearchFetcher<'a> {
    dispatcher: &'a Dispatcher,
    settings: &'a ExtractSettings,
}

impl<'a> SearchFetcher<'a> {
    #[must_use]
    pub fn new(dispatcher: &'a Dispatcher, settings: &'a ExtractSettings) -> Self {
        Self {
            dispatcher,
            settings,
        }
    }
}

impl PageFetcher for SearchFetcher<'_> {
    async fn fetch(&self, page: u32) -> Outcome {
        let query = build_search_query(self.settings, page);
        let outcome = self.dispatcher.get_query(&query).await;
        self.dispatcher.pace().await;
        outcome
    }
}

/// Every record of every page, in page order.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub records: Vec<Map<String, Value>>,
    pub pages_fetched: u32,
}

/// Fetch pages `1..=last_page` and concatenate their records. `page_limit`
/// caps the number of pages fetched.
///
/// # Errors
///
/// Returns the first page failure; no further pages are fetched after it.
pub async fn aggregate_pages<F: PageFetcher>(
    fetcher: &F,
    page_limit: Option<u32>,
) -> Result<Aggregation, AggregateError> {
    let mut current_page = 1u32;
    let mut total_pages: Option<u32> = None;
    let mut records = Vec::new();

    while total_pages.map_or(true, |total| current_page <= total) {
        let body = match fetcher.fetch(current_page).await {
            Outcome::Success { body } => body,
            failure => {
                return Err(AggregateError::Fetch {
                    page: current_page,
                    marker: failure.failure_marker().unwrap_or(FailureMarker::Error),
                    detail: failure.detail(),
                });
            }
        };
        let page = Page::from_body(current_page, &body)?;
        let total = *total_pages.get_or_insert_with(|| match page_limit {
            Some(limit) => page.last_page.min(limit),
            None => page.last_page,
        });
        tracing::info!(
            page = current_page,
            total_pages = total,
            records = page.records.len(),
            "Fetched search page"
        );
        records.extend(page.records);
        current_page += 1;
    }

    Ok(Aggregation {
        records,
        pages_fetched: current_page - 1,
    })
}

/// Flatten records into a table. Columns are the union of record keys in
/// first-seen order; nested values are kept as compact JSON.
#[must_use]
pub fn records_to_table(records: &[Map<String, Value>]) -> Table {
    let mut columns: Vec<String> = Vec::new();
    let mut seen = HashSet::new();
    for record in records {
        for key in record.keys() {
            if seen.insert(key.as_str()) {
                columns.push(key.clone());
            }
        }
    }

    let mut table = Table::new(columns.clone());
    for record in records {
        table.push_row(
            columns
                .iter()
                .map(|c| record.get(c).map_or(Cell::Absent, Cell::from_json))
                .collect(),
        );
    }
    table
}

/// Group a record table by `key`, joining each `fold` column's values with
/// `delimiter`.
///
/// Exact duplicates over `key` and `fold` are dropped first. Every remaining
/// row then contributes one value per fold column, in row order, so the i-th
/// entries of the folded columns come from the same record. Groups are
/// sorted by key.
#[must_use]
pub fn group_records(table: &Table, key: &[String], fold: &[String], delimiter: &str) -> Table {
    struct Group {
        key: Vec<String>,
        folded: Vec<Vec<String>>,
    }

    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<Vec<String>, usize> = HashMap::new();
    let mut distinct: HashSet<Vec<String>> = HashSet::new();

    let read = |row: &carbonfill_types::RowRef<'_>, column: &String| {
        row.get(column).map(Cell::render).unwrap_or_default()
    };

    for row in table.iter_rows() {
        let key_values: Vec<String> = key.iter().map(|c| read(&row, c)).collect();
        let fold_values: Vec<String> = fold.iter().map(|c| read(&row, c)).collect();

        let mut combined = key_values.clone();
        combined.extend(fold_values.iter().cloned());
        if !distinct.insert(combined) {
            continue;
        }

        let slot = *index.entry(key_values.clone()).or_insert_with(|| {
            groups.push(Group {
                key: key_values,
                folded: vec![Vec::new(); fold.len()],
            });
            groups.len() - 1
        });
        let group = &mut groups[slot];
        for (values, value) in group.folded.iter_mut().zip(fold_values) {
            values.push(value);
        }
    }
    groups.sort_by(|a, b| a.key.cmp(&b.key));

    let mut columns = key.to_vec();
    columns.extend(fold.iter().cloned());
    let mut grouped = Table::new(columns);
    for group in groups {
        let mut cells: Vec<Cell> = group.key.into_iter().map(Cell::from_text).collect();
        cells.extend(
            group
                .folded
                .into_iter()
                .map(|values| Cell::from_text(values.join(delimiter))),
        );
        grouped.push_row(cells);
    }
    grouped
}
