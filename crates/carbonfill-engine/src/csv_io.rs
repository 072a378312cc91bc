//! CSV loading and writing for enrichment tables.

use std::path::Path;

use carbonfill_types::{Cell, Table};

/// Errors from reading or writing a table file.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// Malformed CSV or underlying reader/writer failure.
    #[error("csv error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// File-system failure outside the CSV layer (e.g. flushing).
    #[error("i/o error in {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl TableError {
    fn csv(path: &Path, source: csv::Error) -> Self {
        Self::Csv {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Convenience alias used by the table I/O helpers.
pub type Result<T> = std::result::Result<T, TableError>;

/// Read a headed CSV file. Missing tokens become [`Cell::Absent`].
///
/// Ragged rows are tolerated: short rows are padded, long rows truncated.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or is not valid CSV.
pub fn read_table(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| TableError::csv(path, e))?;

    let headers = reader
        .headers()
        .map_err(|e| TableError::csv(path, e))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    let mut table = Table::new(headers);

    for record in reader.records() {
        let record = record.map_err(|e| TableError::csv(path, e))?;
        table.push_row(record.iter().map(Cell::from_raw).collect());
    }

    tracing::debug!(
        path = %path.display(),
        rows = table.len(),
        columns = table.columns().len(),
        "Loaded input table"
    );
    Ok(table)
}

/// Write a table with a header row. Absent cells are written empty.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| TableError::csv(path, e))?;

    writer
        .write_record(table.columns())
        .map_err(|e| TableError::csv(path, e))?;
    for row in table.raw_rows() {
        writer
            .write_record(row.iter().map(Cell::render))
            .map_err(|e| TableError::csv(path, e))?;
    }
    writer.flush().map_err(|e| TableError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    tracing::debug!(path = %path.display(), rows = table.len(), "Wrote output table");
    Ok(())
}

/// Read only the header row of a CSV file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or has no readable header.
pub fn read_headers(path: &Path) -> Result<Vec<String>> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| TableError::csv(path, e))?;
    let headers = reader.headers().map_err(|e| TableError::csv(path, e))?;
    Ok(headers
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect())
}
