//! Reads the list of site URLs from a spreadsheet or CSV file.
//!
//! The first row is the header. The URL column is the first header whose
//! trimmed, lower-cased text appears in [`URL_COLUMN_NAMES`]. Empty cells and
//! values that do not start with `http` are dropped.
use std::path::Path;
use thiserror::Error;

/// Accepted names of the URL column (compared trimmed and lower-cased).
pub const URL_COLUMN_NAMES: &[&str] = &[
    "інтернет-адреса",
    "internet-address",
    "url",
    "адреса",
    "link",
];

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Invalid CSV input: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "xlsx")]
    #[error("Failed to read spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Spreadsheet contains no worksheets")]
    NoWorksheet,

    #[error("No URL column found; rename the column to one of: {}", URL_COLUMN_NAMES.join(", "))]
    MissingColumn,

    /// The binary was built without the `xlsx` feature.
    #[error("Spreadsheet input requires the `xlsx` feature; rebuild with it or convert the file to CSV")]
    SpreadsheetSupportMissing,
}

/// A header row plus data rows, every cell rendered as text.
#[derive(Debug, Default)]
struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Reads site URLs from `path`, keeping file order.
///
/// Files ending in `.csv` are parsed as CSV; anything else is opened as a
/// spreadsheet (first worksheet).
///
/// # Errors
///
/// Returns [`InputError::MissingColumn`] if no header matches
/// [`URL_COLUMN_NAMES`], [`InputError::SpreadsheetSupportMissing`] for a
/// spreadsheet when the `xlsx` feature is disabled, and I/O or format errors
/// from the underlying readers.
pub fn read_site_urls(path: &Path) -> Result<Vec<String>, InputError> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    let table = if is_csv {
        read_csv(path)?
    } else {
        read_spreadsheet(path)?
    };

    let urls = extract_site_urls(&table)?;
    tracing::info!(
        path = %path.display(),
        rows = table.rows.len(),
        urls = urls.len(),
        "Read site URLs"
    );
    Ok(urls)
}

fn extract_site_urls(table: &Table) -> Result<Vec<String>, InputError> {
    let column = find_url_column(&table.header).ok_or(InputError::MissingColumn)?;

    Ok(table
        .rows
        .iter()
        .filter_map(|row| row.get(column))
        .map(|cell| cell.trim())
        .filter(|value| value.starts_with("http"))
        .map(str::to_owned)
        .collect())
}

fn find_url_column(header: &[String]) -> Option<usize> {
    header.iter().position(|name| {
        let name = name.trim_start_matches('\u{feff}').trim().to_lowercase();
        URL_COLUMN_NAMES.contains(&name.as_str())
    })
}

fn read_csv(path: &Path) -> Result<Table, InputError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

    let header: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();
    let rows = reader
        .records()
        .map(|record| record.map(|r| r.iter().map(str::to_owned).collect()))
        .collect::<Result<Vec<Vec<String>>, csv::Error>>()?;

    Ok(Table { header, rows })
}

#[cfg(feature = "xlsx")]
fn read_spreadsheet(path: &Path) -> Result<Table, InputError> {
    use calamine::{open_workbook_auto, Data, Reader};

    fn cell_text(cell: &Data) -> String {
        match cell {
            Data::Empty => String::new(),
            Data::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(InputError::NoWorksheet)??;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect::<Vec<String>>());

    let Some(header) = rows.next() else {
        return Ok(Table::default());
    };

    Ok(Table {
        header,
        rows: rows.collect(),
    })
}

#[cfg(not(feature = "xlsx"))]
fn read_spreadsheet(_path: &Path) -> Result<Table, InputError> {
    Err(InputError::SpreadsheetSupportMissing)
}
