//! Report delivery: CSV files and aligned text tables.

use std::fmt;
use std::path::Path;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::constants::output::{
    CSV_EXTENSION, CSV_FILE_PREFIX, FILENAME_TIMESTAMP_FORMAT, INVALID_FILENAME_CHARS,
    TABLE_COLUMN_GAP,
};
use crate::errors::ReportError;
use crate::pipeline::ReportTable;

/// How a finished report leaves the program.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputMode {
    /// Write a CSV file.
    Csv,
    /// Render an aligned table.
    Table,
    /// Render the table immediately, no prompting.
    Auto,
}

impl OutputMode {
    /// Parse a mode name; `None` for anything unrecognized.
    pub fn from_alias(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(OutputMode::Csv),
            "table" => Some(OutputMode::Table),
            "auto" => Some(OutputMode::Auto),
            _ => None,
        }
    }

    /// Canonical name.
    pub fn label(&self) -> &'static str {
        match self {
            OutputMode::Csv => "csv",
            OutputMode::Table => "table",
            OutputMode::Auto => "auto",
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Write headers plus rows to `path` as CSV.
pub fn write_csv(table: &ReportTable, path: &Path) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(ToString::to_string))?;
    }
    writer.flush()?;
    debug!(path = %path.display(), rows = table.rows.len(), "csv export written");
    Ok(())
}

/// Default export filename stamped with `now`.
pub fn default_csv_filename(now: NaiveDateTime) -> String {
    format!(
        "{CSV_FILE_PREFIX}{}.{CSV_EXTENSION}",
        now.format(FILENAME_TIMESTAMP_FORMAT)
    )
}

/// Turn a user-supplied name into a safe `.csv` filename.
///
/// Any `.csv` the user typed is dropped before sanitizing, characters that
/// break on common filesystems are stripped, and the suffix is re-added.
/// Returns `None` when nothing usable remains, in which case callers fall
/// back to [`default_csv_filename`].
pub fn sanitize_csv_filename(input: &str) -> Option<String> {
    let base = input.replace(".csv", "");
    let safe: String = base
        .trim()
        .chars()
        .filter(|c| !INVALID_FILENAME_CHARS.contains(*c))
        .collect();
    let safe = safe.trim();
    if safe.is_empty() {
        None
    } else {
        Some(format!("{safe}.{CSV_EXTENSION}"))
    }
}

/// Render the table as aligned text columns.
///
/// Column widths fit the widest cell, columns separate by a fixed gap, and a
/// dashed rule sits under the header row. Lines carry no trailing spaces.
pub fn render_table(table: &ReportTable) -> String {
    let rendered: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect();

    let mut widths: Vec<usize> = table.headers.iter().map(String::len).collect();
    for row in &rendered {
        for (idx, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(idx) {
                *width = (*width).max(cell.len());
            }
        }
    }

    let mut lines = Vec::with_capacity(rendered.len() + 2);
    lines.push(format_row(&table.headers, &widths));
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    lines.push(format_row(&rule, &widths));
    for row in &rendered {
        lines.push(format_row(row, &widths));
    }
    lines.join("\n")
}

fn format_row<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    let gap = " ".repeat(TABLE_COLUMN_GAP);
    let mut line = String::new();
    for (idx, cell) in cells.iter().enumerate() {
        if idx > 0 {
            line.push_str(&gap);
        }
        let cell = cell.as_ref();
        if idx + 1 == cells.len() {
            line.push_str(cell);
        } else {
            let width = widths.get(idx).copied().unwrap_or(cell.len());
            line.push_str(&format!("{cell:<width$}"));
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::Scalar;
    use chrono::NaiveDate;

    fn sample_table() -> ReportTable {
        ReportTable {
            headers: vec!["date".into(), "account".into(), "cost".into()],
            rows: vec![
                vec![
                    Scalar::Text("2025-03-01".into()),
                    Scalar::Text("Acme Search".into()),
                    Scalar::Decimal("12.35".parse().unwrap()),
                ],
                vec![
                    Scalar::Text("2025-03-02".into()),
                    Scalar::Text("Acme".into()),
                    Scalar::Decimal("7.00".parse().unwrap()),
                ],
            ],
        }
    }

    #[test]
    fn csv_round_trips_headers_and_scaled_cells() {
        let file = tempfile::NamedTempFile::new().unwrap();
        write_csv(&sample_table(), file.path()).unwrap();
        let written = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(
            written,
            "date,account,cost\n2025-03-01,Acme Search,12.35\n2025-03-02,Acme,7.00\n"
        );
    }

    #[test]
    fn default_filenames_stamp_the_clock() {
        let now = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(13, 5, 9)
            .unwrap();
        assert_eq!(
            default_csv_filename(now),
            "gads_report_2025-03-01_13-05-09.csv"
        );
    }

    #[test]
    fn filenames_sanitize_or_reject() {
        assert_eq!(
            sanitize_csv_filename("q1 <summary>").as_deref(),
            Some("q1 summary.csv")
        );
        assert_eq!(
            sanitize_csv_filename("march.csv").as_deref(),
            Some("march.csv")
        );
        assert_eq!(sanitize_csv_filename("  ").as_deref(), None);
        assert_eq!(sanitize_csv_filename("<>:*").as_deref(), None);
    }

    #[test]
    fn table_renders_aligned_columns() {
        let text = render_table(&sample_table());
        assert_eq!(
            text,
            "date        account      cost\n\
             ----------  -----------  -----\n\
             2025-03-01  Acme Search  12.35\n\
             2025-03-02  Acme         7.00"
        );
    }

    #[test]
    fn empty_tables_still_render_headers() {
        let table = ReportTable {
            headers: vec!["a".into(), "b".into()],
            rows: Vec::new(),
        };
        assert_eq!(render_table(&table), "a  b\n-  -");
    }

    #[test]
    fn output_modes_parse_case_insensitively() {
        assert_eq!(OutputMode::from_alias(" CSV "), Some(OutputMode::Csv));
        assert_eq!(OutputMode::from_alias("auto"), Some(OutputMode::Auto));
        assert_eq!(OutputMode::from_alias("pdf"), None);
    }
}
