//! Universal row parser: arbitrary-column delimited text keyed by its
//! header row, plus the matching CSV serializer.
//!
//! Unlike the contact ingestor there is no header sniffing (the first
//! non-empty line is always the header) and no per-row error recovery:
//! a file without usable headers fails as a whole. Rows whose values
//! are all empty are silently dropped rather than reported.

use std::collections::HashMap;

use serde::Serialize;

use crate::csv;

/// Structural problems that abort the whole parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TabularError {
    /// No non-empty line to use as a header row.
    #[error("input contains no data")]
    Empty,
    /// The header row produced no usable column names.
    #[error("header row has no usable column names")]
    NoHeaders,
}

/// One parsed row: header name to trimmed value, `None` for empty cells
/// and for cells past the end of a short row.
pub type Row = HashMap<String, Option<String>>;

/// A parsed document. The header list carries column order explicitly;
/// the per-row maps are unordered on purpose.
#[derive(Debug, Clone, Serialize)]
pub struct Table {
    /// Column names in original file order, empties removed.
    pub headers: Vec<String>,
    /// Retained rows (at least one non-empty value each).
    pub rows: Vec<Row>,
    /// Number of data rows attempted, including dropped all-empty rows.
    pub total_rows: usize,
}

/// Parse a raw text blob into a [`Table`].
pub fn parse_table(input: &str) -> Result<Table, TabularError> {
    let lines: Vec<&str> = input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let Some((header_line, data_lines)) = lines.split_first() else {
        return Err(TabularError::Empty);
    };

    let headers: Vec<String> = csv::split_line(header_line)
        .into_iter()
        .filter(|header| !header.is_empty())
        .collect();
    if headers.is_empty() {
        return Err(TabularError::NoHeaders);
    }

    let mut rows = Vec::new();
    let mut total_rows = 0;

    for line in data_lines {
        total_rows += 1;

        let fields = csv::split_line(line);
        let mut row = Row::with_capacity(headers.len());
        let mut any_value = false;

        for (position, header) in headers.iter().enumerate() {
            let value = fields
                .get(position)
                .filter(|field| !field.is_empty())
                .cloned();
            any_value |= value.is_some();
            row.insert(header.clone(), value);
        }

        if any_value {
            rows.push(row);
        }
    }

    Ok(Table {
        headers,
        rows,
        total_rows,
    })
}

/// Serialize rows back to CSV in the given header order.
///
/// Every field is quoted (embedded quotes doubled) so the output parses
/// back identically regardless of commas or quotes in the data. Cells
/// missing from a row serialize as empty.
pub fn rows_to_csv(headers: &[String], rows: &[Row]) -> String {
    let mut out: String = headers
        .iter()
        .map(|header| csv::quote_field(header))
        .collect::<Vec<_>>()
        .join(",");

    for row in rows {
        out.push('\n');
        let line: String = headers
            .iter()
            .map(|header| {
                let value = row.get(header).and_then(|v| v.as_deref()).unwrap_or("");
                csv::quote_field(value)
            })
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&line);
    }

    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Table {
        parse_table(input).expect("parse should succeed")
    }

    #[test]
    fn test_basic_document() {
        let table = parse("a,b\n1,2\n3,4");
        assert_eq!(table.headers, vec!["a", "b"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0]["a"].as_deref(), Some("1"));
        assert_eq!(table.rows[1]["b"].as_deref(), Some("4"));
    }

    #[test]
    fn test_all_empty_row_dropped_but_counted() {
        let table = parse("a,b\n1,2\n,\n3,4");
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.total_rows, 3);
        assert_eq!(table.rows[0]["a"].as_deref(), Some("1"));
        assert_eq!(table.rows[1]["a"].as_deref(), Some("3"));
    }

    #[test]
    fn test_first_line_is_always_header() {
        // No sniffing: even a numeric-looking first line is the header.
        let table = parse("1,2\n3,4");
        assert_eq!(table.headers, vec!["1", "2"]);
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_short_row_padded_with_none() {
        let table = parse("a,b,c\nx");
        assert_eq!(table.rows[0]["a"].as_deref(), Some("x"));
        assert_eq!(table.rows[0]["b"], None);
        assert_eq!(table.rows[0]["c"], None);
    }

    #[test]
    fn test_empty_cell_is_none() {
        let table = parse("a,b\nx,");
        assert_eq!(table.rows[0]["b"], None);
    }

    #[test]
    fn test_empty_headers_discarded() {
        let table = parse("a,,b\n1,skipped,2");
        assert_eq!(table.headers, vec!["a", "b"]);
        // Positional zip runs against the surviving header list.
        assert_eq!(table.rows[0]["a"].as_deref(), Some("1"));
        assert_eq!(table.rows[0]["b"].as_deref(), Some("skipped"));
    }

    #[test]
    fn test_empty_input_is_structural_error() {
        assert_eq!(parse_table("").unwrap_err(), TabularError::Empty);
        assert_eq!(parse_table("\n  \n").unwrap_err(), TabularError::Empty);
    }

    #[test]
    fn test_blank_header_row_is_structural_error() {
        assert_eq!(parse_table(",,\n1,2,3").unwrap_err(), TabularError::NoHeaders);
    }

    #[test]
    fn test_quoted_values() {
        let table = parse("name,notes\n\"Shah, Alia\",\"said \"\"hi\"\"\"");
        assert_eq!(table.rows[0]["name"].as_deref(), Some("Shah, Alia"));
        assert_eq!(table.rows[0]["notes"].as_deref(), Some("said \"hi\""));
    }

    #[test]
    fn test_round_trip_preserves_headers_and_rows() {
        let table = parse("a,b\n\"1,5\",2\n\"say \"\"hi\"\"\",\n,\n3,4");
        let csv = rows_to_csv(&table.headers, &table.rows);
        let reparsed = parse(&csv);

        assert_eq!(reparsed.headers, table.headers);
        assert_eq!(reparsed.rows, table.rows);
    }

    #[test]
    fn test_rows_to_csv_quotes_everything() {
        let table = parse("a,b\n1,2");
        let csv = rows_to_csv(&table.headers, &table.rows);
        assert_eq!(csv, "\"a\",\"b\"\n\"1\",\"2\"");
    }
}
