//! Contact ingestion: parse a phone-oriented delimited text blob into
//! typed contacts plus a per-row error report.
//!
//! Row-level problems never abort the batch. Every error string carries
//! the 1-indexed row number against the non-empty line array (a skipped
//! header line still occupies row 1) so a caller can point back at the
//! uploaded file.

use serde::Serialize;

use crate::contact::Contact;
use crate::csv;
use crate::phone::normalize_phone;

/// Header keywords: if the first non-empty line contains any of these
/// (case-insensitively), it is treated as a header row and skipped.
const HEADER_KEYWORDS: &[&str] = &["phone", "name", "number"];

/// Outcome of parsing one uploaded file.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    /// Successfully parsed contacts, in file order.
    pub contacts: Vec<Contact>,
    /// Human-readable row errors (`Row N: ...`).
    pub errors: Vec<String>,
    /// Number of data rows considered (post-header).
    pub total_rows: usize,
    /// Number of rows that produced a contact.
    pub valid_rows: usize,
}

/// Parse a raw text blob into contacts.
///
/// The first field of each row is the phone candidate, the second
/// (optional) is the name. Empty names are treated as absent.
pub fn parse_contacts(input: &str) -> IngestReport {
    let lines: Vec<&str> = input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mut report = IngestReport {
        contacts: Vec::new(),
        errors: Vec::new(),
        total_rows: 0,
        valid_rows: 0,
    };

    let skip = usize::from(lines.first().is_some_and(|first| is_header(first)));

    for (index, line) in lines.iter().enumerate().skip(skip) {
        let row = index + 1;
        report.total_rows += 1;

        let fields = csv::split_line(line);
        let phone_raw = fields.first().map(String::as_str).unwrap_or("");

        if phone_raw.is_empty() {
            report.errors.push(format!("Row {row}: Missing phone number"));
            continue;
        }

        match normalize_phone(phone_raw) {
            Ok(phone) => {
                let name = fields
                    .get(1)
                    .filter(|name| !name.is_empty())
                    .map(String::clone);
                report.contacts.push(Contact { phone, name });
                report.valid_rows += 1;
            }
            Err(_) => {
                report
                    .errors
                    .push(format!("Row {row}: Invalid phone number \"{phone_raw}\""));
            }
        }
    }

    report
}

/// Header sniffing for the phone-oriented format.
fn is_header(line: &str) -> bool {
    let lower = line.to_lowercase();
    HEADER_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_file_with_header() {
        let input = "phone,name\n9876543210,Alice\n+91 98765-43211,\ninvalid,Bob\n";
        let report = parse_contacts(input);

        assert_eq!(report.total_rows, 3);
        assert_eq!(report.valid_rows, 2);
        assert_eq!(
            report.contacts,
            vec![
                Contact::new("+919876543210", Some("Alice".into())),
                Contact::new("+919876543211", None),
            ]
        );
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0], "Row 4: Invalid phone number \"invalid\"");
    }

    #[test]
    fn test_file_without_header() {
        let report = parse_contacts("9876543210,Alice\n9876543211,Bob");
        assert_eq!(report.total_rows, 2);
        assert_eq!(report.valid_rows, 2);
        assert_eq!(report.contacts[0].name.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_header_detection_is_case_insensitive() {
        let report = parse_contacts("PHONE NUMBER\n9876543210");
        assert_eq!(report.total_rows, 1);
        assert_eq!(report.valid_rows, 1);
    }

    #[test]
    fn test_missing_phone_reported_with_row_number() {
        let report = parse_contacts("phone,name\n,Bob");
        assert_eq!(report.errors, vec!["Row 2: Missing phone number"]);
        assert_eq!(report.total_rows, 1);
        assert_eq!(report.valid_rows, 0);
    }

    #[test]
    fn test_row_numbers_skip_blank_lines() {
        // Blank lines are dropped before numbering, so "invalid" sits at
        // row 2 of the non-empty line array.
        let report = parse_contacts("9876543210,Alice\n\n\ninvalid,Bob");
        assert_eq!(report.errors, vec!["Row 2: Invalid phone number \"invalid\""]);
    }

    #[test]
    fn test_quoted_name_with_comma() {
        let report = parse_contacts("9876543210,\"Shah, Alia\"");
        assert_eq!(report.contacts[0].name.as_deref(), Some("Shah, Alia"));
    }

    #[test]
    fn test_empty_name_is_none() {
        let report = parse_contacts("9876543210,");
        assert_eq!(report.contacts[0].name, None);
    }

    #[test]
    fn test_name_only_header_detected() {
        // A single-column header mentioning "name" is still a header.
        let report = parse_contacts("name\n9876543210");
        assert_eq!(report.total_rows, 1);
        assert_eq!(report.valid_rows, 1);
    }

    #[test]
    fn test_empty_input() {
        let report = parse_contacts("");
        assert_eq!(report.total_rows, 0);
        assert_eq!(report.valid_rows, 0);
        assert!(report.contacts.is_empty());
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_errors_never_abort_the_batch() {
        let report = parse_contacts("bad1\n9876543210\nbad2\n9876543211");
        assert_eq!(report.valid_rows, 2);
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.total_rows, 4);
    }
}
