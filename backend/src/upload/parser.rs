// src/upload/parser.rs
//
// Turns uploaded bytes into `ContactRecord`s.
//
// CSV handling is deliberately naive: lines are split on '\n' and fields on
// ','. Quoted fields containing commas are NOT supported; that matches what
// existing uploaders already produce and what the dashboard documents.
//
// Spreadsheets (.xlsx / .xls) are read with calamine; only the first sheet is
// considered and header names must match exactly.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use thiserror::Error;

use crate::upload::models::ContactRecord;

pub const FIRST_NAME_HEADER: &str = "FirstName";
pub const PHONE_HEADER: &str = "Phone";
pub const NOTES_HEADER: &str = "Notes";

/// Extensions accepted by `POST /upload`, lowercase and without the dot.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["csv", "xlsx", "xls"];

const UTF8_BOM: char = '\u{feff}';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("insufficient rows: CSV file must have at least a header and one data row")]
    InsufficientRows,

    #[error(
        "missing required headers ({}): file must contain FirstName and Phone columns (Notes optional)",
        .missing.join(", ")
    )]
    MissingHeaders { missing: Vec<&'static str> },

    #[error("unreadable spreadsheet: {0}")]
    UnreadableSpreadsheet(String),
}

/// How the uploaded bytes should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Spreadsheet,
}

impl FileFormat {
    /// Pick a format from the file extension (case-insensitive).
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, ext) = file_name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(FileFormat::Csv),
            "xlsx" | "xls" => Some(FileFormat::Spreadsheet),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Spreadsheet => "spreadsheet",
        }
    }
}

/// Parse `bytes` according to `format`.
pub fn parse_contacts(bytes: &[u8], format: FileFormat) -> Result<Vec<ContactRecord>, ParseError> {
    match format {
        FileFormat::Csv => parse_csv(bytes),
        FileFormat::Spreadsheet => parse_spreadsheet(bytes),
    }
}

pub fn parse_csv(bytes: &[u8]) -> Result<Vec<ContactRecord>, ParseError> {
    let decoded = String::from_utf8_lossy(bytes);
    let text: &str = decoded.strip_prefix(UTF8_BOM).unwrap_or(&decoded);

    let lines: Vec<&str> = text.split('\n').collect();
    if lines.len() < 2 {
        return Err(ParseError::InsufficientRows);
    }

    let headers: Vec<String> = lines[0].split(',').map(clean_field).collect();
    let column = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

    let first_name_col = column(FIRST_NAME_HEADER);
    let phone_col = column(PHONE_HEADER);
    let notes_col = column(NOTES_HEADER);

    let (first_name_col, phone_col) = match (first_name_col, phone_col) {
        (Some(f), Some(p)) => (f, p),
        (f, p) => {
            let mut missing = Vec::new();
            if f.is_none() {
                missing.push(FIRST_NAME_HEADER);
            }
            if p.is_none() {
                missing.push(PHONE_HEADER);
            }
            return Err(ParseError::MissingHeaders { missing });
        }
    };

    let records = lines[1..]
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let values: Vec<String> = line.split(',').map(clean_field).collect();
            let field = |col: usize| values.get(col).map(String::as_str).unwrap_or("");

            let notes = notes_col.map(field).unwrap_or("");
            ContactRecord::from_fields(field(first_name_col), field(phone_col), notes)
        })
        .collect();

    Ok(records)
}

pub fn parse_spreadsheet(bytes: &[u8]) -> Result<Vec<ContactRecord>, ParseError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| ParseError::UnreadableSpreadsheet(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ParseError::UnreadableSpreadsheet("workbook has no sheets".to_string()))?
        .map_err(|e| ParseError::UnreadableSpreadsheet(e.to_string()))?;

    Ok(records_from_range(&range))
}

/// Extract records from a worksheet whose first row holds the headers.
pub fn records_from_range(range: &Range<Data>) -> Vec<ContactRecord> {
    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(row) => row.iter().map(|cell| cell.to_string()).collect(),
        None => return Vec::new(),
    };
    let column = |name: &str| headers.iter().position(|h| h == name);

    let first_name_col = column(FIRST_NAME_HEADER);
    let phone_col = column(PHONE_HEADER);
    let notes_col = column(NOTES_HEADER);

    rows.filter_map(|row| {
        let cell = |col: Option<usize>| {
            col.and_then(|c| row.get(c))
                .map(|value| value.to_string())
                .unwrap_or_default()
        };
        ContactRecord::from_fields(&cell(first_name_col), &cell(phone_col), &cell(notes_col))
    })
    .collect()
}

fn clean_field(raw: &str) -> String {
    raw.trim().trim_matches('"').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(first_name: &str, phone: &str, notes: &str) -> ContactRecord {
        ContactRecord {
            first_name: first_name.to_string(),
            phone: phone.to_string(),
            notes: notes.to_string(),
        }
    }

    #[test]
    fn detects_format_from_extension() {
        assert_eq!(FileFormat::from_file_name("leads.csv"), Some(FileFormat::Csv));
        assert_eq!(FileFormat::from_file_name("LEADS.CSV"), Some(FileFormat::Csv));
        assert_eq!(FileFormat::from_file_name("q3.xlsx"), Some(FileFormat::Spreadsheet));
        assert_eq!(FileFormat::from_file_name("old.report.xls"), Some(FileFormat::Spreadsheet));
        assert_eq!(FileFormat::from_file_name("notes.txt"), None);
        assert_eq!(FileFormat::from_file_name("csv"), None);
    }

    #[test]
    fn parses_reference_csv() {
        let input = b"FirstName,Phone,Notes\nAlice,555-0001,\nBob,555-0002,vip\nCara,555-0003,";
        let records = parse_csv(input).unwrap();
        assert_eq!(
            records,
            vec![
                record("Alice", "555-0001", ""),
                record("Bob", "555-0002", "vip"),
                record("Cara", "555-0003", ""),
            ]
        );
    }

    #[test]
    fn headers_match_case_insensitively() {
        for header in ["firstname,phone", "FIRSTNAME,PHONE", "FirstName,Phone"] {
            let input = format!("{header}\nDana,555-0100\n");
            let records = parse_csv(input.as_bytes()).unwrap();
            assert_eq!(records, vec![record("Dana", "555-0100", "")], "header {header}");
        }
    }

    #[test]
    fn strips_quotes_whitespace_and_crlf() {
        let input = b"\"FirstName\" , \"Phone\",\"Notes\"\r\n\"Eve\", \"555-0200\" ,\" call after 5 \"\r\n";
        let records = parse_csv(input).unwrap();
        assert_eq!(records, vec![record("Eve", "555-0200", "call after 5")]);
    }

    #[test]
    fn ignores_leading_bom() {
        let input = "\u{feff}FirstName,Phone\nFay,555-0300\n";
        let records = parse_csv(input.as_bytes()).unwrap();
        assert_eq!(records, vec![record("Fay", "555-0300", "")]);
    }

    #[test]
    fn drops_rows_missing_required_values() {
        let input = b"FirstName,Phone,Notes\n,555-0001,no name\nGus,,no phone\n   ,  ,\nHal,555-0004,ok\n\n";
        let records = parse_csv(input).unwrap();
        assert_eq!(records, vec![record("Hal", "555-0004", "ok")]);
    }

    #[test]
    fn short_rows_fill_missing_fields_with_empty() {
        let input = b"Notes,FirstName,Phone\nfirst,Ivy\nsecond,Jo,555-0005\n";
        let records = parse_csv(input).unwrap();
        assert_eq!(records, vec![record("Jo", "555-0005", "second")]);
    }

    #[test]
    fn missing_phone_column_names_the_column_set() {
        let err = parse_csv(b"FirstName,Notes\nAlice,hi\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingHeaders {
                missing: vec![PHONE_HEADER]
            }
        );
        let message = err.to_string();
        assert!(message.contains("FirstName"));
        assert!(message.contains("Phone"));
    }

    #[test]
    fn single_line_is_insufficient() {
        assert_eq!(parse_csv(b"FirstName,Phone").unwrap_err(), ParseError::InsufficientRows);
        assert_eq!(parse_csv(b"").unwrap_err(), ParseError::InsufficientRows);
    }

    #[test]
    fn header_only_yields_no_records() {
        let records = parse_csv(b"FirstName,Phone,Notes\n").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn parsing_is_idempotent() {
        let input = b"FirstName,Phone\nKim,1\nLee,2\n";
        assert_eq!(parse_csv(input).unwrap(), parse_csv(input).unwrap());
    }

    #[test]
    fn garbage_spreadsheet_is_unreadable() {
        let err = parse_spreadsheet(b"definitely not a workbook").unwrap_err();
        assert!(matches!(err, ParseError::UnreadableSpreadsheet(_)));
    }

    #[test]
    fn workbook_bytes_yield_first_sheet_records() {
        let bytes = include_bytes!("../../tests/fixtures/leads.xlsx");
        let records = parse_spreadsheet(bytes).unwrap();
        assert_eq!(
            records,
            vec![
                record("Alice", "555-0001", ""),
                record("Bob", "555-0002", "vip"),
                record("Cara", "5550003", ""),
            ]
        );
    }

    fn sheet(rows: &[&[Data]]) -> Range<Data> {
        let height = rows.len() as u32;
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0) as u32;
        let mut range = Range::new((0, 0), (height - 1, width - 1));
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                range.set_value((r as u32, c as u32), value.clone());
            }
        }
        range
    }

    fn text(value: &str) -> Data {
        Data::String(value.to_string())
    }

    #[test]
    fn sheet_rows_are_read_by_exact_header() {
        let range = sheet(&[
            &[text("Phone"), text("FirstName"), text("Notes")],
            &[Data::Float(5550001.0), text(" Mia "), text("vip")],
            &[text("555-0002"), text("Ned"), Data::Empty],
            &[text(""), text("No phone"), text("dropped")],
        ]);

        assert_eq!(
            records_from_range(&range),
            vec![record("Mia", "5550001", "vip"), record("Ned", "555-0002", "")]
        );
    }

    #[test]
    fn sheet_headers_are_case_sensitive() {
        let range = sheet(&[&[text("firstname"), text("phone")], &[text("Ola"), text("555")]]);
        assert!(records_from_range(&range).is_empty());
    }
}
