//! Row ingestion with encoding and delimiter auto-detection.
//!
//! Three input shapes end up as the same thing, groups of [`Row`]s:
//!
//! | Format | Extension | Rows |
//! |--------|-----------|------|
//! | [`SourceFormat::Delimited`] | `.csv` | one per record, split on the detected delimiter |
//! | [`SourceFormat::Text`] | `.txt` | one per line, OCR-cleaned, split on `|` or whitespace |
//! | [`SourceFormat::PdfPages`] | `.json` | one group per page, see [`pages`] |
//!
//! No logbook semantics here: headers, totals and codes are the assembler's job.

pub mod ocr;
pub mod pages;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{IngestError, IngestResult};
use crate::models::Row;

pub use ocr::{clean_ocr_line, text_to_rows, tokenize_line};
pub use pages::parse_pages;

/// Candidate delimiters; earlier wins on equal counts.
const DELIMITERS: [char; 4] = [',', ';', '\t', '|'];

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceFormat {
    Delimited,
    Text,
    PdfPages,
}

impl SourceFormat {
    pub fn from_extension(ext: &str) -> IngestResult<Self> {
        match ext.to_lowercase().as_str() {
            "csv" | "tsv" => Ok(SourceFormat::Delimited),
            "txt" | "text" => Ok(SourceFormat::Text),
            "json" => Ok(SourceFormat::PdfPages),
            other => Err(IngestError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Format of a file or upload name, from its extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> IngestResult<Self> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        Self::from_extension(ext)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Delimited => "delimited",
            SourceFormat::Text => "text",
            SourceFormat::PdfPages => "pdf pages",
        }
    }
}

/// Rows sharing a layout: the whole file, or one PDF page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowGroup {
    pub page: Option<u32>,
    pub rows: Vec<Row>,
}

/// Parsed rows with detection metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ParseResult {
    pub groups: Vec<RowGroup>,
    /// Detected encoding
    pub encoding: String,
    /// Detected delimiter (delimited input only)
    pub delimiter: Option<char>,
    pub format: SourceFormat,
}

impl ParseResult {
    pub fn row_count(&self) -> usize {
        self.groups.iter().map(|g| g.rows.len()).sum()
    }

    /// First `n` rows across groups.
    pub fn preview(&self, n: usize) -> Vec<Row> {
        self.groups
            .iter()
            .flat_map(|g| g.rows.iter())
            .take(n)
            .cloned()
            .collect()
    }
}

// =============================================================================
// Detection
// =============================================================================

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes with the given encoding.
///
/// Unknown labels and invalid UTF-8 fall back to lossy UTF-8. Content with NUL
/// bytes is binary and rejected.
pub fn decode_content(bytes: &[u8], encoding: &str) -> IngestResult<String> {
    let text = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8_lossy(bytes).into_owned(),
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.into_owned()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        label => match encoding_rs::Encoding::for_label(label.as_bytes()) {
            Some(enc) => enc.decode(bytes).0.into_owned(),
            None => String::from_utf8_lossy(bytes).into_owned(),
        },
    };

    if text.contains('\0') {
        return Err(IngestError::EncodingError(format!(
            "binary content is not a {} text file",
            encoding
        )));
    }
    Ok(text.trim_start_matches('\u{feff}').to_string())
}

/// The delimiter occurring most often in the first line, `,` by default.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let mut best = ',';
    let mut best_count = 0;
    for sep in DELIMITERS {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best = sep;
        }
    }
    best
}

// =============================================================================
// Parsing
// =============================================================================

/// Split delimited content into rows.
///
/// Records may have different lengths; quotes are stripped, cells trimmed,
/// blank records dropped.
pub fn parse_delimited(content: &str, delimiter: char) -> IngestResult<Vec<Row>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .delimiter(delimiter as u8)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IngestError::ParseError(e.to_string()))?;
        let row: Row = record.iter().map(|c| c.trim().to_string()).collect();
        if row.iter().all(|c| c.is_empty()) {
            continue;
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Parse raw bytes of the given format.
///
/// # Errors
/// [`IngestError::EmptyInput`] when no row survives, before any other work.
pub fn parse_bytes(bytes: &[u8], format: SourceFormat) -> IngestResult<ParseResult> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(IngestError::EmptyInput);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;

    let (groups, delimiter) = match format {
        SourceFormat::Delimited => {
            let delimiter = detect_delimiter(&content);
            let rows = parse_delimited(&content, delimiter)?;
            (vec![RowGroup { page: None, rows }], Some(delimiter))
        }
        SourceFormat::Text => (
            vec![RowGroup {
                page: None,
                rows: text_to_rows(&content),
            }],
            None,
        ),
        SourceFormat::PdfPages => (parse_pages(&content)?, None),
    };

    let result = ParseResult {
        groups,
        encoding,
        delimiter,
        format,
    };
    if result.row_count() == 0 {
        return Err(IngestError::EmptyInput);
    }
    Ok(result)
}

/// Read and parse a file, format from its extension.
pub fn parse_file<P: AsRef<Path>>(path: P) -> IngestResult<ParseResult> {
    let format = SourceFormat::from_path(path.as_ref())?;
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes(&bytes, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_delimited_rows() {
        let rows = parse_delimited("Date,From,To\n10/25/2023,JFK,LAX", ',').unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec!["10/25/2023", "JFK", "LAX"]);
    }

    #[test]
    fn test_quoted_values() {
        let csv = "date;remarks\n\"10/25/2023\";\"KSAN; KLAX\"";
        let rows = parse_delimited(csv, ';').unwrap();
        assert_eq!(rows[1], vec!["10/25/2023", "KSAN; KLAX"]);
    }

    #[test]
    fn test_blank_records_skipped() {
        let rows = parse_delimited("a,b\n1,2\n\n , \n3,4\n", ',').unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_ragged_records() {
        let rows = parse_delimited("a,b,c\n1,,3\n1,2,3,4", ',').unwrap();
        assert_eq!(rows[1], vec!["1", "", "3"]);
        assert_eq!(rows[2].len(), 4);
    }

    #[test]
    fn test_detect_delimiter_semicolon() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
    }

    #[test]
    fn test_detect_delimiter_comma() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
    }

    #[test]
    fn test_detect_delimiter_tab() {
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
    }

    #[test]
    fn test_detect_delimiter_pipe() {
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
    }

    #[test]
    fn test_detect_delimiter_default() {
        assert_eq!(detect_delimiter("single column"), ',');
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_binary_content_rejected() {
        let err = decode_content(&[0x25, 0x50, 0x00, 0x01], "utf-8").unwrap_err();
        assert!(matches!(err, IngestError::EncodingError(_)));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(SourceFormat::from_path("book.CSV").unwrap(), SourceFormat::Delimited);
        assert_eq!(SourceFormat::from_path("scan.txt").unwrap(), SourceFormat::Text);
        assert_eq!(SourceFormat::from_path("pages.json").unwrap(), SourceFormat::PdfPages);
        assert!(matches!(
            SourceFormat::from_path("logbook.pdf"),
            Err(IngestError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(parse_bytes(b"", SourceFormat::Delimited), Err(IngestError::EmptyInput)));
        assert!(matches!(parse_bytes(b" \n\n", SourceFormat::Text), Err(IngestError::EmptyInput)));
        assert!(matches!(parse_bytes(b"[]", SourceFormat::PdfPages), Err(IngestError::EmptyInput)));
    }

    #[test]
    fn test_parse_bytes_metadata() {
        let result = parse_bytes(b"date;from;to\n10/25/2023;JFK;LAX\n", SourceFormat::Delimited).unwrap();
        assert_eq!(result.delimiter, Some(';'));
        assert_eq!(result.encoding, "utf-8");
        assert_eq!(result.row_count(), 2);
        assert_eq!(result.preview(1), vec![vec!["date", "from", "to"]]);
    }

    #[test]
    fn test_parse_text() {
        let result = parse_bytes(b"DATE FROM TO\n10/25/2023 MYF SEE\n", SourceFormat::Text).unwrap();
        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.groups[0].rows[1], vec!["10/25/2023", "MYF", "SEE"]);
    }

    #[test]
    fn test_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.csv");
        std::fs::write(&path, "Date,From,To\n10/25/2023,JFK,LAX\n").unwrap();
        let result = parse_file(&path).unwrap();
        assert_eq!(result.format, SourceFormat::Delimited);
        assert_eq!(result.row_count(), 2);
    }
}
