//! Free-text lines (OCR output, plain text, PDF text layer) to rows.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Row;

/// `KSAN→KLAX`, `KSAN - KLAX` and similar joins between two codes.
static CODE_JOIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z]{3,4})\s*[-→]\s*([A-Z]{3,4})").expect("valid regex"));

static LATEX_ARTIFACT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{[^}]*\}|\$\\?mathbb\{[A-Z]\}").expect("valid regex"));

static NOISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\s.:/|-]").expect("valid regex"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Frequent misreads in scanned logbooks.
const OCR_FIXES: &[(&str, &str)] = &[
    ("COMPILYY", "COMPANY"),
    ("FLOT IN", "FLIGHT IN"),
    ("FUGHT", "FLIGHT"),
    ("REPGKT", "REPORT"),
];

/// Clean one line of recognized text.
pub fn clean_ocr_line(line: &str) -> String {
    let mut text = line.to_string();
    // Matches do not overlap, so chained joins need several passes.
    loop {
        let joined = CODE_JOIN.replace_all(&text, "${1}-${2}").into_owned();
        if joined == text {
            break;
        }
        text = joined;
    }

    let mut text = LATEX_ARTIFACT.replace_all(&text, " ").into_owned();
    for (wrong, right) in OCR_FIXES {
        text = text.replace(wrong, right);
    }
    let text = NOISE.replace_all(&text, " ");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Cells of a cleaned line: `|`-separated when the line has pipes, else words.
pub fn tokenize_line(line: &str) -> Row {
    if line.contains('|') {
        line.split('|').map(|c| c.trim().to_string()).collect()
    } else {
        line.split_whitespace().map(String::from).collect()
    }
}

/// Rows of a text document, blank lines dropped.
pub fn text_to_rows(text: &str) -> Vec<Row> {
    text.lines()
        .map(clean_ocr_line)
        .filter(|line| !line.is_empty())
        .map(|line| tokenize_line(&line))
        .collect()
}
