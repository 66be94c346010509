//! Paged rows from a PDF text-layer extractor.
//!
//! Accepted JSON shapes:
//!
//! ```text
//! [ { "page": 1, "lines": ["DATE FROM TO", "10/25/2023 MYF SEE 1.2"] }, ... ]
//! [ { "page": 1, "rows": [["DATE", "FROM", "TO"], ["10/25/2023", "MYF", "SEE"]] }, ... ]
//! { "page": 1, "rows": [[...]] }
//! ```
//!
//! `lines` go through OCR cleaning and tokenizing; `rows` are taken as cells.

use serde::Deserialize;

use super::ocr::{clean_ocr_line, tokenize_line};
use super::RowGroup;
use crate::error::IngestResult;
use crate::models::Row;

#[derive(Debug, Deserialize)]
struct PageInput {
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    lines: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PagesDocument {
    Pages(Vec<PageInput>),
    Single(PageInput),
}

impl PageInput {
    fn into_group(self, position: usize) -> RowGroup {
        let mut rows: Vec<Row> = self
            .lines
            .iter()
            .map(|line| clean_ocr_line(line))
            .filter(|line| !line.is_empty())
            .map(|line| tokenize_line(&line))
            .collect();

        rows.extend(
            self.rows
                .into_iter()
                .map(|row| row.into_iter().map(|c| c.trim().to_string()).collect::<Row>())
                .filter(|row| row.iter().any(|c| !c.is_empty())),
        );

        RowGroup {
            page: Some(self.page.unwrap_or(position as u32 + 1)),
            rows,
        }
    }
}

/// Parse a pages document into one group per page.
pub fn parse_pages(content: &str) -> IngestResult<Vec<RowGroup>> {
    let document: PagesDocument = serde_json::from_str(content)?;
    let pages = match document {
        PagesDocument::Pages(pages) => pages,
        PagesDocument::Single(page) => vec![page],
    };
    Ok(pages
        .into_iter()
        .enumerate()
        .map(|(i, page)| page.into_group(i))
        .collect())
}
