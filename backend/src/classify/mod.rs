//! Token and row classification.
//!
//! - [`code`] - Is this token plausibly an airport code?
//! - [`row`] - Is this row a header, a totals/summary line, or data?

pub mod code;
pub mod row;

pub use code::{has_region_prefix, is_airport_code, is_excluded_term, looks_like_code, EXCLUDED_TERMS};
pub use row::{
    classify_row, is_header_keyword, is_likely_header, is_summary_page, is_summary_row, RowKind,
    HEADER_KEYWORDS,
};
