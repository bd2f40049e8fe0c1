//! Page-range expression parsing.
//!
//! The expression grammar is the one users type into the `--pages` flag:
//! comma-separated tokens, each a 1-based page number or an inclusive
//! hyphenated range. Open-ended bounds default to the document edges, so
//! `"3-"` means page 3 to the end and `"-5"` means the start through page 5.
//! The result is always zero-based, deduplicated, and ascending, whatever
//! order the tokens came in.

use crate::error::PdfMonoError;

/// Parse a page-range expression against a document's page count.
///
/// `""` and `"all"` (case-insensitive) select every page. Any token that is
/// not a valid number or range, any reversed range, and any page number
/// beyond `page_count` fail with [`PdfMonoError::InvalidPageRange`] carrying
/// the offending token.
///
/// # Example
/// ```rust
/// use pdfmono::pipeline::range::parse;
///
/// assert_eq!(parse("2,4-6,3", 10).unwrap(), vec![1, 2, 3, 4, 5]);
/// assert_eq!(parse("all", 3).unwrap(), vec![0, 1, 2]);
/// ```
pub fn parse(expression: &str, page_count: usize) -> Result<Vec<usize>, PdfMonoError> {
    let expression = expression.trim();
    if expression.is_empty() || expression.eq_ignore_ascii_case("all") {
        return Ok((0..page_count).collect());
    }

    let mut indices: Vec<usize> = Vec::new();
    for token in expression.split(',') {
        let token = token.trim();
        if token.is_empty() {
            return Err(invalid(token, "empty token"));
        }
        if let Some((start, end)) = token.split_once('-') {
            let start = parse_bound(start, token, 1)?;
            let end = parse_bound(end, token, page_count)?;
            if start == 0 || end == 0 {
                return Err(invalid(token, "pages are numbered from 1"));
            }
            if start > end {
                return Err(invalid(token, "start exceeds end"));
            }
            if end > page_count {
                return Err(invalid(
                    token,
                    &format!("page {end} is out of range (document has {page_count} pages)"),
                ));
            }
            indices.extend(start - 1..end);
        } else {
            let page: usize = token
                .parse()
                .map_err(|_| invalid(token, "not a page number"))?;
            if page == 0 {
                return Err(invalid(token, "pages are numbered from 1"));
            }
            if page > page_count {
                return Err(invalid(
                    token,
                    &format!("page {page} is out of range (document has {page_count} pages)"),
                ));
            }
            indices.push(page - 1);
        }
    }

    indices.sort_unstable();
    indices.dedup();
    Ok(indices)
}

/// Parse one side of a hyphenated range; an empty side takes `default`.
fn parse_bound(s: &str, token: &str, default: usize) -> Result<usize, PdfMonoError> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(default);
    }
    s.parse().map_err(|_| invalid(token, "not a page number"))
}

fn invalid(token: &str, detail: &str) -> PdfMonoError {
    PdfMonoError::InvalidPageRange {
        token: token.to_string(),
        detail: detail.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_and_empty_select_every_page() {
        assert_eq!(parse("all", 4).unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(parse("ALL", 2).unwrap(), vec![0, 1]);
        assert_eq!(parse("", 3).unwrap(), vec![0, 1, 2]);
        assert_eq!(parse("  ", 1).unwrap(), vec![0]);
    }

    #[test]
    fn mixed_tokens_deduplicate_and_sort() {
        assert_eq!(parse("2,4-6,3", 10).unwrap(), vec![1, 2, 3, 4, 5]);
        assert_eq!(parse("5,1,5,3", 5).unwrap(), vec![0, 2, 4]);
        assert_eq!(parse("3-5,4", 6).unwrap(), vec![2, 3, 4]);
    }

    #[test]
    fn open_ended_bounds_default_to_document_edges() {
        assert_eq!(parse("3-", 5).unwrap(), vec![2, 3, 4]);
        assert_eq!(parse("-2", 5).unwrap(), vec![0, 1]);
    }

    #[test]
    fn out_of_bounds_page_is_an_error() {
        let err = parse("5", 3).unwrap_err();
        match err {
            PdfMonoError::InvalidPageRange { token, .. } => assert_eq!(token, "5"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(parse("1-9", 3).is_err());
    }

    #[test]
    fn reversed_range_is_an_error() {
        let err = parse("4-2", 10).unwrap_err();
        assert!(err.to_string().contains("4-2"));
    }

    #[test]
    fn garbage_tokens_are_errors() {
        assert!(parse("abc", 10).is_err());
        assert!(parse("1,,3", 10).is_err());
        assert!(parse("1-2-3", 10).is_err());
        assert!(parse("0", 10).is_err());
        assert!(parse("0-2", 10).is_err());
    }

    #[test]
    fn single_page_document() {
        assert_eq!(parse("1", 1).unwrap(), vec![0]);
        assert!(parse("2", 1).is_err());
    }
}
