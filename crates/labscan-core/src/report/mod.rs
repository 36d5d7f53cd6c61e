//! Lab report extraction module.

mod parser;
pub mod rules;

pub use parser::LabReportParser;

use crate::models::result::ExtractionResult;
use rules::patterns::PAGE_HEADER;

/// Trait for lab report extractors.
pub trait ReportExtractor {
    /// Extract a report from OCR text, one entry per page.
    fn extract_pages(&self, pages: &[&str]) -> ExtractionResult;

    /// Extract a report from a single text holding every page.
    fn extract_from_text(&self, text: &str) -> ExtractionResult {
        let pages = split_pages(text);
        let pages: Vec<&str> = pages.iter().map(String::as_str).collect();
        self.extract_pages(&pages)
    }
}

/// Split combined OCR output on `=== Strana N ===` / `=== Page N ===`
/// headers. Text without headers is a single page. Text before the first
/// header belongs to the first page, so page numbers follow the headers.
pub fn split_pages(text: &str) -> Vec<String> {
    let headers: Vec<_> = PAGE_HEADER.find_iter(text).collect();
    if headers.is_empty() {
        return vec![text.to_string()];
    }

    let preamble = text[..headers[0].start()].trim();
    let mut pages: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let end = headers.get(i + 1).map_or(text.len(), |next| next.start());
            text[header.end()..end].trim().to_string()
        })
        .collect();

    match pages.first_mut() {
        Some(first) if !preamble.is_empty() && first.is_empty() => *first = preamble.to_string(),
        Some(first) if !preamble.is_empty() => *first = format!("{}\n{}", preamble, first),
        _ => {}
    }

    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_without_headers() {
        assert_eq!(split_pages("03085 Urea 4.0"), vec!["03085 Urea 4.0"]);
    }

    #[test]
    fn test_split_on_headers() {
        let text = "=== Strana 1 ===\nPacient: Jan Novák\n\n=== Strana 2 ===\n03085 Urea 4.0\n";
        assert_eq!(split_pages(text), vec!["Pacient: Jan Novák", "03085 Urea 4.0"]);
    }

    #[test]
    fn test_split_keeps_blank_pages() {
        let text = "=== Page 1 ===\n=== PAGE 2 ===\nlast";
        assert_eq!(split_pages(text), vec!["", "last"]);
    }

    #[test]
    fn test_preamble_joins_first_page() {
        let text = "Pacient: Jan Novák\n=== Strana 1 ===\n03085 Urea 4.0\n=== Strana 2 ===\n03001 Sodík 140";
        assert_eq!(
            split_pages(text),
            vec!["Pacient: Jan Novák\n03085 Urea 4.0", "03001 Sodík 140"]
        );

        let text = "report.pdf\n=== Page 1 ===\n=== Page 2 ===\nlast";
        assert_eq!(split_pages(text), vec!["report.pdf", "last"]);
    }
}
