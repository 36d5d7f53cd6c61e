//! Lab report parser combining the record strategies, canonicalization,
//! metadata extraction and annotation.

use tracing::{debug, info, warn};

use crate::canonical::Canonicalizer;
use crate::error::Result;
use crate::llm::authoritative_report;
use crate::models::config::LabscanConfig;
use crate::models::metadata::DocumentMetadata;
use crate::models::record::LabRecord;
use crate::models::result::{ExtractionResult, ExtractionWarning};
use crate::strategy::{first_match, Strategy};

use super::rules::{
    annotate_all, normalize, Grammar, MetadataExtractor, PageText, RecordLineParser,
    StreamRecoveryParser, DEFAULT_GRAMMAR,
};
use super::ReportExtractor;

type RecordStrategy<'a, 't> = &'a dyn Strategy<[PageText<'t>], Output = Vec<LabRecord>>;

/// Lab report parser.
#[derive(Debug, Clone)]
pub struct LabReportParser {
    grammar: Grammar,
    canonicalizer: Canonicalizer,
    /// Run the strategy fallback per page instead of per document.
    per_page: bool,
    /// Maximum pages to process (0 = unlimited).
    max_pages: usize,
}

impl LabReportParser {
    /// Create a parser with the default grammar and built-in dictionary.
    pub fn new() -> Self {
        Self {
            grammar: DEFAULT_GRAMMAR.clone(),
            canonicalizer: Canonicalizer::default(),
            per_page: false,
            max_pages: 20,
        }
    }

    /// Create a parser from configuration.
    pub fn from_config(config: &LabscanConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            grammar: Grammar::new(&config.extraction.profile)?,
            canonicalizer: Canonicalizer::from_config(&config.canonicalizer)?,
            per_page: config.extraction.per_page,
            max_pages: config.extraction.max_pages,
        })
    }

    /// Set per-page mode.
    pub fn with_per_page(mut self, per_page: bool) -> Self {
        self.per_page = per_page;
        self
    }

    /// Set the page limit (0 = unlimited).
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Replace the canonicalizer.
    pub fn with_canonicalizer(mut self, canonicalizer: Canonicalizer) -> Self {
        self.canonicalizer = canonicalizer;
        self
    }

    pub fn canonicalizer(&self) -> &Canonicalizer {
        &self.canonicalizer
    }

    /// Extract using an upstream structured candidate when it is usable.
    ///
    /// An authoritative candidate supplies the records and wins on metadata;
    /// gaps in its metadata are filled from the text. Anything else falls
    /// back to parsing the text.
    pub fn extract_with_candidate(
        &self,
        pages: &[&str],
        candidate: Option<&str>,
    ) -> ExtractionResult {
        let Some(raw) = candidate else {
            return self.extract_pages(pages);
        };

        let Some(report) = authoritative_report(raw) else {
            warn!("Structured candidate is not usable, parsing text instead");
            let mut result = self.extract_pages(pages);
            result.warnings.insert(0, ExtractionWarning::UpstreamJsonInvalid);
            return result;
        };

        info!(
            "Using structured candidate with {} lab results",
            report.lab_results.as_ref().map_or(0, Vec::len)
        );

        let mut warnings = Vec::new();
        let normalized = self.prepare(pages, &mut warnings);
        let page_texts = page_texts(&normalized);

        let mut metadata = report.metadata();
        metadata.fill_missing(self.extract_metadata(&page_texts));

        self.finish(report.draft_records(), metadata, warnings)
    }

    /// Drop pages past the limit and normalize the rest.
    fn prepare(&self, pages: &[&str], warnings: &mut Vec<ExtractionWarning>) -> Vec<String> {
        let kept = if self.max_pages > 0 && pages.len() > self.max_pages {
            warn!(
                "Document has {} pages, processing the first {}",
                pages.len(),
                self.max_pages
            );
            warnings.push(ExtractionWarning::PagesTruncated {
                total: pages.len(),
                kept: self.max_pages,
            });
            &pages[..self.max_pages]
        } else {
            pages
        };

        kept.iter().map(|page| normalize(page)).collect()
    }

    /// Records from the line grammar, or from stream recovery when the
    /// grammar finds nothing.
    fn extract_records(
        &self,
        pages: &[PageText<'_>],
        warnings: &mut Vec<ExtractionWarning>,
    ) -> Vec<LabRecord> {
        let record_line = RecordLineParser::new(&self.grammar);
        let stream_recovery = StreamRecoveryParser::new(&self.grammar);
        let strategies: [RecordStrategy<'_, '_>; 2] = [&record_line, &stream_recovery];

        let scopes: Vec<&[PageText<'_>]> = if self.per_page {
            pages.chunks(1).collect()
        } else {
            vec![pages]
        };

        let mut records = Vec::new();
        let mut recovered = 0;

        for scope in scopes {
            match first_match(scope, &strategies) {
                Some((strategy, found)) => {
                    debug!("{} produced {} records", strategy, found.len());
                    if strategy == stream_recovery.name() {
                        recovered += found.len();
                    }
                    records.extend(found);
                }
                None => debug!("No strategy produced records"),
            }
        }

        if recovered > 0 {
            warnings.push(ExtractionWarning::StreamRecoveryUsed { records: recovered });
        }

        records
    }

    /// Metadata over the whole document, or page by page merged in page
    /// order in per-page mode. Either way the earliest match wins.
    fn extract_metadata(&self, pages: &[PageText<'_>]) -> DocumentMetadata {
        let extractor = MetadataExtractor::new(&self.grammar);

        if self.per_page {
            let mut metadata = DocumentMetadata::default();
            for page in pages {
                metadata.fill_missing(extractor.extract(page.text));
                if metadata.is_complete() {
                    break;
                }
            }
            metadata
        } else {
            let text = pages.iter().map(|p| p.text).collect::<Vec<_>>().join("\n");
            extractor.extract(&text)
        }
    }

    fn finish(
        &self,
        mut records: Vec<LabRecord>,
        metadata: DocumentMetadata,
        mut warnings: Vec<ExtractionWarning>,
    ) -> ExtractionResult {
        for record in &mut records {
            record.canonical_name = self.canonicalizer.canonicalize(&record.raw_name);
        }
        annotate_all(&mut records);

        if records.is_empty() {
            warn!("No lab records found");
            warnings.push(ExtractionWarning::NoRecordsFound);
        }

        let missing = metadata.missing_fields();
        if !missing.is_empty() {
            debug!("Unresolved metadata fields: {}", missing.join(", "));
        }

        ExtractionResult {
            records,
            metadata,
            warnings,
        }
    }
}

impl Default for LabReportParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportExtractor for LabReportParser {
    fn extract_pages(&self, pages: &[&str]) -> ExtractionResult {
        info!(
            "Extracting lab report from {} pages ({} mode)",
            pages.len(),
            if self.per_page { "per-page" } else { "document" }
        );

        let mut warnings = Vec::new();
        let normalized = self.prepare(pages, &mut warnings);
        let page_texts = page_texts(&normalized);

        let records = self.extract_records(&page_texts, &mut warnings);
        let metadata = self.extract_metadata(&page_texts);

        let result = self.finish(records, metadata, warnings);
        info!(
            "Extracted {} records ({} out of range)",
            result.records.len(),
            result.out_of_range_count()
        );
        result
    }
}

fn page_texts(normalized: &[String]) -> Vec<PageText<'_>> {
    normalized
        .iter()
        .enumerate()
        .map(|(i, text)| PageText::new(i + 1, text))
        .collect()
}
