//! Rule-based extractors for laboratory report text.

pub mod annotate;
pub mod dates;
pub mod grammar;
pub mod metadata;
pub mod normalize;
pub mod patterns;
pub mod range;
pub mod record_line;
pub mod stream_recovery;

pub use annotate::{annotate, annotate_all, is_out_of_range};
pub use dates::parse_date;
pub use grammar::{Grammar, DEFAULT_GRAMMAR};
pub use metadata::MetadataExtractor;
pub use normalize::normalize;
pub use range::{parse_decimal, parse_range, parse_range_with};
pub use record_line::RecordLineParser;
pub use stream_recovery::{StreamRecoveryParser, ValueGroup};

/// Text of one page with its 1-based page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageText<'a> {
    pub number: usize,
    pub text: &'a str,
}

impl<'a> PageText<'a> {
    pub fn new(number: usize, text: &'a str) -> Self {
        Self { number, text }
    }
}
