//! Fallback strategy for OCR output whose rows collapsed into two streams:
//! one line of codes and names, followed by all values and ranges.
//!
//! The i-th (code, name) pair is joined with the i-th value group. Nothing in
//! the text can confirm that both streams kept the same left-to-right order;
//! when OCR reordered one of them the pairing is wrong without any signal.

use tracing::debug;

use super::grammar::Grammar;
use super::range::parse_range_with;
use super::PageText;
use crate::models::record::{LabRecord, ReferenceRange};
use crate::strategy::Strategy;

/// A value with the unit and range that followed it in the value stream.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueGroup {
    pub value: String,
    pub unit: Option<String>,
    pub range: Option<ReferenceRange>,
}

/// Position-pairing parser for collapsed row structure.
pub struct StreamRecoveryParser<'g> {
    grammar: &'g Grammar,
}

impl<'g> StreamRecoveryParser<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self { grammar }
    }

    /// Recover records from text whose first non-empty line is the
    /// code/name stream and whose remaining lines are the value stream.
    pub fn recover(&self, text: &str, page: usize) -> Vec<LabRecord> {
        let mut lines = text.lines().map(str::trim).skip_while(|l| l.is_empty());
        let Some(names_line) = lines.next() else {
            return Vec::new();
        };
        let values_text = lines.collect::<Vec<_>>().join(" ");

        self.pair(names_line, &values_text, page)
    }

    /// Extract `(code, name)` pairs from the code/name stream.
    pub fn code_name_pairs(&self, line: &str) -> Vec<(String, String)> {
        let anchors: Vec<_> = self.grammar.code_name_anchor().captures_iter(line).collect();
        let mut pairs = Vec::with_capacity(anchors.len());

        for (i, caps) in anchors.iter().enumerate() {
            let (Some(code), Some(name_start)) = (caps.name("code"), caps.name("name")) else {
                continue;
            };
            let end = anchors
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map(|m| m.start())
                .unwrap_or(line.len());

            let segment = &line[name_start.start()..end];
            let name = self
                .grammar
                .name_tail()
                .find(segment)
                .map(|m| m.as_str())
                .unwrap_or(segment)
                .trim_end_matches(|c: char| c.is_whitespace() || ",.;:-".contains(c));

            if !name.is_empty() {
                pairs.push((code.as_str().to_string(), name.to_string()));
            }
        }

        pairs
    }

    /// Extract value groups from the value stream, left to right.
    pub fn value_groups(&self, text: &str) -> Vec<ValueGroup> {
        let mut groups: Vec<ValueGroup> = Vec::new();

        for token in self.grammar.stream_token().find_iter(text) {
            let token = token.as_str();

            if let Some(inner) = token.strip_prefix('(') {
                let inner = inner.strip_suffix(')').unwrap_or(inner);
                if let Some(group) = groups.last_mut().filter(|g| g.range.is_none()) {
                    group.range = Some(parse_range_with(inner, self.grammar));
                }
            } else if self.grammar.value_token().is_match(token) {
                groups.push(ValueGroup {
                    value: token.to_string(),
                    unit: None,
                    range: None,
                });
            } else if let Some(group) = groups.last_mut().filter(|g| g.unit.is_none()) {
                group.unit = Some(token.to_string());
            }
        }

        groups
    }

    fn pair(&self, names_line: &str, values_text: &str, page: usize) -> Vec<LabRecord> {
        let names = self.code_name_pairs(names_line);
        let values = self.value_groups(values_text);

        if names.len() != values.len() {
            debug!(
                "Stream lengths differ ({} names, {} values), pairing the first {}",
                names.len(),
                values.len(),
                names.len().min(values.len())
            );
        }

        names
            .into_iter()
            .zip(values)
            .map(|((code, name), group)| {
                LabRecord::draft(
                    code,
                    name,
                    group.value,
                    group.unit,
                    group.range.unwrap_or_default(),
                    page,
                )
            })
            .collect()
    }
}

impl<'t> Strategy<[PageText<'t>]> for StreamRecoveryParser<'_> {
    type Output = Vec<LabRecord>;

    fn name(&self) -> &str {
        "stream-recovery"
    }

    /// The code/name stream is the first non-empty line of the first page
    /// that has one; the value stream is everything after it, across pages.
    fn attempt(&self, pages: &[PageText<'t>]) -> Option<Vec<LabRecord>> {
        let start = pages.iter().position(|p| !p.text.trim().is_empty())?;
        let page = pages[start].number;

        let text = pages[start..]
            .iter()
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join("\n");

        let records = self.recover(&text, page);
        (!records.is_empty()).then_some(records)
    }
}
