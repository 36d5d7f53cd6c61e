//! Out-of-range flagging.

use crate::models::record::{LabRecord, ReferenceRange};

/// Whether `value` lies outside `range`. Absent bounds never trigger.
pub fn is_out_of_range(value: f64, range: ReferenceRange) -> bool {
    range.min.is_some_and(|min| value < min) || range.max.is_some_and(|max| value > max)
}

/// Set `out_of_range` on a record. Records without a numeric value or
/// without any bound are never flagged.
pub fn annotate(record: &mut LabRecord) {
    let range = record.range();
    record.out_of_range = match record.value_numeric {
        Some(value) if range.is_bounded() => is_out_of_range(value, range),
        _ => false,
    };
}

pub fn annotate_all(records: &mut [LabRecord]) {
    records.iter_mut().for_each(annotate);
}
