//! Row-span lookup.
//!
//! A merged group over one column is described row by row in
//! `_extraData.rowSpanData`: the owner carries the group size, members point
//! at the owner's key. Rows without an entry are their own, unmerged owner.

use crate::types::{RawRow, SpanDescriptor};

/// Resolve the span descriptor of `column_name` in `raw`.
///
/// Entries are used verbatim. Missing entries (or missing extra data, which
/// deserializes to an empty block) resolve to an unmerged descriptor.
#[must_use]
pub fn resolve_span(raw: &RawRow, column_name: &str) -> SpanDescriptor {
    raw.extra_data
        .row_span_data
        .get(column_name)
        .copied()
        .unwrap_or_else(|| SpanDescriptor::unmerged(raw.row_key))
}

/// Span as the grid should use it right now.
///
/// Spans only apply while the store keeps rows in key order; otherwise
/// every cell renders on its own.
pub fn effective_span(raw: &RawRow, column_name: &str, span_enabled: bool) -> SpanDescriptor {
    if span_enabled {
        resolve_span(raw, column_name)
    } else {
        SpanDescriptor::unmerged(raw.row_key)
    }
}
