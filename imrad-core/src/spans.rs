//! Adjacent-span merging.

use crate::types::{LabeledUnit, Span};

/// Coalesce consecutive same-label, same-page units into spans.
///
/// Greedy single left-to-right pass: a unit extends the open span iff its
/// label and page both equal the span's — text joined with one space, the
/// bounding rectangles unioned — otherwise the span is emitted and a new
/// one opened. The final unit always closes the last open span. O(n), no
/// backtracking.
pub fn merge_adjacent(units: &[LabeledUnit]) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::new();
    for unit in units {
        match spans.last_mut() {
            Some(open) if open.label == unit.label && open.page == unit.page => {
                open.text.push(' ');
                open.text.push_str(&unit.text);
                open.bbox = open.bbox.union(&unit.bbox);
            }
            _ => spans.push(Span {
                label: unit.label,
                section: unit.section,
                text: unit.text.clone(),
                page: unit.page,
                bbox: unit.bbox,
            }),
        }
    }
    spans
}
