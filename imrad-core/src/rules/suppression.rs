use crate::config::is_citation_rule;
use crate::types::{HitMap, Label};
use regex::Regex;
use std::sync::LazyLock;

static BIB_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:vol\.?|no\.?|pp\.?|doi:?|issn|et al\.)\b").unwrap()
});

static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").unwrap());

static PAGE_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,4}\s*[–-]\s*\d{1,4}\b").unwrap());

/// Lexical heuristic for bibliography-entry tails: explicit bibliographic
/// markers, or a year co-occurring with a page-range pattern. Units that
/// look like this are forced to OTHER regardless of prior resolution.
pub fn looks_like_reference(text: &str) -> bool {
    if BIB_MARKERS.is_match(text) {
        return true;
    }
    YEAR.is_match(text) && PAGE_RANGE.is_match(text)
}

/// Optional soft filter: a bare citation pattern with no other supporting
/// evidence is not a fact claim. When enabled, a unit without a structural
/// citation marker whose resolved label is Input Fact is downgraded to
/// OTHER if every triggered rule belongs to the citation family.
pub fn apply_citation_soft(
    label: Label,
    matches: &HitMap,
    has_structural_citation: bool,
    enabled: bool,
) -> Label {
    if has_structural_citation || !enabled || label != Label::InputFact {
        return label;
    }
    let citation_hits: u32 = matches
        .iter()
        .filter(|(id, _)| is_citation_rule(id))
        .map(|(_, n)| *n)
        .sum();
    let other_hits: u32 = matches
        .iter()
        .filter(|(id, _)| !is_citation_rule(id))
        .map(|(_, n)| *n)
        .sum();
    if citation_hits > 0 && other_hits == 0 {
        Label::Other
    } else {
        label
    }
}
