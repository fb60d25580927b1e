use crate::config::{label_for_rule, CIT_RULE_PREFIX, STRUCT_CIT_RULE};
use crate::types::{HitMap, Label, RuleHits, ScoreVector, Section};

// Fixed increments. Relational hits outweigh surface hits; citation rules
// carry an extra Input Fact bonus on top of their prefix increment, and a
// structural citation marker outweighs any textual citation pattern.
pub const SURFACE_WEIGHT: i32 = 1;
pub const RELATIONAL_WEIGHT: i32 = 2;
pub const CIT_RULE_BONUS: i32 = 3;
pub const CIT_STRUCT_BONUS: i32 = 4;

const ABSTRACT_PRIORS: &[(Label, i32)] = &[(Label::Hypothesis, 1)];
const INTRO_PRIORS: &[(Label, i32)] = &[(Label::InputFact, 1), (Label::Hypothesis, 2)];
const METHODS_PRIORS: &[(Label, i32)] = &[
    (Label::Experiment, 2),
    (Label::Technique, 2),
    (Label::Dataset, 1),
    (Label::Analysis, 1),
];
const RESULTS_PRIORS: &[(Label, i32)] = &[(Label::Result, 2), (Label::Analysis, 1)];
const DISCUSSION_PRIORS: &[(Label, i32)] = &[
    (Label::Conclusion, 2),
    (Label::Result, 1),
    (Label::Hypothesis, 1),
];
const CONCLUSION_PRIORS: &[(Label, i32)] = &[(Label::Conclusion, 2)];

/// Per-section label weight additions reflecting domain expectation
/// (e.g. Methods sections favor Experiment/Technique).
pub fn section_priors(section: Section) -> &'static [(Label, i32)] {
    match section {
        Section::Abstract => ABSTRACT_PRIORS,
        Section::Intro => INTRO_PRIORS,
        Section::Methods => METHODS_PRIORS,
        Section::Results => RESULTS_PRIORS,
        Section::Discussion => DISCUSSION_PRIORS,
        Section::Conclusion => CONCLUSION_PRIORS,
        Section::References | Section::Other => &[],
    }
}

/// Convert one unit's rule hits + section into a per-label score vector.
///
/// Surface hits add +1 per occurrence to their prefix-mapped label,
/// relational hits +2, and citation-family surface hits an extra +3 to
/// Input Fact. Section priors are added unconditionally. A structural
/// citation marker adds +4 to Input Fact and registers a synthetic
/// `INF_CIT_STRUCT` hit so downstream logic can distinguish structural from
/// textual citation evidence; the synthetic entry is not itself re-scored.
///
/// Pure function of its inputs; unknown rule prefixes score nothing.
pub fn score_unit(
    hits: &RuleHits,
    section: Section,
    has_structural_citation: bool,
) -> (ScoreVector, HitMap) {
    let mut scores = ScoreVector::default();

    for (id, count) in &hits.surface {
        if let Some(label) = label_for_rule(id) {
            scores.add(label, SURFACE_WEIGHT * *count as i32);
        }
        if id.starts_with(CIT_RULE_PREFIX) {
            scores.add(Label::InputFact, CIT_RULE_BONUS * *count as i32);
        }
    }

    for (id, count) in &hits.relational {
        if let Some(label) = label_for_rule(id) {
            scores.add(label, RELATIONAL_WEIGHT * *count as i32);
        }
    }

    for (label, weight) in section_priors(section) {
        scores.add(*label, *weight);
    }

    let mut matches = hits.combined();
    if has_structural_citation {
        scores.add(Label::InputFact, CIT_STRUCT_BONUS);
        *matches.entry(STRUCT_CIT_RULE.to_string()).or_insert(0) += 1;
    }

    (scores, matches)
}
