use crate::types::{Flags, Label, ScoreVector, Section};

// Preferred orders for tie resolution. Explicit and total — resolution never
// depends on map iteration order. The universal order deliberately omits
// Hypothesis and ends in OTHER; labels missing from an order sort after
// every listed one, in canonical role order.
pub const UNIVERSAL_TIE_ORDER: [Label; 8] = [
    Label::Conclusion,
    Label::Result,
    Label::Analysis,
    Label::Technique,
    Label::Experiment,
    Label::Dataset,
    Label::InputFact,
    Label::Other,
];

const ABSTRACT_ORDER: [Label; 8] = [
    Label::Conclusion,
    Label::Result,
    Label::Hypothesis,
    Label::Dataset,
    Label::Technique,
    Label::Analysis,
    Label::Experiment,
    Label::InputFact,
];

const INTRO_ORDER: [Label; 8] = [
    Label::Hypothesis,
    Label::InputFact,
    Label::Conclusion,
    Label::Result,
    Label::Analysis,
    Label::Technique,
    Label::Experiment,
    Label::Dataset,
];

const METHODS_ORDER: [Label; 8] = [
    Label::Technique,
    Label::Experiment,
    Label::Dataset,
    Label::Analysis,
    Label::Result,
    Label::InputFact,
    Label::Hypothesis,
    Label::Conclusion,
];

const RESULTS_ORDER: [Label; 8] = [
    Label::Result,
    Label::Analysis,
    Label::Dataset,
    Label::Technique,
    Label::Experiment,
    Label::Conclusion,
    Label::InputFact,
    Label::Hypothesis,
];

const DISCUSSION_ORDER: [Label; 8] = [
    Label::Conclusion,
    Label::Result,
    Label::Analysis,
    Label::Technique,
    Label::Experiment,
    Label::Dataset,
    Label::InputFact,
    Label::Hypothesis,
];

/// Section-specific preferred order, falling back to the universal one.
pub fn tie_order(section: Section) -> &'static [Label] {
    match section {
        Section::Abstract => &ABSTRACT_ORDER,
        Section::Intro => &INTRO_ORDER,
        Section::Methods => &METHODS_ORDER,
        Section::Results => &RESULTS_ORDER,
        // Discussion and Conclusion share interpretive preferences
        Section::Discussion | Section::Conclusion => &DISCUSSION_ORDER,
        Section::References | Section::Other => &UNIVERSAL_TIE_ORDER,
    }
}

/// Pick the final label. Deterministic: identical inputs always yield the
/// identical label.
///
/// Policy, in order:
/// 1. REFERENCES, or no rule fired at all, returns OTHER — except a
///    match-less unit in RESULTS still returns Result (section trust: lack
///    of rule coverage there is assumed to still be a result statement).
/// 2. Maximum score and the set of labels achieving it.
/// 3. Ties resolved by the section's preferred order.
/// 4. Near-tie promotion: the first label in that order within 1 point of
///    the maximum is promoted over the tie-break winner.
/// 5. Hard postfix corrections, each a narrow override for a known
///    confusion, applied as sequential ifs in this fixed order.
pub fn resolve_label(scores: &ScoreVector, flags: &Flags, had_matches: bool) -> Label {
    if flags.section == Section::References || !had_matches {
        return if flags.section == Section::Results {
            Label::Result
        } else {
            Label::Other
        };
    }

    let max = scores.max();
    let order = tie_order(flags.section);

    let candidates: Vec<Label> = Label::ROLES
        .iter()
        .copied()
        .filter(|label| scores.score(*label) == Some(max))
        .collect();
    let mut chosen = order
        .iter()
        .copied()
        .find(|label| candidates.contains(label))
        .unwrap_or(candidates[0]);

    // Near-tie promotion (delta <= 1): a label preferred over the chosen
    // one in this section that trails by at most one point wins instead.
    for preferred in order {
        if *preferred == chosen {
            break;
        }
        if let Some(score) = scores.score(*preferred) {
            if score >= max - 1 {
                chosen = *preferred;
                break;
            }
        }
    }

    // Postfix corrections
    if chosen == Label::Technique && flags.has_analysis_test {
        chosen = Label::Analysis;
    }
    if chosen == Label::Technique && flags.any_result_cue() {
        chosen = if matches!(
            flags.section,
            Section::Discussion | Section::Intro | Section::Abstract
        ) {
            Label::Conclusion
        } else {
            Label::Result
        };
    }
    if chosen == Label::Other && flags.has_experiment_ops {
        chosen = Label::Experiment;
    }
    if chosen == Label::Dataset && flags.has_significance {
        chosen = Label::Result;
    }

    chosen
}
