use crate::types::{Flags, Label, ScoreVector, Section};

// Tunable boost weights, applied in a fixed order. Boosts are cumulative: a
// unit may receive several.
pub const ANALYSIS_BOOST: i32 = 3;
pub const RESULT_BOOST: i32 = 3;
pub const HYP_INTRO_BOOST: i32 = 2;
pub const EXPERIMENT_BOOST: i32 = 2;
pub const TECHNIQUE_BOOST: i32 = 2;
pub const DATASET_NO_SIG_BOOST: i32 = 2;
pub const CITATION_INTRO_BOOST: i32 = 1;
pub const ABS_HEAD_BOOST: i32 = 2;
pub const PCT_LIST_BOOST: i32 = 1;
pub const DATASET_SECTION_BOOST: i32 = 1;
pub const HYP_OVER_TECH_BOOST: i32 = 2;
pub const TECH_PENALTY: i32 = 1;

/// Apply the fixed table of conditional additive adjustments.
///
/// Policy points worth noting:
/// - Dataset is boosted only without a significance signal, so sentences
///   that really report a statistical outcome are not absorbed.
/// - The citation boost to Input Fact applies only in INTRO/ABSTRACT.
/// - In ABSTRACT, header-style markers add directly to Result/Conclusion
///   and a dense percentage list nudges Result.
/// - When hypothesis-surface evidence coexists with a non-zero Technique
///   score in INTRO/ABSTRACT, Hypothesis is boosted and Technique is
///   penalized — "using/with" phrasing in an aims statement is a goal, not
///   a technique.
pub fn apply_boosts(scores: &mut ScoreVector, flags: &Flags) {
    if flags.has_analysis_test {
        scores.add(Label::Analysis, ANALYSIS_BOOST);
    }
    if flags.any_result_cue() {
        scores.add(Label::Result, RESULT_BOOST);
    }
    if flags.has_hyp_intro {
        scores.add(Label::Hypothesis, HYP_INTRO_BOOST);
    }
    if flags.has_experiment_ops {
        scores.add(Label::Experiment, EXPERIMENT_BOOST);
    }
    if flags.has_tech_using || flags.has_scale_classification {
        scores.add(Label::Technique, TECHNIQUE_BOOST);
    }
    if flags.has_dataset_cues && !flags.has_significance {
        scores.add(Label::Dataset, DATASET_NO_SIG_BOOST);
    }
    if flags.is_intro_like && flags.has_citation_rule {
        scores.add(Label::InputFact, CITATION_INTRO_BOOST);
    }

    // ABSTRACT: header markers and percent lists point at Result/Conclusion
    if flags.section == Section::Abstract {
        if flags.has_abs_head_results {
            scores.add(Label::Result, ABS_HEAD_BOOST);
        }
        if flags.has_abs_head_conc {
            scores.add(Label::Conclusion, ABS_HEAD_BOOST);
        }
        if flags.has_pct_list {
            scores.add(Label::Result, PCT_LIST_BOOST);
        }
    }

    // ABSTRACT/METHODS: dataset cues with no stronger signal help Dataset
    if matches!(flags.section, Section::Abstract | Section::Methods)
        && flags.has_dataset_cues
        && !(flags.has_significance || flags.has_analysis_test)
    {
        scores.add(Label::Dataset, DATASET_SECTION_BOOST);
    }

    // INTRO/ABSTRACT: aims statements outweigh the technique reading
    if flags.is_intro_like
        && flags.has_hyp_surface_any
        && scores.score(Label::Technique).unwrap_or(0) > 0
    {
        scores.add(Label::Hypothesis, HYP_OVER_TECH_BOOST);
        scores.add(Label::Technique, -TECH_PENALTY);
    }
}
