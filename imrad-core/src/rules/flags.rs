use crate::types::{Flags, HitMap, Section};

/// Lemmas counted as significance vocabulary.
pub const SIGNIFICANCE_WORDS: [&str; 3] = ["significant", "significantly", "significance"];

const RES_SUMMARY_KEYS: [&str; 1] = ["RES_SUMMARY"];
const RES_VERB_CUE_KEYS: [&str; 2] = ["RES_VERB_CUES", "RES_WE_VERB"];
const RES_STATS_KEYS: [&str; 1] = ["RES_STATS"];
const ANALYSIS_KEYS: [&str; 3] = ["ANA_SURFACE", "ANA_DEP", "ANA_USING"];
const HYP_SURFACE_KEYS: [&str; 1] = ["HYP_SURFACE"];
const EXPERIMENT_KEYS: [&str; 2] = ["EXP_SURFACE", "EXP_DOBJ"];
const TECHNIQUE_KEYS: [&str; 2] = ["TEC_USING", "TEC_SURFACE"];
const DATASET_KEYS: [&str; 1] = ["DATA_SURFACE"];
const CITATION_RULE_KEYS: [&str; 5] = [
    "INF_CIT_BRACK_NUM",
    "INF_CIT_PAREN_AUTHOR_YEAR",
    "INF_CIT_PAREN_YEAR_ONLY",
    "INF_CIT_ETAL_YEAR",
    "INF_CIT_DOI",
];
const ABS_HEAD_RESULTS_KEYS: [&str; 1] = ["RES_ABS_HEAD_RESULTS"];
const ABS_HEAD_CONC_KEYS: [&str; 1] = ["CONC_ABS_HEAD"];

fn any_hit(matches: &HitMap, keys: &[&str]) -> bool {
    keys.iter().any(|k| matches.get(*k).copied().unwrap_or(0) > 0)
}

/// Compute the named signals for one unit. Deterministic over its inputs;
/// no flag mutates another. Abstract-specific flags (header-style markers,
/// dense percentage lists) are computed only when the section is ABSTRACT.
pub fn derive_flags(
    matches: &HitMap,
    section: Section,
    lemmas: &[String],
    has_structural_citation: bool,
    text: &str,
) -> Flags {
    let is_intro_like = section.is_intro_like();

    let has_res_stats = any_hit(matches, &RES_STATS_KEYS);
    let has_significance_word = lemmas
        .iter()
        .any(|lemma| SIGNIFICANCE_WORDS.contains(&lemma.as_str()));
    let has_hyp_surface_any = any_hit(matches, &HYP_SURFACE_KEYS);
    let has_tech_using = any_hit(matches, &TECHNIQUE_KEYS);

    let (has_abs_head_results, has_abs_head_conc, has_pct_list) = if section == Section::Abstract {
        (
            any_hit(matches, &ABS_HEAD_RESULTS_KEYS),
            any_hit(matches, &ABS_HEAD_CONC_KEYS),
            text.matches('%').count() >= 2,
        )
    } else {
        (false, false, false)
    };

    Flags {
        section,
        has_res_summary: any_hit(matches, &RES_SUMMARY_KEYS),
        has_res_verb_cues: any_hit(matches, &RES_VERB_CUE_KEYS),
        has_res_stats,
        has_analysis_test: any_hit(matches, &ANALYSIS_KEYS),
        is_intro_like,
        has_hyp_intro: has_hyp_surface_any && is_intro_like,
        has_experiment_ops: any_hit(matches, &EXPERIMENT_KEYS),
        has_tech_using,
        // scale/classification cues ship inside the technique patterns
        has_scale_classification: has_tech_using,
        has_dataset_cues: any_hit(matches, &DATASET_KEYS),
        has_citation_rule: any_hit(matches, &CITATION_RULE_KEYS) || has_structural_citation,
        has_significance_word,
        has_significance: has_res_stats || has_significance_word,
        has_abs_head_results,
        has_abs_head_conc,
        has_pct_list,
        has_hyp_surface_any,
    }
}
