//! Decision engine tests.
//!
//! The resolver's near-tie promotion and postfix corrections interact —
//! several can arm on the same unit — so the resolver module exercises
//! stacked configurations explicitly rather than assuming the policy is
//! confluent by construction.

use imrad_labeler_core::config::STRUCT_CIT_RULE;
use imrad_labeler_core::rules::boosts::apply_boosts;
use imrad_labeler_core::rules::flags::derive_flags;
use imrad_labeler_core::rules::resolve::resolve_label;
use imrad_labeler_core::rules::scoring::score_unit;
use imrad_labeler_core::rules::suppression::{apply_citation_soft, looks_like_reference};
use imrad_labeler_core::spans::merge_adjacent;
use imrad_labeler_core::types::{
    Flags, HitMap, Label, LabeledUnit, Rect, RuleHits, ScoreVector, Section, SentenceUnit,
};
use imrad_labeler_core::{LabelerConfig, SentenceLabeler};

// ============================================================================
// Helpers
// ============================================================================

fn labeler(citation_soft: bool) -> SentenceLabeler {
    let config = LabelerConfig {
        citation_soft,
        ..Default::default()
    };
    SentenceLabeler::from_config(&config).expect("builtin config should construct")
}

fn unit(text: &str, section: Section) -> SentenceUnit {
    SentenceUnit {
        text: text.to_string(),
        page: 0,
        bbox: Rect::ZERO,
        section,
        has_structural_citation: false,
        is_caption: false,
        caption_kind: String::new(),
    }
}

fn flags_for(section: Section) -> Flags {
    Flags {
        section,
        is_intro_like: section.is_intro_like(),
        ..Default::default()
    }
}

fn scores_of(entries: &[(Label, i32)]) -> ScoreVector {
    let mut scores = ScoreVector::default();
    for (label, weight) in entries {
        scores.add(*label, *weight);
    }
    scores
}

fn labeled(label: Label, page: u32, text: &str, bbox: Rect) -> LabeledUnit {
    LabeledUnit {
        idx: 0,
        label,
        section: Section::Results,
        text: text.to_string(),
        page,
        bbox,
        is_caption: false,
        caption_kind: String::new(),
        scores: ScoreVector::default(),
        matches: HitMap::new(),
    }
}

// ============================================================================
// Score aggregation
// ============================================================================

mod scoring {
    use super::*;

    #[test]
    fn surface_hits_add_one_relational_add_two() {
        let mut hits = RuleHits::default();
        hits.record_surface("HYP_SURFACE", 1);
        hits.record_relational("HYP_THAT", 2);

        let (scores, matches) = score_unit(&hits, Section::Other, false);
        assert_eq!(scores.score(Label::Hypothesis), Some(1 + 2 * 2));
        assert_eq!(matches.get("HYP_SURFACE"), Some(&1));
        assert_eq!(matches.get("HYP_THAT"), Some(&2));
    }

    #[test]
    fn citation_rules_carry_input_fact_bonus() {
        let mut hits = RuleHits::default();
        hits.record_surface("INF_CIT_DOI", 1);

        let (scores, _) = score_unit(&hits, Section::Other, false);
        // +1 for the INF_ prefix, +3 for the citation family
        assert_eq!(scores.score(Label::InputFact), Some(4));
    }

    #[test]
    fn section_priors_added_unconditionally() {
        let (scores, _) = score_unit(&RuleHits::default(), Section::Methods, false);
        assert_eq!(scores.score(Label::Experiment), Some(2));
        assert_eq!(scores.score(Label::Technique), Some(2));
        assert_eq!(scores.score(Label::Dataset), Some(1));
        assert_eq!(scores.score(Label::Analysis), Some(1));
        assert_eq!(scores.score(Label::Result), Some(0));
    }

    #[test]
    fn structural_citation_adds_bonus_and_synthetic_hit() {
        let (scores, matches) = score_unit(&RuleHits::default(), Section::Other, true);
        assert_eq!(scores.score(Label::InputFact), Some(4));
        assert_eq!(matches.get(STRUCT_CIT_RULE), Some(&1));
    }

    #[test]
    fn unknown_prefix_scores_nothing_but_registers_hit() {
        let mut hits = RuleHits::default();
        hits.record_surface("FOO_BAR", 3);

        let (scores, matches) = score_unit(&hits, Section::Other, false);
        for role in Label::ROLES {
            assert_eq!(scores.score(role), Some(0), "{role} should be unscored");
        }
        assert_eq!(matches.get("FOO_BAR"), Some(&3));
    }

    #[test]
    fn score_vector_serializes_exactly_the_eight_role_keys() {
        let json = serde_json::to_value(ScoreVector::default()).unwrap();
        let obj = json.as_object().expect("score vector is a map");
        assert_eq!(obj.len(), 8);
        for role in Label::ROLES {
            assert_eq!(obj.get(role.as_str()), Some(&serde_json::json!(0)));
        }
    }
}

// ============================================================================
// Flags
// ============================================================================

mod flags {
    use super::*;

    fn hit_map(entries: &[(&str, u32)]) -> HitMap {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn significance_from_lemmas_or_stats() {
        let lemmas = vec!["significantly".to_string()];
        let flags = derive_flags(&HitMap::new(), Section::Results, &lemmas, false, "");
        assert!(flags.has_significance_word);
        assert!(flags.has_significance);

        let flags = derive_flags(
            &hit_map(&[("RES_STATS", 1)]),
            Section::Results,
            &[],
            false,
            "",
        );
        assert!(!flags.has_significance_word);
        assert!(flags.has_significance);
    }

    #[test]
    fn abstract_flags_only_in_abstract() {
        let matches = hit_map(&[("RES_ABS_HEAD_RESULTS", 1), ("CONC_ABS_HEAD", 1)]);
        let text = "Results: 40% vs 20%.";

        let in_abs = derive_flags(&matches, Section::Abstract, &[], false, text);
        assert!(in_abs.has_abs_head_results);
        assert!(in_abs.has_abs_head_conc);
        assert!(in_abs.has_pct_list);

        let in_methods = derive_flags(&matches, Section::Methods, &[], false, text);
        assert!(!in_methods.has_abs_head_results);
        assert!(!in_methods.has_abs_head_conc);
        assert!(!in_methods.has_pct_list);
    }

    #[test]
    fn hyp_intro_requires_intro_like_section() {
        let matches = hit_map(&[("HYP_SURFACE", 1)]);
        assert!(derive_flags(&matches, Section::Intro, &[], false, "").has_hyp_intro);
        assert!(derive_flags(&matches, Section::Abstract, &[], false, "").has_hyp_intro);
        assert!(!derive_flags(&matches, Section::Methods, &[], false, "").has_hyp_intro);
        assert!(derive_flags(&matches, Section::Methods, &[], false, "").has_hyp_surface_any);
    }

    #[test]
    fn structural_citation_counts_as_citation_rule() {
        let flags = derive_flags(&HitMap::new(), Section::Intro, &[], true, "");
        assert!(flags.has_citation_rule);
    }
}

// ============================================================================
// Boosts
// ============================================================================

mod boosts {
    use super::*;

    #[test]
    fn dataset_boost_blocked_by_significance() {
        let mut with_sig = flags_for(Section::Results);
        with_sig.has_dataset_cues = true;
        with_sig.has_significance = true;
        let mut scores = ScoreVector::default();
        apply_boosts(&mut scores, &with_sig);
        assert_eq!(scores.score(Label::Dataset), Some(0));

        let mut without_sig = flags_for(Section::Results);
        without_sig.has_dataset_cues = true;
        let mut scores = ScoreVector::default();
        apply_boosts(&mut scores, &without_sig);
        assert_eq!(scores.score(Label::Dataset), Some(2));
    }

    #[test]
    fn citation_boost_only_in_intro_like_sections() {
        let mut flags = flags_for(Section::Methods);
        flags.has_citation_rule = true;
        let mut scores = ScoreVector::default();
        apply_boosts(&mut scores, &flags);
        assert_eq!(scores.score(Label::InputFact), Some(0));

        let mut flags = flags_for(Section::Intro);
        flags.has_citation_rule = true;
        let mut scores = ScoreVector::default();
        apply_boosts(&mut scores, &flags);
        assert_eq!(scores.score(Label::InputFact), Some(1));
    }

    #[test]
    fn aims_statement_outweighs_technique_reading() {
        let mut flags = flags_for(Section::Intro);
        flags.has_hyp_surface_any = true;
        let mut scores = scores_of(&[(Label::Technique, 2)]);
        apply_boosts(&mut scores, &flags);
        assert_eq!(scores.score(Label::Hypothesis), Some(2));
        assert_eq!(scores.score(Label::Technique), Some(1));

        // no technique evidence, no penalty
        let mut scores = ScoreVector::default();
        apply_boosts(&mut scores, &flags);
        assert_eq!(scores.score(Label::Hypothesis), Some(0));
        assert_eq!(scores.score(Label::Technique), Some(0));
    }

    #[test]
    fn abstract_header_markers_boost_result_and_conclusion() {
        let mut flags = flags_for(Section::Abstract);
        flags.has_abs_head_results = true;
        flags.has_abs_head_conc = true;
        flags.has_pct_list = true;
        let mut scores = ScoreVector::default();
        apply_boosts(&mut scores, &flags);
        assert_eq!(scores.score(Label::Result), Some(3));
        assert_eq!(scores.score(Label::Conclusion), Some(2));
    }
}

// ============================================================================
// Resolver: tie-breaks, near-tie promotion, postfix corrections
// ============================================================================

mod resolver {
    use super::*;

    #[test]
    fn references_always_other() {
        let scores = scores_of(&[(Label::Result, 10), (Label::Conclusion, 8)]);
        let label = resolve_label(&scores, &flags_for(Section::References), true);
        assert_eq!(label, Label::Other);
    }

    #[test]
    fn no_matches_is_other_except_results_section() {
        let scores = ScoreVector::default();
        for section in [
            Section::Intro,
            Section::Abstract,
            Section::Methods,
            Section::Discussion,
            Section::Conclusion,
            Section::Other,
        ] {
            assert_eq!(
                resolve_label(&scores, &flags_for(section), false),
                Label::Other,
                "match-less unit in {section} should be OTHER"
            );
        }
        assert_eq!(
            resolve_label(&scores, &flags_for(Section::Results), false),
            Label::Result,
            "section trust: match-less RESULTS unit stays Result"
        );
    }

    #[test]
    fn ties_resolved_by_section_order() {
        let scores = scores_of(&[(Label::Technique, 3), (Label::Experiment, 3)]);
        assert_eq!(
            resolve_label(&scores, &flags_for(Section::Methods), true),
            Label::Technique
        );

        let scores = scores_of(&[(Label::Result, 3), (Label::Conclusion, 3)]);
        assert_eq!(
            resolve_label(&scores, &flags_for(Section::Discussion), true),
            Label::Conclusion
        );
    }

    #[test]
    fn near_tie_promotes_section_preferred_label() {
        let scores = scores_of(&[(Label::Experiment, 5), (Label::Technique, 4)]);
        assert_eq!(
            resolve_label(&scores, &flags_for(Section::Methods), true),
            Label::Technique
        );
    }

    #[test]
    fn two_point_gap_is_not_a_near_tie() {
        let scores = scores_of(&[(Label::Experiment, 5), (Label::Technique, 3)]);
        assert_eq!(
            resolve_label(&scores, &flags_for(Section::Methods), true),
            Label::Experiment
        );
    }

    #[test]
    fn universal_order_applies_outside_known_sections() {
        let scores = scores_of(&[(Label::Result, 2), (Label::Conclusion, 2)]);
        assert_eq!(
            resolve_label(&scores, &flags_for(Section::Other), true),
            Label::Conclusion
        );

        // Hypothesis is absent from the universal order but still wins when
        // it is the sole maximum
        let scores = scores_of(&[(Label::Hypothesis, 5)]);
        assert_eq!(
            resolve_label(&scores, &flags_for(Section::Other), true),
            Label::Hypothesis
        );
    }

    #[test]
    fn postfix_technique_with_analysis_evidence() {
        let mut flags = flags_for(Section::Methods);
        flags.has_analysis_test = true;
        let scores = scores_of(&[(Label::Technique, 6)]);
        assert_eq!(resolve_label(&scores, &flags, true), Label::Analysis);
    }

    #[test]
    fn postfix_technique_with_result_evidence_by_section() {
        let scores = scores_of(&[(Label::Technique, 6)]);

        let mut methods = flags_for(Section::Methods);
        methods.has_res_stats = true;
        assert_eq!(resolve_label(&scores, &methods, true), Label::Result);

        for section in [Section::Discussion, Section::Intro, Section::Abstract] {
            let mut interpretive = flags_for(section);
            interpretive.has_res_verb_cues = true;
            assert_eq!(
                resolve_label(&scores, &interpretive, true),
                Label::Conclusion,
                "interpretive section {section} corrects Technique to Conclusion"
            );
        }
    }

    #[test]
    fn postfix_dataset_with_significance() {
        let mut flags = flags_for(Section::Methods);
        flags.has_significance = true;
        let scores = scores_of(&[(Label::Dataset, 6)]);
        assert_eq!(resolve_label(&scores, &flags, true), Label::Result);
    }

    #[test]
    fn corrections_apply_sequentially_first_match_wins() {
        // Both the analysis and the result corrections are armed; the
        // analysis one fires first and the result one no longer sees
        // Technique.
        let mut flags = flags_for(Section::Methods);
        flags.has_analysis_test = true;
        flags.has_res_stats = true;
        let scores = scores_of(&[(Label::Technique, 6)]);
        assert_eq!(resolve_label(&scores, &flags, true), Label::Analysis);
    }

    #[test]
    fn promotion_can_feed_a_postfix_correction() {
        // Technique wins on raw score, Dataset is promoted by the RESULTS
        // order near-tie, then the significance correction turns it into
        // Result.
        let mut flags = flags_for(Section::Results);
        flags.has_significance_word = true;
        flags.has_significance = true;
        let scores = scores_of(&[(Label::Technique, 5), (Label::Dataset, 4)]);
        assert_eq!(resolve_label(&scores, &flags, true), Label::Result);
    }

    #[test]
    fn resolution_is_deterministic() {
        let scores = scores_of(&[
            (Label::Result, 3),
            (Label::Analysis, 3),
            (Label::Dataset, 3),
        ]);
        let flags = flags_for(Section::Results);
        let first = resolve_label(&scores, &flags, true);
        for _ in 0..100 {
            assert_eq!(resolve_label(&scores, &flags, true), first);
        }
    }
}

// ============================================================================
// Suppression filters
// ============================================================================

mod suppression {
    use super::*;

    #[test]
    fn bibliography_markers_look_like_references() {
        assert!(looks_like_reference("Journal of Testing, vol. 12, pp. 33-41"));
        assert!(looks_like_reference("ISSN 1234-5678"));
        assert!(looks_like_reference("Proc. ACM, 2019, 1123-1130"));
    }

    #[test]
    fn prose_does_not_look_like_a_reference() {
        assert!(!looks_like_reference("We measured outcomes during 2019."));
        assert!(!looks_like_reference("The assay was repeated three times."));
    }

    #[test]
    fn citation_only_input_fact_downgraded_in_soft_mode() {
        let matches: HitMap = [("INF_CIT_ETAL_YEAR".to_string(), 1)].into_iter().collect();
        assert_eq!(
            apply_citation_soft(Label::InputFact, &matches, false, true),
            Label::Other
        );
        // disabled mode leaves it alone
        assert_eq!(
            apply_citation_soft(Label::InputFact, &matches, false, false),
            Label::InputFact
        );
        // a structural citation exempts the unit
        assert_eq!(
            apply_citation_soft(Label::InputFact, &matches, true, true),
            Label::InputFact
        );
    }

    #[test]
    fn supporting_evidence_blocks_the_downgrade() {
        let matches: HitMap = [
            ("INF_CIT_ETAL_YEAR".to_string(), 1),
            ("INF_SURFACE".to_string(), 1),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            apply_citation_soft(Label::InputFact, &matches, false, true),
            Label::InputFact
        );
    }

    #[test]
    fn non_input_fact_labels_untouched() {
        let matches: HitMap = [("INF_CIT_DOI".to_string(), 1)].into_iter().collect();
        assert_eq!(
            apply_citation_soft(Label::Result, &matches, false, true),
            Label::Result
        );
    }
}

// ============================================================================
// End-to-end pipeline with the builtin rule table
// ============================================================================

mod pipeline {
    use super::*;

    #[test]
    fn hypothesis_statement_in_intro() {
        let labeler = labeler(false);
        let decision = labeler
            .label_unit(0, &unit("We hypothesize that treatment X reduces outcome Y.", Section::Intro))
            .unwrap();
        assert_eq!(decision.label, Label::Hypothesis);
        assert!(decision.scores.score(Label::Hypothesis).unwrap() > 0);
        assert!(decision.matches.contains_key("HYP_SURFACE"));
    }

    #[test]
    fn statistical_outcome_in_results() {
        let labeler = labeler(false);
        let decision = labeler
            .label_unit(0, &unit("Our results show a 23% reduction (p<0.05).", Section::Results))
            .unwrap();
        assert_eq!(decision.label, Label::Result);
        assert!(decision.matches.contains_key("RES_STATS"));
        assert!(decision.matches.contains_key("RES_VERB_CUES"));
    }

    #[test]
    fn structural_citation_yields_input_fact() {
        let labeler = labeler(false);
        let mut cited = unit("Smith et al., 2019 reported similar findings.", Section::Intro);
        cited.has_structural_citation = true;
        let decision = labeler.label_unit(0, &cited).unwrap();
        assert_eq!(decision.label, Label::InputFact);
        assert_eq!(decision.matches.get(STRUCT_CIT_RULE), Some(&1));
    }

    #[test]
    fn bare_citation_downgraded_under_soft_mode() {
        let text = "(Smith et al., 2010).";
        let soft = labeler(true)
            .label_unit(0, &unit(text, Section::Intro))
            .unwrap();
        assert_eq!(soft.label, Label::Other);

        let hard = labeler(false)
            .label_unit(0, &unit(text, Section::Intro))
            .unwrap();
        assert_eq!(hard.label, Label::InputFact);
    }

    #[test]
    fn matchless_unit_trusts_results_section_only() {
        let labeler = labeler(false);
        let text = "Qwerty asdfgh zxcvb.";

        let in_results = labeler.label_unit(0, &unit(text, Section::Results)).unwrap();
        assert!(in_results.matches.is_empty(), "fixture text must not hit rules");
        assert_eq!(in_results.label, Label::Result);

        let in_intro = labeler.label_unit(0, &unit(text, Section::Intro)).unwrap();
        assert_eq!(in_intro.label, Label::Other);
    }

    #[test]
    fn references_section_is_always_other() {
        let labeler = labeler(false);
        let decision = labeler
            .label_unit(0, &unit("Our results show a 23% reduction (p<0.05).", Section::References))
            .unwrap();
        assert_eq!(decision.label, Label::Other);
    }

    #[test]
    fn bibliography_tail_suppressed_anywhere() {
        let labeler = labeler(false);
        let decision = labeler
            .label_unit(
                0,
                &unit("Smith J. Cancer Research, vol. 12, pp. 101-109, 2019.", Section::Discussion),
            )
            .unwrap();
        assert_eq!(decision.label, Label::Other);
    }

    #[test]
    fn empty_units_are_skipped_not_errors() {
        let labeler = labeler(false);
        let units = vec![
            unit("", Section::Intro),
            unit("   ", Section::Intro),
            unit("We hypothesize that X holds.", Section::Intro),
        ];
        let labeled = labeler.label_units(&units).unwrap();
        assert_eq!(labeled.len(), 1);
        assert_eq!(labeled[0].idx, 0);
    }

    #[test]
    fn unknown_model_is_fatal() {
        let config = LabelerConfig {
            model: "en_core_web_sm".to_string(),
            ..Default::default()
        };
        assert!(SentenceLabeler::from_config(&config).is_err());
    }
}

// ============================================================================
// Span merging & rectangle algebra
// ============================================================================

mod spans {
    use super::*;

    #[test]
    fn consecutive_same_label_same_page_units_merge() {
        let units = vec![
            labeled(Label::Result, 3, "First result.", Rect::new(10.0, 10.0, 50.0, 20.0)),
            labeled(Label::Result, 3, "Second result.", Rect::new(12.0, 22.0, 60.0, 32.0)),
        ];
        let spans = merge_adjacent(&units);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "First result. Second result.");
        assert_eq!(spans[0].bbox, Rect::new(10.0, 10.0, 60.0, 32.0));
        assert!(spans[0].bbox.contains(&units[0].bbox));
        assert!(spans[0].bbox.contains(&units[1].bbox));
    }

    #[test]
    fn label_or_page_change_closes_the_span() {
        let units = vec![
            labeled(Label::Result, 3, "A.", Rect::ZERO),
            labeled(Label::Analysis, 3, "B.", Rect::ZERO),
            labeled(Label::Analysis, 4, "C.", Rect::ZERO),
        ];
        let spans = merge_adjacent(&units);
        assert_eq!(spans.len(), 3);
    }

    #[test]
    fn merge_is_idempotent() {
        let units = vec![
            labeled(Label::Result, 1, "A.", Rect::new(0.0, 0.0, 10.0, 10.0)),
            labeled(Label::Result, 1, "B.", Rect::new(0.0, 12.0, 10.0, 22.0)),
            labeled(Label::Conclusion, 1, "C.", Rect::new(0.0, 24.0, 10.0, 34.0)),
            labeled(Label::Conclusion, 2, "D.", Rect::new(0.0, 0.0, 10.0, 10.0)),
        ];
        let once = merge_adjacent(&units);

        // re-feed the spans as units; merging must be a fixed point
        let as_units: Vec<LabeledUnit> = once
            .iter()
            .map(|s| labeled(s.label, s.page, &s.text, s.bbox))
            .collect();
        let twice = merge_adjacent(&as_units);
        assert_eq!(once, twice);
    }

    #[test]
    fn rect_union_is_associative_and_commutative() {
        let a = Rect::new(0.0, 5.0, 10.0, 15.0);
        let b = Rect::new(-3.0, 8.0, 6.0, 30.0);
        let c = Rect::new(2.0, -1.0, 20.0, 4.0);

        assert_eq!(a.union(&b), b.union(&a));
        assert_eq!(a.union(&b).union(&c), a.union(&b.union(&c)));
        assert_eq!(b.union(&a).union(&c), c.union(&b).union(&a));
    }
}
