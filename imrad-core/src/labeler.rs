use crate::config::{LabelerConfig, RuleSpec};
use crate::matcher::{RegexAnalyzer, SentenceAnalyzer};
use crate::rules::{
    apply_boosts, apply_citation_soft, derive_flags, looks_like_reference, resolve_label,
    score_unit,
};
use crate::spans::merge_adjacent;
use crate::types::{Label, LabeledUnit, SentenceUnit, Span};
use anyhow::Result;

/// Per-unit decision pipeline: hit aggregation → flags → boosts →
/// resolution → suppression filters. Each unit is processed to completion
/// before the next, in document reading order; all per-unit state is local
/// and discarded after the decision.
pub struct SentenceLabeler {
    analyzer: Box<dyn SentenceAnalyzer>,
    citation_soft: bool,
}

impl SentenceLabeler {
    pub fn new(analyzer: Box<dyn SentenceAnalyzer>, citation_soft: bool) -> Self {
        Self {
            analyzer,
            citation_soft,
        }
    }

    /// Build the labeler from a configuration: rule spec (file or builtin),
    /// analyzer model, citation-soft toggle. Rule identifiers with no known
    /// label prefix are reported and ignored for scoring, not fatal.
    pub fn from_config(config: &LabelerConfig) -> Result<Self> {
        let spec = match &config.rules {
            Some(path) => {
                println!("📁 Loading rule spec from: {path}");
                RuleSpec::load_from_file(path)?
            }
            None => RuleSpec::builtin(),
        };
        for id in spec.unknown_prefixes() {
            eprintln!("⚠️  Rule `{id}` has no known label prefix and will never score");
        }
        let analyzer = RegexAnalyzer::new(&spec, &config.model)?;
        Ok(Self::new(Box::new(analyzer), config.citation_soft))
    }

    /// Label one sentence unit.
    pub fn label_unit(&self, idx: usize, unit: &SentenceUnit) -> Result<LabeledUnit> {
        let features = self.analyzer.analyze(&unit.text)?;
        let (mut scores, matches) =
            score_unit(&features.hits, unit.section, unit.has_structural_citation);
        let flags = derive_flags(
            &matches,
            unit.section,
            &features.lemmas,
            unit.has_structural_citation,
            &unit.text,
        );
        apply_boosts(&mut scores, &flags);

        let had_matches = !matches.is_empty();
        let mut label = resolve_label(&scores, &flags, had_matches);

        // Suppression filters; the reference-looks override runs last.
        label = apply_citation_soft(
            label,
            &matches,
            unit.has_structural_citation,
            self.citation_soft,
        );
        if looks_like_reference(&unit.text) {
            label = Label::Other;
        }

        Ok(LabeledUnit {
            idx,
            label,
            section: unit.section,
            text: unit.text.clone(),
            page: unit.page,
            bbox: unit.bbox,
            is_caption: unit.is_caption,
            caption_kind: unit.caption_kind.clone(),
            scores,
            matches,
        })
    }

    /// Label units in document reading order, skipping empty text.
    pub fn label_units(&self, units: &[SentenceUnit]) -> Result<Vec<LabeledUnit>> {
        let mut labeled = Vec::with_capacity(units.len());
        for unit in units {
            if unit.text.trim().is_empty() {
                continue;
            }
            labeled.push(self.label_unit(labeled.len(), unit)?);
        }
        Ok(labeled)
    }

    /// Label units and coalesce the decision stream into spans.
    pub fn label_and_merge(&self, units: &[SentenceUnit]) -> Result<(Vec<LabeledUnit>, Vec<Span>)> {
        let labeled = self.label_units(units)?;
        let spans = merge_adjacent(&labeled);
        Ok((labeled, spans))
    }
}
