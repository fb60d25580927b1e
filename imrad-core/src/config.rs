use crate::types::Label;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

// ===== IDENTIFIER CONVENTION =====
// Rule identifiers carry their target label as a prefix. This convention is
// the only part of the rule content the engine depends on; everything else
// in a rule specification is opaque pattern data.

pub const PREFIX_TO_LABEL: [(&str, Label); 8] = [
    ("INF_", Label::InputFact),
    ("HYP_", Label::Hypothesis),
    ("EXP_", Label::Experiment),
    ("TEC_", Label::Technique),
    ("RES_", Label::Result),
    ("DATA_", Label::Dataset),
    ("ANA_", Label::Analysis),
    ("CONC_", Label::Conclusion),
];

/// Citation-rule family prefix. Rules in this family score Input Fact extra
/// and are the subject of the citation-soft suppression filter.
pub const CIT_RULE_PREFIX: &str = "INF_CIT_";

/// Synthetic hit registered when a unit carries a structural citation
/// marker, so downstream logic can tell structural from textual evidence.
pub const STRUCT_CIT_RULE: &str = "INF_CIT_STRUCT";

/// Label a rule identifier scores for, by prefix. `None` for unknown
/// prefixes — those rules never score (config typos, not corruption).
pub fn label_for_rule(id: &str) -> Option<Label> {
    PREFIX_TO_LABEL
        .iter()
        .find(|(prefix, _)| id.starts_with(prefix))
        .map(|(_, label)| *label)
}

/// Whether a hit belongs to the citation-rule family.
pub fn is_citation_rule(id: &str) -> bool {
    id.starts_with(CIT_RULE_PREFIX) || id == "INF_CITATION"
}

// ===== RULE SPECIFICATION =====

/// Externally supplied table mapping rule identifiers to pattern
/// definitions, partitioned into surface (shallow token) and relational
/// (syntactic relation) families. Pattern content is opaque to the decision
/// engine; only the identifier prefix convention above is load-bearing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSpec {
    #[serde(default)]
    pub surface: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub relational: BTreeMap<String, Vec<String>>,
}

impl RuleSpec {
    /// Load a rule specification from a YAML or JSON file, by extension.
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read rule spec: {path}"))?;
        let spec = if Path::new(path)
            .extension()
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
        {
            serde_json::from_str(&content)
                .with_context(|| format!("invalid JSON rule spec: {path}"))?
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("invalid YAML rule spec: {path}"))?
        };
        Ok(spec)
    }

    /// Rule identifiers whose prefix maps to no label. These still register
    /// hits but never contribute to any score.
    pub fn unknown_prefixes(&self) -> Vec<String> {
        self.surface
            .keys()
            .chain(self.relational.keys())
            .filter(|id| label_for_rule(id).is_none())
            .cloned()
            .collect()
    }

    /// The bundled default rule table. Surface patterns are shallow lexical
    /// cues; relational patterns are long-range renditions of
    /// verb–argument relations, matched by the bundled analyzer.
    pub fn builtin() -> Self {
        let mut spec = RuleSpec::default();

        let surface: &[(&str, &[&str])] = &[
            // RESULT
            (
                "RES_VERB_CUES",
                &[
                    r"(?i)\b(?:our|these)\s+(?:results|findings)\s+(?:show|indicate|demonstrate|reveal|suggest)",
                    r"(?i)\bwe\s+(?:show(?:ed)?|find|found|observed?|demonstrated?|indicated?|reveal(?:ed)?|report(?:ed)?)\b",
                ],
            ),
            (
                "RES_STATS",
                &[
                    r"(?i)\bp(?:-value)?\s*(?:<|≤|<=)\s*\d",
                    r"(?i)\d+(?:\.\d+)?\s*%\s*(?:increase|decrease|improvement|reduction)",
                    r"(?i)\d+(?:\.\d+)?\s*%\s*ci\b",
                    r"(?i)\b(?:odds|hazard)\s+ratio\b",
                    r"(?i)\b(?:rmse|auc|auroc|accuracy|precision|recall|sensitivity|specificity)\b",
                    r"(?i)\bcompared\s+to\b",
                    r"(?i)\bachieved\b",
                    r"(?i)\byielded\b",
                ],
            ),
            // ABSTRACT header markers ("Results:", "Conclusions:")
            ("RES_ABS_HEAD_RESULTS", &[r"(?i)^\s*results?\s*:"]),
            ("CONC_ABS_HEAD", &[r"(?i)^\s*conclusions?\s*:"]),
            // EXPERIMENT
            (
                "EXP_SURFACE",
                &[
                    r"(?i)\bwe\s+(?:conduct(?:ed)?|perform(?:ed)?|ran|run|carr(?:y|ied)|implement(?:ed)?)\b",
                    r"(?i)\bwe\s+(?:measured?|collect(?:ed)?|recruit(?:ed)?|randomi[sz]ed?|enroll(?:ed)?|administer(?:ed)?)\b",
                    r"(?i)\b(?:trial|experiments?|study)\b",
                    r"(?i)\b(?:placebo|control(?:led)?|double-blind|randomi[sz]ed)\b",
                    r"(?i)\bn\s*=\s*\d+",
                ],
            ),
            // TECHNIQUE
            (
                "TEC_SURFACE",
                &[
                    r"(?i)\b(?:using|with|via|through|by)\s+(?:\w+\s+){0,3}?(?:methods?|techniques?|protocols?|assays?|algorithms?|pipelines?|architectures?|classifiers?|models?)\b",
                    r"(?i)\b(?:pcr|rt-pcr|western\s+blot|elisa|mass\s+spectrometry|mrna|rna-seq|immunohistochemistry|random\s+forest|svm|cox|kaplan-meier)\b",
                    r"(?i)\b(?:assays?|protocols?)\b",
                ],
            ),
            // DATASET
            (
                "DATA_SURFACE",
                &[
                    r"(?i)\b(?:datasets?|data|registry|cohort|biobank|database)\b",
                    r"(?i)\b(?:mimic(?:-iii|-iv)?|uk\s+biobank|eicu|clinicaltrials\.gov|tcga|physionet)\b",
                    r"(?i)\b(?:patients|participants|subjects)\b",
                    r"(?i)\bn\s*=\s*\d+",
                    r"(?i)\bnct\s*\d+",
                ],
            ),
            // ANALYSIS
            (
                "ANA_SURFACE",
                &[
                    r"(?i)\bwe\s+(?:analy[sz]ed?|assess(?:ed)?|evaluated?|model(?:l?ed)?|fit(?:ted)?|estimated?|adjust(?:ed)?|normali[sz]ed?|standardi[sz]ed?)\b",
                    r"(?i)\b(?:regression|logistic|linear|cox|anova|ancova|mixed-effects|multivariate|univariate)\b",
                    r"(?i)\b(?:kaplan-meier|survival|hazard|odds)\b",
                    r"(?i)\b(?:significance|bonferroni|fdr|multiple\s+testing)\b",
                ],
            ),
            // HYPOTHESIS
            (
                "HYP_SURFACE",
                &[
                    r"(?i)\b(?:we|our)\s+(?:hypothesi[sz]ed?|postulated?|posit(?:ed)?|predict(?:ed)?|proposed?)\b",
                    r"(?i)\b(?:we|our)\s+hypothes[ei]s\b",
                    r"(?i)\b(?:we|this|the)\s+(?:study\s+)?(?:aim(?:s|ed)?|seeks?|sought)\s+to\b",
                    r"(?i)\bwe\s+expect(?:ed)?\s+that\b",
                ],
            ),
            // INPUT FACT
            (
                "INF_SURFACE",
                &[
                    r"(?i)\b(?:according\s+to|given|based\s+on)\b",
                    r"(?i)\b(?:it|this)\s+is\s+(?:known|established|well-known)\b",
                    r"(?i)\b(?:prior|previous|existing)\s+(?:work|evidence|studies|literature)\b",
                    r"(?i)\b(?:guidelines|consensus|recommendations)\b",
                    r"(?i)\b(?:baseline|assumptions?|inclusion|exclusion|criteria)\b",
                ],
            ),
            // INPUT FACT: hard citation patterns
            ("INF_CIT_BRACK_NUM", &[r"\[\s*\d+(?:\s*[,–-]\s*\d+)*\s*\]"]),
            (
                "INF_CIT_PAREN_AUTHOR_YEAR",
                &[r"\([A-Z][A-Za-z-]+(?:\s+(?:et\s+al\.?|and\s+[A-Z][A-Za-z-]+))?,?\s+(?:19|20)\d{2}[a-z]?\)"],
            ),
            ("INF_CIT_PAREN_YEAR_ONLY", &[r"\((?:19|20)\d{2}[a-z]?\)"]),
            (
                "INF_CIT_ETAL_YEAR",
                &[r"[A-Z][A-Za-z-]+\s+et\s+al\.?,?\s+(?:19|20)\d{2}"],
            ),
            ("INF_CIT_DOI", &[r"(?i)\bdoi\s*:?\s*\S+"]),
            // CONCLUSION
            (
                "CONC_SURFACE",
                &[
                    r"(?i)\b(?:in|overall)\s+conclusion\b",
                    r"(?i)\b(?:in|overall)\s+summary\b",
                    r"(?i)\bwe\s+(?:concluded?|confirm(?:ed)?)\b",
                    r"(?i)\b(?:these|our|the)\s+(?:findings|results|data)\s+(?:support|suggest|highlight|underscore)\b",
                    r"(?i)\b(?:implications|clinical\s+practice|translation|future\s+directions)\b",
                ],
            ),
        ];

        let relational: &[(&str, &[&str])] = &[
            (
                "RES_WE_VERB",
                &[
                    r"(?i)\bwe\b[^.;]{0,60}?\b(?:show(?:ed)?|find|found|observed?|demonstrated?|indicated?|reveal(?:ed)?|suggest(?:ed)?|report(?:ed)?)\b",
                ],
            ),
            (
                "EXP_DOBJ",
                &[
                    r"(?i)\b(?:conduct(?:ed)?|perform(?:ed)?|ran|carried|measured?|used?|utili[sz]ed?|appl(?:y|ied)|calibrated?|assembled?|administer(?:ed)?)\b[^.;]{0,40}?\b(?:experiments?|study|trial|measurements?|setup|apparatus|assay)\b",
                ],
            ),
            (
                "TEC_USING",
                &[r"(?i)\b\w+(?:ed|es|ing|s)\s+(?:using|with|via|by|through)\b"],
            ),
            (
                "DATA_SOURCE",
                &[
                    r"(?i)\b(?:collect(?:ed)?|used?|utili[sz]ed?|obtain(?:ed)?|sourced?|recruit(?:ed)?|enroll(?:ed)?|included?)\b[^.;]{0,40}?\b(?:data(?:sets?)?|patients|participants|subjects|records|cohort)\b",
                ],
            ),
            (
                "ANA_DEP",
                &[
                    r"(?i)\b(?:analy[sz]ed?|evaluated?|assess(?:ed)?|model(?:l?ed)?|fit(?:ted)?|estimated?|adjust(?:ed)?)\s+(?:\w+\s+){0,2}?\w+",
                ],
            ),
            (
                "HYP_THAT",
                &[
                    r"(?i)\b(?:hypothesi[sz]ed?|postulated?|posit(?:ed)?|predict(?:ed)?|proposed?|expect(?:ed)?)\s+that\b",
                ],
            ),
            (
                "INF_CITATION",
                &[
                    r"(?i)\b(?:previously|earlier)\s+(?:report(?:ed)?|show(?:ed|n)?|demonstrated)\b",
                    r"(?i)\b(?:report(?:ed)?|show(?:ed|n)?|demonstrated)\b[^.;]{0,30}?\b(?:previously|earlier)\b",
                ],
            ),
            (
                "CONC_DEP",
                &[
                    r"(?i)\b(?:findings|results|data|study|analysis|we)\b[^.;]{0,40}?\b(?:concludes?|suggests?|supports?|confirms?|highlights?|underscores?)\b",
                ],
            ),
        ];

        for (id, patterns) in surface {
            spec.surface
                .insert(id.to_string(), patterns.iter().map(|p| p.to_string()).collect());
        }
        for (id, patterns) in relational {
            spec.relational
                .insert(id.to_string(), patterns.iter().map(|p| p.to_string()).collect());
        }
        spec
    }
}

// ===== LABELER CONFIGURATION =====

fn default_model() -> String {
    "en-basic".to_string()
}

/// Runtime configuration surface. Only these knobs affect a run: the rule
/// specification, the analyzer model, and the citation-soft filter toggle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelerConfig {
    /// Identifier of the linguistic model the analyzer loads.
    #[serde(default = "default_model")]
    pub model: String,
    /// Downgrade citation-only "Input Fact" decisions to OTHER.
    #[serde(default)]
    pub citation_soft: bool,
    /// Path to a rule specification file. The builtin table is used when unset.
    #[serde(default)]
    pub rules: Option<String>,
}

impl Default for LabelerConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            citation_soft: false,
            rules: None,
        }
    }
}

impl LabelerConfig {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {path}"))?;
        let config: LabelerConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("invalid config: {path}"))?;
        Ok(config)
    }

    /// Load config with fallback to defaults.
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|_| {
                eprintln!("⚠️  Failed to load config from {p}, using defaults");
                Self::default()
            }),
            None => Self::default(),
        }
    }
}
