// Linguistic analysis boundary.
//
// This module defines the boundary between linguistic analysis (raw sentence
// text -> rule hits + token features) and the decision engine (hits ->
// label). The analyzer abstraction allows different matching backends while
// the engine only ever sees rule identifiers and occurrence counts.

use crate::config::RuleSpec;
use anyhow::Result;
use regex::Regex;
use thiserror::Error;

/// Models the bundled analyzer knows how to load.
const SUPPORTED_MODELS: [&str; 2] = ["en-basic", "en-basic-lg"];

/// Fatal analyzer construction failures. The engine cannot meaningfully
/// degrade without a working analyzer, so these surface immediately and are
/// never retried.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("unknown linguistic model `{0}` (available: en-basic, en-basic-lg)")]
    UnknownModel(String),
    #[error("rule `{rule}` has an invalid pattern: {source}")]
    BadPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },
}

/// Per-unit output of linguistic analysis: the triggered rule multisets and
/// a lemma stream for lexical flags.
#[derive(Debug, Clone, Default)]
pub struct SentenceFeatures {
    pub hits: crate::types::RuleHits,
    pub lemmas: Vec<String>,
}

/// Analyzer trait — converts sentence text to rule hits and token features.
///
/// This is the key abstraction boundary of the labeler. Implementations
/// handle tokenization, lemmatization and pattern matching against a rule
/// specification; everything after this point works with rule identifiers
/// and is backend-agnostic. The bundled [`RegexAnalyzer`] matches both
/// families with compiled regex sets; a backend with a real dependency
/// parser can produce relational hits from parse trees instead.
pub trait SentenceAnalyzer {
    /// Analyze one sentence unit's text.
    fn analyze(&self, text: &str) -> Result<SentenceFeatures>;

    /// Analyzer name for logging.
    fn name(&self) -> &str;
}

/// Bundled analyzer: compiles the rule specification's pattern tables into
/// regex sets and produces lowercased token lemmas.
pub struct RegexAnalyzer {
    surface: Vec<(String, Vec<Regex>)>,
    relational: Vec<(String, Vec<Regex>)>,
}

impl RegexAnalyzer {
    pub fn new(spec: &RuleSpec, model: &str) -> Result<Self, AnalyzerError> {
        if !SUPPORTED_MODELS.contains(&model) {
            return Err(AnalyzerError::UnknownModel(model.to_string()));
        }
        Ok(Self {
            surface: compile_family(&spec.surface)?,
            relational: compile_family(&spec.relational)?,
        })
    }
}

fn compile_family(
    table: &std::collections::BTreeMap<String, Vec<String>>,
) -> Result<Vec<(String, Vec<Regex>)>, AnalyzerError> {
    let mut compiled = Vec::with_capacity(table.len());
    for (id, patterns) in table {
        let mut regexes = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let regex = Regex::new(pattern).map_err(|source| AnalyzerError::BadPattern {
                rule: id.clone(),
                source,
            })?;
            regexes.push(regex);
        }
        compiled.push((id.clone(), regexes));
    }
    Ok(compiled)
}

impl SentenceAnalyzer for RegexAnalyzer {
    fn analyze(&self, text: &str) -> Result<SentenceFeatures> {
        let mut features = SentenceFeatures::default();
        for (id, regexes) in &self.surface {
            let count: usize = regexes.iter().map(|r| r.find_iter(text).count()).sum();
            features.hits.record_surface(id, count as u32);
        }
        for (id, regexes) in &self.relational {
            let count: usize = regexes.iter().map(|r| r.find_iter(text).count()).sum();
            features.hits.record_relational(id, count as u32);
        }
        features.lemmas = lemmatize(text);
        Ok(features)
    }

    fn name(&self) -> &str {
        "regex-analyzer"
    }
}

/// Lowercased alphabetic tokens. Adequate for the lexical cues the flag
/// deriver checks, which are inflection-closed word lists.
fn lemmatize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '-'))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}
