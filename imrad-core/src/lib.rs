// IMRaD Labeler Core Library
//
// Assigns rhetorical-role labels (Input Fact, Hypothesis, Experiment,
// Technique, Result, Dataset, Analysis, Conclusion) to the sentence units of
// a scientific document, using rule-hit scoring with section-aware priors,
// boosts and deterministic tie-breaking, then merges consecutive same-label
// units into page-anchored spans.

pub mod config;
pub mod labeler;
pub mod matcher;
pub mod rules;
pub mod spans;
pub mod tei;
pub mod types;

// Re-export main types and functions for easy use
pub use config::{LabelerConfig, RuleSpec};
pub use labeler::SentenceLabeler;
pub use matcher::{AnalyzerError, RegexAnalyzer, SentenceAnalyzer, SentenceFeatures};
pub use spans::merge_adjacent;
pub use tei::{read_tei_units, SectionTracker};
pub use types::*;
