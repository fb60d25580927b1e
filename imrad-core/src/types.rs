use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ===== LABELS & SECTIONS =====
// Closed enumerations. Labels are never extended at runtime; the score
// vector is keyed by the eight roles, with OTHER reserved for fallback
// decisions.

/// Rhetorical role assigned to a sentence-like unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "Input Fact")]
    InputFact,
    Hypothesis,
    Experiment,
    Technique,
    Result,
    Dataset,
    Analysis,
    Conclusion,
    /// Fallback for units no role claims (headings, bibliography tails, noise).
    #[serde(rename = "OTHER")]
    Other,
}

impl Label {
    /// The eight scoreable roles in canonical order. `Other` is a resolver
    /// outcome, never a score key.
    pub const ROLES: [Label; 8] = [
        Label::InputFact,
        Label::Hypothesis,
        Label::Experiment,
        Label::Technique,
        Label::Result,
        Label::Dataset,
        Label::Analysis,
        Label::Conclusion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::InputFact => "Input Fact",
            Label::Hypothesis => "Hypothesis",
            Label::Experiment => "Experiment",
            Label::Technique => "Technique",
            Label::Result => "Result",
            Label::Dataset => "Dataset",
            Label::Analysis => "Analysis",
            Label::Conclusion => "Conclusion",
            Label::Other => "OTHER",
        }
    }

    fn role_index(&self) -> Option<usize> {
        Label::ROLES.iter().position(|r| r == self)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// IMRaD section active at a unit's position in document reading order.
/// Mutated only by the section tracker, monotonically — no backtracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Section {
    Intro,
    Abstract,
    Methods,
    Results,
    Discussion,
    Conclusion,
    References,
    #[default]
    Other,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Intro => "INTRO",
            Section::Abstract => "ABSTRACT",
            Section::Methods => "METHODS",
            Section::Results => "RESULTS",
            Section::Discussion => "DISCUSSION",
            Section::Conclusion => "CONCLUSION",
            Section::References => "REFERENCES",
            Section::Other => "OTHER",
        }
    }

    /// INTRO and ABSTRACT share aims/background phrasing and are treated
    /// alike by several boosts.
    pub fn is_intro_like(&self) -> bool {
        matches!(self, Section::Intro | Section::Abstract)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ===== GEOMETRY =====

/// Page-space rectangle, serialized as `[x0, y0, x1, y1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        x0: 0.0,
        y0: 0.0,
        x1: 0.0,
        y1: 0.0,
    };

    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Smallest rectangle containing both. Associative and commutative.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    pub fn contains(&self, other: &Rect) -> bool {
        self.x0 <= other.x0 && self.y0 <= other.y0 && self.x1 >= other.x1 && self.y1 >= other.y1
    }
}

impl From<[f32; 4]> for Rect {
    fn from(v: [f32; 4]) -> Self {
        Rect::new(v[0], v[1], v[2], v[3])
    }
}

impl From<Rect> for [f32; 4] {
    fn from(r: Rect) -> Self {
        [r.x0, r.y0, r.x1, r.y1]
    }
}

// ===== INPUT UNITS =====

/// Immutable input record produced once by document extraction and consumed
/// read-only by the decision engine. `page` is 0-based.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentenceUnit {
    pub text: String,
    pub page: u32,
    pub bbox: Rect,
    pub section: Section,
    /// Citation signalled by document markup (a reference link), distinct
    /// from a textual citation pattern detected by surface rules.
    pub has_structural_citation: bool,
    pub is_caption: bool,
    /// "Figure" or "Table" for captions, empty otherwise.
    #[serde(default)]
    pub caption_kind: String,
}

// ===== RULE HITS =====

/// Rule identifier → occurrence count within one unit.
pub type HitMap = BTreeMap<String, u32>;

/// Triggered rule identifiers for one unit, partitioned by match family.
/// Surface hits are shallow token patterns; relational hits are matches over
/// syntactic relations and weigh more.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleHits {
    pub surface: HitMap,
    pub relational: HitMap,
}

impl RuleHits {
    pub fn record_surface(&mut self, id: &str, count: u32) {
        if count > 0 {
            *self.surface.entry(id.to_string()).or_insert(0) += count;
        }
    }

    pub fn record_relational(&mut self, id: &str, count: u32) {
        if count > 0 {
            *self.relational.entry(id.to_string()).or_insert(0) += count;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.surface.is_empty() && self.relational.is_empty()
    }

    /// Both families summed into one map.
    pub fn combined(&self) -> HitMap {
        let mut all = self.surface.clone();
        for (id, n) in &self.relational {
            *all.entry(id.clone()).or_insert(0) += n;
        }
        all
    }
}

// ===== SCORES =====

/// Per-unit integer score for every role label. Array-backed so each of the
/// eight roles always has an entry; zero is a valid score. Serializes as a
/// `{label: score}` map in canonical role order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, i32>", into = "BTreeMap<String, i32>")]
pub struct ScoreVector {
    scores: [i32; 8],
}

impl ScoreVector {
    /// Score for a role label; `None` for `Other`, which is never scored.
    pub fn score(&self, label: Label) -> Option<i32> {
        label.role_index().map(|i| self.scores[i])
    }

    /// Add weight to a role's score. Adding to `Other` is a no-op.
    pub fn add(&mut self, label: Label, weight: i32) {
        if let Some(i) = label.role_index() {
            self.scores[i] += weight;
        }
    }

    pub fn max(&self) -> i32 {
        self.scores.iter().copied().max().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Label, i32)> {
        Label::ROLES.into_iter().zip(self.scores)
    }
}

impl From<BTreeMap<String, i32>> for ScoreVector {
    fn from(map: BTreeMap<String, i32>) -> Self {
        let mut v = ScoreVector::default();
        for (i, role) in Label::ROLES.iter().enumerate() {
            if let Some(&s) = map.get(role.as_str()) {
                v.scores[i] = s;
            }
        }
        v
    }
}

impl From<ScoreVector> for BTreeMap<String, i32> {
    fn from(v: ScoreVector) -> Self {
        v.iter().map(|(l, s)| (l.as_str().to_string(), s)).collect()
    }
}

// ===== FLAGS =====

/// Named signals derived once per unit from hits, section and lexical
/// features; read-only after computation. The abstract-specific flags are
/// only ever true when the unit's section is ABSTRACT.
#[derive(Debug, Clone, Default)]
pub struct Flags {
    pub section: Section,
    pub has_res_summary: bool,
    pub has_res_verb_cues: bool,
    pub has_res_stats: bool,
    pub has_analysis_test: bool,
    pub is_intro_like: bool,
    pub has_hyp_intro: bool,
    pub has_experiment_ops: bool,
    pub has_tech_using: bool,
    pub has_scale_classification: bool,
    pub has_dataset_cues: bool,
    pub has_citation_rule: bool,
    pub has_significance_word: bool,
    pub has_significance: bool,
    pub has_abs_head_results: bool,
    pub has_abs_head_conc: bool,
    pub has_pct_list: bool,
    pub has_hyp_surface_any: bool,
}

impl Flags {
    /// Any of the three result-evidence cues.
    pub fn any_result_cue(&self) -> bool {
        self.has_res_summary || self.has_res_verb_cues || self.has_res_stats
    }
}

// ===== DECISIONS & SPANS =====

/// One labeling decision per sentence unit, immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledUnit {
    pub idx: usize,
    pub label: Label,
    pub section: Section,
    pub text: String,
    pub page: u32,
    pub bbox: Rect,
    pub is_caption: bool,
    #[serde(default)]
    pub caption_kind: String,
    pub scores: ScoreVector,
    pub matches: HitMap,
}

/// A maximal run of consecutive same-label, same-page units, merged into one
/// region. The bounding rectangle contains every absorbed unit's rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub label: Label,
    pub section: Section,
    pub text: String,
    pub page: u32,
    pub bbox: Rect,
}

// ===== RUN PROFILE =====

/// Summary of one labeling run, computed after span merging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunProfile {
    pub created_at: DateTime<Utc>,
    pub total_units: usize,
    pub total_spans: usize,
    pub label_counts: BTreeMap<String, usize>,
}

impl RunProfile {
    pub fn compute(units: &[LabeledUnit], spans: &[Span]) -> Self {
        let mut label_counts = BTreeMap::new();
        for unit in units {
            *label_counts.entry(unit.label.as_str().to_string()).or_insert(0) += 1;
        }
        Self {
            created_at: Utc::now(),
            total_units: units.len(),
            total_spans: spans.len(),
            label_counts,
        }
    }
}
