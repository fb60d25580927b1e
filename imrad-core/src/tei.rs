//! GROBID TEI ingest.
//!
//! Parses a GROBID fulltext TEI document (produced with sentence
//! segmentation and coordinates enabled) into [`SentenceUnit`]s, in a single
//! pass over the XML event stream. The walk owns the section state:
//!
//! - `<head>` elements whose text maps to a known IMRaD section update the
//!   running section; sub-headings mapping to OTHER leave it unchanged.
//! - `<s>` elements yield sentence units carrying the current section,
//!   except inside `<abstract>`/`<div type="abstract|summary">` which force
//!   ABSTRACT.
//! - `<figDesc>` and the first `<head>` of a `<table>` yield caption units.
//! - `coords="p,x,y,w,h;…"` attributes become a 0-based page plus the union
//!   rectangle of the boxes on that page.
//! - `<ref>`/`<ptr>` targets pointing at the bibliography mark the
//!   enclosing unit as structurally cited.

use crate::types::{Rect, Section, SentenceUnit};
use anyhow::{bail, Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use std::sync::LazyLock;

// ===== HEADING → SECTION MAPPING =====

// Word boundaries over the cleaned (lowercased) heading text.
const WB: &str = r"(?:^|[^a-z])";
const WE: &str = r"(?:$|[^a-z])";

static HEAD_NUMBERING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(?:\d+|[IVXLCM]+)[.)]?\s+").unwrap());

static INTRO_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "{WB}(?:abstract|introduction|background|aims and scope){WE}"
    ))
    .unwrap()
});

static METHODS_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "{WB}(?:materials? and methods?|methods?|methodology|experimental(?: section)?|patients? and methods?|subjects? and methods?|study design|statistical (?:analysis|methods?)){WE}"
    ))
    .unwrap()
});

// Checked before the plain results patterns so "Results and Discussion"
// lands in DISCUSSION.
static DISCUSSION_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "{WB}(?:results? and discussion|general discussion|discussion|conclusions?|concluding remarks|implications|limitations){WE}"
    ))
    .unwrap()
});

static RESULTS_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("{WB}(?:results?|findings|outcomes){WE}")).unwrap()
});

static REFERENCES_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("{WB}(?:references|bibliography|works cited){WE}")).unwrap()
});

fn clean_heading(text: &str) -> String {
    let stripped = HEAD_NUMBERING.replace(text.trim(), "");
    stripped.replace('&', "and").to_lowercase()
}

/// Map a structural heading to a section. Sub-headings like "Study
/// population" map to OTHER and never move the tracker.
pub fn map_heading_to_section(heading: &str) -> Section {
    let cleaned = clean_heading(heading);
    if cleaned.is_empty() {
        return Section::Other;
    }
    if INTRO_HEAD.is_match(&cleaned) {
        return Section::Intro;
    }
    if METHODS_HEAD.is_match(&cleaned) {
        return Section::Methods;
    }
    if DISCUSSION_HEAD.is_match(&cleaned) {
        return Section::Discussion;
    }
    if RESULTS_HEAD.is_match(&cleaned) {
        return Section::Results;
    }
    if REFERENCES_HEAD.is_match(&cleaned) {
        return Section::References;
    }
    Section::Other
}

/// Explicit state object for the single-pass document walk. Owns the
/// current section; sentence units snapshot its value rather than reading
/// shared state. Updates are monotone in reading order — only a heading
/// mapping to a known section changes it.
#[derive(Debug, Clone, Default)]
pub struct SectionTracker {
    current: Section,
}

impl SectionTracker {
    pub fn new() -> Self {
        Self {
            current: Section::Other,
        }
    }

    pub fn current(&self) -> Section {
        self.current
    }

    /// Feed a heading; returns the (possibly updated) current section.
    pub fn observe_heading(&mut self, heading: &str) -> Section {
        let mapped = map_heading_to_section(heading);
        if mapped != Section::Other {
            self.current = mapped;
        }
        self.current
    }
}

// ===== COORDINATES =====

// Two coordinate formats occur in the wild: "1,x,y,w,h" and "1: x,y,w,h".
// Trailing numbers after h (e.g. font size) are ignored.
static COORD_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*p?(\d+)\s*[:, ]\s*(-?[\d.]+)\s*,\s*(-?[\d.]+)\s*,\s*(-?[\d.]+)\s*,\s*(-?[\d.]+)")
        .unwrap()
});

/// One page-anchored box from a `coords` attribute (1-based page, x/y/w/h).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordBox {
    pub page: u32,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

pub fn parse_coords(coords: &str) -> Vec<CoordBox> {
    coords
        .split(';')
        .filter_map(|chunk| {
            let caps = COORD_ITEM.captures(chunk)?;
            Some(CoordBox {
                page: caps[1].parse().ok()?,
                x: caps[2].parse().ok()?,
                y: caps[3].parse().ok()?,
                w: caps[4].parse().ok()?,
                h: caps[5].parse().ok()?,
            })
        })
        .collect()
}

/// Union the boxes on the first box's page into one rectangle; the page is
/// returned 0-based. No boxes yields page 0 and a zero rect.
pub fn union_boxes(boxes: &[CoordBox]) -> (u32, Rect) {
    let Some(first) = boxes.first() else {
        return (0, Rect::ZERO);
    };
    let page = first.page;
    let mut rect: Option<Rect> = None;
    for b in boxes.iter().filter(|b| b.page == page) {
        let box_rect = Rect::new(b.x, b.y, b.x + b.w, b.y + b.h);
        rect = Some(match rect {
            Some(r) => r.union(&box_rect),
            None => box_rect,
        });
    }
    (page.saturating_sub(1), rect.unwrap_or(Rect::ZERO))
}

fn page_and_bbox(coords: Option<&str>) -> (u32, Rect) {
    union_boxes(&parse_coords(coords.unwrap_or("")))
}

// ===== TEI WALK =====

#[derive(Debug, Default)]
struct Frame {
    abstract_scope: bool,
    figure: bool,
    table: bool,
    caption_taken: bool,
    coords: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum CaptureKind {
    Heading,
    Sentence,
    FigureCaption,
    TableCaption,
}

#[derive(Debug)]
struct Capture {
    kind: CaptureKind,
    text: String,
    coords: Option<String>,
    has_citation: bool,
    in_abstract: bool,
    depth: usize,
}

impl Capture {
    fn new(kind: CaptureKind, coords: Option<String>, in_abstract: bool, depth: usize) -> Self {
        Self {
            kind,
            text: String::new(),
            coords,
            has_citation: false,
            in_abstract,
            depth,
        }
    }
}

fn attr(e: &BytesStart, name: &str) -> Result<Option<String>> {
    let value = e
        .try_get_attribute(name)
        .context("malformed TEI attribute")?
        .map(|a| a.unescape_value().map(|v| v.into_owned()))
        .transpose()
        .context("malformed TEI attribute value")?;
    Ok(value)
}

/// Whether an element signals a structural citation: `<ref>`/`<ptr>` typed
/// as bibliographic or targeting the bibliography, or a nested `<bibl>`.
fn marks_structural_citation(name: &[u8], e: &BytesStart) -> Result<bool> {
    match name {
        b"bibl" => Ok(true),
        b"ref" | b"ptr" => {
            if let Some(kind) = attr(e, "type")? {
                if matches!(kind.to_lowercase().as_str(), "bibr" | "bibl" | "citation") {
                    return Ok(true);
                }
            }
            let target = match attr(e, "target")? {
                Some(t) => Some(t),
                None => attr(e, "xlink:href")?,
            };
            if let Some(target) = target {
                if target.starts_with("#b") || target.to_lowercase().contains("bibl") {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        _ => Ok(false),
    }
}

/// Read a GROBID fulltext TEI document into sentence and caption units, in
/// reading order. Empty-text elements are skipped, not errors.
pub fn read_tei_units(tei_xml: &str) -> Result<Vec<SentenceUnit>> {
    let mut reader = Reader::from_str(tei_xml);
    let mut tracker = SectionTracker::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut capture: Option<Capture> = None;
    let mut units = Vec::new();

    loop {
        match reader.read_event().context("malformed TEI document")? {
            Event::Start(e) => {
                let lname = e.local_name();
                let name = lname.as_ref();

                let mut frame = Frame::default();
                match name {
                    b"abstract" => frame.abstract_scope = true,
                    b"div" => {
                        if let Some(kind) = attr(&e, "type")? {
                            frame.abstract_scope =
                                matches!(kind.to_lowercase().as_str(), "abstract" | "summary");
                        }
                    }
                    b"figure" => {
                        frame.figure = true;
                        frame.coords = attr(&e, "coords")?;
                    }
                    b"table" => {
                        frame.table = true;
                        frame.coords = attr(&e, "coords")?;
                    }
                    _ => {}
                }

                if let Some(cap) = capture.as_mut() {
                    if marks_structural_citation(name, &e)? {
                        cap.has_citation = true;
                    }
                } else {
                    match name {
                        b"head" => {
                            if let Some(table) = stack.iter_mut().rev().find(|f| f.table) {
                                // first head of a table is its caption
                                if !table.caption_taken {
                                    table.caption_taken = true;
                                    let coords = match attr(&e, "coords")? {
                                        Some(c) => Some(c),
                                        None => table.coords.clone(),
                                    };
                                    capture = Some(Capture::new(
                                        CaptureKind::TableCaption,
                                        coords,
                                        false,
                                        stack.len() + 1,
                                    ));
                                }
                            } else if stack.iter().any(|f| f.figure) {
                                // figure titles are caption furniture, never section headings
                            } else {
                                capture = Some(Capture::new(
                                    CaptureKind::Heading,
                                    None,
                                    false,
                                    stack.len() + 1,
                                ));
                            }
                        }
                        b"s" => {
                            if !stack.iter().any(|f| f.table) {
                                let in_abstract = stack.iter().any(|f| f.abstract_scope);
                                capture = Some(Capture::new(
                                    CaptureKind::Sentence,
                                    attr(&e, "coords")?,
                                    in_abstract,
                                    stack.len() + 1,
                                ));
                            }
                        }
                        b"figDesc" => {
                            capture = Some(Capture::new(
                                CaptureKind::FigureCaption,
                                attr(&e, "coords")?,
                                false,
                                stack.len() + 1,
                            ));
                        }
                        _ => {}
                    }
                }

                stack.push(frame);
            }
            Event::Empty(e) => {
                if let Some(cap) = capture.as_mut() {
                    let lname = e.local_name();
                    if marks_structural_citation(lname.as_ref(), &e)? {
                        cap.has_citation = true;
                    }
                }
            }
            Event::Text(t) => {
                if let Some(cap) = capture.as_mut() {
                    cap.text
                        .push_str(&t.unescape().context("invalid text in TEI")?);
                }
            }
            Event::CData(t) => {
                if let Some(cap) = capture.as_mut() {
                    cap.text.push_str(&String::from_utf8_lossy(&t.into_inner()));
                }
            }
            Event::End(_) => {
                if capture.as_ref().is_some_and(|c| c.depth == stack.len()) {
                    if let Some(cap) = capture.take() {
                        finalize_capture(cap, &mut tracker, &stack, &mut units);
                    }
                }
                stack.pop();
            }
            Event::Eof => {
                if !stack.is_empty() {
                    bail!("malformed TEI document: unexpected end of input");
                }
                break;
            }
            _ => {}
        }
    }

    Ok(units)
}

fn finalize_capture(
    cap: Capture,
    tracker: &mut SectionTracker,
    stack: &[Frame],
    units: &mut Vec<SentenceUnit>,
) {
    let text = cap.text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        return;
    }
    match cap.kind {
        CaptureKind::Heading => {
            tracker.observe_heading(&text);
        }
        CaptureKind::Sentence => {
            let (page, bbox) = page_and_bbox(cap.coords.as_deref());
            let section = if cap.in_abstract {
                Section::Abstract
            } else {
                tracker.current()
            };
            units.push(SentenceUnit {
                text,
                page,
                bbox,
                section,
                has_structural_citation: cap.has_citation,
                is_caption: false,
                caption_kind: String::new(),
            });
        }
        CaptureKind::FigureCaption => {
            // coords may sit on the figDesc or on the enclosing figure
            let coords = cap.coords.or_else(|| {
                stack
                    .iter()
                    .rev()
                    .find(|f| f.figure)
                    .and_then(|f| f.coords.clone())
            });
            let (page, bbox) = page_and_bbox(coords.as_deref());
            units.push(SentenceUnit {
                text,
                page,
                bbox,
                section: tracker.current(),
                has_structural_citation: cap.has_citation,
                is_caption: true,
                caption_kind: "Figure".to_string(),
            });
        }
        CaptureKind::TableCaption => {
            let (page, bbox) = page_and_bbox(cap.coords.as_deref());
            units.push(SentenceUnit {
                text,
                page,
                bbox,
                section: tracker.current(),
                has_structural_citation: cap.has_citation,
                is_caption: true,
                caption_kind: "Table".to_string(),
            });
        }
    }
}
