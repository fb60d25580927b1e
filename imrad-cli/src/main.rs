use anyhow::{bail, Context, Result};
use clap::Parser;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use imrad_labeler::fetch_fulltext_tei;
use imrad_labeler_core::{
    read_tei_units, Label, LabeledUnit, LabelerConfig, RunProfile, SentenceLabeler, Span,
};

/// Label order for the markdown summary.
const SUMMARY_ORDER: [Label; 9] = [
    Label::Result,
    Label::Experiment,
    Label::Technique,
    Label::Analysis,
    Label::Dataset,
    Label::Hypothesis,
    Label::Conclusion,
    Label::InputFact,
    Label::Other,
];

#[derive(Parser)]
#[command(name = "imrad-labeler")]
#[command(about = "Label scientific-paper sentences with rhetorical roles (IMRaD-aware)")]
struct Args {
    /// Path to the PDF to process (sent to a GROBID server)
    #[arg(short, long)]
    pdf: Option<String>,

    /// GROBID server URL
    #[arg(short, long, default_value = "http://localhost:8070")]
    server: String,

    /// GROBID request timeout in seconds
    #[arg(long, default_value_t = 120)]
    timeout: u64,

    /// Path to an existing TEI file (skips the GROBID call)
    #[arg(long)]
    tei: Option<String>,

    /// Path to a labeler config file (YAML); CLI flags override its values
    #[arg(short, long)]
    config: Option<String>,

    /// Path to a rule specification file (YAML or JSON); builtin rules otherwise
    #[arg(long)]
    rules: Option<String>,

    /// Linguistic model identifier for the analyzer
    #[arg(long)]
    model: Option<String>,

    /// Downgrade citation-only "Input Fact" decisions to OTHER when the unit
    /// carries no structural citation marker
    #[arg(long)]
    citation_soft: bool,

    /// Output path for labeled units (JSONL)
    #[arg(short, long, default_value = "out.jsonl")]
    out: String,

    /// Optional markdown summary of merged spans
    #[arg(long, default_value = "")]
    md: String,

    /// Directory for run artifacts (TEI, units, spans, profile); always
    /// written when set
    #[arg(long)]
    outdir: Option<String>,

    /// Summarize per-sentence records instead of merged spans
    #[arg(long)]
    no_merge: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("🦀 IMRaD Labeler");

    // Obtain the TEI: local file, or fetch via GROBID
    let (tei, pdf_stem) = match (&args.tei, &args.pdf) {
        (Some(tei_path), _) => {
            println!("📄 Reading TEI from: {tei_path}");
            let tei = fs::read_to_string(tei_path)
                .with_context(|| format!("failed to read TEI: {tei_path}"))?;
            (tei, stem_of(tei_path))
        }
        (None, Some(pdf_path)) => {
            if !Path::new(pdf_path).exists() {
                bail!("input PDF not found at: {pdf_path}");
            }
            println!("📄 Processing: {pdf_path}");
            println!("🌐 Fetching TEI from GROBID at {}", args.server);
            let tei = fetch_fulltext_tei(&args.server, Path::new(pdf_path), args.timeout)?;
            (tei, stem_of(pdf_path))
        }
        (None, None) => bail!("either --pdf or --tei is required"),
    };

    // Load config, then apply CLI overrides
    let mut config = LabelerConfig::load_with_fallback(args.config.as_deref());
    if let Some(config_path) = &args.config {
        println!("📋 Loaded config from: {config_path}");
    } else {
        println!("📋 Using default config");
    }
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(rules) = &args.rules {
        config.rules = Some(rules.clone());
    }
    if args.citation_soft {
        config.citation_soft = true;
    }

    let units = read_tei_units(&tei)?;
    println!("📊 Extracted {} sentence units", units.len());

    let labeler = SentenceLabeler::from_config(&config)?;
    let (labeled, spans) = labeler.label_and_merge(&units)?;
    let profile = RunProfile::compute(&labeled, &spans);

    println!("✅ Labeled {} units into {} spans", labeled.len(), spans.len());
    for (label, count) in &profile.label_counts {
        println!("   {label:.<20} {count}");
    }

    // JSONL of per-unit decisions
    write_jsonl(&args.out, &labeled)?;
    println!("💾 Units → {}", args.out);

    if !args.md.is_empty() {
        let md = if args.no_merge {
            render_unit_summary(&labeled)
        } else {
            render_span_summary(&spans)
        };
        fs::write(&args.md, md).with_context(|| format!("failed to write {}", args.md))?;
        println!("💾 Summary → {}", args.md);
    }

    if let Some(outdir) = &args.outdir {
        let dir = PathBuf::from(outdir);
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create output directory: {outdir}"))?;
        fs::write(dir.join(format!("{pdf_stem}.tei.xml")), &tei)?;
        fs::write(dir.join("units.json"), serde_json::to_string_pretty(&labeled)?)?;
        fs::write(dir.join("spans.json"), serde_json::to_string_pretty(&spans)?)?;
        fs::write(
            dir.join("profile.json"),
            serde_json::to_string_pretty(&profile)?,
        )?;
        println!("💾 Artifacts → {outdir}");
    }

    Ok(())
}

fn stem_of(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

fn write_jsonl(path: &str, labeled: &[LabeledUnit]) -> Result<()> {
    let mut lines = String::new();
    for record in labeled {
        lines.push_str(&serde_json::to_string(record)?);
        lines.push('\n');
    }
    fs::write(path, lines).with_context(|| format!("failed to write {path}"))
}

fn render_span_summary(spans: &[Span]) -> String {
    let mut groups: BTreeMap<&str, Vec<&Span>> = BTreeMap::new();
    for span in spans {
        groups.entry(span.label.as_str()).or_default().push(span);
    }
    let mut lines = vec!["# Labels (merged spans)".to_string(), String::new()];
    for label in SUMMARY_ORDER {
        let Some(group) = groups.get(label.as_str()) else {
            continue;
        };
        lines.push(format!("## {label}  \n(count: {})", group.len()));
        for span in group.iter().take(200) {
            lines.push(format!("- p.{} {}", span.page + 1, span.text));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

fn render_unit_summary(labeled: &[LabeledUnit]) -> String {
    let mut groups: BTreeMap<&str, Vec<&LabeledUnit>> = BTreeMap::new();
    for unit in labeled {
        groups.entry(unit.label.as_str()).or_default().push(unit);
    }
    let mut lines = vec!["# Labels (unmerged units)".to_string(), String::new()];
    for label in SUMMARY_ORDER {
        let Some(group) = groups.get(label.as_str()) else {
            continue;
        };
        lines.push(format!("## {label}  \n(count: {})", group.len()));
        for unit in group.iter().take(200) {
            lines.push(format!("- p.{} {}", unit.page + 1, unit.text));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}
