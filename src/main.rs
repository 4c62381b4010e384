use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use content_audit::{Report, WeightConfig};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "content-audit",
    about = "Score page copy on entropy, rhythm, repetition, vocabulary and readability",
    version
)]
struct Cli {
    /// Text files to analyze (reads stdin if none provided)
    files: Vec<PathBuf>,

    /// TOML file overriding the scoring calibration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Drop symbols and emoji before tokenizing
    #[arg(long)]
    strict: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Text,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => WeightConfig::load(path)?,
        None => WeightConfig::default(),
    };
    if cli.strict {
        config.strict_normalize = true;
    }

    if cli.print_config {
        print!(
            "{}",
            toml::to_string_pretty(&config).context("failed to serialize config")?
        );
        return Ok(());
    }

    if cli.files.is_empty() {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("failed to read stdin")?;
        let report = content_audit::analyze_with_config(&input, &config);
        emit(&report, "<stdin>", cli.format)?;
    } else {
        for path in &cli.files {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            info!("Analyzing {}", path.display());
            let report = content_audit::analyze_with_config(&text, &config);
            emit(&report, &path.display().to_string(), cli.format)?;
        }
    }
    Ok(())
}

fn emit(report: &Report, label: &str, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(report)?),
        Format::Text => print!("{}", render_text(report, label)),
    }
    Ok(())
}

fn render_text(report: &Report, label: &str) -> String {
    let s = &report.stats;
    let mut lines = vec![
        label.to_string(),
        format!(
            "  score: {:.1}/100 ({})",
            report.score,
            serde_plain_name(&report.verdict)
        ),
    ];
    lines.extend(report.modules.iter().map(|m| {
        format!(
            "  {:<12} {:>5.2}/{:<4} raw {:.2}",
            m.name, m.score, m.max, m.raw
        )
    }));
    lines.push(format!(
        "  words {} | sentences {} | avg sentence {:.1} words | diversity {:.1}% | flesch {:.1} ({})",
        s.word_count,
        s.sentence_count,
        s.avg_sentence_length,
        s.vocabulary_diversity,
        s.flesch_reading_ease,
        serde_plain_name(&s.readability_band)
    ));
    if !report.keywords.is_empty() {
        let terms: Vec<String> = report
            .keywords
            .iter()
            .map(|k| format!("{} ({:.1}%)", k.term, k.density))
            .collect();
        lines.push(format!("  keywords: {}", terms.join(", ")));
    }
    lines.extend(report.advice.iter().map(|line| format!("  - {line}")));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

// Unit enums serialize to a bare JSON string.
fn serde_plain_name<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_rendering_lists_every_module() {
        let report = content_audit::analyze("The cat sat on the mat. The dog ran fast.");
        let out = render_text(&report, "sample.txt");
        assert!(out.starts_with("sample.txt\n"));
        for m in &report.modules {
            assert!(out.contains(m.name), "missing {}", m.name);
        }
        assert!(out.contains("(excellent)"));
        assert!(out.ends_with('\n'));
        assert_eq!(
            out.lines().count(),
            3 + report.modules.len() + usize::from(!report.keywords.is_empty()) + report.advice.len()
        );
    }

    #[test]
    fn plain_name_uses_snake_case() {
        assert_eq!(
            serde_plain_name(&content_audit::Verdict::LikelyHuman),
            "likely_human"
        );
    }
}
