//! fenceline binary - converts Markdown files to HTML with highlighted code blocks

mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info, warn};

use config::AppConfig;
use fenceline_render::{Conversion, Converter, HighlighterCell, HttpSource};

#[derive(Parser, Debug)]
#[command(name = "fenceline")]
#[command(about = "Convert Markdown to HTML with highlighted, protected code blocks")]
struct Args {
    /// Markdown files to convert
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// YAML or JSON config file with `options` and `highlight` sections
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for the .html output (defaults to next to each input)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Also write the token table as <name>.tokens.json
    #[arg(long)]
    emit_tokens: bool,

    /// Leave fenced code to the markdown converter
    #[arg(long)]
    no_gh_code_blocks: bool,

    /// Skip the trailing newline after each highlighted block
    #[arg(long)]
    omit_extra_wl: bool,

    /// Do not fetch external grammars
    #[arg(long)]
    offline: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if args.no_gh_code_blocks {
        config.options.gh_code_blocks = false;
    }
    if args.omit_extra_wl {
        config.options.omit_extra_wl_in_code_blocks = true;
    }
    if args.offline {
        config.highlight.grammars.clear();
        config.highlight.syntax_dump = None;
    }

    // Startup waits here until the highlighter is ready
    let cell = HighlighterCell::new();
    let source = Arc::new(HttpSource::new(config.highlight.fetch_timeout()));
    let highlighter = cell
        .ensure_ready(&config.highlight, source)
        .await
        .context("initializing highlighter")?;
    info!(
        "Highlighter ready ({}{})",
        highlighter.engine_name(),
        if highlighter.is_degraded() { ", degraded" } else { "" }
    );

    let converter = Converter::new(highlighter.clone(), config.options.clone());
    for input in &args.inputs {
        convert_file(&converter, input, &args)?;
    }

    Ok(())
}

fn convert_file(converter: &Converter, input: &Path, args: &Args) -> Result<()> {
    let markdown = std::fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let conversion = converter
        .convert(&markdown)
        .with_context(|| format!("converting {}", input.display()))?;
    report(input, &conversion);

    let html_path = output_path(input, args.out_dir.as_deref(), "html");
    std::fs::write(&html_path, &conversion.html)
        .with_context(|| format!("writing {}", html_path.display()))?;
    info!(
        "{} -> {} ({} code blocks)",
        input.display(),
        html_path.display(),
        conversion.tokens.len()
    );

    if args.emit_tokens {
        let tokens_path = output_path(input, args.out_dir.as_deref(), "tokens.json");
        let json = serde_json::to_string_pretty(&conversion.tokens)?;
        std::fs::write(&tokens_path, json)
            .with_context(|| format!("writing {}", tokens_path.display()))?;
    }
    Ok(())
}

fn report(input: &Path, conversion: &Conversion) {
    let diagnostics = &conversion.diagnostics;
    for warning in &diagnostics.warnings {
        warn!("{}: {}", input.display(), warning);
    }
    for error in &diagnostics.errors {
        warn!("{}: {}", input.display(), error);
    }
    if diagnostics.has_any() {
        info!("{}: {} diagnostic(s)", input.display(), diagnostics.count());
    }
    if !conversion.tokens.is_empty() {
        debug!("{} token table:\n{}", input.display(), conversion.tokens.summary().trim_end());
    }
}

fn output_path(input: &Path, out_dir: Option<&Path>, extension: &str) -> PathBuf {
    let file_name = input.with_extension(extension);
    match (out_dir, file_name.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => file_name,
    }
}
