//! relayout CLI - reading order reconstruction tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use relayout::{
    classify_document, Document, DocumentKind, ErrorMode, JsonFormat, JsonSource, LayoutOptions,
    LayoutPipeline, PageEvent, PageSelection,
};

#[derive(Parser)]
#[command(name = "relayout")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Reconstruct reading order from extracted page geometry", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconstruct reading order and structure
    Analyze {
        /// Extraction output (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Process pages one at a time
        #[arg(long)]
        sequential: bool,

        /// Stop at the first page that fails
        #[arg(long)]
        strict: bool,

        /// Keep header and footer paragraphs in the output
        #[arg(long)]
        keep_headers: bool,
    },

    /// Show document statistics
    Info {
        /// Extraction output (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Decide whether a document is text-based or scanned
    Classify {
        /// Extraction output (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            input,
            output,
            compact,
            pages,
            sequential,
            strict,
            keep_headers,
        } => parse_pages(pages.as_deref()).and_then(|selection| {
            let options = LayoutOptions::new()
                .with_pages(selection)
                .with_parallel(!sequential)
                .with_error_mode(if strict {
                    ErrorMode::Strict
                } else {
                    ErrorMode::Lenient
                })
                .with_drop_headers_footers(!keep_headers);
            cmd_analyze(&input, output.as_deref(), compact, options)
        }),
        Commands::Info { input } => cmd_info(&input),
        Commands::Classify { input, json } => cmd_classify(&input, json),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn parse_pages(pages: Option<&str>) -> Result<PageSelection, Box<dyn std::error::Error>> {
    match pages {
        Some(p) => Ok(PageSelection::parse(p)?),
        None => Ok(PageSelection::All),
    }
}

fn cmd_analyze(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    options: LayoutOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let strict = options.error_mode == ErrorMode::Strict;
    let source = JsonSource::open(input)?.into_inner();
    let total = source
        .pages
        .iter()
        .filter(|p| options.pages.includes(p.number))
        .count();

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    pb.set_message("Analyzing layout...");

    let mut doc = Document {
        name: source.name,
        ..Document::default()
    };
    for event in LayoutPipeline::new(options).stream(source.pages) {
        match event {
            PageEvent::Page(page) => {
                doc.pages.push(page);
                pb.inc(1);
            }
            PageEvent::Failed(failure) => {
                pb.inc(1);
                if strict {
                    pb.abandon();
                    return Err(failure.error.into());
                }
                pb.println(format!(
                    "{} page {}: {}",
                    "Warning".yellow(),
                    failure.page,
                    failure.error
                ));
                doc.failures.push(failure);
            }
            PageEvent::Finished { processed, failed } => {
                pb.finish_with_message(format!("{} pages, {} failed", processed, failed));
            }
        }
    }

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let json = relayout::render::to_json(&doc, format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let options = LayoutOptions::new().with_drop_headers_footers(false);
    let source = JsonSource::open(input)?;
    let doc = LayoutPipeline::new(options).process_source(&source)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    if let Some(ref name) = doc.name {
        println!("{}: {}", "Name".bold(), name);
    }
    println!("{}: {}", "Pages".bold(), source.document().page_count());
    println!("{}: {}", "Failed pages".bold(), doc.failures.len());

    println!();
    println!("{}", "Layout Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let items = doc.pages.iter().flat_map(|p| p.items.iter());
    let (mut paragraphs, mut images, mut tables) = (0, 0, 0);
    for item in items {
        if item.is_text() {
            paragraphs += 1;
        } else if item.is_image() {
            images += 1;
        } else if item.is_table() {
            tables += 1;
        }
    }
    let blocks: usize = doc.pages.iter().map(|p| p.blocks.len()).sum();
    let headers: usize = doc.pages.iter().map(|p| p.header_count()).sum();
    let footers: usize = doc.pages.iter().map(|p| p.footer_count()).sum();
    let diagnostics: usize = doc.pages.iter().map(|p| p.diagnostics.len()).sum();
    let words = doc.plain_text().split_whitespace().count();

    println!("{}: {}", "Blocks".bold(), blocks);
    println!("{}: {}", "Paragraphs".bold(), paragraphs);
    println!("{}: {}", "Images".bold(), images);
    println!("{}: {}", "Tables".bold(), tables);
    println!("{}: {} / {}", "Headers / footers".bold(), headers, footers);
    println!("{}: {}", "Words".bold(), words);
    println!("{}: {}", "Diagnostics".bold(), diagnostics);

    for failure in &doc.failures {
        println!("  {} {}", "✗".red(), failure.error);
    }

    Ok(())
}

fn cmd_classify(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let source = JsonSource::open(input)?;
    let result = classify_document(source.document());

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let label = match result.kind {
        DocumentKind::Text => "text".green().bold(),
        DocumentKind::Scanned => "scanned".yellow().bold(),
    };
    println!("{}: {}", "Document".bold(), label);
    if !result.is_unanimous() {
        println!(
            "  {} by area: {:?}, by text length: {:?}",
            "votes disagree".dimmed(),
            result.by_area,
            result.by_text_len
        );
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "relayout".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Reading order reconstruction tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/relayout".dimmed());
    println!("License: MIT");
}
