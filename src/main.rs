//! tei2jekyll - TEI facsimile to Jekyll importer

use std::process::ExitCode;

use clap::Parser;

use tei2jekyll::TeiDocument;
use tei2jekyll::site::{ImportOptions, import};

#[derive(Parser)]
#[command(name = "tei2jekyll")]
#[command(version, about = "Import an annotated TEI facsimile volume into a Jekyll site", long_about = None)]
#[command(after_help = "EXAMPLES:
    tei2jekyll volume.xml            Import into the current directory
    tei2jekyll volume.xml my-site    Import into my-site/
    tei2jekyll -i volume.xml         Show document metadata")]
struct Cli {
    /// TEI facsimile file
    #[arg(value_name = "TEIFILE")]
    input: String,

    /// Jekyll site directory to import into
    #[arg(value_name = "SITE_DIR", default_value = ".")]
    site_dir: String,

    /// Show document metadata without importing
    #[arg(short, long)]
    info: bool,

    /// Suppress progress messages
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = if cli.info {
        show_info(&cli.input)
    } else {
        import(
            &cli.input,
            &cli.site_dir,
            &ImportOptions { quiet: cli.quiet },
        )
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn show_info(path: &str) -> tei2jekyll::Result<()> {
    let doc = TeiDocument::open(path)?;
    let facsimile = doc.facsimile();

    println!("File: {path}");

    // prefer the strict nested title path, fall back to any title in
    // the statement
    let statement = facsimile.title_statement().ok();
    let mut title = facsimile.title()?;
    let mut subtitle = facsimile.subtitle()?;
    if let Some(statement) = &statement {
        if title.is_none() {
            title = statement.title()?;
        }
        if subtitle.is_none() {
            subtitle = statement.subtitle()?;
        }
    }
    if let Some(title) = title {
        println!("Title: {title}");
    }
    if let Some(subtitle) = subtitle {
        println!("Subtitle: {subtitle}");
    }

    let bibls = facsimile.source_bibl()?;
    if let Some(original) = bibls.get("original") {
        if let Some(author) = original.author()? {
            println!("Author: {author}");
        }
        if let Some(date) = original.date()? {
            println!("Date: {date}");
        }
    }

    println!("Pages: {}", facsimile.pages()?.len());
    println!("Annotations: {}", facsimile.annotations()?.len());
    println!("Tags: {}", facsimile.tags()?.len());

    Ok(())
}
