//! Inventory example for the pptx-inventory crate
//!
//! Extracts placeholders, text, tables, charts and images of every slide and
//! writes the report as JSON. Images are saved next to the report.
//!
//! Run with: cargo run --example inventory <path/to/presentation.pptx> [report.json] [media_dir] [--parallel]

use pptx_inventory::{parse_all_parallel, ParserConfig, PptxContainer, Result};
use std::env;
use std::path::Path;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let parallel = args.iter().any(|arg| arg == "--parallel");
    let positional: Vec<&String> = args.iter().filter(|arg| !arg.starts_with("--")).collect();

    let Some(pptx_path) = positional.first() else {
        eprintln!("Usage: cargo run --example inventory <path/to/presentation.pptx> [report.json] [media_dir] [--parallel]");
        return Ok(());
    };
    let report_path = positional.get(1).map(|s| s.as_str()).unwrap_or("inventory.json");
    let media_dir = positional.get(2).map(|s| s.as_str()).unwrap_or("media");

    println!("Processing PPTX file: {}", pptx_path);

    let config = ParserConfig::builder()
        .media_dir(media_dir)
        .embed_images(false)
        .build();

    let report = if parallel {
        parse_all_parallel(Path::new(pptx_path.as_str()), &config)?
    } else {
        PptxContainer::open(Path::new(pptx_path.as_str()), config)?.parse_all()?
    };

    for slide in &report.slides {
        match (&slide.title, &slide.error) {
            (_, Some(error)) => println!("Slide {}: failed ({})", slide.slide_number, error),
            (Some(title), None) => println!("Slide {}: {}", slide.slide_number, title),
            (None, None) => println!("Slide {}: <untitled>", slide.slide_number),
        }
    }

    report.write_json(Path::new(report_path))?;
    println!("Wrote {} slides to {}", report.slide_count, report_path);

    Ok(())
}
