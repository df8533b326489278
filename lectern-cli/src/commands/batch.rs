//! Batch render command implementation

use super::standalone_document;
use anyhow::{bail, Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use lectern_core::source::CHAPTER_EXTENSIONS;
use lectern_core::types::Chapter;
use lectern_core::ReaderConfig;
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Render every chapter file in a directory to markup
pub fn batch(
    input_dir: &str,
    output_dir: &str,
    standalone: bool,
    jobs: usize,
    config: &ReaderConfig,
) -> Result<()> {
    let input_path = Path::new(input_dir);
    let output_path = Path::new(output_dir);

    // Find all chapter files
    let mut files: Vec<_> = fs::read_dir(input_path)
        .with_context(|| format!("Failed to read input directory: {}", input_dir))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .map(|ext| CHAPTER_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();
    files.sort();

    if files.is_empty() {
        println!("No chapter files found in {}", input_dir);
        return Ok(());
    }

    // Ensure output directory exists
    fs::create_dir_all(output_path)?;

    println!("Found {} chapters to render", files.len());

    // Set up progress tracking
    let multi_progress = MultiProgress::new();
    let overall_pb = multi_progress.add(ProgressBar::new(files.len() as u64));
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")?
            .progress_chars("##-"),
    );

    let success_count = AtomicUsize::new(0);
    let error_count = AtomicUsize::new(0);
    let empty_count = AtomicUsize::new(0);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .context("Failed to start worker threads")?;

    // Render files in parallel
    pool.install(|| {
        files.par_iter().for_each(|file_path| {
            match render_file(file_path, output_path, standalone, config) {
                Ok(blocks) => {
                    success_count.fetch_add(1, Ordering::Relaxed);
                    if blocks == 0 {
                        empty_count.fetch_add(1, Ordering::Relaxed);
                    }
                }
                Err(e) => {
                    error_count.fetch_add(1, Ordering::Relaxed);
                    tracing::error!("Failed to render {:?}: {:#}", file_path, e);
                }
            }

            overall_pb.inc(1);
        });
    });

    overall_pb.finish();

    let success = success_count.load(Ordering::Relaxed);
    let errors = error_count.load(Ordering::Relaxed);
    let empty = empty_count.load(Ordering::Relaxed);

    println!("\nBatch render complete:");
    println!("  Success: {}", success);
    println!("  Empty:   {}", empty);
    println!("  Errors:  {}", errors);

    if errors > 0 {
        bail!("Batch render completed with {} errors", errors);
    }

    Ok(())
}

/// Render one chapter file; returns its block count
fn render_file(
    input_path: &Path,
    output_dir: &Path,
    standalone: bool,
    config: &ReaderConfig,
) -> Result<usize> {
    let raw = fs::read_to_string(input_path)
        .with_context(|| format!("Failed to read {}", input_path.display()))?;

    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .context("Could not determine output filename from input")?;

    let chapter = Chapter::from_raw(&raw).with_id(stem);
    let renderer = config.renderer();
    let body = renderer.render_html(&chapter.blocks);
    let html = if standalone {
        standalone_document(stem, &body, &renderer.stylesheet())
    } else {
        body
    };

    let output_file = output_dir.join(format!("{}.html", stem));
    fs::write(&output_file, html)?;

    tracing::info!(
        "Rendered {:?} ({:?}, {} blocks) -> {:?}",
        input_path,
        chapter.format,
        chapter.blocks.len(),
        output_file
    );

    Ok(chapter.blocks.len())
}
