//! Batch compression command implementation

use super::resolve_config;
use crate::TuningArgs;
use anyhow::{bail, Context, Result};
use epubslim_core::types::bytes_to_mb;
use epubslim_core::{default_output_path, ImageTransformPolicy, Repacker};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Compress every EPUB in a directory
pub fn batch(input_dir: &Path, output_dir: &Path, jobs: usize, tuning: &TuningArgs) -> Result<()> {
    let config = resolve_config(tuning)?;

    // Ensure output directory exists
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    // Find all EPUB files
    let files: Vec<_> = fs::read_dir(input_dir)
        .with_context(|| format!("Failed to read {}", input_dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .map(|ext| ext.eq_ignore_ascii_case("epub"))
                    .unwrap_or(false)
        })
        .collect();

    if files.is_empty() {
        println!("No EPUB files found in {}", input_dir.display());
        return Ok(());
    }

    println!("Found {} files to compress", files.len());

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );

    let repacker = Repacker::new(config.repack.clone());
    let success_count = AtomicUsize::new(0);
    let error_count = AtomicUsize::new(0);
    let bytes_before = AtomicU64::new(0);
    let bytes_after = AtomicU64::new(0);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .context("Failed to build thread pool")?;

    // Each file gets its own reader and writer; only the files run in parallel
    pool.install(|| {
        files.par_iter().for_each(|file_path| {
            match process_file(&repacker, file_path, output_dir, &config.policy) {
                Ok((before, after)) => {
                    success_count.fetch_add(1, Ordering::Relaxed);
                    bytes_before.fetch_add(before, Ordering::Relaxed);
                    bytes_after.fetch_add(after, Ordering::Relaxed);
                }
                Err(e) => {
                    error_count.fetch_add(1, Ordering::Relaxed);
                    tracing::error!("Failed to compress {:?}: {:#}", file_path, e);
                }
            }

            overall_pb.inc(1);
        });
    });

    overall_pb.finish();

    let success = success_count.load(Ordering::Relaxed);
    let errors = error_count.load(Ordering::Relaxed);

    println!("\nBatch compression complete:");
    println!("  Success: {}", success);
    println!("  Errors:  {}", errors);
    println!(
        "  Size:    {:.2} MB -> {:.2} MB",
        bytes_to_mb(bytes_before.load(Ordering::Relaxed)),
        bytes_to_mb(bytes_after.load(Ordering::Relaxed))
    );

    if errors > 0 {
        bail!("Batch compression completed with {} errors", errors);
    }

    Ok(())
}

fn process_file(
    repacker: &Repacker,
    input_path: &Path,
    output_dir: &Path,
    policy: &ImageTransformPolicy,
) -> Result<(u64, u64)> {
    let file_name = input_path
        .file_name()
        .context("Could not determine output filename from input")?;
    let output_file = default_output_path(
        &output_dir.join(file_name),
        &repacker.options().output_suffix,
    );

    let report = repacker.repack(input_path, &output_file, policy)?;

    tracing::info!(
        "Compressed {:?} -> {:?} ({:.1}% smaller)",
        input_path,
        output_file,
        report.reduction_percent()
    );

    Ok((report.source_size, report.output_size))
}
