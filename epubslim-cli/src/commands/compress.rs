//! Compress command implementation

use super::resolve_config;
use crate::TuningArgs;
use anyhow::{Context, Result};
use epubslim_core::types::{bytes_to_mb, mb_to_bytes};
use epubslim_core::{compress_to_target, default_output_path, RepackReport, Repacker};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Compress the images of one EPUB file
pub fn compress(
    input: &Path,
    output: Option<&Path>,
    target_mb: Option<f64>,
    tuning: &TuningArgs,
    json: bool,
) -> Result<()> {
    let config = resolve_config(tuning)?;
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(input, &config.repack.output_suffix));

    let pb = if json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(0)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>5}/{len:5} {wide_msg}")
            .unwrap()
            .progress_chars("##-"),
    );

    let progress = pb.clone();
    let repacker = Repacker::new(config.repack.clone()).with_progress(move |current, total, path| {
        progress.set_length(total as u64);
        progress.set_position(current as u64);
        progress.set_message(path.to_string());
    });

    match target_mb {
        Some(mb) => {
            let target = mb_to_bytes(mb);
            let outcome = compress_to_target(
                &repacker,
                input,
                &output,
                &config.policy,
                target,
                &config.adaptive,
            )
            .with_context(|| format!("Failed to compress {}", input.display()))?;
            pb.finish_and_clear();

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
                return Ok(());
            }

            print_report(&outcome.best);
            println!("Passes:        {}", outcome.attempts.len());
            println!("Target:        {:.2} MB", mb);
            if outcome.target_met {
                println!("Target met: output is below {:.2} MB", mb);
            } else {
                println!("Target not met: output is still above {:.2} MB", mb);
                println!("  Kept the smallest result. You could try:");
                println!("  - a lower --quality");
                println!("  - a smaller --max-width / --max-height");
                println!("  - lower floors in the [adaptive] config section");
            }
        }
        None => {
            let report = repacker
                .repack(input, &output, &config.policy)
                .with_context(|| format!("Failed to compress {}", input.display()))?;
            pb.finish_and_clear();

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }
            print_report(&report);
        }
    }

    Ok(())
}

fn print_report(report: &RepackReport) {
    let stats = &report.stats;
    println!("Entries:       {}", stats.entries);
    println!(
        "Images:        {} re-encoded ({} resized), {} kept unchanged",
        stats.images_transformed, stats.images_resized, stats.images_skipped
    );
    for path in &stats.skipped_paths {
        println!("  skipped: {}", path);
    }
    if stats.dropped > 0 {
        println!("Dropped:       {} OS metadata entries", stats.dropped);
    }
    println!("Original size: {:.2} MB", bytes_to_mb(report.source_size));
    println!("Final size:    {:.2} MB", bytes_to_mb(report.output_size));
    println!("Reduction:     {:.1}%", report.reduction_percent());
    println!(
        "Quality:       {} (max {}x{})",
        report.policy.quality, report.policy.max_width, report.policy.max_height
    );
    println!("Saved to:      {}", report.destination.display());
}
