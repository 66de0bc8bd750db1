//! Info command implementation

use anyhow::{Context, Result};
use epubslim_core::archive::inspect;
use epubslim_core::types::bytes_to_mb;
use std::path::Path;

/// Display the entry and image breakdown of an EPUB file
pub fn info(input: &Path, json: bool) -> Result<()> {
    let summary =
        inspect(input).with_context(|| format!("Failed to read {}", input.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("File:        {}", summary.path.display());
    println!("Size:        {:.2} MB", bytes_to_mb(summary.archive_size));
    println!("Entries:     {}", summary.entries);
    println!("Directories: {}", summary.directories);
    println!(
        "Images:      {} ({:.2} MB uncompressed)",
        summary.images,
        bytes_to_mb(summary.image_bytes)
    );
    println!("Other data:  {:.2} MB uncompressed", bytes_to_mb(summary.other_bytes));
    if summary.os_metadata_entries > 0 {
        println!("OS junk:     {} entries", summary.os_metadata_entries);
    }
    if !summary.has_mimetype {
        println!("Mimetype:    missing");
    } else if summary.mimetype_first && summary.mimetype_stored {
        println!("Mimetype:    first, stored");
    } else {
        println!(
            "Mimetype:    {}, {}",
            if summary.mimetype_first { "first" } else { "not first" },
            if summary.mimetype_stored { "stored" } else { "compressed" }
        );
    }

    Ok(())
}
