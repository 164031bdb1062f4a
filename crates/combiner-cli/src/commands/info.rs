use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use combiner_core::io::codec::{Decoder, ImageCodec};
use combiner_core::io::source::{FileSource, ImageSource};
use combiner_core::metadata::read_source_metadata;

#[derive(Args)]
pub struct InfoArgs {
    /// Image file
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let source = FileSource::new(&args.file);
    let buffer = ImageCodec
        .decode(&source)
        .with_context(|| format!("Failed to decode {}", source.name()))?;
    let metadata = read_source_metadata(&source)?;

    println!("File:        {}", args.file.display());
    println!("Dimensions:  {}x{}", buffer.width(), buffer.height());
    if metadata.is_empty() {
        println!("Metadata:    none copyable");
    } else {
        println!("Metadata:    {} copyable tag(s)", metadata.len());
        for (tag, value) in metadata.iter() {
            println!("  {:<24}{}", tag.name, value);
        }
    }
    Ok(())
}
