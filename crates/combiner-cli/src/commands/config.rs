use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use combiner_core::pipeline::config::CompositeConfig;
use combiner_core::stack::OperationSet;

#[derive(Args)]
pub struct ConfigArgs {
    /// Write config to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Print or save a full default CompositeConfig as TOML.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let config = CompositeConfig {
        inputs: vec![PathBuf::from("IMG_0001.jpg"), PathBuf::from("IMG_0002.jpg")],
        operations: OperationSet::all(),
        ..Default::default()
    };
    let toml_str = toml::to_string_pretty(&config)?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &toml_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        println!("Default config saved to {}", path.display());
    } else {
        print!("{}", toml_str);
    }

    Ok(())
}
