use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use combiner_core::io::codec::{ImageCodec, OutputFormat};
use combiner_core::io::sink::DirectorySink;
use combiner_core::io::source::{FileSource, ImageSource};
use combiner_core::pipeline::config::{CompositeConfig, OutputConfig};
use combiner_core::pipeline::{
    composite, now_millis, CompositeRequest, ProgressEvent, ProgressReporter,
};
use combiner_core::stack::{Operation, OperationSet};
use indicatif::{ProgressBar, ProgressStyle};

use crate::summary::{print_config_summary, print_run_summary};

#[derive(Clone, ValueEnum)]
pub enum FormatArg {
    Jpeg,
    Png,
}

#[derive(Args)]
pub struct CombineArgs {
    /// Input images, in stack order
    pub files: Vec<PathBuf>,

    /// Composite config file (TOML); replaces the other options
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Produce the per-pixel average
    #[arg(long)]
    pub mean: bool,

    /// Produce the per-pixel median
    #[arg(long)]
    pub median: bool,

    /// Produce the per-pixel mode
    #[arg(long)]
    pub mode: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "jpeg")]
    pub format: FormatArg,

    /// JPEG quality (1-100)
    #[arg(long, default_value = "95")]
    pub quality: u8,

    /// Picture collection to save into
    #[arg(short, long, default_value = "Pictures")]
    pub output: PathBuf,

    /// Folder under the output directory
    #[arg(long)]
    pub subfolder: Option<String>,

    /// Treat the output as write-once (metadata is applied by rewriting the file)
    #[arg(long)]
    pub write_once: bool,

    /// Do not copy EXIF metadata from the first image
    #[arg(long)]
    pub no_metadata: bool,
}

/// Drives an indicatif bar from compositor callbacks.
struct BarReporter {
    bar: ProgressBar,
}

impl ProgressReporter for BarReporter {
    fn operation_started(&self, operation: Operation) {
        self.bar.set_message(operation.to_string());
    }

    fn progress(&self, event: &ProgressEvent) {
        self.bar.set_position((event.overall_fraction * 100.0) as u64);
    }
}

pub fn run(args: &CombineArgs) -> Result<()> {
    let config: CompositeConfig = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        toml::from_str(&contents).context("Invalid composite config")?
    } else {
        build_config_from_args(args)
    };
    config.validate()?;

    print_config_summary(&config);

    let sources: Vec<Box<dyn ImageSource>> = config
        .inputs
        .iter()
        .map(|path| Box::new(FileSource::new(path)) as Box<dyn ImageSource>)
        .collect();
    let mut sink = DirectorySink::new(&config.output.directory, config.output.subfolder.as_deref())
        .with_capability(config.output.capability());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:10} [{bar:40}] {pos}%")?
            .progress_chars("=> "),
    );
    let reporter = BarReporter { bar: pb };

    let request = CompositeRequest::from_config(&sources, &config, now_millis());
    let result = composite(&request, &ImageCodec, &ImageCodec, &mut sink, &reporter)?;
    reporter.bar.finish_with_message("Done");

    print_run_summary(&result);
    Ok(())
}

fn build_config_from_args(args: &CombineArgs) -> CompositeConfig {
    let operations = OperationSet {
        mean: args.mean,
        median: args.median,
        mode: args.mode,
    };
    let format = match args.format {
        FormatArg::Jpeg => OutputFormat::Jpeg,
        FormatArg::Png => OutputFormat::Png,
    };

    CompositeConfig {
        inputs: args.files.clone(),
        copy_metadata: !args.no_metadata,
        operations,
        output: OutputConfig {
            directory: args.output.clone(),
            subfolder: args.subfolder.clone(),
            format,
            quality: args.quality,
            write_once: args.write_once,
        },
    }
}
