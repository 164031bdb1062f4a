use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_JPEG_QUALITY;
use crate::error::{CombinerError, Result};
use crate::io::codec::OutputFormat;
use crate::io::sink::SinkCapability;
use crate::stack::OperationSet;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompositeConfig {
    /// Images to combine, in stack order.
    pub inputs: Vec<PathBuf>,
    /// Copy allow-listed EXIF tags from the first decoded input.
    #[serde(default = "default_copy_metadata")]
    pub copy_metadata: bool,
    #[serde(default)]
    pub operations: OperationSet,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_copy_metadata() -> bool {
    true
}

impl Default for CompositeConfig {
    fn default() -> Self {
        Self {
            inputs: vec![],
            copy_metadata: default_copy_metadata(),
            operations: OperationSet::default(),
            output: OutputConfig::default(),
        }
    }
}

impl CompositeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(CombinerError::InvalidConfig("no input images".into()));
        }
        if self.operations.is_empty() {
            return Err(CombinerError::NoOperations);
        }
        if !(1..=100).contains(&self.output.quality) {
            return Err(CombinerError::InvalidConfig(format!(
                "quality {} outside 1-100",
                self.output.quality
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root of the picture collection results are saved into.
    pub directory: PathBuf,
    /// Optional folder under `directory`.
    pub subfolder: Option<String>,
    pub format: OutputFormat,
    /// Encoder quality for lossy formats (1-100).
    pub quality: u8,
    /// Treat the destination as write-once, editing metadata via a full rewrite.
    pub write_once: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("Pictures"),
            subfolder: None,
            format: OutputFormat::Jpeg,
            quality: DEFAULT_JPEG_QUALITY,
            write_once: false,
        }
    }
}

impl OutputConfig {
    pub fn capability(&self) -> SinkCapability {
        if self.write_once {
            SinkCapability::WriteOnce
        } else {
            SinkCapability::RandomAccess
        }
    }
}
