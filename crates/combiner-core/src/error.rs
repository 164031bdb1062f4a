use thiserror::Error;

use crate::stack::Operation;

/// Structural problems with a stack, detected before any operation starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StackError {
    #[error("Empty image stack")]
    EmptyStack,

    #[error(
        "Image {index} is {}x{} but the stack is {}x{}",
        .found.0, .found.1, .expected.0, .expected.1
    )]
    DimensionMismatch {
        index: usize,
        expected: (u32, u32),
        found: (u32, u32),
    },
}

#[derive(Error, Debug)]
pub enum CombinerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Invalid stack: {0}")]
    InvalidStack(#[from] StackError),

    #[error("No operations selected")]
    NoOperations,

    #[error("Failed to decode {source_name}: {reason}")]
    Decode { source_name: String, reason: String },

    #[error("Invalid pixel buffer: {0}")]
    InvalidBuffer(String),

    #[error("Invalid EXIF data: {0}")]
    InvalidExif(String),

    #[error("Metadata copy failed: {0}")]
    MetadataCopyFailed(String),

    #[error("Output sink error: {0}")]
    OutputSink(String),

    #[error("All requested operations failed: {}", format_failures(.0))]
    AllOperationsFailed(Vec<(Operation, String)>),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

fn format_failures(failures: &[(Operation, String)]) -> String {
    failures
        .iter()
        .map(|(op, reason)| format!("{op}: {reason}"))
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, CombinerError>;
