pub mod fields;
pub mod jpeg;
pub mod propagate;
pub mod tags;

pub use propagate::{copy_metadata, read_source_metadata, CopyStrategy, MetadataOutcome};
pub use tags::{Ifd, MetadataSet, MetadataTag, ValueKind, ALLOW_LIST};
