use std::io::{Read, Seek, SeekFrom, Write};

use exif::{Field, In};
use tracing::{debug, warn};

use crate::error::{CombinerError, Result};
use crate::io::sink::{OutputSink, PendingResource, RandomAccess, SinkCapability};
use crate::io::source::ImageSource;

use super::fields::{parse_value, read_exif, value_text, writable_fields, write_tiff};
use super::jpeg::{is_jpeg, replace_exif};
use super::tags::{MetadataSet, ALLOW_LIST};

/// How metadata is written into a pending destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CopyStrategy {
    /// Edit through a random-access handle on the destination.
    Direct,
    /// Read the destination into scratch, edit, overwrite it in full.
    RoundTrip,
}

impl CopyStrategy {
    pub fn for_capability(capability: SinkCapability) -> Self {
        match capability {
            SinkCapability::RandomAccess => Self::Direct,
            SinkCapability::WriteOnce => Self::RoundTrip,
        }
    }
}

/// What happened to a result's metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MetadataOutcome {
    /// `tags` allow-listed tags were written.
    Copied { tags: usize },
    /// Nothing was attempted (copy disabled or format without metadata).
    Skipped,
    /// The copy failed; the image itself was still persisted.
    Failed { reason: String },
}

fn copy_failed(err: impl std::fmt::Display) -> CombinerError {
    CombinerError::MetadataCopyFailed(err.to_string())
}

/// Read the allow-listed tags of a source image.
///
/// Only a failure to read the source stream is an error; sources that are
/// not JPEG or carry no readable EXIF give an empty set.
pub fn read_source_metadata(source: &dyn ImageSource) -> Result<MetadataSet> {
    let bytes = source
        .read_all()
        .map_err(|e| copy_failed(format!("reading {}: {e}", source.name())))?;
    Ok(metadata_from_bytes(&bytes))
}

/// Allow-listed tags found in an encoded image.
pub fn metadata_from_bytes(bytes: &[u8]) -> MetadataSet {
    let mut set = MetadataSet::new();
    if !is_jpeg(bytes) {
        return set;
    }

    let block = match read_exif(bytes) {
        Ok(Some(block)) => block,
        Ok(None) => return set,
        Err(e) => {
            warn!(error = %e, "Ignoring unreadable source EXIF");
            return set;
        }
    };

    for tag in ALLOW_LIST {
        let Some(field) = block.get_field(tag.exif_tag(), In::PRIMARY) else {
            continue;
        };
        match value_text(&field.value) {
            Some(text) => set.insert(*tag, text),
            None => debug!(tag = tag.name, "Skipping metadata tag without a text form"),
        }
    }
    set
}

/// Write `metadata` into an encoded JPEG, returning the new bytes and the
/// number of tags applied.
///
/// Fields already in the destination are kept unless the set replaces them.
/// Tags whose value does not parse are skipped.
pub fn apply_metadata(jpeg: &[u8], metadata: &MetadataSet) -> Result<(Vec<u8>, usize)> {
    if !is_jpeg(jpeg) {
        return Err(CombinerError::InvalidExif("not a JPEG stream".into()));
    }

    let mut fields = match read_exif(jpeg) {
        Ok(Some(block)) => writable_fields(&block),
        Ok(None) => Vec::new(),
        Err(e) => {
            debug!(error = %e, "Replacing unreadable destination EXIF");
            Vec::new()
        }
    };

    let mut applied = 0;
    for (tag, text) in metadata.iter() {
        let value = match parse_value(tag.kind, text) {
            Ok(value) => value,
            Err(e) => {
                warn!(tag = tag.name, error = %e, "Skipping metadata tag");
                continue;
            }
        };
        let exif_tag = tag.exif_tag();
        fields.retain(|f| f.tag != exif_tag);
        fields.push(Field {
            tag: exif_tag,
            ifd_num: In::PRIMARY,
            value,
        });
        applied += 1;
    }

    if fields.is_empty() {
        return Ok((jpeg.to_vec(), 0));
    }
    Ok((replace_exif(jpeg, &write_tiff(&fields)?)?, applied))
}

/// Copy `metadata` into a pending JPEG resource, choosing the strategy from
/// the resource's capability. Returns the number of tags written.
pub fn copy_metadata(
    metadata: &MetadataSet,
    sink: &mut dyn OutputSink,
    resource: &PendingResource,
) -> Result<usize> {
    if metadata.is_empty() {
        return Ok(0);
    }

    let strategy = CopyStrategy::for_capability(resource.capability);
    debug!(
        resource = %resource.display_name,
        ?strategy,
        tags = metadata.len(),
        "Copying metadata"
    );
    match strategy {
        CopyStrategy::Direct => copy_direct(metadata, sink, resource),
        CopyStrategy::RoundTrip => copy_round_trip(metadata, sink, resource),
    }
}

fn copy_direct(
    metadata: &MetadataSet,
    sink: &mut dyn OutputSink,
    resource: &PendingResource,
) -> Result<usize> {
    let mut handle = sink.open_random_access(resource).map_err(copy_failed)?;

    let mut scratch = Vec::new();
    handle.seek(SeekFrom::Start(0)).map_err(copy_failed)?;
    handle.read_to_end(&mut scratch).map_err(copy_failed)?;

    let (edited, applied) = apply_metadata(&scratch, metadata).map_err(copy_failed)?;

    handle.seek(SeekFrom::Start(0)).map_err(copy_failed)?;
    handle.write_all(&edited).map_err(copy_failed)?;
    handle.truncate(edited.len() as u64).map_err(copy_failed)?;
    handle.flush().map_err(copy_failed)?;
    Ok(applied)
}

fn copy_round_trip(
    metadata: &MetadataSet,
    sink: &mut dyn OutputSink,
    resource: &PendingResource,
) -> Result<usize> {
    let scratch = sink.read_back(resource).map_err(copy_failed)?;
    let (edited, applied) = apply_metadata(&scratch, metadata).map_err(copy_failed)?;
    sink.overwrite(resource, &edited).map_err(copy_failed)?;
    Ok(applied)
}
