use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{info, warn};

use crate::buffer::PixelBuffer;
use crate::consts::DEFAULT_JPEG_QUALITY;
use crate::error::{CombinerError, Result, StackError};
use crate::io::codec::{Decoder, Encoder, OutputFormat};
use crate::io::sink::{OutputSink, PendingResource, ResourceId};
use crate::io::source::ImageSource;
use crate::metadata::{copy_metadata, read_source_metadata, MetadataOutcome, MetadataSet};
use crate::stack::{Operation, OperationSet};

use super::compositor::composite_stack;
use super::config::CompositeConfig;
use super::types::{CompositeResult, ProgressReporter, ResultNaming};

/// Milliseconds since the Unix epoch, used to name results.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Everything a single compositing run needs besides its collaborators.
pub struct CompositeRequest<'a> {
    pub sources: &'a [Box<dyn ImageSource>],
    pub operations: OperationSet,
    pub format: OutputFormat,
    /// Encoder quality for lossy formats, 0-100.
    pub quality: u8,
    /// Copy allow-listed metadata from the first decoded source.
    pub copy_metadata: bool,
    /// Embedded in every result's file name.
    pub timestamp_ms: u64,
}

impl<'a> CompositeRequest<'a> {
    /// JPEG output at the default quality with metadata copy enabled.
    pub fn new(sources: &'a [Box<dyn ImageSource>], operations: OperationSet) -> Self {
        Self {
            sources,
            operations,
            format: OutputFormat::Jpeg,
            quality: DEFAULT_JPEG_QUALITY,
            copy_metadata: true,
            timestamp_ms: now_millis(),
        }
    }

    pub fn from_config(
        sources: &'a [Box<dyn ImageSource>],
        config: &CompositeConfig,
        timestamp_ms: u64,
    ) -> Self {
        Self {
            sources,
            operations: config.operations,
            format: config.output.format,
            quality: config.output.quality,
            copy_metadata: config.copy_metadata,
            timestamp_ms,
        }
    }
}

/// A result that reached the output sink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersistedResult {
    pub operation: Operation,
    pub display_name: String,
    pub resource: ResourceId,
    pub metadata: MetadataOutcome,
}

/// An operation whose result could not be persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailedOperation {
    pub operation: Operation,
    pub reason: String,
}

/// A source left out of the stack because it did not decode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DroppedSource {
    pub name: String,
    pub reason: String,
}

/// Outcome of a run that produced at least one result.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompositeRunResult {
    pub succeeded: Vec<PersistedResult>,
    pub failed: Vec<FailedOperation>,
    pub dropped_sources: Vec<DroppedSource>,
}

/// Decode, validate, composite and persist.
///
/// Sources that fail to decode are dropped; the run fails with
/// `InvalidStack` only if none decode or their sizes differ. Each
/// operation's result is persisted independently: a sink failure marks that
/// operation failed and the run continues. If every operation fails the
/// run fails with `AllOperationsFailed`.
pub fn composite(
    request: &CompositeRequest<'_>,
    decoder: &dyn Decoder,
    encoder: &dyn Encoder,
    sink: &mut dyn OutputSink,
    reporter: &dyn ProgressReporter,
) -> Result<CompositeRunResult> {
    if request.operations.is_empty() {
        return Err(CombinerError::NoOperations);
    }

    let mut run = CompositeRunResult::default();
    let (buffers, decoded_indices) = decode_sources(request.sources, decoder, &mut run);
    if buffers.is_empty() {
        return Err(StackError::EmptyStack.into());
    }
    info!(
        decoded = buffers.len(),
        dropped = run.dropped_sources.len(),
        "Sources decoded"
    );

    let naming = ResultNaming::new(request.timestamp_ms, request.format);
    let results = composite_stack(&buffers, request.operations, &naming, reporter)
        .map_err(|e| in_source_order(e, &decoded_indices))?;
    // Every operation has read the sources; release them before encoding.
    drop(buffers);

    let source_metadata = if request.copy_metadata && request.format.supports_metadata() {
        let source = request.sources[decoded_indices[0]].as_ref();
        Some(read_source_metadata(source).map_err(|e| e.to_string()))
    } else {
        None
    };

    for result in results {
        let operation = result.operation;
        match persist_result(result, request, encoder, sink, source_metadata.as_ref()) {
            Ok(persisted) => {
                info!(
                    operation = operation.name(),
                    resource = %persisted.resource,
                    "Result saved"
                );
                run.succeeded.push(persisted);
            }
            Err(e) => {
                warn!(operation = operation.name(), error = %e, "Result not saved");
                run.failed.push(FailedOperation {
                    operation,
                    reason: e.to_string(),
                });
            }
        }
    }

    if run.succeeded.is_empty() {
        return Err(CombinerError::AllOperationsFailed(
            run.failed
                .into_iter()
                .map(|f| (f.operation, f.reason))
                .collect(),
        ));
    }
    Ok(run)
}

/// Point a stack error at the source list rather than the decoded subset.
fn in_source_order(err: CombinerError, decoded_indices: &[usize]) -> CombinerError {
    match err {
        CombinerError::InvalidStack(StackError::DimensionMismatch {
            index,
            expected,
            found,
        }) => StackError::DimensionMismatch {
            index: decoded_indices[index],
            expected,
            found,
        }
        .into(),
        other => other,
    }
}

/// Decode every source, recording failures. Returns the buffers and the
/// index of the source each came from.
fn decode_sources(
    sources: &[Box<dyn ImageSource>],
    decoder: &dyn Decoder,
    run: &mut CompositeRunResult,
) -> (Vec<PixelBuffer>, Vec<usize>) {
    let mut buffers = Vec::with_capacity(sources.len());
    let mut indices = Vec::with_capacity(sources.len());

    for (index, source) in sources.iter().enumerate() {
        match decoder.decode(source.as_ref()) {
            Ok(buffer) => {
                buffers.push(buffer);
                indices.push(index);
            }
            Err(e) => {
                warn!(source = %source.name(), error = %e, "Dropping source");
                run.dropped_sources.push(DroppedSource {
                    name: source.name(),
                    reason: e.to_string(),
                });
            }
        }
    }

    (buffers, indices)
}

fn persist_result(
    result: CompositeResult,
    request: &CompositeRequest<'_>,
    encoder: &dyn Encoder,
    sink: &mut dyn OutputSink,
    source_metadata: Option<&std::result::Result<MetadataSet, String>>,
) -> Result<PersistedResult> {
    let bytes = encoder.encode(&result.buffer, request.format, request.quality)?;
    drop(result.buffer);

    let pending = sink.create_pending(&result.display_name, request.format.mime_type())?;
    match write_and_finalize(sink, &pending, &bytes, source_metadata) {
        Ok((resource, metadata)) => Ok(PersistedResult {
            operation: result.operation,
            display_name: result.display_name,
            resource,
            metadata,
        }),
        Err(e) => {
            if let Err(cleanup) = sink.delete_pending(pending) {
                warn!(error = %cleanup, "Could not delete pending resource");
            }
            Err(e)
        }
    }
}

/// Write, copy metadata, finalize. A metadata failure is recorded in the
/// outcome and never stops the image from being finalized.
fn write_and_finalize(
    sink: &mut dyn OutputSink,
    pending: &PendingResource,
    bytes: &[u8],
    source_metadata: Option<&std::result::Result<MetadataSet, String>>,
) -> Result<(ResourceId, MetadataOutcome)> {
    sink.write(pending, bytes)?;

    let metadata = match source_metadata {
        None => MetadataOutcome::Skipped,
        Some(Err(reason)) => MetadataOutcome::Failed {
            reason: reason.clone(),
        },
        Some(Ok(set)) => match copy_metadata(set, sink, pending) {
            Ok(tags) => MetadataOutcome::Copied { tags },
            Err(e) => {
                warn!(resource = %pending.display_name, error = %e, "Metadata not copied");
                MetadataOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        },
    };

    let resource = sink.finalize(pending.clone())?;
    Ok((resource, metadata))
}
