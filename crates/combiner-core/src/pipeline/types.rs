use crate::buffer::PixelBuffer;
use crate::consts::COMPLETE_OPERATION_NAME;
use crate::io::codec::OutputFormat;
use crate::stack::Operation;

/// A normalized progress sample emitted while compositing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressEvent {
    /// Progress across every requested operation, in [0, 1].
    pub overall_fraction: f64,
    /// Name of the running operation, or `"complete"` for the final event.
    pub operation_name: &'static str,
    /// Progress of the running operation, in [0, 1].
    pub operation_fraction: f64,
}

impl ProgressEvent {
    pub(crate) fn complete() -> Self {
        Self {
            overall_fraction: 1.0,
            operation_name: COMPLETE_OPERATION_NAME,
            operation_fraction: 1.0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.operation_name == COMPLETE_OPERATION_NAME
    }
}

/// Thread-safe progress reporting for a compositing run.
///
/// Callbacks fire on the thread driving the run, in order, never
/// concurrently. Forwarding them to a UI thread is the implementor's job.
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// An operation is about to scan the stack.
    fn operation_started(&self, _operation: Operation) {}

    /// Progress within the current operation and across the run.
    fn progress(&self, _event: &ProgressEvent) {}
}

/// No-op progress reporter.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// The output of one operation over one stack.
#[derive(Clone, Debug)]
pub struct CompositeResult {
    pub operation: Operation,
    /// File name the result is persisted under.
    pub display_name: String,
    pub buffer: PixelBuffer,
}

/// Generates `<prefix>_image_<timestamp>.<ext>` names for one run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResultNaming {
    pub timestamp_ms: u64,
    pub format: OutputFormat,
}

impl ResultNaming {
    pub fn new(timestamp_ms: u64, format: OutputFormat) -> Self {
        Self {
            timestamp_ms,
            format,
        }
    }

    pub fn display_name(&self, operation: Operation) -> String {
        format!(
            "{}_image_{}.{}",
            operation.file_prefix(),
            self.timestamp_ms,
            self.format.extension()
        )
    }
}
