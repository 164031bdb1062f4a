pub mod config;
mod compositor;
mod orchestrator;
mod types;

pub use compositor::composite_stack;
pub use orchestrator::{
    composite, now_millis, CompositeRequest, CompositeRunResult, DroppedSource, FailedOperation,
    PersistedResult,
};
pub use types::{CompositeResult, NoOpReporter, ProgressEvent, ProgressReporter, ResultNaming};
