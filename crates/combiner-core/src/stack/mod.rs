pub mod mean;
pub mod median;
pub mod mode;
pub mod operation;
pub mod validate;

pub use operation::{Operation, OperationSet};
pub use validate::{validate_stack, StackGeometry};
