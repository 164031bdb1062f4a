pub mod codec;
pub mod sink;
pub mod source;
