//! Built-in sink implementations
//!
//! Leaf sinks write somewhere (console, writer, file, rotating file, remote
//! collector); decorators wrap another sink and change when or whether a
//! record reaches it (buffered, filter).

pub mod buffered;
pub mod console;
pub mod file;
pub mod filter;
pub mod remote;
pub mod rotating_file;
pub mod writer;

pub use crate::core::Sink;
pub use buffered::BufferedSink;
pub use console::ConsoleSink;
pub use file::FileSink;
pub use filter::FilterSink;
pub use remote::RemoteSink;
pub use rotating_file::RotatingFileSink;
pub use writer::{MemorySink, WriterSink};
