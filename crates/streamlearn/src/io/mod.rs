//! IO utilities for loading datasets from disk.

pub mod file_stream;

pub use file_stream::{open_file_stream, read_dataset, FileFormat, FileOptions};
