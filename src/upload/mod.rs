mod file_processor;
mod types;

pub use file_processor::{FileProcessor, UploadEndpoint};
pub use types::{FileDescriptor, FileSource, Selection, UploadStatus};
