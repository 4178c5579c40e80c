pub mod api;
pub mod chunker;
pub mod embedding;
pub mod extract;
pub mod index;
pub mod processor;

pub use api::{select_pdf_uploads, UploadError, UploadedFile};
pub use index::DocumentIndex;
pub use processor::{DocumentProcessor, IngestionError, ProcessedDocument};
