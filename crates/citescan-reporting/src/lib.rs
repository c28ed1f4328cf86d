pub mod export;
pub mod types;

pub use export::{ExportError, export_csv, export_json, export_markdown, export_results};
pub use types::{ExportFormat, UnknownFormat};
