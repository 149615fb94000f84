//! MRMC Carts export: sample camera and target positions over the scene's
//! frame range, convert them to rig space and write a Flair Carts file.

pub mod carts;
pub mod conversion;
pub mod error;
pub mod exporter;
pub mod report;

pub use carts::{CartsHeader, CartsWriter, Sample};
pub use conversion::ConversionMatrix;
pub use error::{ExportError, ObjectRole};
pub use exporter::{export, resolve_output_path, ExportRequest, Exporter};
pub use report::{ExportReport, ExportSummary, Severity};
