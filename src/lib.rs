//! Export camera and target trajectories to Mark Roberts Motion Control
//! "Carts" files.

pub mod config;
pub mod export;
pub mod host;
pub mod scene_graph;

pub use config::{ExportConfig, WriteMode};
pub use export::{export, ExportError, ExportReport, ExportRequest, ExportSummary, Exporter};
pub use host::{FrameGuard, SceneHost};
pub use scene_graph::Scene;
