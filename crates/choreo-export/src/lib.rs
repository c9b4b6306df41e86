//! # choreo-export
//!
//! Export module: writes a compiled movie as a folder an engine bridge can
//! read, with a manifest at the top and one folder of tracks per entity.

pub mod exporter;
pub mod manifest;

pub use exporter::{folder_name, ExportReport, MovieExporter};
pub use manifest::{ActorSettings, CameraSettings, Manifest};
