//! Boundary adapters: path-data text and DXF entities.

pub mod dxf;
pub mod path_data;

pub use dxf::{to_dxf, write_dxf, DxfEntity, DxfExport, DxfOptions, DxfVertex};
pub use path_data::{parse_path_data, write_path_data, write_path_data_by_layer, PathDataOptions};
