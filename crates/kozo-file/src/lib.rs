//! KOZO 文件格式处理
//!
//! 支持：
//! - `.inp` 节点、断面、构件文本
//! - `.inl` 构件短表
//! - 曲面点网格导出（毫米单位）
//! - Frame 的 JSON 快照

pub mod error;
pub mod inl;
pub mod inp;
pub mod snapshot;
pub mod surface;

pub use error::{FileError, Result};
pub use inl::{inl_elem_string, inl_node_string, write_inl};
pub use inp::{elem_inp_string, node_inp_string, sect_inp_string, write_inp};
pub use snapshot::{from_json, to_json};
pub use surface::{write_surface, write_surface_file, GRID_COLUMNS};
