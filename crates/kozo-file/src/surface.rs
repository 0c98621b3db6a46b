//! 曲面点网格导出
//!
//! 输出给曲面建模工具的点网格脚本：固定表头加上逐行 `x,y,z`（毫米）。
//! 每行 [`GRID_COLUMNS`] 个点，节点按编号升序排列。

use crate::error::{FileError, Result};
use kozo_core::frame::Frame;
use kozo_core::node::NodeId;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// 网格每行的点数
pub const GRID_COLUMNS: usize = 11;

pub fn write_surface<W: Write>(frame: &Frame, nodes: &[NodeId], writer: &mut W) -> Result<()> {
    let mut ids = nodes.to_vec();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() || ids.len() % GRID_COLUMNS != 0 {
        return Err(FileError::InvalidFormat(format!(
            "{} points do not fill rows of {}",
            ids.len(),
            GRID_COLUMNS
        )));
    }
    let rows = ids.len() / GRID_COLUMNS;

    write!(writer, "_SrfPtGrid\n_KeepPoint\n{}\n{}\n", GRID_COLUMNS, rows)?;
    for id in ids {
        let p = frame.coord(id)? * 1000.0;
        writeln!(writer, "{:.3},{:.3},{:.3}", p.x, p.y, p.z)?;
    }
    tracing::info!("surface written: {} rows", rows);
    Ok(())
}

pub fn write_surface_file(frame: &Frame, nodes: &[NodeId], path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_surface(frame, nodes, &mut writer)?;
    writer.flush()?;
    Ok(())
}
