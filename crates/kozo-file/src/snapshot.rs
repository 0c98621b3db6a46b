//! Frame 的 JSON 快照
//!
//! 带版本号的包装；读取后重建坐标索引。

use crate::error::{FileError, Result};
use kozo_core::frame::Frame;
use serde::{Deserialize, Serialize};

/// 当前快照版本
const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    frame: &'a Frame,
}

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    frame: Frame,
}

pub fn to_json(frame: &Frame) -> Result<String> {
    Ok(serde_json::to_string_pretty(&SnapshotRef {
        version: FORMAT_VERSION,
        frame,
    })?)
}

pub fn from_json(text: &str) -> Result<Frame> {
    let snapshot: Snapshot = serde_json::from_str(text)?;
    if snapshot.version > FORMAT_VERSION {
        return Err(FileError::InvalidFormat(format!(
            "snapshot version {} is newer than {}",
            snapshot.version, FORMAT_VERSION
        )));
    }
    let mut frame = snapshot.frame;
    frame.rebuild_index();
    tracing::debug!(
        "snapshot loaded: {} nodes, {} elements",
        frame.node_count(),
        frame.elem_count()
    );
    Ok(frame)
}
