//! 按固定间距的平面切断模型并连梁
//!
//! 对 `axis = k·pitch` 的每个平面：分割穿过平面的线构件，
//! 收集分割点和原本就在平面上的节点，沿正交轴排序后相邻两点之间新建梁。

use crate::command::{CommandContext, CommandReport, CutterParams};
use crate::error::{CommandError, Result};
use crate::pipeline::CommandInput;
use kozo_core::element::{ElemId, Etype};
use kozo_core::frame::Frame;
use kozo_core::math::Axis;
use kozo_core::node::NodeId;
use std::collections::BTreeSet;

pub async fn run(ctx: CommandContext, _input: CommandInput) -> Result<CommandReport> {
    let mut frame = ctx.frame.write().await;
    let created = cutter(&mut frame, &ctx.cutter)?;
    Ok(CommandReport {
        modified: Vec::new(),
        created,
    })
}

/// 排序用的正交轴
fn orthogonal(axis: Axis) -> Axis {
    match axis {
        Axis::X => Axis::Y,
        Axis::Y | Axis::Z => Axis::X,
    }
}

/// 切断一个平面，返回新建的梁
fn cut_plane(frame: &mut Frame, axis: Axis, coord: f64, sect: u32) -> Result<Vec<ElemId>> {
    let i = axis.index();
    let eps = frame.config.eps;
    let mut points: BTreeSet<NodeId> = BTreeSet::new();

    for id in frame.fence(axis, coord, false) {
        let divided = frame.divide_at_axis(id, axis, coord)?;
        points.extend(divided.nodes);
    }
    points.extend(
        frame
            .nodes()
            .filter(|n| (n.coord[i] - coord).abs() <= eps)
            .map(|n| n.num),
    );
    if points.len() < 2 {
        return Ok(Vec::new());
    }

    let o = orthogonal(axis).index();
    let mut sorted = Vec::with_capacity(points.len());
    for n in points {
        sorted.push((frame.coord(n)?[o], n));
    }
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut created = Vec::new();
    for pair in sorted.windows(2) {
        let (a, b) = (pair[0].1, pair[1].1);
        if !frame.search_elem(&[a, b]).is_empty() {
            continue;
        }
        created.push(frame.add_line_elem([a, b], sect, Etype::Girder, None)?);
    }
    Ok(created)
}

pub fn cutter(frame: &mut Frame, params: &CutterParams) -> Result<Vec<ElemId>> {
    if !(params.pitch > 0.0) {
        return Err(CommandError::InvalidArgument(format!(
            "cutter pitch {}",
            params.pitch
        )));
    }
    let Some(bbox) = frame.bbox() else {
        return Ok(Vec::new());
    };
    let i = params.axis.index();
    let eps = frame.config.eps;
    let first = ((bbox.min[i] - eps) / params.pitch).ceil() as i64;
    let last = ((bbox.max[i] + eps) / params.pitch).floor() as i64;

    let mut created = Vec::new();
    for k in first..=last {
        let coord = k as f64 * params.pitch;
        created.extend(cut_plane(frame, params.axis, coord, params.sect)?);
    }
    tracing::info!(
        "cutter {} pitch {}: {} girders created",
        params.axis.name(),
        params.pitch,
        created.len()
    );
    Ok(created)
}
