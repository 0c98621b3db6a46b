//! 以三个选中节点为基准整体移动、旋转模型
//!
//! 第一个节点移到原点；再依次绕 Z、X、Y 轴旋转，
//! 使第二个节点落在 +Y 轴上，第三个节点落在 +Y/+Z 平面内。

use crate::command::{CommandContext, CommandReport};
use crate::error::{CommandError, Result};
use crate::pipeline::CommandInput;
use kozo_core::frame::Frame;
use kozo_core::math::{Axis, Vector3};
use kozo_core::node::NodeId;

pub async fn run(ctx: CommandContext, _input: CommandInput) -> Result<CommandReport> {
    let nodes = ctx.selection.nodes();
    if nodes.len() < 3 {
        return Err(CommandError::Selection(format!(
            "rotate zero needs 3 nodes, {} selected",
            nodes.len()
        )));
    }
    let mut frame = ctx.frame.write().await;
    rotate_zero(&mut frame, [nodes[0], nodes[1], nodes[2]])?;
    Ok(CommandReport {
        modified: frame.elem_ids(),
        created: Vec::new(),
    })
}

pub fn rotate_zero(frame: &mut Frame, nodes: [NodeId; 3]) -> Result<()> {
    let origin = frame.coord(nodes[0])?;
    frame.move_all(-origin.x, -origin.y, -origin.z);

    let center = Vector3::zeros();
    let p1 = frame.coord(nodes[1])?;
    frame.rotate(&center, &Axis::Z.unit(), p1.x.atan2(p1.y));

    let p1 = frame.coord(nodes[1])?;
    frame.rotate(&center, &Axis::X.unit(), (-p1.z).atan2(p1.y));

    let p2 = frame.coord(nodes[2])?;
    frame.rotate(&center, &Axis::Y.unit(), -p2.x.atan2(p2.z));

    tracing::info!("rotate zero on nodes {:?}", nodes);
    Ok(())
}
