//! 按相邻墙的法线设定梁的转角
//!
//! 对每根梁，取同时包含其两端点、且断面编号除以 100 的余数与梁相同的墙，
//! 累加墙的单位法线，使梁的强轴朝向该合向量。

use crate::command::{CommandContext, CommandReport};
use crate::error::Result;
use crate::pipeline::CommandInput;
use kozo_core::element::{ElemId, Etype};
use kozo_core::frame::Frame;
use kozo_core::math::{Vector3, EPSILON};

pub async fn run(ctx: CommandContext, _input: CommandInput) -> Result<CommandReport> {
    let mut frame = ctx.frame.write().await;
    let targets: Vec<ElemId> = if ctx.selection.elems().is_empty() {
        frame.elem_ids()
    } else {
        ctx.selection.elems().to_vec()
    };
    let modified = set_cang(&mut frame, &targets)?;
    Ok(CommandReport {
        modified,
        created: Vec::new(),
    })
}

pub fn set_cang(frame: &mut Frame, targets: &[ElemId]) -> Result<Vec<ElemId>> {
    let mut modified = Vec::new();
    for &id in targets {
        let girder = frame.elem(id)?;
        if girder.etype != Etype::Girder {
            continue;
        }
        let key = girder.sect % 100;
        let ends = [girder.enodes[0], girder.enodes[1]];

        let mut sum = Vector3::zeros();
        for wall in frame.search_elem(&ends) {
            let w = frame.elem(wall)?;
            if w.etype == Etype::Wall && w.sect % 100 == key {
                sum += frame.normal(wall, true)?;
            }
        }
        if sum.norm() < EPSILON {
            continue;
        }
        let cang = frame.axis_to_cang(id, &sum, true)?;
        tracing::debug!("girder {} cang {:.5}", id, cang);
        modified.push(id);
    }
    tracing::info!("set cang: {} girders", modified.len());
    Ok(modified)
}
