//! 属性匹配
//!
//! 先取得源构件（选择集中的第一根，或输入流中的第一根），
//! 之后收到的每根构件都改为源构件的断面与类型，直到命令结束。

use crate::command::{CommandContext, CommandReport};
use crate::error::{CommandError, Result};
use crate::pipeline::CommandInput;

pub async fn run(ctx: CommandContext, mut input: CommandInput) -> Result<CommandReport> {
    let source = match ctx.selection.elems().first() {
        Some(&e) => e,
        None => input.next_elem().await.ok_or(CommandError::Cancelled)?,
    };
    let (sect, etype, is_line) = {
        let frame = ctx.frame.read().await;
        let elem = frame.elem(source)?;
        (elem.sect, elem.etype, elem.is_line())
    };
    tracing::debug!("match property source {}: sect {} {}", source, sect, etype);

    let mut report = CommandReport::default();
    while let Some(id) = input.next_elem().await {
        let mut frame = ctx.frame.write().await;
        let elem = match frame.elem_mut(id) {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("match property: {}", e);
                continue;
            }
        };
        // 线构件与面构件之间不能互换类型
        if elem.is_line() != is_line {
            tracing::warn!("match property: element {} is a different kind", id);
            continue;
        }
        elem.sect = sect;
        elem.etype = etype;
        report.modified.push(id);
    }
    tracing::info!("match property: {} elements changed", report.modified.len());
    Ok(report)
}
