//! 在中间节点处分割收到的每根线构件

use crate::command::{CommandContext, CommandReport};
use crate::error::Result;
use crate::pipeline::CommandInput;

pub async fn run(ctx: CommandContext, mut input: CommandInput) -> Result<CommandReport> {
    let mut report = CommandReport::default();
    while let Some(id) = input.next_elem().await {
        let mut frame = ctx.frame.write().await;
        match frame.divide_at_ons(id) {
            Ok(divided) => {
                if divided.elems.len() > 1 {
                    report.modified.push(id);
                    report.created.extend_from_slice(&divided.elems[1..]);
                }
            }
            Err(e) => tracing::warn!("divide at ons: {}", e),
        }
    }
    tracing::info!("divide at ons: {} elements created", report.created.len());
    Ok(report)
}
