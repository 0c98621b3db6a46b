//! 具体的命令实现
//!
//! 每个命令模块提供 `run(ctx, input)`，由 [`spawn_command`](crate::command::spawn_command) 启动。

pub mod cutter;
pub mod divide_at_ons;
pub mod match_property;
pub mod rotate_zero;
pub mod set_cang;
