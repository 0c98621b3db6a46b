//! KOZO 交互层
//!
//! 选择集、命令管道与显示命令。命令作为 tokio 任务运行，
//! 通过管道逐个接收拾取到的构件与节点。

pub mod command;
pub mod command_registry;
pub mod commands;
pub mod display;
pub mod error;
pub mod pipeline;
pub mod selection;

pub use command::{spawn_command, CommandContext, CommandReport, CommandType, CutterParams};
pub use command_registry::CommandRegistry;
pub use display::{apply, execute, parse, DisplayCommand, Parsed};
pub use error::{CommandError, Result};
pub use pipeline::{CommandInput, CommandPipeline, CommandStreams, Hit, SharedFrame};
pub use selection::Selection;
