//! 命令类型与运行环境
//!
//! 每个命令是一个异步任务：从 [`CommandInput`] 取得拾取结果，
//! 在两次等待之间持有 Frame 的写锁完成修改。

use crate::commands;
use crate::error::Result;
use crate::pipeline::{CommandInput, CommandPipeline, SharedFrame};
use crate::selection::Selection;
use kozo_core::element::ElemId;
use kozo_core::math::Axis;
use kozo_core::section::SectId;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// 命令类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandType {
    MatchProperty,
    DivideAtOns,
    RotateZero,
    Cutter,
    SetCang,
}

impl CommandType {
    pub const ALL: [CommandType; 5] = [
        CommandType::MatchProperty,
        CommandType::DivideAtOns,
        CommandType::RotateZero,
        CommandType::Cutter,
        CommandType::SetCang,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CommandType::MatchProperty => "Match Property",
            CommandType::DivideAtOns => "Divide At Ons",
            CommandType::RotateZero => "Rotate Zero",
            CommandType::Cutter => "Cutter",
            CommandType::SetCang => "Set Cang",
        }
    }

    pub fn shortcut(&self) -> Option<&'static str> {
        match self {
            CommandType::MatchProperty => Some("MP"),
            CommandType::DivideAtOns => Some("DO"),
            CommandType::RotateZero => None,
            CommandType::Cutter => Some("CT"),
            CommandType::SetCang => None,
        }
    }

    /// 是否从输入流持续接收构件（否则启动后立即完成）
    pub fn is_streaming(&self) -> bool {
        matches!(self, CommandType::MatchProperty | CommandType::DivideAtOns)
    }
}

/// Cutter 的参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutterParams {
    pub pitch: f64,
    pub axis: Axis,
    /// 新建梁使用的断面
    pub sect: SectId,
}

impl Default for CutterParams {
    fn default() -> Self {
        Self {
            pitch: 1.0,
            axis: Axis::X,
            sect: 501,
        }
    }
}

/// 命令运行环境
#[derive(Clone)]
pub struct CommandContext {
    pub frame: SharedFrame,
    /// 命令启动时的选择集快照
    pub selection: Selection,
    pub cutter: CutterParams,
}

impl CommandContext {
    pub fn new(frame: SharedFrame, selection: Selection) -> Self {
        Self {
            frame,
            selection,
            cutter: CutterParams::default(),
        }
    }
}

/// 命令完成后的汇总
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandReport {
    /// 被修改的构件
    pub modified: Vec<ElemId>,
    /// 新建的构件
    pub created: Vec<ElemId>,
}

/// 在管道上启动命令，返回命令任务
///
/// 一次性命令不读输入流，但仍占用管道，直到驱动方调用 `end_command`。
pub fn spawn_command(
    pipeline: &mut CommandPipeline,
    command: CommandType,
    ctx: CommandContext,
) -> Result<JoinHandle<Result<CommandReport>>> {
    let (quit_tx, quit_rx) = oneshot::channel();
    let streams = pipeline.execute(quit_tx)?;
    let input = CommandInput::new(streams, quit_rx);
    tracing::info!("start command: {}", command.name());

    let handle = match command {
        CommandType::MatchProperty => tokio::spawn(commands::match_property::run(ctx, input)),
        CommandType::DivideAtOns => tokio::spawn(commands::divide_at_ons::run(ctx, input)),
        CommandType::RotateZero => tokio::spawn(commands::rotate_zero::run(ctx, input)),
        CommandType::Cutter => tokio::spawn(commands::cutter::run(ctx, input)),
        CommandType::SetCang => tokio::spawn(commands::set_cang::run(ctx, input)),
    };
    Ok(handle)
}
