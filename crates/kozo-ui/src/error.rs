//! 交互层错误定义

use kozo_core::KozoError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error(transparent)]
    Kozo(#[from] KozoError),

    #[error("no command is executing")]
    NotExecuting,

    #[error("a command is already executing")]
    AlreadyExecuting,

    #[error("command cancelled")]
    Cancelled,

    #[error("selection: {0}")]
    Selection(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// `?` 后缀请求的用法说明
    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, CommandError>;
