//! 内核错误定义

use thiserror::Error;

use crate::element::ElemId;
use crate::node::NodeId;
use crate::section::SectId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KozoError {
    #[error("{0}: not parallel")]
    NotParallel(&'static str),

    #[error("{0}: not a line element")]
    NotLineElem(&'static str),

    #[error("{0}: not a plate element")]
    NotPlateElem(&'static str),

    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("element {0} not found")]
    ElemNotFound(ElemId),

    #[error("section {0} not found")]
    SectNotFound(SectId),

    #[error("kijun '{0}' not found")]
    KijunNotFound(String),

    #[error("cannot divide: {0}")]
    CannotDivide(&'static str),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("node {0} is still referenced by an element")]
    NodeInUse(NodeId),

    #[error("duplicate id {0}")]
    DuplicateId(u32),

    #[error("{0}: degenerate geometry")]
    Degenerate(&'static str),
}

pub type Result<T> = std::result::Result<T, KozoError>;
