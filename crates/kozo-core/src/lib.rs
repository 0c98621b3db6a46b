//! KOZO 结构模型内核
//!
//! 管理节点、线构件（柱、梁、支撑）、面构件（墙、楼板）与断面，
//! 并提供作用在模型上的几何操作：分割、移动、复制、镜像、旋转、
//! 切断面选择、链式遍历、主轴设定以及中间节点查询。
//!
//! # 架构设计
//!
//! - [`Frame`](frame::Frame) 以编号为键持有全部节点、构件和断面
//! - 构件是线/面两种变体的和类型，只对一种变体有效的操作会返回错误
//! - 节点只能经由坐标创建，同一坐标总是得到同一节点
//!
//! # 示例
//!
//! ```rust
//! use kozo_core::prelude::*;
//!
//! let mut frame = Frame::new();
//! let n0 = frame.coord_node(0.0, 0.0, 0.0);
//! let n1 = frame.coord_node(10.0, 0.0, 0.0);
//! let g = frame.add_line_elem([n0, n1], 201, Etype::Girder, None).unwrap();
//!
//! let divided = frame.divide_at_rate(g, 0.3).unwrap();
//! assert_eq!(divided.elems.len(), 2);
//! ```

pub mod brace;
pub mod chain;
pub mod config;
pub mod divide;
pub mod element;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod kijun;
pub mod math;
pub mod neighbor;
pub mod node;
pub mod section;
pub mod show;
pub mod spatial;
pub mod stress;
pub mod transform;

pub use error::{KozoError, Result};

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::chain::{never, straight, Chain, ChainState};
    pub use crate::config::KernelConfig;
    pub use crate::divide::{DividePosition, Divided};
    pub use crate::element::{ElemId, Element, ElementKind, Etype, LineData, PlateData};
    pub use crate::error::{KozoError, Result};
    pub use crate::frame::Frame;
    pub use crate::kijun::Kijun;
    pub use crate::math::{Axis, BoundingBox3, Point3, Vector3};
    pub use crate::node::{Node, NodeId};
    pub use crate::section::{Figure, Material, SectId, Section};
    pub use crate::show::{CaptionMask, ColorMode, Measure, Show, View};
    pub use crate::stress::PeriodExpr;
}
