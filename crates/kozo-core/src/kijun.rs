//! 基准轴线（通り芯）

use crate::math::Vector3;
use serde::{Deserialize, Serialize};

/// 平面内的命名基准线，只使用起终点的 x、y
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kijun {
    pub name: String,
    pub start: Vector3,
    pub end: Vector3,
    pub hide: bool,
}

impl Kijun {
    pub fn new(name: &str, start: Vector3, end: Vector3) -> Self {
        Self {
            name: name.to_string(),
            start,
            end,
            hide: false,
        }
    }

    /// 平面内单位方向；起终点重合时为 None
    pub fn direction(&self) -> Option<Vector3> {
        let d = Vector3::new(self.end.x - self.start.x, self.end.y - self.start.y, 0.0);
        let n = d.norm();
        (n > crate::math::EPSILON).then(|| d / n)
    }

    /// 点在平面上到基准线（无限延长）的距离
    pub fn plan_distance(&self, p: &Vector3) -> f64 {
        let v = Vector3::new(p.x - self.start.x, p.y - self.start.y, 0.0);
        match self.direction() {
            Some(d) => (v - d * v.dot(&d)).norm(),
            None => v.norm(),
        }
    }
}
