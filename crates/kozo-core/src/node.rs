//! 节点

use crate::math::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 节点编号，在所属 Frame 内唯一
pub type NodeId = u32;

/// 自由度名称，约束/位移数组按此顺序排列
pub const DOF_NAMES: [&str; 6] = ["x", "y", "z", "tx", "ty", "tz"];

/// 结构节点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub num: NodeId,
    /// 世界坐标
    pub coord: Vector3,
    /// 投影后的屏幕坐标，由视图设置
    pub pcoord: [f64; 2],
    /// 约束条件（三个平动、三个转动）
    pub conf: [bool; 6],
    /// 累计重量
    pub weight: Vector3,
    pub hide: bool,
    pub lock: bool,
    /// 各荷载工况下的位移
    #[serde(default)]
    pub disp: BTreeMap<String, [f64; 6]>,
    /// 各荷载工况下的反力
    #[serde(default)]
    pub reaction: BTreeMap<String, [f64; 6]>,
}

impl Node {
    pub fn new(num: NodeId, x: f64, y: f64, z: f64) -> Self {
        Self {
            num,
            coord: Vector3::new(x, y, z),
            pcoord: [0.0; 2],
            conf: [false; 6],
            weight: Vector3::zeros(),
            hide: false,
            lock: false,
            disp: BTreeMap::new(),
            reaction: BTreeMap::new(),
        }
    }

    pub fn x(&self) -> f64 {
        self.coord.x
    }

    pub fn y(&self) -> f64 {
        self.coord.y
    }

    pub fn z(&self) -> f64 {
        self.coord.z
    }

    pub fn distance_to(&self, other: &Node) -> f64 {
        (other.coord - self.coord).norm()
    }

    /// 是否有任一自由度被约束
    pub fn is_confed(&self) -> bool {
        self.conf.iter().any(|&c| c)
    }

    pub fn set_pin(&mut self) {
        self.conf = [true, true, true, false, false, false];
    }

    pub fn set_fix(&mut self) {
        self.conf = [true; 6];
    }

    pub fn set_free(&mut self) {
        self.conf = [false; 6];
    }

    pub fn add_weight(&mut self, w: Vector3) {
        self.weight += w;
    }

    /// 指定工况的某个位移分量，无结果时为 0
    pub fn disp_component(&self, period: &str, index: usize) -> f64 {
        self.disp
            .get(period)
            .and_then(|d| d.get(index).copied())
            .unwrap_or(0.0)
    }

    /// 约束条件字符串，如 "111000"
    pub fn conf_string(&self) -> String {
        self.conf.iter().map(|&c| if c { '1' } else { '0' }).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_distance() {
        let n1 = Node::new(1, 0.0, 0.0, 0.0);
        let n2 = Node::new(2, 3.0, 4.0, 0.0);
        assert!((n1.distance_to(&n2) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_conf() {
        let mut n = Node::new(1, 0.0, 0.0, 0.0);
        assert!(!n.is_confed());
        n.set_pin();
        assert!(n.is_confed());
        assert_eq!(n.conf_string(), "111000");
    }
}
