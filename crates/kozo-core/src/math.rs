//! 三维向量基础运算
//!
//! 基于 nalgebra 的类型别名，加上结构模型常用的几个工具函数。

use nalgebra::{Rotation3, Unit};
use serde::{Deserialize, Serialize};

pub type Vector3 = nalgebra::Vector3<f64>;
pub type Point3 = nalgebra::Point3<f64>;

/// 浮点比较的默认精度
pub const EPSILON: f64 = 1e-9;

/// 坐标轴
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Axis::X),
            1 => Some(Axis::Y),
            2 => Some(Axis::Z),
            _ => None,
        }
    }

    /// 单位方向向量
    pub fn unit(self) -> Vector3 {
        let mut v = Vector3::zeros();
        v[self.index()] = 1.0;
        v
    }

    pub fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

impl std::str::FromStr for Axis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            _ => Err(format!("unknown axis: {}", s)),
        }
    }
}

/// 单位化；零向量原样返回
pub fn normalize(v: Vector3) -> Vector3 {
    let n = v.norm();
    if n < EPSILON {
        v
    } else {
        v / n
    }
}

/// 两向量是否平行（同向或反向），`eps` 为叉积模长容差
pub fn is_parallel(a: &Vector3, b: &Vector3, eps: f64) -> bool {
    let na = a.norm();
    let nb = b.norm();
    if na < EPSILON || nb < EPSILON {
        return false;
    }
    (a / na).cross(&(b / nb)).norm() < eps
}

pub fn distance(a: &Vector3, b: &Vector3) -> f64 {
    (a - b).norm()
}

/// 绕过 `center` 的 `axis` 旋转点
pub fn rotate_about(p: &Vector3, center: &Vector3, axis: &Vector3, angle: f64) -> Vector3 {
    let rot = Rotation3::from_axis_angle(&Unit::new_normalize(*axis), angle);
    center + rot * (p - center)
}

/// 关于过 `center`、法向 `normal` 的平面镜像
pub fn mirror_about(p: &Vector3, center: &Vector3, normal: &Vector3) -> Vector3 {
    let n = normalize(*normal);
    p - n * (2.0 * (p - center).dot(&n))
}

/// 三维包围盒
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox3 {
    pub min: Vector3,
    pub max: Vector3,
}

impl BoundingBox3 {
    pub fn new(min: Vector3, max: Vector3) -> Self {
        Self { min, max }
    }

    pub fn from_points<I: IntoIterator<Item = Vector3>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = Self::new(first, first);
        for p in iter {
            bbox.expand(&p);
        }
        Some(bbox)
    }

    pub fn expand(&mut self, p: &Vector3) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    pub fn contains(&self, p: &Vector3) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] && p[i] <= self.max[i])
    }

    pub fn center(&self) -> Vector3 {
        (self.min + self.max) * 0.5
    }
}
