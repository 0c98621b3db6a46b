//! 断面与材料
//!
//! 一个断面由若干 Figure 组成，每个 Figure 引用一种材料并携带
//! 一组命名的几何参数（AREA、THICK、IXX ...）。

use crate::element::Etype;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 断面编号
pub type SectId = u32;

/// 材料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub num: u32,
    pub name: String,
    /// 杨氏模量
    pub young: f64,
    /// 剪切模量
    pub shear: f64,
    /// 泊松比
    pub poisson: f64,
    /// 单位体积重量
    pub unit_weight: f64,
}

impl Material {
    pub fn new(num: u32, name: &str, young: f64, poisson: f64) -> Self {
        Self {
            num,
            name: name.to_string(),
            young,
            shear: young / (2.0 * (1.0 + poisson)),
            poisson,
            unit_weight: 0.0,
        }
    }
}

/// 断面的组成部分：材料 + 几何参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub num: u32,
    pub material: Material,
    pub values: BTreeMap<String, f64>,
}

impl Figure {
    pub fn new(num: u32, material: Material) -> Self {
        Self {
            num,
            material,
            values: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, key: &str, value: f64) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: f64) {
        self.values.insert(key.to_ascii_uppercase(), value);
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(&key.to_ascii_uppercase()).copied()
    }

    pub fn area(&self) -> Option<f64> {
        self.get("AREA")
    }

    pub fn thick(&self) -> Option<f64> {
        self.get("THICK")
    }
}

/// 断面
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub num: SectId,
    pub name: String,
    pub figures: Vec<Figure>,
    /// 断面用途
    pub kind: Etype,
    /// 显示颜色 0xRRGGBB
    pub color: u32,
    /// 屈服承载力包络（两端各 6 个分量）
    pub yield_envelope: [f64; 12],
    pub hide: bool,
}

impl Section {
    pub fn new(num: SectId, name: &str, kind: Etype) -> Self {
        Self {
            num,
            name: name.to_string(),
            figures: Vec::new(),
            kind,
            color: 0xFFFFFF,
            yield_envelope: [0.0; 12],
            hide: false,
        }
    }

    pub fn with_figure(mut self, figure: Figure) -> Self {
        self.figures.push(figure);
        self
    }

    pub fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    /// 各 Figure 的面积之和
    pub fn area(&self) -> f64 {
        self.figures.iter().filter_map(Figure::area).sum()
    }

    /// 与给定面积的接近程度
    pub fn matches_area(&self, area: f64, tol: f64) -> bool {
        !self.figures.is_empty() && (self.area() - area).abs() <= tol
    }

    /// 是否存在杨氏模量与面积均吻合的 Figure
    pub fn matches_brace(&self, young: f64, area: f64, tol: f64) -> bool {
        self.figures.iter().any(|f| {
            (f.material.young - young).abs() <= tol * young.abs().max(1.0)
                && f.area().is_some_and(|a| (a - area).abs() <= tol)
        })
    }
}
