//! 显示配置与视图
//!
//! 渲染后端只读取这里的快照，从不回写。

use crate::element::Etype;
use crate::math::Vector3;
use crate::section::SectId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// 注记掩码（位域）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CaptionMask {
    bits: u32,
}

impl CaptionMask {
    // 节点注记
    pub const NODE_NUM: u32 = 1 << 0;
    pub const NODE_WEIGHT: u32 = 1 << 1;
    pub const NODE_CONF: u32 = 1 << 2;
    pub const NODE_PILE: u32 = 1 << 3;
    // 构件注记
    pub const ELEM_NUM: u32 = 1 << 0;
    pub const ELEM_SECT: u32 = 1 << 1;
    pub const ELEM_ECCENTRIC: u32 = 1 << 2;
    pub const ELEM_RATE_L: u32 = 1 << 3;
    pub const ELEM_RATE_S: u32 = 1 << 4;
    pub const ELEM_RATE_Q: u32 = 1 << 5;
    pub const ELEM_RATE_M: u32 = 1 << 6;
    pub const ELEM_ENERGY: u32 = 1 << 7;

    pub const NONE: CaptionMask = CaptionMask { bits: 0 };

    pub fn new(bits: u32) -> Self {
        Self { bits }
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn is_set(&self, bit: u32) -> bool {
        self.bits & bit != 0
    }

    pub fn set(&mut self, bit: u32, on: bool) {
        if on {
            self.bits |= bit;
        } else {
            self.bits &= !bit;
        }
    }

    pub fn toggle(&mut self, bit: u32) {
        self.bits ^= bit;
    }

    pub fn clear(&mut self) {
        self.bits = 0;
    }
}

/// 构件着色方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorMode {
    White,
    #[default]
    Sect,
    Etype,
    /// 按检定比
    Rate,
    /// 按应变能
    Energy,
}

/// 应力显示分量掩码：N, Qx, Qy, Mz, Mx, My
pub const STRESS_N: u32 = 1 << 0;
pub const STRESS_QX: u32 = 1 << 1;
pub const STRESS_QY: u32 = 1 << 2;
pub const STRESS_MZ: u32 = 1 << 3;
pub const STRESS_MX: u32 = 1 << 4;
pub const STRESS_MY: u32 = 1 << 5;

/// 测量标注
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub start: Vector3,
    pub end: Vector3,
    /// 沿该轴测量；None 为两点直线距离
    pub axis: Option<crate::math::Axis>,
    pub offset: f64,
    pub dot: f64,
    pub rotate: f64,
    pub text: Option<String>,
}

impl Measure {
    pub fn length(&self) -> f64 {
        match self.axis {
            Some(axis) => (self.end[axis.index()] - self.start[axis.index()]).abs(),
            None => (self.end - self.start).norm(),
        }
    }
}

/// 显示配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Show {
    /// 各构件类型是否显示，按 `Etype::index` 排列
    pub etype: [bool; 8],
    /// 隐藏的断面
    pub hidden_sects: BTreeSet<SectId>,
    pub node_caption: CaptionMask,
    pub elem_caption: CaptionMask,
    pub color_mode: ColorMode,
    pub node_color: bool,
    /// 坐标显示范围 [min, max]，按 x, y, z
    pub range: [[f64; 2]; 3],
    /// 当前荷载工况
    pub period: String,
    /// 变形、反力、剪力、弯矩的显示倍率
    pub dfact: f64,
    pub rfact: f64,
    pub qfact: f64,
    pub mfact: f64,
    /// 按构件类型的应力显示分量
    pub stress_etype: [u32; 8],
    /// 按断面的应力显示分量
    pub stress_sect: BTreeMap<SectId, u32>,
    pub deformation: bool,
    /// 位移注记分量（x, y, z, tx, ty, tz）
    pub disp: [bool; 6],
    pub kijun: bool,
    pub measures: Vec<Measure>,
}

impl Default for Show {
    fn default() -> Self {
        Self {
            etype: [true; 8],
            hidden_sects: BTreeSet::new(),
            node_caption: CaptionMask::NONE,
            elem_caption: CaptionMask::NONE,
            color_mode: ColorMode::default(),
            node_color: false,
            range: [[-100.0, 1000.0]; 3],
            period: "L".to_string(),
            dfact: 100.0,
            rfact: 0.1,
            qfact: 0.5,
            mfact: 0.5,
            stress_etype: [0; 8],
            stress_sect: BTreeMap::new(),
            deformation: false,
            disp: [false; 6],
            kijun: false,
            measures: Vec::new(),
        }
    }
}

impl Show {
    /// period++ / period-- 循环的工况序列
    pub const PERIODS: [&'static str; 3] = ["L", "X", "Y"];

    pub fn is_etype_visible(&self, etype: Etype) -> bool {
        self.etype[etype.index()]
    }

    pub fn set_etype_visible(&mut self, etype: Etype, on: bool) {
        self.etype[etype.index()] = on;
    }

    pub fn is_sect_visible(&self, sect: SectId) -> bool {
        !self.hidden_sects.contains(&sect)
    }

    pub fn set_sect_visible(&mut self, sect: SectId, on: bool) {
        if on {
            self.hidden_sects.remove(&sect);
        } else {
            self.hidden_sects.insert(sect);
        }
    }

    pub fn in_range(&self, p: &Vector3) -> bool {
        (0..3).all(|i| p[i] >= self.range[i][0] && p[i] <= self.range[i][1])
    }

    /// 工况循环：`step` 为 +1 或 -1；不在序列中的工况回到首项
    pub fn step_period(&mut self, step: i32) {
        let n = Self::PERIODS.len() as i32;
        let current = Self::PERIODS
            .iter()
            .position(|p| p.eq_ignore_ascii_case(&self.period));
        let next = match current {
            Some(i) => (i as i32 + step).rem_euclid(n) as usize,
            None => 0,
        };
        self.period = Self::PERIODS[next].to_string();
    }

    /// 某构件应显示的应力分量掩码
    pub fn stress_mask(&self, etype: Etype, sect: SectId) -> u32 {
        self.stress_etype[etype.index()] | self.stress_sect.get(&sect).copied().unwrap_or(0)
    }
}

/// 相机
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub focus: Vector3,
    /// 方位角 φ、仰角 θ（度）
    pub angle: [f64; 2],
    /// 视点距离 r、投影面距离 l
    pub dists: [f64; 2],
    pub perspective: bool,
    /// 平行投影的缩放
    pub gfact: f64,
    /// 画面中心
    pub center: [f64; 2],
}

impl Default for View {
    fn default() -> Self {
        Self {
            focus: Vector3::zeros(),
            angle: [-60.0, 20.0],
            dists: [1000.0, 5000.0],
            perspective: true,
            gfact: 1.0,
            center: [0.0, 0.0],
        }
    }
}

impl View {
    /// 世界坐标投影到画面坐标
    pub fn project(&self, p: &Vector3) -> [f64; 2] {
        let (sp, cp) = self.angle[0].to_radians().sin_cos();
        let (st, ct) = self.angle[1].to_radians().sin_cos();
        let eye = Vector3::new(ct * cp, ct * sp, st);
        let right = Vector3::new(-sp, cp, 0.0);
        let up = Vector3::new(-st * cp, -st * sp, ct);

        let v = p - self.focus;
        let x = v.dot(&right);
        let y = v.dot(&up);
        let scale = if self.perspective {
            let depth = self.dists[0] - v.dot(&eye);
            if depth.abs() < crate::math::EPSILON {
                0.0
            } else {
                self.dists[1] / depth
            }
        } else {
            self.gfact
        };
        [self.center[0] + scale * x, self.center[1] - scale * y]
    }
}
