//! 构件定义
//!
//! 构件分两类：
//! - 线构件（柱、梁、支撑）：两个端点，带端部释放、材轴转角、CMQ 与应力结果
//! - 面构件（墙、楼板）：三或四个端点，可派生出等效支撑
//!
//! 两类构件共用 [`Element`] 外壳，差异部分放在 [`ElementKind`] 中。
//! 只对某一类有效的操作在另一类上返回 `NotLineElem` / `NotPlateElem`。

use crate::error::{KozoError, Result};
use crate::math::{normalize, Vector3, EPSILON};
use crate::node::NodeId;
use crate::section::SectId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 构件编号
pub type ElemId = u32;

/// 构件类型；顺序有意义：`Sbrace` 及之前为线构件，`Wall` 及之后为面构件
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Etype {
    None,
    Column,
    Girder,
    Brace,
    Wbrace,
    Sbrace,
    Wall,
    Slab,
}

impl Etype {
    pub const ALL: [Etype; 8] = [
        Etype::None,
        Etype::Column,
        Etype::Girder,
        Etype::Brace,
        Etype::Wbrace,
        Etype::Sbrace,
        Etype::Wall,
        Etype::Slab,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Etype::None => "NONE",
            Etype::Column => "COLUMN",
            Etype::Girder => "GIRDER",
            Etype::Brace => "BRACE",
            Etype::Wbrace => "WBRACE",
            Etype::Sbrace => "SBRACE",
            Etype::Wall => "WALL",
            Etype::Slab => "SLAB",
        }
    }

    pub fn is_line(self) -> bool {
        self <= Etype::Sbrace
    }

    pub fn is_plate(self) -> bool {
        self >= Etype::Wall
    }

    /// 面构件对应的等效支撑类型
    pub fn brace_of(self) -> Option<Etype> {
        match self {
            Etype::Wall => Some(Etype::Wbrace),
            Etype::Slab => Some(Etype::Sbrace),
            _ => None,
        }
    }
}

impl std::fmt::Display for Etype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Etype {
    type Err = KozoError;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.to_ascii_uppercase();
        Etype::ALL
            .iter()
            .copied()
            .find(|e| e.name() == upper)
            .ok_or_else(|| KozoError::InvalidInput(format!("unknown etype: {}", s)))
    }
}

/// 某工况下各端点的 6 分量应力
pub type StressTable = BTreeMap<String, BTreeMap<NodeId, [f64; 6]>>;

/// 线构件专有数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineData {
    cang: f64,
    strong: Vector3,
    weak: Vector3,
    #[serde(default)]
    pub stress: StressTable,
}

impl LineData {
    pub fn cang(&self) -> f64 {
        self.cang
    }

    pub fn strong(&self) -> Vector3 {
        self.strong
    }

    pub fn weak(&self) -> Vector3 {
        self.weak
    }
}

/// 面构件专有数据
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlateData {
    /// RectToBrace 生成的等效支撑
    pub children: [Option<ElemId>; 2],
    /// 开口尺寸（宽、高）
    pub wrect: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementKind {
    Line(LineData),
    Plate(PlateData),
}

/// 构件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub num: ElemId,
    pub enodes: Vec<NodeId>,
    pub sect: SectId,
    pub etype: Etype,
    /// 端部释放，长度 6 × 端点数
    pub bonds: Vec<bool>,
    /// 固端力，长度 6 × 端点数
    pub cmq: Vec<f64>,
    /// 派生来源（等效支撑指向原面构件）
    pub parent: Option<ElemId>,
    pub hide: bool,
    pub lock: bool,
    pub kind: ElementKind,
}

impl Element {
    /// 创建线构件；主轴在加入 Frame 时计算
    pub fn new_line(num: ElemId, enodes: [NodeId; 2], sect: SectId, etype: Etype) -> Result<Self> {
        if !etype.is_line() {
            return Err(KozoError::NotLineElem("new_line"));
        }
        Ok(Self {
            num,
            enodes: enodes.to_vec(),
            sect,
            etype,
            bonds: vec![false; 12],
            cmq: vec![0.0; 12],
            parent: None,
            hide: false,
            lock: false,
            kind: ElementKind::Line(LineData {
                cang: 0.0,
                strong: Vector3::zeros(),
                weak: Vector3::zeros(),
                stress: StressTable::new(),
            }),
        })
    }

    pub fn new_plate(num: ElemId, enodes: &[NodeId], sect: SectId, etype: Etype) -> Result<Self> {
        if !etype.is_plate() {
            return Err(KozoError::NotPlateElem("new_plate"));
        }
        if enodes.len() != 3 && enodes.len() != 4 {
            return Err(KozoError::InvalidInput(format!(
                "plate needs 3 or 4 nodes, got {}",
                enodes.len()
            )));
        }
        let n = enodes.len();
        Ok(Self {
            num,
            enodes: enodes.to_vec(),
            sect,
            etype,
            bonds: vec![false; 6 * n],
            cmq: vec![0.0; 6 * n],
            parent: None,
            hide: false,
            lock: false,
            kind: ElementKind::Plate(PlateData::default()),
        })
    }

    pub fn is_line(&self) -> bool {
        matches!(self.kind, ElementKind::Line(_))
    }

    pub fn is_plate(&self) -> bool {
        matches!(self.kind, ElementKind::Plate(_))
    }

    pub fn enods(&self) -> usize {
        self.enodes.len()
    }

    pub fn line(&self, func: &'static str) -> Result<&LineData> {
        match &self.kind {
            ElementKind::Line(l) => Ok(l),
            ElementKind::Plate(_) => Err(KozoError::NotLineElem(func)),
        }
    }

    pub fn line_mut(&mut self, func: &'static str) -> Result<&mut LineData> {
        match &mut self.kind {
            ElementKind::Line(l) => Ok(l),
            ElementKind::Plate(_) => Err(KozoError::NotLineElem(func)),
        }
    }

    pub fn plate(&self, func: &'static str) -> Result<&PlateData> {
        match &self.kind {
            ElementKind::Plate(p) => Ok(p),
            ElementKind::Line(_) => Err(KozoError::NotPlateElem(func)),
        }
    }

    pub fn plate_mut(&mut self, func: &'static str) -> Result<&mut PlateData> {
        match &mut self.kind {
            ElementKind::Plate(p) => Ok(p),
            ElementKind::Line(_) => Err(KozoError::NotPlateElem(func)),
        }
    }

    /// 材轴转角；面构件为 None
    pub fn cang(&self) -> Option<f64> {
        match &self.kind {
            ElementKind::Line(l) => Some(l.cang),
            ElementKind::Plate(_) => None,
        }
    }

    pub fn strong(&self) -> Option<Vector3> {
        self.line("strong").ok().map(|l| l.strong)
    }

    pub fn weak(&self) -> Option<Vector3> {
        self.line("weak").ok().map(|l| l.weak)
    }

    /// 以给定构件方向设置转角并刷新主轴缓存
    pub fn set_cang(&mut self, direction: &Vector3, cang: f64) -> Result<()> {
        let (strong, weak) = principal_axis(direction, cang)?;
        let line = self.line_mut("set_cang")?;
        line.cang = cang;
        line.strong = strong;
        line.weak = weak;
        Ok(())
    }

    /// 方向改变后按现有转角重算主轴
    pub fn refresh_axes(&mut self, direction: &Vector3) -> Result<()> {
        let cang = self.line("refresh_axes")?.cang;
        self.set_cang(direction, cang)
    }

    pub fn has_node(&self, node: NodeId) -> bool {
        self.enodes.contains(&node)
    }

    pub fn node_index(&self, node: NodeId) -> Option<usize> {
        self.enodes.iter().position(|&n| n == node)
    }

    /// 线构件上与 `node` 相对的另一端
    pub fn otherside(&self, node: NodeId) -> Option<NodeId> {
        if !self.is_line() {
            return None;
        }
        match self.node_index(node)? {
            0 => Some(self.enodes[1]),
            _ => Some(self.enodes[0]),
        }
    }

    /// 某端的 6 个释放标志
    pub fn end_bonds(&self, end: usize) -> &[bool] {
        &self.bonds[6 * end..6 * end + 6]
    }

    pub fn clear_end_bonds(&mut self, end: usize) {
        for b in &mut self.bonds[6 * end..6 * end + 6] {
            *b = false;
        }
    }

    /// 两端铰接（转动释放）
    pub fn set_pin_both(&mut self) {
        for end in 0..self.enods() {
            for dof in 4..6 {
                self.bonds[6 * end + dof] = true;
            }
        }
    }

    pub fn set_stress(&mut self, period: &str, node: NodeId, values: [f64; 6]) -> Result<()> {
        let line = self.line_mut("set_stress")?;
        line.stress
            .entry(period.to_ascii_uppercase())
            .or_default()
            .insert(node, values);
        Ok(())
    }

    pub fn stress(&self, period: &str, node: NodeId) -> Option<[f64; 6]> {
        self.line("stress")
            .ok()?
            .stress
            .get(&period.to_ascii_uppercase())?
            .get(&node)
            .copied()
    }
}

/// 未旋转时的主轴对 (x, y)，`d` 为单位方向向量
fn unrotated_axes(d: &Vector3) -> (Vector3, Vector3) {
    let x = if d.x.abs() < EPSILON && d.y.abs() < EPSILON {
        Vector3::new(0.0, 1.0, 0.0)
    } else {
        normalize(Vector3::new(-d.y, d.x, 0.0))
    };
    let y = d.cross(&x);
    (x, y)
}

/// 由构件方向和转角求强轴、弱轴（单位向量）
///
/// 竖直构件的未旋转强轴为 (0, 1, 0)，弱轴为 (-d.z, 0, 0)；
/// 其余构件以水平垂线为 x、`d × x` 为 y，强轴 `cos·x + sin·y`，弱轴 `-sin·x + cos·y`。
pub fn principal_axis(direction: &Vector3, angle: f64) -> Result<(Vector3, Vector3)> {
    let len = direction.norm();
    if len < EPSILON {
        return Err(KozoError::Degenerate("principal_axis"));
    }
    let d = direction / len;
    let (x, y) = unrotated_axes(&d);
    let (s, c) = angle.sin_cos();
    Ok((x * c + y * s, -x * s + y * c))
}

fn clamped_acos(c: f64, clamp: f64) -> Result<f64> {
    if c >= 1.0 {
        if c <= 1.0 + clamp {
            return Ok(0.0);
        }
    } else if c <= -1.0 {
        if c >= -1.0 - clamp {
            return Ok(std::f64::consts::PI);
        }
    } else {
        return Ok(c.acos());
    }
    Err(KozoError::InvalidInput(format!("cosine out of range: {}", c)))
}

/// 求使强轴（或弱轴）朝向 `target` 的转角
///
/// `target` 先投影到与构件垂直的平面，再与未旋转的 (x, y) 分解为 (c1, c2)。
pub fn axis_to_cang(direction: &Vector3, target: &Vector3, strong: bool, clamp: f64) -> Result<f64> {
    let len = direction.norm();
    if len < EPSILON {
        return Err(KozoError::Degenerate("axis_to_cang"));
    }
    let d = direction / len;
    let inplane = target - d * target.dot(&d);
    if inplane.norm() < EPSILON {
        return Err(KozoError::Degenerate("axis_to_cang"));
    }
    let v = inplane.normalize();
    let (x, y) = unrotated_axes(&d);
    let c1 = v.dot(&x);
    let c2 = v.dot(&y);
    if strong {
        let a = clamped_acos(c1, clamp)?;
        Ok(if c2 >= 0.0 { a } else { -a })
    } else {
        let a = clamped_acos(c2, clamp)?;
        Ok(if c1 >= 0.0 { -a } else { a })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn assert_orthonormal(d: &Vector3, s: &Vector3, w: &Vector3) {
        let d = d.normalize();
        assert!((s.norm() - 1.0).abs() < 1e-9);
        assert!((w.norm() - 1.0).abs() < 1e-9);
        assert!(s.dot(&d).abs() < 1e-9);
        assert!(w.dot(&d).abs() < 1e-9);
        assert!(s.dot(w).abs() < 1e-9);
    }

    #[test]
    fn test_etype_ranges() {
        assert!(Etype::Column.is_line());
        assert!(Etype::Sbrace.is_line());
        assert!(!Etype::Wall.is_line());
        assert!(Etype::Slab.is_plate());
        assert_eq!("girder".parse::<Etype>().unwrap(), Etype::Girder);
        assert!("beam".parse::<Etype>().is_err());
    }

    #[test]
    fn test_principal_axis_vertical() {
        let d = Vector3::new(0.0, 0.0, 3.0);
        let (s, w) = principal_axis(&d, 0.0).unwrap();
        assert!((s - Vector3::new(0.0, 1.0, 0.0)).norm() < 1e-12);
        assert!((w - Vector3::new(-1.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_principal_axis_orthonormal() {
        for d in [
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(1.0, 2.0, 3.0),
            Vector3::new(0.0, 0.0, -2.0),
            Vector3::new(-0.3, 0.7, 0.0),
        ] {
            for angle in [0.0, 0.4, FRAC_PI_2, -2.5, PI] {
                let (s, w) = principal_axis(&d, angle).unwrap();
                assert_orthonormal(&d, &s, &w);
            }
        }
    }

    #[test]
    fn test_axis_to_cang_girder() {
        let d = Vector3::new(1.0, 0.0, 0.0);
        let cang = axis_to_cang(&d, &Vector3::new(0.0, 0.0, 1.0), true, 1e-3).unwrap();
        assert!((cang - FRAC_PI_2).abs() < 1e-12);
        let (s, _) = principal_axis(&d, cang).unwrap();
        assert!((s - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-9);
    }

    #[test]
    fn test_axis_to_cang_roundtrip() {
        let d = Vector3::new(1.0, 2.0, 0.5);
        let target = Vector3::new(-0.2, 0.4, 1.0);
        for strong in [true, false] {
            let cang = axis_to_cang(&d, &target, strong, 1e-3).unwrap();
            let (s, w) = principal_axis(&d, cang).unwrap();
            let axis = if strong { s } else { w };
            let dn = d.normalize();
            let inplane = (target - dn * target.dot(&dn)).normalize();
            assert!((axis - inplane).norm() < 1e-9);
        }
    }

    #[test]
    fn test_axis_to_cang_parallel_target() {
        let d = Vector3::new(1.0, 0.0, 0.0);
        assert!(axis_to_cang(&d, &Vector3::new(2.0, 0.0, 0.0), true, 1e-3).is_err());
    }

    #[test]
    fn test_clamped_acos() {
        assert_eq!(clamped_acos(1.0005, 1e-3).unwrap(), 0.0);
        assert_eq!(clamped_acos(-1.0005, 1e-3).unwrap(), PI);
        assert!(clamped_acos(1.1, 1e-3).is_err());
    }

    #[test]
    fn test_variant_errors() {
        let plate = Element::new_plate(1, &[1, 2, 3], 301, Etype::Wall).unwrap();
        assert_eq!(
            plate.line("cang").unwrap_err(),
            KozoError::NotLineElem("cang")
        );
        assert!(Element::new_line(2, [1, 2], 101, Etype::Wall).is_err());
        assert!(Element::new_plate(3, &[1, 2], 301, Etype::Slab).is_err());
    }

    #[test]
    fn test_otherside_and_bonds() {
        let mut e = Element::new_line(1, [10, 20], 101, Etype::Girder).unwrap();
        assert_eq!(e.otherside(10), Some(20));
        assert_eq!(e.otherside(20), Some(10));
        assert_eq!(e.otherside(30), None);
        e.set_pin_both();
        assert_eq!(e.end_bonds(1), &[false, false, false, false, true, true]);
        e.clear_end_bonds(1);
        assert!(e.end_bonds(1).iter().all(|b| !b));
        assert_eq!(e.bonds.len(), 12);
    }
}
