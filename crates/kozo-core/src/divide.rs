//! 线构件分割
//!
//! 所有分割都经由 `coord_node` 取得分割点，相邻构件因此共享节点。
//! 分割后原构件保留前半段，后半段为新构件；端部释放的后半部分随之移动。

use crate::element::{ElemId, ElementKind, StressTable};
use crate::error::{KozoError, Result};
use crate::frame::Frame;
use crate::math::{Axis, Vector3, EPSILON};
use crate::node::NodeId;

/// `divide_at_node` 中给定节点相对构件的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DividePosition {
    /// 端点 0 外侧
    BeforeStart,
    /// 内部，以端点 0 为基准
    InsideStart,
    /// 内部，以端点 1 为基准
    InsideEnd,
    /// 端点 1 外侧
    AfterEnd,
}

impl DividePosition {
    /// 数值形式 -1, 0, 1, 2
    pub fn from_index(i: i32) -> Result<Self> {
        match i {
            -1 => Ok(Self::BeforeStart),
            0 => Ok(Self::InsideStart),
            1 => Ok(Self::InsideEnd),
            2 => Ok(Self::AfterEnd),
            _ => Err(KozoError::InvalidInput(format!("divide position {}", i))),
        }
    }
}

/// 分割结果：分割点与沿构件排列的各段
#[derive(Debug, Clone, PartialEq)]
pub struct Divided {
    pub nodes: Vec<NodeId>,
    pub elems: Vec<ElemId>,
}

impl Frame {
    /// 在内部节点处一分为二，返回后半段的新构件
    fn split_at_node(&mut self, id: ElemId, node: NodeId) -> Result<ElemId> {
        let orig = self.elem(id)?;
        orig.line("split_at_node")?;
        let end = orig.enodes[1];

        let mut second = orig.clone();
        second.enodes = vec![node, end];
        second.cmq = vec![0.0; 12];
        for i in 0..6 {
            second.bonds[i] = false;
        }
        if let ElementKind::Line(line) = &mut second.kind {
            line.stress = StressTable::new();
        }
        let new_id = self.insert_elem(second)?;

        let first = self.elem_mut(id)?;
        first.enodes[1] = node;
        first.clear_end_bonds(1);
        self.refresh_axes(id)?;
        Ok(new_id)
    }

    /// 替换一个端点；原端点不再被引用时删除
    fn replace_end(&mut self, id: ElemId, end: usize, node: NodeId) -> Result<()> {
        let elem = self.elem_mut(id)?;
        let old = elem.enodes[end];
        elem.enodes[end] = node;
        elem.clear_end_bonds(end);
        self.refresh_axes(id)?;
        self.delete_node_if_orphan(old);
        Ok(())
    }

    /// 在 (x, y, z) 处分割线构件
    ///
    /// 分割点与端点重合时不产生新构件，返回该端点与原构件。
    pub fn divide_at_coord(&mut self, id: ElemId, x: f64, y: f64, z: f64) -> Result<Divided> {
        let elem = self.elem(id)?;
        elem.line("divide_at_coord")?;
        let (n0, n1) = (elem.enodes[0], elem.enodes[1]);

        let node = self.coord_node(x, y, z);
        if node == n0 || node == n1 {
            return Ok(Divided {
                nodes: vec![node],
                elems: vec![id],
            });
        }
        let new_id = self.split_at_node(id, node)?;
        tracing::debug!("divided element {} at node {} -> {}", id, node, new_id);
        Ok(Divided {
            nodes: vec![node],
            elems: vec![id, new_id],
        })
    }

    /// 在 `(1-k)·n0 + k·n1` 处分割
    pub fn divide_at_rate(&mut self, id: ElemId, k: f64) -> Result<Divided> {
        self.elem(id)?.line("divide_at_rate")?;
        let c = self.elem_coords(id)?;
        let p: Vector3 = c[0] * (1.0 - k) + c[1] * k;
        self.divide_at_coord(id, p.x, p.y, p.z)
    }

    /// 在坐标平面 `axis = coord` 处分割
    pub fn divide_at_axis(&mut self, id: ElemId, axis: Axis, coord: f64) -> Result<Divided> {
        self.elem(id)?.line("divide_at_axis")?;
        let c = self.elem_coords(id)?;
        let i = axis.index();
        let den = c[1][i] - c[0][i];
        if den.abs() < EPSILON {
            return Err(KozoError::CannotDivide("element is perpendicular to axis"));
        }
        let k = (coord - c[0][i]) / den;
        if !(-EPSILON..=1.0 + EPSILON).contains(&k) {
            return Err(KozoError::CannotDivide("plane does not cross element"));
        }
        self.divide_at_rate(id, k.clamp(0.0, 1.0))
    }

    /// 以节点 `node` 延长、截短或分割构件
    ///
    /// - 外侧位置：`del` 为真时端点移到 `node`，否则追加一根从端点到 `node` 的构件
    /// - 内部位置：`del` 为真时截短到 `node`，否则在 `node` 处分割
    ///
    /// 被替换的端点若不再被引用则从 Frame 删除，该端的释放标志清零。
    pub fn divide_at_node(
        &mut self,
        id: ElemId,
        node: NodeId,
        position: DividePosition,
        del: bool,
    ) -> Result<Divided> {
        let elem = self.elem(id)?;
        elem.line("divide_at_node")?;
        self.node(node)?;
        let (n0, n1) = (elem.enodes[0], elem.enodes[1]);
        if node == n0 || node == n1 {
            return Ok(Divided {
                nodes: vec![node],
                elems: vec![id],
            });
        }

        use DividePosition::*;
        let elems = match (position, del) {
            (BeforeStart | InsideStart, true) => {
                self.replace_end(id, 0, node)?;
                vec![id]
            }
            (InsideEnd | AfterEnd, true) => {
                self.replace_end(id, 1, node)?;
                vec![id]
            }
            (InsideStart | InsideEnd, false) => {
                let new_id = self.split_at_node(id, node)?;
                vec![id, new_id]
            }
            (BeforeStart, false) => {
                let new_id = self.extend(id, node, n0)?;
                vec![new_id, id]
            }
            (AfterEnd, false) => {
                let new_id = self.extend(id, n1, node)?;
                vec![id, new_id]
            }
        };
        Ok(Divided {
            nodes: vec![node],
            elems,
        })
    }

    /// 以 `id` 的属性追加构件 a-b
    fn extend(&mut self, id: ElemId, a: NodeId, b: NodeId) -> Result<ElemId> {
        let mut elem = self.elem(id)?.clone();
        elem.enodes = vec![a, b];
        elem.bonds = vec![false; 12];
        elem.cmq = vec![0.0; 12];
        elem.parent = None;
        if let ElementKind::Line(line) = &mut elem.kind {
            line.stress = StressTable::new();
        }
        self.insert_elem(elem)
    }

    /// 在构件上所有中间节点处依次分割，返回沿构件排列的各段
    pub fn divide_at_ons(&mut self, id: ElemId) -> Result<Divided> {
        let elem = self.elem(id)?;
        elem.line("divide_at_ons")?;
        let exclude = elem.enodes.clone();
        let c = self.elem_coords(id)?;
        let ons = self.nodes_on_segment(&c[0], &c[1], &exclude);

        let mut elems = vec![id];
        let mut current = id;
        for &n in &ons {
            current = self.split_at_node(current, n)?;
            elems.push(current);
        }
        if !ons.is_empty() {
            tracing::debug!("element {} divided into {} parts", id, elems.len());
        }
        Ok(Divided { nodes: ons, elems })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Etype;

    fn girder(frame: &mut Frame, a: (f64, f64, f64), b: (f64, f64, f64)) -> ElemId {
        let n0 = frame.coord_node(a.0, a.1, a.2);
        let n1 = frame.coord_node(b.0, b.1, b.2);
        frame.add_line_elem([n0, n1], 201, Etype::Girder, None).unwrap()
    }

    #[test]
    fn test_divide_at_rate() {
        let mut frame = Frame::new();
        let e = girder(&mut frame, (0.0, 0.0, 0.0), (10.0, 0.0, 0.0));
        let r = frame.divide_at_rate(e, 0.3).unwrap();
        let p = frame.coord(r.nodes[0]).unwrap();
        assert!((p - Vector3::new(3.0, 0.0, 0.0)).norm() < 1e-9);
        assert_eq!(r.elems.len(), 2);
        assert!((frame.length(r.elems[0]).unwrap() - 3.0).abs() < 1e-9);
        assert!((frame.length(r.elems[1]).unwrap() - 7.0).abs() < 1e-9);
        assert_eq!(frame.elem(r.elems[1]).unwrap().etype, Etype::Girder);
        assert_eq!(frame.elem(r.elems[1]).unwrap().sect, 201);
    }

    #[test]
    fn test_divide_moves_second_half_bonds() {
        let mut frame = Frame::new();
        let e = girder(&mut frame, (0.0, 0.0, 0.0), (4.0, 0.0, 0.0));
        frame.elem_mut(e).unwrap().set_pin_both();
        let r = frame.divide_at_coord(e, 1.0, 0.0, 0.0).unwrap();
        let first = frame.elem(r.elems[0]).unwrap();
        let second = frame.elem(r.elems[1]).unwrap();
        assert_eq!(first.end_bonds(0), &[false, false, false, false, true, true]);
        assert!(first.end_bonds(1).iter().all(|b| !b));
        assert!(second.end_bonds(0).iter().all(|b| !b));
        assert_eq!(second.end_bonds(1), &[false, false, false, false, true, true]);
    }

    #[test]
    fn test_divide_at_endpoint_is_noop() {
        let mut frame = Frame::new();
        let e = girder(&mut frame, (0.0, 0.0, 0.0), (4.0, 0.0, 0.0));
        let r = frame.divide_at_coord(e, 4.0, 0.0, 0.0).unwrap();
        assert_eq!(r.elems, vec![e]);
        assert_eq!(r.nodes[0], frame.elem(e).unwrap().enodes[1]);
        assert_eq!(frame.elem_count(), 1);
    }

    #[test]
    fn test_divide_length_sum() {
        let mut frame = Frame::new();
        let e = girder(&mut frame, (1.0, 2.0, 3.0), (4.0, -2.0, 9.0));
        let total = frame.length(e).unwrap();
        let r = frame.divide_at_rate(e, 0.37).unwrap();
        let sum = frame.length(r.elems[0]).unwrap() + frame.length(r.elems[1]).unwrap();
        assert!((sum - total).abs() < 1e-9);
    }

    #[test]
    fn test_divide_at_axis() {
        let mut frame = Frame::new();
        let e = girder(&mut frame, (0.0, 0.0, 0.0), (8.0, 0.0, 4.0));
        let r = frame.divide_at_axis(e, Axis::X, 2.0).unwrap();
        let p = frame.coord(r.nodes[0]).unwrap();
        assert!((p - Vector3::new(2.0, 0.0, 1.0)).norm() < 1e-9);

        let before = frame.elem_count();
        assert_eq!(
            frame.divide_at_axis(e, Axis::Y, 0.0).unwrap_err(),
            KozoError::CannotDivide("element is perpendicular to axis")
        );
        assert!(frame.divide_at_axis(e, Axis::X, 50.0).is_err());
        assert_eq!(frame.elem_count(), before);
    }

    #[test]
    fn test_divide_at_ons() {
        let mut frame = Frame::new();
        let mid = frame.coord_node(0.5, 0.0, 0.0);
        let e = girder(&mut frame, (0.0, 0.0, 0.0), (1.0, 0.0, 0.0));
        let r = frame.divide_at_ons(e).unwrap();
        assert_eq!(r.nodes, vec![mid]);
        assert_eq!(r.elems.len(), 2);
        let first = frame.elem(r.elems[0]).unwrap();
        let second = frame.elem(r.elems[1]).unwrap();
        assert_eq!(first.enodes[1], mid);
        assert_eq!(second.enodes[0], mid);
        assert!((frame.coord(second.enodes[1]).unwrap().x - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_divide_at_ons_cascade() {
        let mut frame = Frame::new();
        let a = frame.coord_node(7.5, 0.0, 0.0);
        let b = frame.coord_node(2.5, 0.0, 0.0);
        let c = frame.coord_node(5.0, 0.0, 0.0);
        let e = girder(&mut frame, (0.0, 0.0, 0.0), (10.0, 0.0, 0.0));
        let r = frame.divide_at_ons(e).unwrap();
        assert_eq!(r.nodes, vec![b, c, a]);
        assert_eq!(r.elems.len(), 4);
        for seg in &r.elems {
            assert!((frame.length(*seg).unwrap() - 2.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_divide_at_node_extend_and_trim() {
        let mut frame = Frame::new();
        let e = girder(&mut frame, (0.0, 0.0, 0.0), (4.0, 0.0, 0.0));
        let n0 = frame.elem(e).unwrap().enodes[0];
        let outside = frame.coord_node(6.0, 0.0, 0.0);
        let r = frame
            .divide_at_node(e, outside, DividePosition::AfterEnd, false)
            .unwrap();
        assert_eq!(r.elems.len(), 2);
        assert!((frame.length(r.elems[1]).unwrap() - 2.0).abs() < 1e-12);

        // 截短：原端点 0 只被 e 引用，因此被删除
        let inner = frame.coord_node(1.0, 0.0, 0.0);
        frame
            .divide_at_node(e, inner, DividePosition::InsideStart, true)
            .unwrap();
        assert_eq!(frame.elem(e).unwrap().enodes[0], inner);
        assert!(frame.node(n0).is_err());
        assert!((frame.length(e).unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_divide_at_node_trim_clears_replaced_end() {
        let mut frame = Frame::new();
        let e = girder(&mut frame, (0.0, 0.0, 0.0), (4.0, 0.0, 0.0));
        frame.elem_mut(e).unwrap().set_pin_both();
        let inner = frame.coord_node(1.0, 0.0, 0.0);
        frame
            .divide_at_node(e, inner, DividePosition::InsideStart, true)
            .unwrap();

        let elem = frame.elem(e).unwrap();
        assert_eq!(elem.enodes[0], inner);
        assert!(elem.end_bonds(0).iter().all(|&b| !b));
        assert_eq!(
            elem.end_bonds(1),
            &[false, false, false, false, true, true]
        );
    }

    #[test]
    fn test_divide_plate_rejected() {
        let mut frame = Frame::new();
        let n: Vec<_> = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]
            .iter()
            .map(|&(x, y)| frame.coord_node(x, y, 0.0))
            .collect();
        let p = frame.add_plate_elem(&n, 301, Etype::Slab, None).unwrap();
        assert_eq!(
            frame.divide_at_rate(p, 0.5).unwrap_err(),
            KozoError::NotLineElem("divide_at_rate")
        );
    }
}
