//! 构件邻近节点查询

use crate::element::ElemId;
use crate::error::{KozoError, Result};
use crate::frame::Frame;
use crate::math::{Vector3, EPSILON};
use crate::node::NodeId;

impl Frame {
    /// 严格位于线段 a-b 内部且与其共线的节点，按到 a 的距离排序
    pub fn nodes_on_segment(&self, a: &Vector3, b: &Vector3, exclude: &[NodeId]) -> Vec<NodeId> {
        let d = b - a;
        let len = d.norm();
        if len < EPSILON {
            return Vec::new();
        }
        let unit = d / len;
        let eps = self.config.eps;
        let tol = self.config.collinear_tol;

        let mut found: Vec<(f64, NodeId)> = self
            .nodes()
            .filter(|n| !exclude.contains(&n.num))
            .filter_map(|n| {
                let v = n.coord - a;
                let s = v.dot(&unit);
                if s <= eps || s >= len - eps {
                    return None;
                }
                let vn = v.norm();
                if (v / vn).cross(&unit).norm() >= tol {
                    return None;
                }
                Some((s, n.num))
            })
            .collect();
        found.sort_by(|x, y| x.0.total_cmp(&y.0));
        found.into_iter().map(|(_, n)| n).collect()
    }

    /// 边 (side, side+1) 上的中间节点，按到 side 端的距离排序
    pub fn on_node(&self, id: ElemId, side: usize) -> Result<Vec<NodeId>> {
        let elem = self.elem(id)?;
        let n = elem.enods();
        if side >= n {
            return Err(KozoError::InvalidInput(format!(
                "side {} of element {} with {} nodes",
                side, id, n
            )));
        }
        let a = elem.enodes[side];
        let b = elem.enodes[(side + 1) % n];
        Ok(self.nodes_on_segment(&self.coord(a)?, &self.coord(b)?, &elem.enodes))
    }

    /// 在构件方向上的投影严格落在 (0, L) 内的节点
    ///
    /// `size` 为 Some(k) 时只返回离端点 `index` 最近的 k 个（由近到远）；
    /// None 时返回全部（按节点编号）。
    pub fn between_node(&self, id: ElemId, index: usize, size: Option<usize>) -> Result<Vec<NodeId>> {
        let elem = self.elem(id)?;
        if index >= elem.enods() {
            return Err(KozoError::InvalidInput(format!(
                "end {} of element {}",
                index, id
            )));
        }
        let c0 = self.coord(elem.enodes[0])?;
        let d = self.coord(elem.enodes[1])? - c0;
        let len = d.norm();
        if len < EPSILON {
            return Err(KozoError::Degenerate("between_node"));
        }
        let unit = d / len;
        let origin = self.coord(elem.enodes[index])?;

        let candidates = self.nodes().filter(|n| !elem.has_node(n.num)).filter(|n| {
            let s = (n.coord - c0).dot(&unit);
            s > 0.0 && s < len
        });

        let Some(size) = size else {
            return Ok(candidates.map(|n| n.num).collect());
        };

        // 有界插入排序：保持 `nearest` 升序，末尾即当前最大值
        let mut nearest: Vec<(f64, NodeId)> = Vec::with_capacity(size + 1);
        for n in candidates {
            let dist = (n.coord - origin).norm();
            if nearest.len() == size {
                match nearest.last() {
                    Some(&(max, _)) if dist < max => {}
                    _ => continue,
                }
            }
            let pos = nearest.partition_point(|&(x, _)| x <= dist);
            nearest.insert(pos, (dist, n.num));
            nearest.truncate(size);
        }
        Ok(nearest.into_iter().map(|(_, n)| n).collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::element::Etype;
    use crate::frame::Frame;

    #[test]
    fn test_on_node_ordered() {
        let mut frame = Frame::new();
        let n0 = frame.coord_node(0.0, 0.0, 0.0);
        let n1 = frame.coord_node(10.0, 0.0, 0.0);
        let a = frame.coord_node(7.0, 0.0, 0.0);
        let b = frame.coord_node(2.0, 0.0, 0.0);
        frame.coord_node(5.0, 0.5, 0.0);
        frame.coord_node(12.0, 0.0, 0.0);
        let e = frame.add_line_elem([n0, n1], 201, Etype::Girder, None).unwrap();
        assert_eq!(frame.on_node(e, 0).unwrap(), vec![b, a]);
        assert_eq!(frame.on_node(e, 1).unwrap(), vec![a, b]);
        assert!(frame.on_node(e, 2).is_err());
    }

    #[test]
    fn test_on_node_plate_edge() {
        let mut frame = Frame::new();
        let n0 = frame.coord_node(0.0, 0.0, 0.0);
        let n1 = frame.coord_node(4.0, 0.0, 0.0);
        let n2 = frame.coord_node(4.0, 0.0, 3.0);
        let n3 = frame.coord_node(0.0, 0.0, 3.0);
        let mid = frame.coord_node(4.0, 0.0, 1.0);
        let p = frame.add_plate_elem(&[n0, n1, n2, n3], 301, Etype::Wall, None).unwrap();
        assert!(frame.on_node(p, 0).unwrap().is_empty());
        assert_eq!(frame.on_node(p, 1).unwrap(), vec![mid]);
    }

    #[test]
    fn test_between_node() {
        let mut frame = Frame::new();
        let n0 = frame.coord_node(0.0, 0.0, 0.0);
        let n1 = frame.coord_node(10.0, 0.0, 0.0);
        let a = frame.coord_node(2.0, 3.0, 0.0);
        let b = frame.coord_node(6.0, -1.0, 0.0);
        let c = frame.coord_node(9.0, 0.0, 5.0);
        frame.coord_node(-1.0, 0.0, 0.0);
        frame.coord_node(11.0, 0.0, 0.0);
        let e = frame.add_line_elem([n0, n1], 201, Etype::Girder, None).unwrap();

        assert_eq!(frame.between_node(e, 0, None).unwrap(), vec![a, b, c]);
        assert_eq!(frame.between_node(e, 0, Some(2)).unwrap(), vec![a, b]);
        assert_eq!(frame.between_node(e, 1, Some(1)).unwrap(), vec![b]);
        assert!(frame.between_node(e, 0, Some(0)).unwrap().is_empty());
    }
}
