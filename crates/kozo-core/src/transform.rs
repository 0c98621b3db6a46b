//! 移动、复制、镜像与整体变换
//!
//! 构件端点一律经由 `coord_node` 重新定位，重合节点因此被共享。

use crate::element::{ElemId, ElementKind, StressTable};
use crate::error::Result;
use crate::frame::Frame;
use crate::math::{self, Vector3};
use crate::node::NodeId;

impl Frame {
    /// 构件端点各自平移 `d` 后对应的节点
    fn shifted_nodes(&mut self, id: ElemId, d: &Vector3) -> Result<Vec<NodeId>> {
        let coords = self.elem_coords(id)?;
        Ok(coords.iter().map(|c| self.coord_node_at(&(c + d))).collect())
    }

    /// 平移单个构件；原端点不再被引用时删除
    pub fn move_elem(&mut self, id: ElemId, d: &Vector3) -> Result<()> {
        let nodes = self.shifted_nodes(id, d)?;
        let old = std::mem::replace(&mut self.elem_mut(id)?.enodes, nodes);
        if self.elem(id)?.is_line() {
            self.refresh_axes(id)?;
        }
        for n in old {
            self.delete_node_if_orphan(n);
        }
        Ok(())
    }

    /// 复制构件到平移 `d` 的位置；线构件保留转角、端部释放与固端力
    pub fn copy_elem(&mut self, id: ElemId, d: &Vector3) -> Result<ElemId> {
        let nodes = self.shifted_nodes(id, d)?;
        let mut elem = self.elem(id)?.clone();
        elem.enodes = nodes;
        elem.parent = None;
        match &mut elem.kind {
            ElementKind::Line(line) => line.stress = StressTable::new(),
            ElementKind::Plate(plate) => plate.children = [None, None],
        }
        let new_id = self.insert_elem(elem)?;
        tracing::debug!("copied element {} -> {}", id, new_id);
        Ok(new_id)
    }

    /// 关于过 `center`、法向 `normal` 的平面镜像
    ///
    /// `copy` 为真时保留原构件并返回新构件，否则就地修改。
    /// 线构件的强轴随之镜像。
    pub fn mirror_elem(
        &mut self,
        id: ElemId,
        center: &Vector3,
        normal: &Vector3,
        copy: bool,
    ) -> Result<ElemId> {
        let strong = self.elem(id)?.strong();
        let coords = self.elem_coords(id)?;
        let nodes: Vec<NodeId> = coords
            .iter()
            .map(|c| self.coord_node_at(&math::mirror_about(c, center, normal)))
            .collect();

        let target = if copy {
            let mut elem = self.elem(id)?.clone();
            elem.enodes = nodes;
            elem.parent = None;
            match &mut elem.kind {
                ElementKind::Line(line) => line.stress = StressTable::new(),
                ElementKind::Plate(plate) => plate.children = [None, None],
            }
            self.insert_elem(elem)?
        } else {
            let old = std::mem::replace(&mut self.elem_mut(id)?.enodes, nodes);
            for n in old {
                self.delete_node_if_orphan(n);
            }
            id
        };

        if let Some(s) = strong {
            let n = math::normalize(*normal);
            let reflected = s - n * (2.0 * s.dot(&n));
            self.axis_to_cang(target, &reflected, true)?;
        }
        Ok(target)
    }

    /// 全部节点平移
    pub fn move_all(&mut self, dx: f64, dy: f64, dz: f64) {
        let d = Vector3::new(dx, dy, dz);
        for node in self.nodes_mut_all() {
            node.coord += d;
        }
        self.rebuild_index();
        tracing::info!("moved frame by ({}, {}, {})", dx, dy, dz);
    }

    /// 全部节点绕过 `center` 的 `axis` 旋转 `angle`（弧度）
    pub fn rotate(&mut self, center: &Vector3, axis: &Vector3, angle: f64) {
        if axis.norm() < math::EPSILON {
            return;
        }
        for node in self.nodes_mut_all() {
            node.coord = math::rotate_about(&node.coord, center, axis, angle);
        }
        self.rebuild_index();
        self.refresh_all_axes();
        tracing::info!("rotated frame by {:.6} rad", angle);
    }
}
