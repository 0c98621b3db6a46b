//! 框架：节点、构件、断面的所有者
//!
//! 构件之间、构件与节点之间都通过编号引用，不持有指针。
//! 节点只能经由 [`Frame::coord_node`] 创建，保证同一坐标只有一个节点。

use crate::config::KernelConfig;
use crate::element::{ElemId, Element, ElementKind, Etype};
use crate::error::{KozoError, Result};
use crate::kijun::Kijun;
use crate::math::{Axis, BoundingBox3, Vector3};
use crate::node::{Node, NodeId};
use crate::section::{SectId, Section};
use crate::show::{Show, View};
use crate::spatial::CoordIndex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// 结构模型
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub name: String,
    pub config: KernelConfig,
    nodes: BTreeMap<NodeId, Node>,
    elems: BTreeMap<ElemId, Element>,
    sects: BTreeMap<SectId, Section>,
    pub kijuns: BTreeMap<String, Kijun>,
    /// 下一个可用的断面编号
    pub maxsnum: SectId,
    pub view: View,
    pub show: Show,

    #[serde(skip)]
    index: CoordIndex,
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl Frame {
    pub fn new() -> Self {
        Self::with_config(KernelConfig::default())
    }

    pub fn with_config(config: KernelConfig) -> Self {
        Self {
            name: String::new(),
            config,
            nodes: BTreeMap::new(),
            elems: BTreeMap::new(),
            sects: BTreeMap::new(),
            kijuns: BTreeMap::new(),
            maxsnum: 1,
            view: View::default(),
            show: Show::default(),
            index: CoordIndex::new(config.eps),
        }
    }

    // ========== 节点 ==========

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(&id).ok_or(KozoError::NodeNotFound(id))
    }

    /// 节点的可变引用；修改坐标请用 [`Frame::move_node`]
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(&id).ok_or(KozoError::NodeNotFound(id))
    }

    pub fn coord(&self, id: NodeId) -> Result<Vector3> {
        Ok(self.node(id)?.coord)
    }

    pub fn next_node_num(&self) -> NodeId {
        self.nodes.keys().next_back().map_or(1, |n| n + 1)
    }

    /// 返回位于 (x, y, z) 的节点，不存在时新建
    pub fn coord_node(&mut self, x: f64, y: f64, z: f64) -> NodeId {
        let p = Vector3::new(x, y, z);
        if let Some(id) = self.index.find(&p) {
            return id;
        }
        let id = self.next_node_num();
        self.nodes.insert(id, Node::new(id, x, y, z));
        self.index.insert(id, p);
        tracing::trace!("new node {} at ({}, {}, {})", id, x, y, z);
        id
    }

    pub fn coord_node_at(&mut self, p: &Vector3) -> NodeId {
        self.coord_node(p.x, p.y, p.z)
    }

    /// 平移单个节点并更新坐标索引
    pub fn move_node(&mut self, id: NodeId, d: &Vector3) -> Result<()> {
        let node = self.nodes.get_mut(&id).ok_or(KozoError::NodeNotFound(id))?;
        let old = node.coord;
        node.coord += d;
        let new = node.coord;
        self.index.remove(id, &old);
        self.index.insert(id, new);
        self.refresh_axes_at(id);
        Ok(())
    }

    /// 引用该节点的构件
    pub fn elems_of_node(&self, node: NodeId) -> Vec<ElemId> {
        self.elems
            .values()
            .filter(|e| e.has_node(node))
            .map(|e| e.num)
            .collect()
    }

    /// 引用该节点的线构件
    pub fn line_elems_at(&self, node: NodeId) -> Vec<ElemId> {
        self.elems
            .values()
            .filter(|e| e.is_line() && e.has_node(node))
            .map(|e| e.num)
            .collect()
    }

    pub fn is_orphan(&self, node: NodeId) -> bool {
        !self.elems.values().any(|e| e.has_node(node))
    }

    /// 删除节点；仍被构件引用时失败
    pub fn delete_node(&mut self, id: NodeId) -> Result<Node> {
        if !self.nodes.contains_key(&id) {
            return Err(KozoError::NodeNotFound(id));
        }
        if !self.is_orphan(id) {
            return Err(KozoError::NodeInUse(id));
        }
        let node = self.nodes.remove(&id).ok_or(KozoError::NodeNotFound(id))?;
        self.index.remove(id, &node.coord);
        tracing::debug!("deleted node {}", id);
        Ok(node)
    }

    /// 节点不再被引用时删除，返回是否删除
    pub fn delete_node_if_orphan(&mut self, id: NodeId) -> bool {
        self.is_orphan(id) && self.delete_node(id).is_ok()
    }

    // ========== 断面 ==========

    pub fn sects(&self) -> impl Iterator<Item = &Section> {
        self.sects.values()
    }

    pub fn sect(&self, id: SectId) -> Result<&Section> {
        self.sects.get(&id).ok_or(KozoError::SectNotFound(id))
    }

    pub fn sect_mut(&mut self, id: SectId) -> Result<&mut Section> {
        self.sects.get_mut(&id).ok_or(KozoError::SectNotFound(id))
    }

    pub fn add_sect(&mut self, section: Section) -> Result<SectId> {
        let id = section.num;
        if self.sects.contains_key(&id) {
            return Err(KozoError::DuplicateId(id));
        }
        self.sects.insert(id, section);
        if id >= self.maxsnum {
            self.maxsnum = id + 1;
        }
        Ok(id)
    }

    /// 杨氏模量与面积均吻合的支撑断面
    pub fn search_brace_sect(&self, young: f64, area: f64, tol: f64) -> Option<SectId> {
        self.sects
            .values()
            .filter(|s| matches!(s.kind, Etype::Brace | Etype::Wbrace | Etype::Sbrace))
            .find(|s| s.matches_brace(young, area, tol))
            .map(|s| s.num)
    }

    /// 面积最接近且在容差内的断面
    pub fn search_sect_by_area(&self, area: f64, tol: f64) -> Option<SectId> {
        self.sects
            .values()
            .filter(|s| s.matches_area(area, tol))
            .min_by(|a, b| {
                (a.area() - area)
                    .abs()
                    .total_cmp(&(b.area() - area).abs())
            })
            .map(|s| s.num)
    }

    // ========== 构件 ==========

    pub fn elems(&self) -> impl Iterator<Item = &Element> {
        self.elems.values()
    }

    pub fn elem_ids(&self) -> Vec<ElemId> {
        self.elems.keys().copied().collect()
    }

    pub fn elem_count(&self) -> usize {
        self.elems.len()
    }

    pub fn elem(&self, id: ElemId) -> Result<&Element> {
        self.elems.get(&id).ok_or(KozoError::ElemNotFound(id))
    }

    /// 构件的可变引用；更换端点请用 Frame 上的操作，以维持主轴缓存
    pub fn elem_mut(&mut self, id: ElemId) -> Result<&mut Element> {
        self.elems.get_mut(&id).ok_or(KozoError::ElemNotFound(id))
    }

    pub fn next_elem_num(&self) -> ElemId {
        self.elems.keys().next_back().map_or(1, |n| n + 1)
    }

    fn check_nodes(&self, enodes: &[NodeId]) -> Result<()> {
        for &n in enodes {
            if !self.nodes.contains_key(&n) {
                return Err(KozoError::NodeNotFound(n));
            }
        }
        let unique: BTreeSet<_> = enodes.iter().collect();
        if unique.len() != enodes.len() {
            return Err(KozoError::Degenerate("duplicate element node"));
        }
        Ok(())
    }

    fn assign_num(&self, num: Option<ElemId>) -> Result<ElemId> {
        match num {
            Some(n) if self.elems.contains_key(&n) => Err(KozoError::DuplicateId(n)),
            Some(n) => Ok(n),
            None => Ok(self.next_elem_num()),
        }
    }

    /// 添加线构件；`num` 为 None 时自动取下一个编号
    pub fn add_line_elem(
        &mut self,
        enodes: [NodeId; 2],
        sect: SectId,
        etype: Etype,
        num: Option<ElemId>,
    ) -> Result<ElemId> {
        self.check_nodes(&enodes)?;
        let id = self.assign_num(num)?;
        let mut elem = Element::new_line(id, enodes, sect, etype)?;
        let d = self.coord(enodes[1])? - self.coord(enodes[0])?;
        elem.set_cang(&d, 0.0)?;
        self.elems.insert(id, elem);
        tracing::debug!("add {} {} ({} - {})", etype, id, enodes[0], enodes[1]);
        Ok(id)
    }

    /// 添加面构件（3 或 4 节点）
    pub fn add_plate_elem(
        &mut self,
        enodes: &[NodeId],
        sect: SectId,
        etype: Etype,
        num: Option<ElemId>,
    ) -> Result<ElemId> {
        self.check_nodes(enodes)?;
        let id = self.assign_num(num)?;
        let elem = Element::new_plate(id, enodes, sect, etype)?;
        self.elems.insert(id, elem);
        tracing::debug!("add {} {} {:?}", etype, id, enodes);
        Ok(id)
    }

    /// 直接插入已构造的构件（复制等操作使用），编号取下一个可用值
    pub(crate) fn insert_elem(&mut self, mut elem: Element) -> Result<ElemId> {
        self.check_nodes(&elem.enodes)?;
        let id = self.next_elem_num();
        elem.num = id;
        if elem.is_line() {
            let d = self.coord(elem.enodes[1])? - self.coord(elem.enodes[0])?;
            elem.refresh_axes(&d)?;
        }
        self.elems.insert(id, elem);
        Ok(id)
    }

    /// 删除构件，并清除父子关系中对它的引用
    pub fn delete_elem(&mut self, id: ElemId) -> Result<Element> {
        let elem = self.elems.remove(&id).ok_or(KozoError::ElemNotFound(id))?;
        match &elem.kind {
            ElementKind::Plate(p) => {
                for child in p.children.iter().flatten() {
                    if let Some(c) = self.elems.get_mut(child) {
                        c.parent = None;
                    }
                }
            }
            ElementKind::Line(_) => {
                if let Some(parent) = elem.parent {
                    if let Some(ElementKind::Plate(p)) =
                        self.elems.get_mut(&parent).map(|e| &mut e.kind)
                    {
                        for slot in p.children.iter_mut() {
                            if *slot == Some(id) {
                                *slot = None;
                            }
                        }
                    }
                }
            }
        }
        tracing::debug!("deleted element {}", id);
        Ok(elem)
    }

    /// 删除构件，并删除因此不再被引用的端点
    pub fn delete_elem_and_orphans(&mut self, id: ElemId) -> Result<Element> {
        let elem = self.delete_elem(id)?;
        for &n in &elem.enodes {
            self.delete_node_if_orphan(n);
        }
        Ok(elem)
    }

    // ========== 查询 ==========

    /// 全部节点的包围盒
    pub fn bbox(&self) -> Option<BoundingBox3> {
        BoundingBox3::from_points(self.nodes.values().map(|n| n.coord))
    }

    /// 与平面 `axis = coord` 相交的线构件
    ///
    /// `or_over` 为真时，端点恰在平面上的构件也计入（整根落在平面内的除外）。
    pub fn fence(&self, axis: Axis, coord: f64, or_over: bool) -> Vec<ElemId> {
        let i = axis.index();
        let eps = self.config.eps;
        self.elems
            .values()
            .filter(|e| e.is_line())
            .filter(|e| {
                let (Some(a), Some(b)) = (self.nodes.get(&e.enodes[0]), self.nodes.get(&e.enodes[1]))
                else {
                    return false;
                };
                let da = a.coord[i] - coord;
                let db = b.coord[i] - coord;
                if or_over {
                    let on_a = da.abs() <= eps;
                    let on_b = db.abs() <= eps;
                    (da * db < 0.0) || (on_a ^ on_b)
                } else {
                    da * db < 0.0 && da.abs() > eps && db.abs() > eps
                }
            })
            .map(|e| e.num)
            .collect()
    }

    /// 同时引用全部给定节点的构件
    pub fn search_elem(&self, nodes: &[NodeId]) -> Vec<ElemId> {
        if nodes.is_empty() {
            return Vec::new();
        }
        self.elems
            .values()
            .filter(|e| nodes.iter().all(|n| e.has_node(*n)))
            .map(|e| e.num)
            .collect()
    }

    /// 引用任一给定节点的构件（不重复，按编号排序）
    pub fn node_to_elem_any(&self, nodes: &[NodeId]) -> Vec<ElemId> {
        self.elems
            .values()
            .filter(|e| nodes.iter().any(|n| e.has_node(*n)))
            .map(|e| e.num)
            .collect()
    }

    /// 落在包围盒内的节点
    pub fn node_in_box(&self, bbox: &BoundingBox3) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| bbox.contains(&n.coord))
            .map(|n| n.num)
            .collect()
    }

    // ========== 基准线 ==========

    pub fn add_kijun(&mut self, kijun: Kijun) {
        self.kijuns.insert(kijun.name.to_ascii_uppercase(), kijun);
    }

    pub fn kijun(&self, name: &str) -> Result<&Kijun> {
        self.kijuns
            .get(&name.to_ascii_uppercase())
            .ok_or_else(|| KozoError::KijunNotFound(name.to_string()))
    }

    /// 平面位置落在任一指定基准线上的节点
    pub fn kijun_nodes(&self, names: &[&str]) -> Result<Vec<NodeId>> {
        let kijuns = names
            .iter()
            .map(|n| self.kijun(n))
            .collect::<Result<Vec<_>>>()?;
        let eps = self.config.eps;
        Ok(self
            .nodes
            .values()
            .filter(|n| kijuns.iter().any(|k| k.plan_distance(&n.coord) <= eps))
            .map(|n| n.num)
            .collect())
    }

    /// 全部端点都在指定基准线上的构件
    pub fn kijun_elems(&self, names: &[&str]) -> Result<Vec<ElemId>> {
        let nodes: BTreeSet<NodeId> = self.kijun_nodes(names)?.into_iter().collect();
        Ok(self
            .elems
            .values()
            .filter(|e| e.enodes.iter().all(|n| nodes.contains(n)))
            .map(|e| e.num)
            .collect())
    }

    // ========== 维护 ==========

    /// 按现有坐标重建坐标索引（反序列化后需要调用）
    pub fn rebuild_index(&mut self) {
        self.index = CoordIndex::new(self.config.eps);
        self.index
            .rebuild(self.nodes.values().map(|n| (n.num, n.coord)));
    }

    /// 节点重新编号为 1..n（保持原顺序），同步更新构件引用
    pub fn renumber_nodes(&mut self) {
        let map: BTreeMap<NodeId, NodeId> = self
            .nodes
            .keys()
            .enumerate()
            .map(|(i, &old)| (old, i as NodeId + 1))
            .collect();
        let nodes = std::mem::take(&mut self.nodes);
        self.nodes = nodes
            .into_values()
            .map(|mut n| {
                n.num = map[&n.num];
                (n.num, n)
            })
            .collect();
        for elem in self.elems.values_mut() {
            for n in elem.enodes.iter_mut() {
                *n = map[&*n];
            }
            if let ElementKind::Line(line) = &mut elem.kind {
                for table in line.stress.values_mut() {
                    let old = std::mem::take(table);
                    *table = old
                        .into_iter()
                        .map(|(k, v)| (map.get(&k).copied().unwrap_or(k), v))
                        .collect();
                }
            }
        }
        self.rebuild_index();
        tracing::info!("renumbered {} nodes", self.nodes.len());
    }

    /// 构件重新编号为 1..n（保持原顺序），同步更新父子引用
    pub fn renumber_elems(&mut self) {
        let map: BTreeMap<ElemId, ElemId> = self
            .elems
            .keys()
            .enumerate()
            .map(|(i, &old)| (old, i as ElemId + 1))
            .collect();
        let elems = std::mem::take(&mut self.elems);
        self.elems = elems
            .into_values()
            .map(|mut e| {
                e.num = map[&e.num];
                e.parent = e.parent.and_then(|p| map.get(&p).copied());
                if let ElementKind::Plate(p) = &mut e.kind {
                    for c in p.children.iter_mut() {
                        *c = c.and_then(|id| map.get(&id).copied());
                    }
                }
                (e.num, e)
            })
            .collect();
        tracing::info!("renumbered {} elements", self.elems.len());
    }

    /// 用当前视图计算全部节点的投影坐标
    pub fn project(&mut self) {
        let view = self.view.clone();
        for node in self.nodes.values_mut() {
            node.pcoord = view.project(&node.coord);
        }
    }

    /// 渲染用快照：视图与显示配置的副本
    pub fn snapshot(&self) -> (View, Show) {
        (self.view.clone(), self.show.clone())
    }

    // ========== crate 内部 ==========

    pub(crate) fn nodes_mut_all(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.values_mut()
    }

    /// 与节点相连的线构件按新方向刷新主轴
    pub(crate) fn refresh_axes_at(&mut self, node: NodeId) {
        for id in self.line_elems_at(node) {
            if let Err(e) = self.refresh_axes(id) {
                tracing::warn!("element {}: {}", id, e);
            }
        }
    }
}
