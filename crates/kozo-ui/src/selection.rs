//! 选择集
//!
//! 节点与构件各保存一个有序序列。合并时保持既有顺序：
//! 追加尚未选中的项，或移除每一项的第一次出现。

use kozo_core::element::{ElemId, Element, Etype};
use kozo_core::frame::Frame;
use kozo_core::node::NodeId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    nodes: Vec<NodeId>,
    elems: Vec<ElemId>,
}

fn merge<T: Copy + PartialEq>(list: &mut Vec<T>, items: &[T], deselect: bool) {
    for item in items {
        let pos = list.iter().position(|x| x == item);
        match (deselect, pos) {
            (true, Some(i)) => {
                list.remove(i);
            }
            (false, None) => list.push(*item),
            _ => {}
        }
    }
}

fn toggle<T: Copy + PartialEq>(list: &mut Vec<T>, item: T) {
    match list.iter().position(|x| *x == item) {
        Some(i) => {
            list.remove(i);
        }
        None => list.push(item),
    }
}

/// 构件当前是否可见（自身未隐藏，类型与断面均显示）
pub fn is_elem_visible(frame: &Frame, elem: &Element) -> bool {
    !elem.hide
        && frame.show.is_etype_visible(elem.etype)
        && frame.show.is_sect_visible(elem.sect)
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn elems(&self) -> &[ElemId] {
        &self.elems
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.elems.is_empty()
    }

    pub fn set_nodes(&mut self, nodes: Vec<NodeId>) {
        self.nodes.clear();
        merge(&mut self.nodes, &nodes, false);
    }

    pub fn set_elems(&mut self, elems: Vec<ElemId>) {
        self.elems.clear();
        merge(&mut self.elems, &elems, false);
    }

    pub fn merge_select_nodes(&mut self, items: &[NodeId], deselect: bool) {
        merge(&mut self.nodes, items, deselect);
    }

    pub fn merge_select_elems(&mut self, items: &[ElemId], deselect: bool) {
        merge(&mut self.elems, items, deselect);
    }

    pub fn toggle_node(&mut self, node: NodeId) {
        toggle(&mut self.nodes, node);
    }

    pub fn toggle_elem(&mut self, elem: ElemId) {
        toggle(&mut self.elems, elem);
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.elems.clear();
    }

    /// 以全部可见的约束节点替换节点选择
    pub fn select_confed(&mut self, frame: &Frame) {
        self.nodes = frame
            .nodes()
            .filter(|n| !n.hide && n.is_confed())
            .map(|n| n.num)
            .collect();
    }

    /// 以指定类型的可见构件替换构件选择
    pub fn select_elems_by_etype(&mut self, frame: &Frame, etype: Etype) {
        self.elems = frame
            .elems()
            .filter(|e| e.etype == etype && is_elem_visible(frame, e))
            .map(|e| e.num)
            .collect();
    }

    /// 差集：在本选择中而不在 `other` 中的项
    pub fn difference(&self, other: &Selection) -> Selection {
        Selection {
            nodes: self
                .nodes
                .iter()
                .copied()
                .filter(|n| !other.nodes.contains(n))
                .collect(),
            elems: self
                .elems
                .iter()
                .copied()
                .filter(|e| !other.elems.contains(e))
                .collect(),
        }
    }

    /// 去掉已不存在于 Frame 中的编号
    pub fn cleanup(&mut self, frame: &Frame) {
        self.nodes.retain(|&n| frame.node(n).is_ok());
        self.elems.retain(|&e| frame.elem(e).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_order() {
        let mut sel = Selection::new();
        sel.merge_select_elems(&[3, 1, 2], false);
        sel.merge_select_elems(&[1, 4], false);
        assert_eq!(sel.elems(), &[3, 1, 2, 4]);
        sel.merge_select_elems(&[1, 5], true);
        assert_eq!(sel.elems(), &[3, 2, 4]);
    }

    #[test]
    fn test_toggle_and_difference() {
        let mut a = Selection::new();
        a.merge_select_nodes(&[1, 2, 3], false);
        a.toggle_node(2);
        a.toggle_node(9);
        assert_eq!(a.nodes(), &[1, 3, 9]);

        let mut b = Selection::new();
        b.merge_select_nodes(&[3], false);
        assert_eq!(a.difference(&b).nodes(), &[1, 9]);
    }

    #[test]
    fn test_select_confed_skips_hidden() {
        let mut frame = Frame::new();
        let n0 = frame.coord_node(0.0, 0.0, 0.0);
        let n1 = frame.coord_node(6.0, 0.0, 0.0);
        let n2 = frame.coord_node(6.0, 6.0, 0.0);
        frame.node_mut(n0).unwrap().set_fix();
        frame.node_mut(n1).unwrap().set_pin();
        frame.node_mut(n1).unwrap().hide = true;
        frame.node_mut(n2).unwrap().conf[2] = true;

        let mut sel = Selection::new();
        sel.merge_select_nodes(&[n1], false);
        sel.select_confed(&frame);
        assert_eq!(sel.nodes(), &[n0, n2]);
    }

    #[test]
    fn test_select_by_etype_and_cleanup() {
        let mut frame = Frame::new();
        let a = frame.coord_node(0.0, 0.0, 0.0);
        let b = frame.coord_node(0.0, 0.0, 3.0);
        let c = frame.coord_node(6.0, 0.0, 3.0);
        let col = frame.add_line_elem([a, b], 101, Etype::Column, None).unwrap();
        let gir = frame.add_line_elem([b, c], 201, Etype::Girder, None).unwrap();

        let mut sel = Selection::new();
        sel.select_elems_by_etype(&frame, Etype::Girder);
        assert_eq!(sel.elems(), &[gir]);

        frame.show.set_sect_visible(201, false);
        sel.select_elems_by_etype(&frame, Etype::Girder);
        assert!(sel.elems().is_empty());

        sel.set_elems(vec![col, gir]);
        frame.delete_elem(col).unwrap();
        sel.cleanup(&frame);
        assert_eq!(sel.elems(), &[gir]);
    }
}
