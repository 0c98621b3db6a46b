//! 相连线构件的惰性遍历

use crate::element::ElemId;
use crate::frame::Frame;
use crate::node::NodeId;
use std::collections::BTreeSet;

/// 遍历的当前位置，供终止条件读取
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainState {
    /// 当前构件远端的节点
    pub node: NodeId,
    /// 刚经过的构件
    pub elem: ElemId,
    /// 已产出的构件数
    pub steps: usize,
}

/// 沿相连线构件前进的迭代器
///
/// 每一步在当前节点处查找（除当前构件外）满足 `condition` 的第一根线构件，
/// 前进到其另一端。`terminate` 为真或找不到后继时结束。
/// 已经过的构件不会再次产出，闭合环路因此也会结束。
pub struct Chain<'a, C, T> {
    frame: &'a Frame,
    state: ChainState,
    condition: C,
    terminate: T,
    visited: BTreeSet<ElemId>,
    done: bool,
}

impl<'a, C, T> Chain<'a, C, T>
where
    C: FnMut(&Frame, ElemId, ElemId) -> bool,
    T: FnMut(&ChainState) -> bool,
{
    /// 从 `start` 出发、经 `first` 开始遍历；`first` 本身不产出
    pub fn new(frame: &'a Frame, start: NodeId, first: ElemId, condition: C, terminate: T) -> Self {
        let far = frame
            .elem(first)
            .ok()
            .and_then(|e| e.otherside(start));
        let done = far.is_none();
        Self {
            frame,
            state: ChainState {
                node: far.unwrap_or(start),
                elem: first,
                steps: 0,
            },
            condition,
            terminate,
            visited: BTreeSet::from([first]),
            done,
        }
    }

    pub fn state(&self) -> &ChainState {
        &self.state
    }
}

impl<'a, C, T> Iterator for Chain<'a, C, T>
where
    C: FnMut(&Frame, ElemId, ElemId) -> bool,
    T: FnMut(&ChainState) -> bool,
{
    type Item = ElemId;

    fn next(&mut self) -> Option<ElemId> {
        if self.done || (self.terminate)(&self.state) {
            self.done = true;
            return None;
        }
        let current = self.state.elem;
        let found = self
            .frame
            .line_elems_at(self.state.node)
            .into_iter()
            .filter(|id| *id != current && !self.visited.contains(id))
            .find(|&id| (self.condition)(self.frame, current, id));

        let Some(next) = found else {
            self.done = true;
            return None;
        };
        let far = self
            .frame
            .elem(next)
            .ok()
            .and_then(|e| e.otherside(self.state.node));
        let Some(far) = far else {
            self.done = true;
            return None;
        };
        self.visited.insert(next);
        self.state = ChainState {
            node: far,
            elem: next,
            steps: self.state.steps + 1,
        };
        Some(next)
    }
}

/// 同断面且方向平行（容差 `eps`）时继续
pub fn straight(eps: f64) -> impl FnMut(&Frame, ElemId, ElemId) -> bool {
    move |frame, current, candidate| {
        let (Ok(a), Ok(b)) = (frame.elem(current), frame.elem(candidate)) else {
            return false;
        };
        a.sect == b.sect && frame.is_parallel(current, candidate, eps).unwrap_or(false)
    }
}

/// 不主动终止
pub fn never(_: &ChainState) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Etype;

    #[test]
    fn test_straight_chain() {
        let mut frame = Frame::new();
        let n: Vec<_> = (0..4).map(|i| frame.coord_node(i as f64, 0.0, 0.0)).collect();
        let g1 = frame.add_line_elem([n[0], n[1]], 201, Etype::Girder, None).unwrap();
        let g2 = frame.add_line_elem([n[2], n[1]], 201, Etype::Girder, None).unwrap();
        let g3 = frame.add_line_elem([n[2], n[3]], 201, Etype::Girder, None).unwrap();
        // 分支：不同断面、不平行
        let up = frame.coord_node(1.0, 0.0, 3.0);
        frame.add_line_elem([n[1], up], 101, Etype::Column, None).unwrap();

        let visited: Vec<_> = Chain::new(&frame, n[0], g1, straight(1e-6), never).collect();
        assert_eq!(visited, vec![g2, g3]);
    }

    #[test]
    fn test_chain_stops_on_section_change() {
        let mut frame = Frame::new();
        let n: Vec<_> = (0..3).map(|i| frame.coord_node(0.0, i as f64, 0.0)).collect();
        let g1 = frame.add_line_elem([n[0], n[1]], 201, Etype::Girder, None).unwrap();
        frame.add_line_elem([n[1], n[2]], 202, Etype::Girder, None).unwrap();
        assert_eq!(Chain::new(&frame, n[0], g1, straight(1e-6), never).count(), 0);
    }

    #[test]
    fn test_chain_terminate_and_ring() {
        let mut frame = Frame::new();
        let pts = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        let n: Vec<_> = pts.iter().map(|&(x, y)| frame.coord_node(x, y, 0.0)).collect();
        let mut ring = Vec::new();
        for i in 0..4 {
            let e = frame
                .add_line_elem([n[i], n[(i + 1) % 4]], 201, Etype::Girder, None)
                .unwrap();
            ring.push(e);
        }
        let any = |_: &Frame, _: ElemId, _: ElemId| true;
        let all: Vec<_> = Chain::new(&frame, n[0], ring[0], any, never).collect();
        assert_eq!(all, vec![ring[1], ring[2], ring[3]]);

        let two: Vec<_> =
            Chain::new(&frame, n[0], ring[0], any, |s: &ChainState| s.steps >= 2).collect();
        assert_eq!(two.len(), 2);
    }
}
