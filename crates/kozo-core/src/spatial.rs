//! 节点坐标索引
//!
//! 以容差为网格尺寸的三维哈希网格，用于 `coord_node` 的重合节点查找：
//! - 插入/删除 O(1)
//! - 查找只检查相邻 27 个网格

use crate::math::Vector3;
use crate::node::NodeId;
use std::collections::HashMap;

type Cell = (i64, i64, i64);

/// 基于网格的坐标索引
#[derive(Debug, Clone, Default)]
pub struct CoordIndex {
    /// 网格单元大小（即重合容差）
    cell_size: f64,

    /// 网格映射：网格坐标 -> (节点, 坐标) 列表
    grid: HashMap<Cell, Vec<(NodeId, Vector3)>>,
}

impl CoordIndex {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size: cell_size.max(f64::MIN_POSITIVE),
            grid: HashMap::new(),
        }
    }

    fn to_cell(&self, p: &Vector3) -> Cell {
        (
            (p.x / self.cell_size).floor() as i64,
            (p.y / self.cell_size).floor() as i64,
            (p.z / self.cell_size).floor() as i64,
        )
    }

    pub fn insert(&mut self, id: NodeId, p: Vector3) {
        let cell = self.to_cell(&p);
        self.grid.entry(cell).or_default().push((id, p));
    }

    pub fn remove(&mut self, id: NodeId, p: &Vector3) -> bool {
        let cell = self.to_cell(p);
        if let Some(entries) = self.grid.get_mut(&cell) {
            let before = entries.len();
            entries.retain(|(n, _)| *n != id);
            let removed = entries.len() != before;
            if entries.is_empty() {
                self.grid.remove(&cell);
            }
            removed
        } else {
            false
        }
    }

    /// 查找与 `p` 各坐标差均不超过容差的节点；多个时取编号最小者
    pub fn find(&self, p: &Vector3) -> Option<NodeId> {
        let (cx, cy, cz) = self.to_cell(p);
        let mut found: Option<NodeId> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    // 远处坐标的网格号在 i64 边界饱和
                    let cell = (
                        cx.saturating_add(dx),
                        cy.saturating_add(dy),
                        cz.saturating_add(dz),
                    );
                    let Some(entries) = self.grid.get(&cell) else {
                        continue;
                    };
                    for (id, q) in entries {
                        if (0..3).all(|i| (p[i] - q[i]).abs() <= self.cell_size) {
                            found = Some(found.map_or(*id, |f| f.min(*id)));
                        }
                    }
                }
            }
        }
        found
    }

    pub fn clear(&mut self) {
        self.grid.clear();
    }

    pub fn len(&self) -> usize {
        self.grid.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// 重建索引
    pub fn rebuild<I: IntoIterator<Item = (NodeId, Vector3)>>(&mut self, entries: I) {
        self.grid.clear();
        for (id, p) in entries {
            self.insert(id, p);
        }
    }
}
