//! 构件几何量
//!
//! 方向、法线、长度、面积、主轴等依赖端点坐标的量。
//! 端点坐标存放在 Frame 中，因此这些方法都定义在 [`Frame`] 上。

use crate::element::{self, ElemId};
use crate::error::{KozoError, Result};
use crate::frame::Frame;
use crate::math::{self, Vector3};

impl Frame {
    /// 构件全部端点的坐标
    pub fn elem_coords(&self, id: ElemId) -> Result<Vec<Vector3>> {
        self.elem(id)?
            .enodes
            .iter()
            .map(|&n| self.coord(n))
            .collect()
    }

    /// 端点 0 指向端点 1 的向量
    pub fn direction(&self, id: ElemId, normalize: bool) -> Result<Vector3> {
        let c = self.elem_coords(id)?;
        let d = c[1] - c[0];
        Ok(if normalize { math::normalize(d) } else { d })
    }

    /// 面构件法线：(0→1) × (0→2)
    pub fn normal(&self, id: ElemId, normalize: bool) -> Result<Vector3> {
        self.elem(id)?.plate("normal")?;
        let c = self.elem_coords(id)?;
        let n = (c[1] - c[0]).cross(&(c[2] - c[0]));
        Ok(if normalize { math::normalize(n) } else { n })
    }

    pub fn length(&self, id: ElemId) -> Result<f64> {
        self.elem(id)?.line("length")?;
        Ok(self.direction(id, false)?.norm())
    }

    pub fn midpoint(&self, id: ElemId) -> Result<Vector3> {
        let c = self.elem_coords(id)?;
        Ok(c.iter().sum::<Vector3>() / c.len() as f64)
    }

    /// 面构件面积；四边形按对角线 0-2 分成两个三角形
    pub fn area(&self, id: ElemId) -> Result<f64> {
        self.elem(id)?.plate("area")?;
        let c = self.elem_coords(id)?;
        let tri = |a: &Vector3, b: &Vector3, o: &Vector3| 0.5 * (a - o).cross(&(b - o)).norm();
        let mut area = tri(&c[1], &c[2], &c[0]);
        if c.len() == 4 {
            area += tri(&c[2], &c[3], &c[0]);
        }
        Ok(area)
    }

    /// 面构件宽度：边 0-1 的长度
    pub fn width(&self, id: ElemId) -> Result<f64> {
        self.elem(id)?.plate("width")?;
        let c = self.elem_coords(id)?;
        Ok((c[1] - c[0]).norm())
    }

    /// 面构件高度：边 1-2 的长度
    pub fn height(&self, id: ElemId) -> Result<f64> {
        self.elem(id)?.plate("height")?;
        let c = self.elem_coords(id)?;
        Ok((c[2] - c[1]).norm())
    }

    /// 两构件方向是否平行
    pub fn is_parallel(&self, a: ElemId, b: ElemId, eps: f64) -> Result<bool> {
        Ok(math::is_parallel(
            &self.direction(a, false)?,
            &self.direction(b, false)?,
            eps,
        ))
    }

    /// 按指定转角计算主轴（不修改构件）
    pub fn principal_axis(&self, id: ElemId, angle: f64) -> Result<(Vector3, Vector3)> {
        self.elem(id)?.line("principal_axis")?;
        element::principal_axis(&self.direction(id, false)?, angle)
    }

    /// 设置转角并刷新主轴缓存
    pub fn set_cang(&mut self, id: ElemId, cang: f64) -> Result<()> {
        let d = self.direction(id, false)?;
        self.elem_mut(id)?.set_cang(&d, cang)
    }

    /// 重算主轴（端点移动后）
    pub fn refresh_axes(&mut self, id: ElemId) -> Result<()> {
        let d = self.direction(id, false)?;
        self.elem_mut(id)?.refresh_axes(&d)
    }

    /// 使强轴（`strong`）或弱轴朝向 `target`，返回新的转角
    pub fn axis_to_cang(&mut self, id: ElemId, target: &Vector3, strong: bool) -> Result<f64> {
        self.elem(id)?.line("axis_to_cang")?;
        let d = self.direction(id, false)?;
        let cang = element::axis_to_cang(&d, target, strong, self.config.axis_clamp)?;
        self.elem_mut(id)?.set_cang(&d, cang)?;
        Ok(cang)
    }

    /// 全部线构件按当前方向刷新主轴
    pub fn refresh_all_axes(&mut self) {
        let ids: Vec<ElemId> = self.elems().filter(|e| e.is_line()).map(|e| e.num).collect();
        for id in ids {
            if let Err(e) = self.refresh_axes(id) {
                tracing::warn!("element {}: {}", id, e);
            }
        }
    }

    /// 按中点在 `axis` 方向的坐标排序
    pub fn sorted_elems(&self, ids: &[ElemId], axis: math::Axis) -> Result<Vec<ElemId>> {
        let mut keyed = Vec::with_capacity(ids.len());
        for &id in ids {
            keyed.push((self.midpoint(id)?[axis.index()], id));
        }
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        Ok(keyed.into_iter().map(|(_, id)| id).collect())
    }

    /// 线构件的平行判定失败时返回 NotParallel
    pub fn ensure_parallel(&self, a: ElemId, b: ElemId, func: &'static str) -> Result<()> {
        if self.is_parallel(a, b, self.config.parallel_tol)? {
            Ok(())
        } else {
            Err(KozoError::NotParallel(func))
        }
    }
}
