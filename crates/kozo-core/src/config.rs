//! 内核数值配置

use serde::{Deserialize, Serialize};

/// 几何运算使用的容差，由驱动程序给定
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// 节点坐标重合判定
    pub eps: f64,
    /// AxisToCang 中余弦值的截断容差
    pub axis_clamp: f64,
    /// 共线判定（单位方向向量叉积）
    pub collinear_tol: f64,
    /// 链式遍历等处的平行判定
    pub parallel_tol: f64,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            eps: 1e-4,
            axis_clamp: 1e-3,
            collinear_tol: 1e-4,
            parallel_tol: 1e-6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: KernelConfig = serde_json::from_str(r#"{"eps": 0.001}"#).unwrap();
        assert_eq!(cfg.eps, 0.001);
        assert_eq!(cfg.axis_clamp, 1e-3);
    }
}
