//! 荷载工况表达式与应力取值
//!
//! 工况名可以是组合形式，如 `L+X-Y`。表达式只解析一次，
//! 之后对每个构件、每个端点重复求值。

use crate::element::Element;
use crate::error::{KozoError, Result};
use crate::node::NodeId;
use serde::{Deserialize, Serialize};

/// 应力分量名称
pub const STRESS_NAMES: [&str; 6] = ["N", "Qx", "Qy", "Mz", "Mx", "My"];

/// 工况组合表达式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodExpr {
    Case(String),
    Add(Box<PeriodExpr>, Box<PeriodExpr>),
    Sub(Box<PeriodExpr>, Box<PeriodExpr>),
}

impl PeriodExpr {
    /// 解析 `A+B-C` 形式的工况名；运算符左结合
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(KozoError::InvalidInput("empty period".to_string()));
        }

        let mut expr: Option<PeriodExpr> = None;
        let mut op = '+';
        let mut start = 0;
        let bytes: Vec<(usize, char)> = input.char_indices().collect();
        for (i, &(pos, c)) in bytes.iter().enumerate() {
            let last = i + 1 == bytes.len();
            if c == '+' || c == '-' || last {
                let end = if last && c != '+' && c != '-' {
                    input.len()
                } else {
                    pos
                };
                let name = input[start..end].trim();
                if name.is_empty() {
                    return Err(KozoError::InvalidInput(format!("malformed period: {}", input)));
                }
                let term = PeriodExpr::Case(name.to_ascii_uppercase());
                expr = Some(match expr {
                    None if op == '+' => term,
                    None => {
                        return Err(KozoError::InvalidInput(format!(
                            "malformed period: {}",
                            input
                        )))
                    }
                    Some(lhs) if op == '+' => PeriodExpr::Add(Box::new(lhs), Box::new(term)),
                    Some(lhs) => PeriodExpr::Sub(Box::new(lhs), Box::new(term)),
                });
                if (c == '+' || c == '-') && last {
                    return Err(KozoError::InvalidInput(format!("malformed period: {}", input)));
                }
                op = c;
                start = pos + c.len_utf8();
            }
        }
        expr.ok_or_else(|| KozoError::InvalidInput(format!("malformed period: {}", input)))
    }

    /// 用给定的单工况取值函数求组合值
    pub fn eval<F: Fn(&str) -> f64 + Copy>(&self, value: F) -> f64 {
        match self {
            PeriodExpr::Case(name) => value(name),
            PeriodExpr::Add(a, b) => a.eval(value) + b.eval(value),
            PeriodExpr::Sub(a, b) => a.eval(value) - b.eval(value),
        }
    }

    /// 表达式涉及的全部单工况
    pub fn cases(&self) -> Vec<&str> {
        match self {
            PeriodExpr::Case(name) => vec![name.as_str()],
            PeriodExpr::Add(a, b) | PeriodExpr::Sub(a, b) => {
                let mut v = a.cases();
                v.extend(b.cases());
                v
            }
        }
    }
}

impl std::str::FromStr for PeriodExpr {
    type Err = KozoError;

    fn from_str(s: &str) -> Result<Self> {
        PeriodExpr::parse(s)
    }
}

impl Element {
    /// 单工况应力；`nnum` 先按节点号查找，找不到时视为端点序号
    fn single_stress(&self, period: &str, nnum: NodeId, index: usize) -> f64 {
        let Ok(line) = self.line("return_stress") else {
            return 0.0;
        };
        let Some(table) = line.stress.get(period) else {
            return 0.0;
        };
        if let Some(v) = table.get(&nnum) {
            return v[index];
        }
        self.enodes
            .get(nnum as usize)
            .and_then(|n| table.get(n))
            .map(|v| v[index])
            .unwrap_or(0.0)
    }

    /// 组合工况下端点 `nnum` 的第 `index` 个应力分量
    pub fn return_stress(&self, period: &PeriodExpr, nnum: NodeId, index: usize) -> Result<f64> {
        self.line("return_stress")?;
        if index >= 6 {
            return Err(KozoError::InvalidInput(format!("stress index {}", index)));
        }
        Ok(period.eval(|case| self.single_stress(case, nnum, index)))
    }

    pub fn return_stress_str(&self, period: &str, nnum: NodeId, index: usize) -> Result<f64> {
        self.return_stress(&PeriodExpr::parse(period)?, nnum, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Etype;

    fn stressed() -> Element {
        let mut e = Element::new_line(1, [10, 20], 101, Etype::Column).unwrap();
        e.set_stress("L", 10, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        e.set_stress("X", 10, [10.0, 20.0, 30.0, 40.0, 50.0, 60.0]).unwrap();
        e.set_stress("Y", 10, [0.5, 0.5, 0.5, 0.5, 0.5, 0.5]).unwrap();
        e.set_stress("L", 20, [-1.0; 6]).unwrap();
        e
    }

    #[test]
    fn test_parse() {
        let expr = PeriodExpr::parse("l+x-y").unwrap();
        assert_eq!(expr.cases(), vec!["L", "X", "Y"]);
        assert!(PeriodExpr::parse("").is_err());
        assert!(PeriodExpr::parse("L+").is_err());
        assert!(PeriodExpr::parse("L++X").is_err());
        assert!(PeriodExpr::parse("-L").is_err());
        assert_eq!(PeriodExpr::parse("L").unwrap(), PeriodExpr::Case("L".into()));
    }

    #[test]
    fn test_combination_law() {
        let e = stressed();
        for k in 0..6 {
            let combined = e.return_stress_str("L+X-Y", 10, k).unwrap();
            let expected = e.return_stress_str("L", 10, k).unwrap()
                + e.return_stress_str("X", 10, k).unwrap()
                - e.return_stress_str("Y", 10, k).unwrap();
            assert!((combined - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_end_index_fallback() {
        let e = stressed();
        assert_eq!(e.return_stress_str("L", 1, 0).unwrap(), -1.0);
        assert_eq!(e.return_stress_str("L", 0, 2).unwrap(), 3.0);
        assert_eq!(e.return_stress_str("Z", 10, 0).unwrap(), 0.0);
        assert!(e.return_stress_str("L", 10, 6).is_err());
    }
}
