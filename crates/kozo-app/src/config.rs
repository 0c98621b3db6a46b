//! 驱动程序配置

use anyhow::{Context, Result};
use kozo_core::config::KernelConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 未在命令行给出路径时读取的环境变量
pub const CONFIG_ENV: &str = "KOZO_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// tracing 的最高级别，如 "INFO"、"DEBUG"
    pub log_level: String,
    pub kernel: KernelConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "INFO".to_string(),
            kernel: KernelConfig::default(),
        }
    }
}

impl AppConfig {
    /// 命令行第一个参数，其次是环境变量
    pub fn locate(arg: Option<String>) -> Option<PathBuf> {
        arg.or_else(|| std::env::var(CONFIG_ENV).ok())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
    }

    /// 文件不存在时返回 None
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(Some(config))
    }

    pub fn level(&self) -> Result<tracing::Level> {
        self.log_level
            .parse()
            .with_context(|| format!("invalid log_level: {}", self.log_level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config() {
        let cfg: AppConfig =
            serde_json::from_str(r#"{"log_level": "debug", "kernel": {"eps": 0.01}}"#).unwrap();
        assert_eq!(cfg.level().unwrap(), tracing::Level::DEBUG);
        assert_eq!(cfg.kernel.eps, 0.01);
        assert_eq!(cfg.kernel.axis_clamp, 1e-3);
    }

    #[test]
    fn test_missing_file_and_bad_level() {
        assert_eq!(
            AppConfig::load(Path::new("/nonexistent/kozo.json")).unwrap(),
            None
        );
        let cfg = AppConfig {
            log_level: "loud".into(),
            ..AppConfig::default()
        };
        assert!(cfg.level().is_err());
    }

    #[test]
    fn test_locate_prefers_argument() {
        assert_eq!(
            AppConfig::locate(Some("a.json".into())),
            Some(PathBuf::from("a.json"))
        );
    }
}
