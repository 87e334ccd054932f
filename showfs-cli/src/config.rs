//! CLI 配置
//!
//! 配置文件中的日志设置与命令行参数的组合

use showfs_config::{Component, LogLevel, LoggingConfig, ShowfsConfig};
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;

/// 未指定配置文件时查找的默认文件名
pub const DEFAULT_CONFIG_FILE: &str = "showfs.json";

/// CLI 日志配置
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    pub global: LevelFilter,
    pub resolver: Option<LevelFilter>,
    pub cache: Option<LevelFilter>,
    pub proto: Option<LevelFilter>,
    pub expr: Option<LevelFilter>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            global: LevelFilter::WARN,
            resolver: None,
            cache: None,
            proto: None,
            expr: None,
        }
    }
}

impl LogConfig {
    /// Build from the config file section; `level` from the command line wins
    /// over the file's global level.
    pub fn from_logging(logging: &LoggingConfig, level: Option<LevelFilter>) -> Self {
        let defaults = Self::default();
        Self {
            global: level
                .or_else(|| logging.level.map(to_filter))
                .unwrap_or(defaults.global),
            resolver: logging.level_for(Component::Resolver).map(to_filter),
            cache: logging.level_for(Component::Cache).map(to_filter),
            proto: logging.level_for(Component::Proto).map(to_filter),
            expr: logging.level_for(Component::Expr).map(to_filter),
        }
    }

    /// Get log level for a specific component
    pub fn level_for(&self, component: Component) -> LevelFilter {
        let level = match component {
            Component::Resolver => self.resolver,
            Component::Cache => self.cache,
            Component::Proto => self.proto,
            Component::Expr => self.expr,
            Component::Api | Component::Cli => None,
        };
        level.unwrap_or(self.global)
    }
}

fn to_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Silent => LevelFilter::OFF,
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    }
}

/// Parse log level string
pub fn parse_log_level(s: &str) -> Option<LevelFilter> {
    match s.to_lowercase().as_str() {
        "silent" | "off" => Some(LevelFilter::OFF),
        "error" => Some(LevelFilter::ERROR),
        "warn" => Some(LevelFilter::WARN),
        "info" => Some(LevelFilter::INFO),
        "debug" => Some(LevelFilter::DEBUG),
        "trace" => Some(LevelFilter::TRACE),
        _ => None,
    }
}

/// Read the configuration file.
///
/// An explicit path must exist; otherwise `showfs.json` in `dir` is used
/// when present, and the defaults when not.
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<ShowfsConfig, String> {
    let path: PathBuf = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let fallback = dir.join(DEFAULT_CONFIG_FILE);
            if !fallback.is_file() {
                return Ok(ShowfsConfig::default());
            }
            fallback
        }
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|e| format!("无法读取 '{}': {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("解析 '{}' 失败: {}", path.display(), e))
}
