//! CLI 日志系统初始化
//!
//! 基于 `tracing-subscriber` 实现按组件的日志控制。
//! 日志写到 stderr，stdout 只留给 JSON 结果。

use crate::config::LogConfig;
use clap::ValueEnum;
use showfs_config::Component;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{
    filter::Targets, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry,
};

/// 日志输出格式
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// 彩色格式化（开发使用）
    Pretty,
    /// 紧凑格式
    Compact,
    /// JSON 格式（工具集成）
    Json,
}

/// 按组件构建过滤器
pub fn build_targets(log_config: &LogConfig) -> Targets {
    Component::ALL
        .iter()
        .fold(Targets::new().with_default(log_config.global), |targets, c| {
            targets.with_target(c.target(), log_config.level_for(*c))
        })
}

/// 使用指定格式和日志配置初始化日志系统
///
/// 指定 `file` 时同时追加写入该文件（无颜色）。
pub fn init_with_file<P: AsRef<Path>>(
    log_config: &LogConfig,
    format: LogFormat,
    file: Option<P>,
) -> io::Result<()> {
    let targets = build_targets(log_config);

    let file_layer = match file {
        Some(path) => {
            let handle = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(handle))
                    .with_filter(targets.clone()),
            )
        }
        None => None,
    };

    let console_layer = create_format_layer(format, io::stderr).with_filter(targets);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
    Ok(())
}

/// Create formatter layer based on format
fn create_format_layer<W, F>(format: LogFormat, make_writer: F) -> Box<dyn Layer<Registry> + Send + Sync>
where
    W: io::Write + Send + Sync + 'static,
    F: Fn() -> W + Send + Sync + 'static,
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(true)
            .with_timer(fmt::time::time())
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(false)
            .without_time()
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_timer(fmt::time::time())
            .with_writer(make_writer)
            .boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;
    use tracing::Level;

    #[test]
    fn test_targets_per_component() {
        let log_config = LogConfig {
            global: LevelFilter::WARN,
            cache: Some(LevelFilter::TRACE),
            ..LogConfig::default()
        };
        let targets = build_targets(&log_config);
        assert!(targets.would_enable("showfs::cache", &Level::TRACE));
        assert!(!targets.would_enable("showfs::proto", &Level::INFO));
        assert!(targets.would_enable("showfs::proto", &Level::WARN));
        assert!(!targets.would_enable("other::crate", &Level::DEBUG));
    }
}
