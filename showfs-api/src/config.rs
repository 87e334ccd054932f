//! API 层配置
//!
//! 每个会话持有自己的配置，没有全局单例。

use showfs_config::{MetaLayout, ShowfsConfig};
use std::path::PathBuf;

/// Session configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Directory relative targets are resolved against (absolute)
    pub working_dir: PathBuf,
    /// Sidecar naming
    pub layout: MetaLayout,
}

impl SessionConfig {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            layout: MetaLayout::default(),
        }
    }

    /// Take the layout from a loaded configuration file
    pub fn from_config(config: &ShowfsConfig, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            layout: config.layout.clone(),
        }
    }

    pub fn with_layout(mut self, layout: MetaLayout) -> Self {
        self.layout = layout;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new("/")
    }
}
