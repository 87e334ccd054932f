//! API 类型定义
//!
//! 批量操作的输入输出类型。

use crate::error::{ApiError, ErrorReport};
use serde::Serialize;
use std::path::PathBuf;

/// Kind of object `create_objects` makes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Dir,
    File,
}

/// 单个目标的失败记录
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFailure {
    pub path: PathBuf,
    pub error: ErrorReport,
}

/// 批量操作结果
///
/// 单个目标失败不会中断批处理，失败记录在 `failed` 中。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    /// 新建或更新的目标
    pub created: Vec<PathBuf>,
    /// 已存在而跳过的目标
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn fail(&mut self, path: PathBuf, error: &ApiError) {
        self.failed.push(BatchFailure {
            path,
            error: error.to_report(),
        });
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}
