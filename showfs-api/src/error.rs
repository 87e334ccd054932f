//! API 错误类型
//!
//! 提供统一的错误类型和结构化错误报告。

use serde::Serialize;
use showfs_core::{CoreError, ParseError};
use std::path::PathBuf;
use thiserror::Error;

/// Showfs 错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// 表达式语法错误（结构化）
    #[error("{0}")]
    Parse(#[from] ParseError),

    /// 解析、求值、原型或 IO 错误
    #[error("{0}")]
    Core(#[from] CoreError),

    /// 调用参数错误（例如 `key:value` 缺少冒号）
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// 获取错误列号（只有语法错误有）
    pub fn column(&self) -> Option<usize> {
        match self {
            ApiError::Parse(e) => e.column(),
            _ => None,
        }
    }

    /// 获取错误阶段名称
    pub fn phase(&self) -> &'static str {
        match self {
            ApiError::Parse(_) => "parse",
            ApiError::Core(e) => match e {
                CoreError::UnresolvedShow { .. } | CoreError::InvalidTarget { .. } => "resolve",
                CoreError::FieldNotFound { .. }
                | CoreError::OperandMismatch { .. }
                | CoreError::GeneratorMetaNotAllowed { .. }
                | CoreError::EmptyGeneration { .. } => "eval",
                CoreError::ProtoNotFound { .. } | CoreError::NoShow { .. } => "proto",
                CoreError::Io { .. } | CoreError::MetaDecode { .. } => "io",
            },
            ApiError::InvalidArgument(_) => "api",
        }
    }

    /// 错误涉及的文件系统路径（如果有）
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ApiError::Core(
                CoreError::UnresolvedShow { path }
                | CoreError::NoShow { path }
                | CoreError::Io { path, .. }
                | CoreError::MetaDecode { path, .. },
            ) => Some(path),
            _ => None,
        }
    }

    /// 转换为结构化错误报告
    ///
    /// CLI 可以直接打印，上层应用可以序列化为 JSON。
    pub fn to_report(&self) -> ErrorReport {
        let error_kind = match self {
            ApiError::Parse(e) => e.kind.name().to_string(),
            ApiError::Core(e) => e.kind_name().to_string(),
            ApiError::InvalidArgument(_) => "InvalidArgument".to_string(),
        };
        ErrorReport {
            phase: self.phase(),
            column: self.column(),
            error_kind,
            message: self.to_string(),
            path: self.path().map(|p| p.display().to_string()),
        }
    }
}

/// 结构化错误报告
///
/// 上层应用（CLI、脚本）可以根据自己的需求格式化。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    /// 错误阶段: parse, resolve, eval, proto, io, api
    pub phase: &'static str,
    /// 表达式中的列号（1-based，如果有）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    /// 错误类型（可用于程序化处理）
    pub error_kind: String,
    /// 人类可读的错误消息
    pub message: String,
    /// 相关路径（如果有）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl std::fmt::Display for ErrorReport {
    /// 默认的 CLI 友好格式
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.column {
            Some(col) => write!(f, "[col {}] {} error: {}", col, self.phase, self.message),
            None => write!(f, "[{}] {} error: {}", self.phase, self.phase, self.message),
        }
    }
}

impl ErrorReport {
    /// 转换为 JSON 格式
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{{\"message\":{:?}}}", self.message))
    }

    /// 简洁格式（适合终端）
    pub fn to_short(&self) -> String {
        format!("{}: {}", self.phase, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use showfs_core::ParseErrorKind;

    #[test]
    fn test_parse_error_report() {
        let err = ApiError::Parse(ParseError::at(ParseErrorKind::MissingRightParen, 7));
        assert_eq!(err.column(), Some(7));
        assert_eq!(err.phase(), "parse");

        let report = err.to_report();
        assert_eq!(report.error_kind, "MissingRightParen");
        assert!(report.to_string().contains("[col 7]"));
    }

    #[test]
    fn test_unexpected_token_kind_name() {
        let err = ApiError::Parse(ParseError::at(
            ParseErrorKind::UnexpectedToken {
                found: ")".to_string(),
                expected: vec![],
            },
            3,
        ));
        assert_eq!(err.to_report().error_kind, "UnexpectedToken");
    }

    #[test]
    fn test_core_error_phases() {
        let err = ApiError::from(CoreError::FieldNotFound {
            name: "width".to_string(),
        });
        assert_eq!(err.phase(), "eval");
        assert_eq!(err.column(), None);

        let err = ApiError::from(CoreError::NoShow {
            path: PathBuf::from("/tmp"),
        });
        assert_eq!(err.phase(), "proto");
        assert_eq!(err.to_report().path.as_deref(), Some("/tmp"));

        let err = ApiError::InvalidArgument("width".to_string());
        assert_eq!(err.phase(), "api");
    }

    #[test]
    fn test_report_display_without_column() {
        let report = ApiError::from(CoreError::EmptyGeneration {
            expr: "*/x".to_string(),
        })
        .to_report();
        assert_eq!(report.error_kind, "EmptyGeneration");
        let display = report.to_string();
        assert!(display.contains("[eval]"));
        assert!(display.contains("Pattern returned nothing: */x"));
    }

    #[test]
    fn test_report_to_json() {
        let report = ApiError::from(CoreError::ProtoNotFound {
            name: "Default".to_string(),
        })
        .to_report();
        let json: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();
        assert_eq!(json["phase"], "proto");
        assert_eq!(json["error_kind"], "ProtoNotFound");
        assert!(json.get("column").is_none());
    }
}
