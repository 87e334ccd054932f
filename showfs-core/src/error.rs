//! 核心错误类型
//!
//! 所有解析器、缓存和求值操作都返回 `CoreResult`，不会静默替换默认值。

use showfs_vfs::VfsError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// `//` used from a directory that is not inside any show
    #[error("Couldn't resolve '//': '{}' is not inside a show", path.display())]
    UnresolvedShow { path: PathBuf },

    /// Target string that cannot name a file-system location
    #[error("Invalid target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    /// Meta selector identifier missing, or a non-map reached mid-chain
    #[error("Couldn't find key in meta: {name}")]
    FieldNotFound { name: String },

    /// Arithmetic on operand types the operator does not support
    #[error("Unsupported operand types for '{op}': {left} and {right}")]
    OperandMismatch {
        op: char,
        left: &'static str,
        right: &'static str,
    },

    /// Meta selector attached to a generate-only expression
    #[error("Meta selector is not allowed when generating targets: {expr}")]
    GeneratorMetaNotAllowed { expr: String },

    /// Generation produced nothing where at least one target was required
    #[error("Pattern returned nothing: {expr}")]
    EmptyGeneration { expr: String },

    /// No prototype matched by any naming strategy
    #[error("No appropriate proto for: {name}")]
    ProtoNotFound { name: String },

    /// Operation needs a show but the object lies outside of one
    #[error("Prototyping not supported outside shows: '{}'", path.display())]
    NoShow { path: PathBuf },

    /// Underlying file-system failure
    #[error("IO failure on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: VfsError,
    },

    /// Sidecar record that cannot be decoded
    #[error("Malformed meta record '{}': {message}", path.display())]
    MetaDecode { path: PathBuf, message: String },
}

impl CoreError {
    /// Wrap a VFS error for `path`
    pub fn io(path: &Path, source: VfsError) -> Self {
        CoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Whether this error means the file-system object does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::Io { source, .. } if source.is_not_found())
    }

    /// Short machine-readable name of the error kind
    pub fn kind_name(&self) -> &'static str {
        match self {
            CoreError::UnresolvedShow { .. } => "UnresolvedShow",
            CoreError::InvalidTarget { .. } => "InvalidTarget",
            CoreError::FieldNotFound { .. } => "FieldNotFound",
            CoreError::OperandMismatch { .. } => "OperandMismatch",
            CoreError::GeneratorMetaNotAllowed { .. } => "GeneratorMetaNotAllowed",
            CoreError::EmptyGeneration { .. } => "EmptyGeneration",
            CoreError::ProtoNotFound { .. } => "ProtoNotFound",
            CoreError::NoShow { .. } => "NoShow",
            CoreError::Io { .. } => "IOFailure",
            CoreError::MetaDecode { .. } => "MetaDecode",
        }
    }
}
