//! Showfs Config - Pure configuration data structures
//!
//! This crate contains only data structures, no logic or global state.
//! It serves as the shared configuration vocabulary across all showfs crates.

use serde::Deserialize;

/// On-disk naming conventions for metadata sidecars and prototypes.
///
/// A directory keeps its record at `<dir>/<meta_dir_name>/<dir_record_name>`,
/// a file keeps it at `<parent>/<meta_dir_name>/<file name><record_extension>`.
/// Prototypes live under `<dir>/<meta_dir_name>/<proto_dir_name>/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MetaLayout {
    /// Name of the per-directory metadata directory
    pub meta_dir_name: String,
    /// Record name used for the directory itself
    pub dir_record_name: String,
    /// Extension appended to a file name to get its record name
    pub record_extension: String,
    /// Name of the prototype directory inside the metadata directory
    pub proto_dir_name: String,
}

/// Log level names accepted in configuration files
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Silent,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Logging section of a configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Global level, used for every component without an override
    pub level: Option<LogLevel>,
    /// Level override for the path resolver
    pub resolver: Option<LogLevel>,
    /// Level override for the object cache
    pub cache: Option<LogLevel>,
    /// Level override for the prototype resolver
    pub proto: Option<LogLevel>,
    /// Level override for expression evaluation
    pub expr: Option<LogLevel>,
}

/// Top-level configuration file (`showfs.json`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ShowfsConfig {
    pub layout: MetaLayout,
    pub logging: LoggingConfig,
}

/// Components that emit logs under their own target
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Component {
    Resolver,
    Cache,
    Proto,
    Expr,
    Api,
    Cli,
}

impl Component {
    /// All components, in pipeline order
    pub const ALL: [Component; 6] = [
        Component::Resolver,
        Component::Cache,
        Component::Proto,
        Component::Expr,
        Component::Api,
        Component::Cli,
    ];

    /// Get the string name of the component
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Resolver => "resolver",
            Component::Cache => "cache",
            Component::Proto => "proto",
            Component::Expr => "expr",
            Component::Api => "api",
            Component::Cli => "cli",
        }
    }

    /// Get the log target name for this component
    pub fn target(&self) -> String {
        format!("showfs::{}", self.as_str())
    }
}

impl Default for MetaLayout {
    fn default() -> Self {
        Self {
            meta_dir_name: String::from(".meta"),
            dir_record_name: String::from("_"),
            record_extension: String::from("._"),
            proto_dir_name: String::from("proto"),
        }
    }
}

impl LoggingConfig {
    /// Get the configured override for a component (if any)
    pub fn level_for(&self, component: Component) -> Option<LogLevel> {
        match component {
            Component::Resolver => self.resolver,
            Component::Cache => self.cache,
            Component::Proto => self.proto,
            Component::Expr => self.expr,
            Component::Api | Component::Cli => None,
        }
    }
}
