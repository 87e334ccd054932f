//! Showfs Core - object cache, target resolution, prototypes and expressions
//!
//! All IO goes through a [`showfs_vfs::VirtualFileSystem`] owned by the
//! [`ObjectCache`]; no terminal output, no global state.
//!
//! Configuration is passed explicitly via parameters, not via global state.

pub mod cache;
pub mod error;
pub mod expr;
pub mod meta;
pub mod parser;
pub mod proto;
pub mod resolver;

// Re-export common types
pub use cache::{FileInfo, Node, NodeId, ObjectCache};
pub use error::{CoreError, CoreResult};
pub use expr::{Expression, MetaContext, MetaNode, PathSelector, SegmentKind, Value};
pub use meta::{Contract, ImgInfo, PersistentMeta, Seq};
pub use parser::{parse_expression, ParseError, ParseErrorKind};
pub use proto::proto_candidates;
pub use resolver::clean_path;

// Re-export config types from showfs-config
pub use showfs_config::MetaLayout;
