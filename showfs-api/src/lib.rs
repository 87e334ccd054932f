//! Showfs API - session orchestration layer
//!
//! Provides the operations the CLI (or any other front end) needs:
//! - Expression queries from a working directory
//! - Metadata edits, show creation and contract patterns
//! - Prototype lookup, listing and linking
//! - Unified error reports (`ApiError` / `ErrorReport`)
//!
//! A [`Session`] owns its [`ObjectCache`]; there is no global state.

pub mod config;
pub mod error;
pub mod types;

pub use config::SessionConfig;
pub use error::{ApiError, ApiResult, ErrorReport};
pub use types::{BatchFailure, BatchReport, ObjectKind};

// Re-export core types
pub use showfs_config;
pub use showfs_core::{CoreError, Expression, NodeId, ObjectCache, ParseError, Value};

use showfs_core::Contract;
use showfs_vfs::{NativeFileSystem, VirtualFileSystem};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const LOG_API: &str = "showfs::api";

/// Split a `key:value` assignment at the first colon
pub fn parse_assignment(text: &str) -> ApiResult<(&str, &str)> {
    match text.split_once(':') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => Err(ApiError::InvalidArgument(format!(
            "expected key:value, got '{text}'"
        ))),
    }
}

/// A working session over one file system
#[derive(Debug)]
pub struct Session {
    cache: ObjectCache,
}

impl Session {
    pub fn new(vfs: Box<dyn VirtualFileSystem>, config: SessionConfig) -> ApiResult<Self> {
        let cache = ObjectCache::new(vfs, config.layout, &config.working_dir)?;
        Ok(Self { cache })
    }

    /// Session on the real file system
    pub fn native(config: SessionConfig) -> ApiResult<Self> {
        Self::new(Box::new(NativeFileSystem::new()), config)
    }

    pub fn cache(&self) -> &ObjectCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut ObjectCache {
        &mut self.cache
    }

    fn resolve(&mut self, target: &str) -> ApiResult<NodeId> {
        let cwd = self.cache.working_node()?;
        let path = self.cache.resolve_target(target, cwd)?;
        Ok(self.cache.materialize(&path)?)
    }

    fn generate(&mut self, expr: &str) -> ApiResult<Vec<PathBuf>> {
        let expression = Expression::parse(expr)?;
        let cwd = self.cache.working_node()?;
        Ok(expression.generate(&self.cache, cwd)?)
    }

    /// Evaluate an expression from the working directory
    pub fn get(&mut self, expr: &str) -> ApiResult<Value> {
        let mut expression = Expression::parse(expr)?;
        let cwd = self.cache.working_node()?;
        let value = expression.eval(&mut self.cache, cwd)?;
        debug!(target: LOG_API, expr, "get");
        Ok(value)
    }

    /// Set one user-data key on `target`; an empty value removes the key
    pub fn set_meta(&mut self, target: &str, key: &str, value: &str) -> ApiResult<()> {
        let id = self.resolve(target)?;
        {
            let meta = &mut self.cache.node_mut(id).meta;
            if value.is_empty() {
                meta.remove_user(key);
            } else {
                meta.set_user(key, value);
            }
        }
        self.cache.sync_meta(id)?;
        info!(target: LOG_API, target_path = %self.cache.node(id).path.display(), key, "meta updated");
        Ok(())
    }

    /// File-system path of the show containing `target`
    pub fn show_root(&mut self, target: &str) -> ApiResult<PathBuf> {
        let id = self.resolve(target)?;
        let show = self
            .cache
            .show(id)
            .ok_or_else(|| CoreError::UnresolvedShow {
                path: self.cache.node(id).path.clone(),
            })?;
        Ok(self.cache.node(show).path.clone())
    }

    /// Stored proto reference of `target`
    pub fn proto_of(&mut self, target: &str) -> ApiResult<Option<String>> {
        let id = self.resolve(target)?;
        Ok(self.cache.node(id).meta.proto.clone())
    }

    /// Prototypes visible from `target`, name to `//`-reference
    pub fn list_protos(&mut self, target: &str) -> ApiResult<BTreeMap<String, String>> {
        let id = self.resolve(target)?;
        Ok(self.cache.list_protos(id)?)
    }

    /// Link `target` to the nearest prototype called `name`.
    ///
    /// The search starts at the target's parent. Returns the prototype path.
    pub fn link_proto(&mut self, target: &str, name: &str) -> ApiResult<PathBuf> {
        let id = self.resolve(target)?;
        let start = self.cache.parent(id).unwrap_or(id);
        let proto = self.cache.find_proto(start, name)?;
        self.cache.set_proto(id, &proto)?;
        Ok(proto)
    }

    /// Create every object `expr` generates that does not exist yet.
    ///
    /// New objects are linked to the explicit prototype `proto`, or inside a
    /// show to whatever prototype matches their name.
    pub fn create_objects(
        &mut self,
        expr: &str,
        kind: ObjectKind,
        proto: Option<&str>,
    ) -> ApiResult<BatchReport> {
        let candidates = self.generate(expr)?;
        let mut report = BatchReport::default();
        for path in candidates {
            if self.cache.vfs().exists(&path) {
                report.skipped.push(path);
                continue;
            }
            match self.create_object(&path, kind, proto) {
                Ok(()) => report.created.push(path),
                Err(e) => {
                    warn!(target: LOG_API, path = %path.display(), error = %e, "create failed");
                    report.fail(path, &e);
                }
            }
        }
        info!(
            target: LOG_API,
            expr,
            created = report.created.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "create objects"
        );
        Ok(report)
    }

    fn create_object(&mut self, path: &Path, kind: ObjectKind, proto: Option<&str>) -> ApiResult<()> {
        let created = match kind {
            ObjectKind::Dir => self.cache.vfs().create_dir(path),
            ObjectKind::File => self.cache.vfs().write_file(path, &[]),
        };
        created.map_err(|e| CoreError::io(path, e))?;

        let id = self.cache.materialize(path)?;
        let start = self.cache.parent(id).unwrap_or(id);
        let proto_path = match proto {
            Some(name) => Some(self.cache.find_proto(start, name)?),
            None if self.cache.show(id).is_some() => {
                let name = self.cache.node(id).file_info.name.clone();
                match self.cache.find_proto_for_target(start, &name) {
                    Ok(found) => Some(found),
                    Err(CoreError::ProtoNotFound { .. }) => None,
                    Err(e) => return Err(e.into()),
                }
            }
            None => None,
        };

        if let Some(proto_path) = proto_path {
            self.cache.set_proto(id, &proto_path)?;
        }
        Ok(())
    }

    /// Create a directory for every generated path and flag it as show root
    pub fn create_shows(&mut self, expr: &str) -> ApiResult<BatchReport> {
        let candidates = self.generate(expr)?;
        if candidates.is_empty() {
            return Err(CoreError::EmptyGeneration {
                expr: expr.to_string(),
            }
            .into());
        }

        let mut report = BatchReport::default();
        for path in candidates {
            if self.cache.vfs().exists(&path) {
                report.skipped.push(path);
                continue;
            }
            match self.create_show(&path) {
                Ok(()) => report.created.push(path),
                Err(e) => {
                    warn!(target: LOG_API, path = %path.display(), error = %e, "show creation failed");
                    report.fail(path, &e);
                }
            }
        }
        Ok(report)
    }

    fn create_show(&mut self, path: &Path) -> ApiResult<()> {
        self.cache
            .vfs()
            .create_dir(path)
            .map_err(|e| CoreError::io(path, e))?;
        let id = self.cache.materialize(path)?;
        self.cache.mark_show_root(id);
        self.cache.sync_meta(id)?;
        info!(target: LOG_API, show = %path.display(), "created show");
        Ok(())
    }

    /// Store `pattern` as the contract of every generated target
    pub fn set_contract_pattern(&mut self, expr: &str, pattern: &str) -> ApiResult<BatchReport> {
        let candidates = self.generate(expr)?;
        if candidates.is_empty() {
            return Err(CoreError::EmptyGeneration {
                expr: expr.to_string(),
            }
            .into());
        }

        let mut report = BatchReport::default();
        for path in candidates {
            match self.set_contract(&path, pattern) {
                Ok(()) => report.created.push(path),
                Err(e) => report.fail(path, &e),
            }
        }
        Ok(report)
    }

    fn set_contract(&mut self, path: &Path, pattern: &str) -> ApiResult<()> {
        let id = self.cache.materialize(path)?;
        self.cache.node_mut(id).meta.contract = Some(Contract {
            pattern: pattern.to_string(),
        });
        self.cache.sync_meta(id)?;
        Ok(())
    }
}
