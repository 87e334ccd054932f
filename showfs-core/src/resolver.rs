//! Target resolution
//!
//! Targets come in three flavours:
//! - `//rel/path` show-absolute, relative to the show root of the current directory
//! - `/abs/path` file-system absolute
//! - `rel/path` relative to the session's working directory
//!
//! Canonicalization is purely lexical; symlinks are not followed.

use crate::cache::{NodeId, ObjectCache, LOG_RESOLVER};
use crate::error::{CoreError, CoreResult};
use std::path::{Component, Path, PathBuf};
use tracing::trace;

/// Lexically normalize an absolute path (`.` dropped, `..` popped, never above `/`).
pub fn clean_path(path: &Path) -> CoreResult<PathBuf> {
    if !path.has_root() {
        return Err(CoreError::InvalidTarget {
            target: path.display().to_string(),
            reason: "path is not absolute".to_string(),
        });
    }

    let mut out = PathBuf::from("/");
    for component in path.components() {
        match component {
            Component::RootDir | Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(name) => out.push(name),
            Component::Prefix(_) => {
                return Err(CoreError::InvalidTarget {
                    target: path.display().to_string(),
                    reason: "path prefixes are not supported".to_string(),
                })
            }
        }
    }
    Ok(out)
}

/// `//`-notation of `path` relative to `show_root`
pub(crate) fn relative_to_show(show_root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(show_root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    Some(format!("//{}", parts.join("/")))
}

impl ObjectCache {
    /// Resolve a target string to a canonical path.
    ///
    /// Show-absolute targets are resolved against the show of `current_dir`.
    pub fn resolve_target(&self, target: &str, current_dir: NodeId) -> CoreResult<PathBuf> {
        let working_dir = self.working_dir().to_path_buf();
        let resolved = self.resolve_from(target, current_dir, &working_dir)?;
        trace!(target: LOG_RESOLVER, input = target, resolved = %resolved.display(), "resolved target");
        Ok(resolved)
    }

    /// Resolve a stored reference (usually `//`-relative) against `node`.
    ///
    /// Plain relative references are taken relative to the node's directory.
    pub fn resolve_reference(&self, reference: &str, node: NodeId) -> CoreResult<PathBuf> {
        let base = {
            let n = self.node(node);
            if n.is_dir() {
                n.path.clone()
            } else {
                n.path.parent().map(Path::to_path_buf).unwrap_or_default()
            }
        };
        self.resolve_from(reference, node, &base)
    }

    fn resolve_from(&self, target: &str, anchor: NodeId, base: &Path) -> CoreResult<PathBuf> {
        if target.starts_with("//") {
            let show = self.show(anchor).ok_or_else(|| CoreError::UnresolvedShow {
                path: self.node(anchor).path.clone(),
            })?;
            let rest = target.trim_start_matches('/');
            return clean_path(&self.node(show).path.join(rest));
        }
        if target.starts_with('/') {
            return clean_path(Path::new(target));
        }
        clean_path(&base.join(target))
    }

    /// Convert a path inside a show into `//rel/path` notation.
    ///
    /// Materializes the path. The show root itself becomes `//`.
    pub fn show_relative(&mut self, path: &Path) -> CoreResult<String> {
        let id = self.materialize(path)?;
        let node = self.node(id);
        let show = node.show.ok_or_else(|| CoreError::UnresolvedShow {
            path: node.path.clone(),
        })?;
        relative_to_show(&self.node(show).path, &node.path).ok_or_else(|| {
            CoreError::UnresolvedShow {
                path: node.path.clone(),
            }
        })
    }
}
