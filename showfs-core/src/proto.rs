//! Prototype lookup and instance linking.
//!
//! Prototypes live in `<dir>/.meta/proto/<name>` at any level between an
//! object and its show root. Nearer directories shadow farther ones.

use crate::cache::{NodeId, ObjectCache, LOG_PROTO};
use crate::error::{CoreError, CoreResult};
use crate::resolver::relative_to_show;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Names a target may match a prototype by, in precedence order:
/// exact name, prefix up to and including the first `_`, `_<extension>`.
///
/// The extension is whatever follows the last `.`, so dot-files count too
/// (`.nuke` gives `_nuke`).
pub fn proto_candidates(target_name: &str) -> Vec<String> {
    let mut candidates = vec![target_name.to_string()];
    if let Some(idx) = target_name.find('_') {
        candidates.push(target_name[..=idx].to_string());
    }
    if let Some((_, ext)) = target_name.rsplit_once('.') {
        if !ext.is_empty() {
            candidates.push(format!("_{ext}"));
        }
    }
    candidates.dedup();
    candidates
}

impl ObjectCache {
    fn proto_dir_of(&self, dir: &Path) -> PathBuf {
        dir.join(&self.layout().meta_dir_name)
            .join(&self.layout().proto_dir_name)
    }

    /// Every prototype directory from `node` up to its show root, nearest first.
    ///
    /// Outside a show the walk continues to the file-system root.
    pub fn find_proto_dirs(&self, node: NodeId) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            let n = self.node(id);
            if n.is_dir() {
                let candidate = self.proto_dir_of(&n.path);
                if self.vfs().is_dir(&candidate) {
                    dirs.push(candidate);
                }
            }
            if n.show == Some(id) {
                break;
            }
            current = n.parent;
        }
        dirs
    }

    /// Nearest prototype called exactly `name`
    pub fn find_proto(&self, node: NodeId, name: &str) -> CoreResult<PathBuf> {
        for dir in self.find_proto_dirs(node) {
            let candidate = dir.join(name);
            if self.vfs().exists(&candidate) {
                debug!(target: LOG_PROTO, proto_name = name, proto = %candidate.display(), "found proto");
                return Ok(candidate);
            }
        }
        Err(CoreError::ProtoNotFound {
            name: name.to_string(),
        })
    }

    /// Nearest prototype for a new object called `target_name`.
    ///
    /// Each level is checked for all candidate names before moving up.
    pub fn find_proto_for_target(&self, node: NodeId, target_name: &str) -> CoreResult<PathBuf> {
        let candidates = proto_candidates(target_name);
        for dir in self.find_proto_dirs(node) {
            for name in &candidates {
                let candidate = dir.join(name);
                if self.vfs().exists(&candidate) {
                    debug!(
                        target: LOG_PROTO,
                        target_name,
                        proto = %candidate.display(),
                        "found proto for target"
                    );
                    return Ok(candidate);
                }
            }
        }
        Err(CoreError::ProtoNotFound {
            name: target_name.to_string(),
        })
    }

    /// Link `instance` to the prototype at `proto_path`.
    ///
    /// Unlinks from the previous prototype first. Each of the three records
    /// is persisted on its own; a failure leaves earlier writes in place.
    pub fn set_proto(&mut self, instance: NodeId, proto_path: &Path) -> CoreResult<()> {
        let proto_ref = self.show_relative(proto_path)?;
        let instance_path = self.node(instance).path.clone();
        let instance_ref = self.show_relative(&instance_path)?;

        if let Some(old) = self.node(instance).meta.proto.clone() {
            match self
                .resolve_reference(&old, instance)
                .and_then(|path| self.materialize(&path))
            {
                Ok(old_id) => {
                    self.node_mut(old_id).meta.remove_instance(&instance_ref);
                    self.sync_meta(old_id)?;
                }
                Err(e) if e.is_not_found() => {
                    warn!(target: LOG_PROTO, old_proto = %old, "previous proto is gone, skipping unlink");
                }
                Err(e) => return Err(e),
            }
        }

        {
            let meta = &mut self.node_mut(instance).meta;
            meta.proto = Some(proto_ref.clone());
            meta.instances.clear();
        }
        self.sync_meta(instance)?;

        let proto_id = self.materialize(proto_path)?;
        self.node_mut(proto_id).meta.add_instance(&instance_ref);
        self.sync_meta(proto_id)?;

        debug!(target: LOG_PROTO, instance = %instance_ref, proto = %proto_ref, "linked proto");
        Ok(())
    }

    /// All prototypes visible from `node`, name to `//`-reference.
    pub fn list_protos(&self, node: NodeId) -> CoreResult<BTreeMap<String, String>> {
        let start = if self.node(node).is_dir() {
            node
        } else {
            self.parent(node).unwrap_or(node)
        };
        let show = self.show(start).ok_or_else(|| CoreError::NoShow {
            path: self.node(node).path.clone(),
        })?;
        let show_path = self.node(show).path.clone();

        let mut protos = BTreeMap::new();
        for dir in self.find_proto_dirs(start) {
            for name in self.list_dir(&dir)? {
                let full = dir.join(&name);
                if let Some(reference) = relative_to_show(&show_path, &full) {
                    protos.entry(name).or_insert(reference);
                }
            }
        }
        Ok(protos)
    }
}
