//! Object cache: one materialized [`Node`] per canonical path.
//!
//! Nodes live in an arena and reference each other by [`NodeId`]. A node is
//! inserted only after its whole parent chain exists, so `parent` and `show`
//! always point at fully initialized entries. Nothing is ever evicted.

use crate::error::{CoreError, CoreResult};
use crate::meta::PersistentMeta;
use crate::resolver::clean_path;
use showfs_config::MetaLayout;
use showfs_vfs::{VfsError, VirtualFileSystem};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, trace};

pub(crate) const LOG_CACHE: &str = "showfs::cache";
pub(crate) const LOG_RESOLVER: &str = "showfs::resolver";
pub(crate) const LOG_PROTO: &str = "showfs::proto";
pub(crate) const LOG_EXPR: &str = "showfs::expr";

/// Arena index of a cached node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Stat snapshot taken when the node was materialized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    pub modified: Option<SystemTime>,
    pub is_dir: bool,
}

/// A materialized file-system object
#[derive(Debug, Clone)]
pub struct Node {
    pub path: PathBuf,
    pub parent: Option<NodeId>,
    pub show: Option<NodeId>,
    pub file_info: FileInfo,
    pub meta: PersistentMeta,
}

impl Node {
    pub fn is_dir(&self) -> bool {
        self.file_info.is_dir
    }
}

/// Per-session cache of file-system objects
pub struct ObjectCache {
    vfs: Box<dyn VirtualFileSystem>,
    layout: MetaLayout,
    working_dir: PathBuf,
    nodes: Vec<Node>,
    index: HashMap<PathBuf, NodeId>,
}

impl ObjectCache {
    /// Create an empty cache over `vfs`.
    ///
    /// `working_dir` anchors relative targets and must be absolute.
    pub fn new(
        vfs: Box<dyn VirtualFileSystem>,
        layout: MetaLayout,
        working_dir: impl AsRef<Path>,
    ) -> CoreResult<Self> {
        let working_dir = clean_path(working_dir.as_ref())?;
        Ok(Self {
            vfs,
            layout,
            working_dir,
            nodes: Vec::new(),
            index: HashMap::new(),
        })
    }

    pub fn vfs(&self) -> &dyn VirtualFileSystem {
        self.vfs.as_ref()
    }

    pub fn layout(&self) -> &MetaLayout {
        &self.layout
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids of all cached nodes; parents come before their children
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Look up an already materialized path
    pub fn get(&self, path: &Path) -> Option<NodeId> {
        self.index.get(path).copied()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn show(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].show
    }

    /// Return the node for `path`, creating it (and every missing ancestor)
    /// on first use.
    pub fn materialize(&mut self, path: &Path) -> CoreResult<NodeId> {
        let path = clean_path(path)?;
        self.materialize_clean(path)
    }

    /// Materialize the session's working directory
    pub fn working_node(&mut self) -> CoreResult<NodeId> {
        let dir = self.working_dir.clone();
        self.materialize_clean(dir)
    }

    fn materialize_clean(&mut self, path: PathBuf) -> CoreResult<NodeId> {
        if let Some(&id) = self.index.get(&path) {
            return Ok(id);
        }

        let stat = self
            .vfs
            .metadata(&path)
            .map_err(|e| CoreError::io(&path, e))?;

        let parent = match path.parent() {
            Some(parent) => Some(self.materialize_clean(parent.to_path_buf())?),
            None => None,
        };

        let meta = self.load_meta(&path, stat.is_dir)?;
        let id = NodeId(self.nodes.len());
        let show = if meta.is_show_root {
            Some(id)
        } else {
            parent.and_then(|p| self.nodes[p.0].show)
        };

        debug!(
            target: LOG_CACHE,
            path = %path.display(),
            id = id.0,
            show = ?show.map(|s| s.0),
            "materialized node"
        );

        self.nodes.push(Node {
            path: path.clone(),
            parent,
            show,
            file_info: FileInfo {
                name: stat.name,
                size: stat.size,
                modified: stat.modified,
                is_dir: stat.is_dir,
            },
            meta,
        });
        self.index.insert(path, id);
        Ok(id)
    }

    /// Sidecar location for an object at `path`
    pub fn meta_file_for(&self, path: &Path, is_dir: bool) -> PathBuf {
        if is_dir {
            return path
                .join(&self.layout.meta_dir_name)
                .join(&self.layout.dir_record_name);
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let dir = path.parent().unwrap_or_else(|| Path::new("/"));
        dir.join(&self.layout.meta_dir_name)
            .join(format!("{}{}", name, self.layout.record_extension))
    }

    fn load_meta(&self, path: &Path, is_dir: bool) -> CoreResult<PersistentMeta> {
        let record = self.meta_file_for(path, is_dir);
        match self.vfs.read_file(&record) {
            Ok(bytes) => PersistentMeta::decode(&bytes).map_err(|e| CoreError::MetaDecode {
                path: record.clone(),
                message: e.to_string(),
            }),
            Err(e) if e.is_not_found() => Ok(PersistentMeta::default()),
            Err(e) => Err(CoreError::io(&record, e)),
        }
    }

    /// Persist a node's metadata.
    ///
    /// The record is written to a temporary sibling and renamed into place.
    pub fn sync_meta(&mut self, id: NodeId) -> CoreResult<()> {
        let node = &self.nodes[id.0];
        let record = self.meta_file_for(&node.path, node.is_dir());
        let bytes = node.meta.encode().map_err(|e| CoreError::MetaDecode {
            path: record.clone(),
            message: e.to_string(),
        })?;

        if let Some(meta_dir) = record.parent() {
            match self.vfs.create_dir(meta_dir) {
                Ok(()) | Err(VfsError::AlreadyExists { .. }) => {}
                Err(e) => return Err(CoreError::io(meta_dir, e)),
            }
        }

        let mut tmp = record.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        self.vfs
            .write_file(&tmp, &bytes)
            .map_err(|e| CoreError::io(&tmp, e))?;
        self.vfs
            .rename(&tmp, &record)
            .map_err(|e| CoreError::io(&record, e))?;

        trace!(target: LOG_CACHE, record = %record.display(), "meta synced");
        Ok(())
    }

    /// Sorted entry names of a directory, hiding the metadata directory
    pub fn list_dir(&self, path: &Path) -> CoreResult<Vec<String>> {
        let names = self
            .vfs
            .read_dir(path)
            .map_err(|e| CoreError::io(path, e))?;
        Ok(names
            .into_iter()
            .filter(|name| name != &self.layout.meta_dir_name)
            .collect())
    }

    /// Entry names below a node; empty for files
    pub fn children(&self, id: NodeId) -> CoreResult<Vec<String>> {
        let node = &self.nodes[id.0];
        if !node.is_dir() {
            return Ok(Vec::new());
        }
        self.list_dir(&node.path)
    }

    /// Flag a node as show root and re-derive `show` for every cached node.
    ///
    /// The flag is not persisted; call [`ObjectCache::sync_meta`] afterwards.
    pub fn mark_show_root(&mut self, id: NodeId) {
        self.nodes[id.0].meta.is_show_root = true;
        // parents always precede their children in the arena
        for i in 0..self.nodes.len() {
            let show = if self.nodes[i].meta.is_show_root {
                Some(NodeId(i))
            } else {
                self.nodes[i].parent.and_then(|p| self.nodes[p.0].show)
            };
            self.nodes[i].show = show;
        }
        debug!(target: LOG_CACHE, path = %self.nodes[id.0].path.display(), "marked show root");
    }
}

impl std::fmt::Debug for ObjectCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectCache")
            .field("working_dir", &self.working_dir)
            .field("nodes", &self.nodes.len())
            .finish()
    }
}
