//! Path selector: a lazily iterating chain of path segments.
//!
//! Each segment owns its enumeration state. Asking the chain for the next
//! match walks it top-down; a segment hands every candidate it produces to
//! the segment after it and only advances once that one is exhausted, which
//! yields the Cartesian product of all wildcard expansions depth-first.

use crate::cache::{NodeId, ObjectCache, LOG_EXPR};
use crate::error::{CoreError, CoreResult};
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};

/// What a single segment matches
#[derive(Debug, Clone)]
pub enum SegmentKind {
    /// `/` (file-system root) or `//` (show root of the seed)
    AbsoluteRoot { show: bool },
    /// `.` is `RelativeUp(0)`, `..` is `RelativeUp(1)`
    RelativeUp(usize),
    ExactName(String),
    /// Name pattern where `*` matches any run of characters
    Wildcard { pattern: String, regex: Regex },
}

impl SegmentKind {
    /// Compile a wildcard; `*` is the only metacharacter.
    pub fn wildcard(pattern: &str) -> Result<Self, regex::Error> {
        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        let regex = Regex::new(&format!("^{body}$"))?;
        Ok(SegmentKind::Wildcard {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// Classify one `/`-separated component of a path selector.
    pub fn from_component(component: &str) -> Result<Self, regex::Error> {
        match component {
            "." => Ok(SegmentKind::RelativeUp(0)),
            ".." => Ok(SegmentKind::RelativeUp(1)),
            c if c.contains('*') => SegmentKind::wildcard(c),
            c => Ok(SegmentKind::ExactName(c.to_string())),
        }
    }
}

impl PartialEq for SegmentKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SegmentKind::AbsoluteRoot { show: a }, SegmentKind::AbsoluteRoot { show: b }) => a == b,
            (SegmentKind::RelativeUp(a), SegmentKind::RelativeUp(b)) => a == b,
            (SegmentKind::ExactName(a), SegmentKind::ExactName(b)) => a == b,
            (SegmentKind::Wildcard { pattern: a, .. }, SegmentKind::Wildcard { pattern: b, .. }) => {
                a == b
            }
            _ => false,
        }
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentKind::AbsoluteRoot { show: true } => write!(f, "//"),
            SegmentKind::AbsoluteRoot { show: false } => write!(f, "/"),
            SegmentKind::RelativeUp(0) => write!(f, "."),
            SegmentKind::RelativeUp(n) => write!(f, "{}", vec![".."; *n].join("/")),
            SegmentKind::ExactName(name) => write!(f, "{name}"),
            SegmentKind::Wildcard { pattern, .. } => write!(f, "{pattern}"),
        }
    }
}

#[derive(Debug, Clone, Default)]
enum SegmentState {
    #[default]
    Fresh,
    /// Single-match segment whose candidate is being expanded downstream
    Holding(NodeId),
    /// Single-match tail segment that already reported its match
    Exhausted,
    Listing {
        entries: Vec<String>,
        cursor: usize,
        pending: Option<NodeId>,
    },
}

#[derive(Debug, Clone)]
pub struct PathSegment {
    kind: SegmentKind,
    state: SegmentState,
}

impl PathSegment {
    pub fn new(kind: SegmentKind) -> Self {
        Self {
            kind,
            state: SegmentState::Fresh,
        }
    }

    pub fn kind(&self) -> &SegmentKind {
        &self.kind
    }
}

/// Ordered chain of segments; the next of a segment is the one after it.
#[derive(Debug, Clone)]
pub struct PathSelector {
    segments: Vec<PathSegment>,
}

impl PathSelector {
    pub fn new(kinds: Vec<SegmentKind>) -> Self {
        Self {
            segments: kinds.into_iter().map(PathSegment::new).collect(),
        }
    }

    pub fn kinds(&self) -> impl Iterator<Item = &SegmentKind> {
        self.segments.iter().map(PathSegment::kind)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Drop all enumeration state
    pub fn reset(&mut self) {
        for segment in &mut self.segments {
            segment.state = SegmentState::Fresh;
        }
    }

    /// Pull the next matching node starting from `seed`.
    ///
    /// Returns `None` once the chain is exhausted; the chain is then back in
    /// its fresh state.
    pub fn next_match(&mut self, cache: &mut ObjectCache, seed: NodeId) -> CoreResult<Option<NodeId>> {
        next_in_chain(&mut self.segments, seed, cache)
    }

    /// Paths implied by the selector from `anchor`; they need not exist.
    pub fn generate(&self, cache: &ObjectCache, anchor: NodeId) -> CoreResult<Vec<PathBuf>> {
        let mut out = Vec::new();
        let base = cache.node(anchor).path.clone();
        generate_into(&self.segments, anchor, &base, cache, &mut out)?;
        Ok(out)
    }
}

impl fmt::Display for PathSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut need_sep = false;
        for kind in self.kinds() {
            if need_sep {
                write!(f, "/")?;
            }
            write!(f, "{kind}")?;
            need_sep = !matches!(kind, SegmentKind::AbsoluteRoot { .. });
        }
        Ok(())
    }
}

fn next_in_chain(
    segments: &mut [PathSegment],
    seed: NodeId,
    cache: &mut ObjectCache,
) -> CoreResult<Option<NodeId>> {
    let Some((head, rest)) = segments.split_first_mut() else {
        return Ok(None);
    };
    let PathSegment { kind, state } = head;
    match kind {
        SegmentKind::Wildcard { regex, .. } => next_wildcard(state, regex, rest, seed, cache),
        _ => next_single(state, kind, rest, seed, cache),
    }
}

fn next_single(
    state: &mut SegmentState,
    kind: &SegmentKind,
    rest: &mut [PathSegment],
    seed: NodeId,
    cache: &mut ObjectCache,
) -> CoreResult<Option<NodeId>> {
    let candidate = match std::mem::take(state) {
        SegmentState::Exhausted => return Ok(None),
        SegmentState::Holding(candidate) => candidate,
        _ => match single_candidate(kind, seed, cache)? {
            Some(candidate) => candidate,
            None => return Ok(None),
        },
    };

    if rest.is_empty() {
        *state = SegmentState::Exhausted;
        return Ok(Some(candidate));
    }

    match next_in_chain(rest, candidate, cache)? {
        Some(found) => {
            *state = SegmentState::Holding(candidate);
            Ok(Some(found))
        }
        None => Ok(None),
    }
}

fn single_candidate(
    kind: &SegmentKind,
    seed: NodeId,
    cache: &mut ObjectCache,
) -> CoreResult<Option<NodeId>> {
    match kind {
        SegmentKind::AbsoluteRoot { show: false } => cache.materialize(Path::new("/")).map(Some),
        SegmentKind::AbsoluteRoot { show: true } => match cache.show(seed) {
            Some(show) => Ok(Some(show)),
            None => Err(CoreError::UnresolvedShow {
                path: cache.node(seed).path.clone(),
            }),
        },
        SegmentKind::RelativeUp(levels) => {
            let mut current = seed;
            for _ in 0..*levels {
                match cache.parent(current) {
                    Some(parent) => current = parent,
                    None => break,
                }
            }
            Ok(Some(current))
        }
        SegmentKind::ExactName(name) => {
            let seed_node = cache.node(seed);
            if !seed_node.is_dir() {
                return Ok(None);
            }
            let path = seed_node.path.join(name);
            match cache.materialize(&path) {
                Ok(id) => Ok(Some(id)),
                Err(e) if e.is_not_found() => Ok(None),
                Err(e) => Err(e),
            }
        }
        // listed by next_wildcard
        SegmentKind::Wildcard { .. } => Ok(None),
    }
}

fn next_wildcard(
    state: &mut SegmentState,
    regex: &Regex,
    rest: &mut [PathSegment],
    seed: NodeId,
    cache: &mut ObjectCache,
) -> CoreResult<Option<NodeId>> {
    if !matches!(state, SegmentState::Listing { .. }) {
        let entries = cache.children(seed)?;
        trace!(
            target: LOG_EXPR,
            seed = %cache.node(seed).path.display(),
            entries = entries.len(),
            "listed directory for wildcard"
        );
        *state = SegmentState::Listing {
            entries,
            cursor: 0,
            pending: None,
        };
    }

    loop {
        let SegmentState::Listing {
            entries,
            cursor,
            pending,
        } = state
        else {
            *state = SegmentState::Fresh;
            return Ok(None);
        };

        if let Some(candidate) = *pending {
            match next_in_chain(rest, candidate, cache)? {
                Some(found) => return Ok(Some(found)),
                None => *pending = None,
            }
            continue;
        }

        let mut next_name = None;
        while *cursor < entries.len() {
            let name = &entries[*cursor];
            *cursor += 1;
            if regex.is_match(name) {
                next_name = Some(name.clone());
                break;
            }
        }
        let Some(name) = next_name else {
            *state = SegmentState::Fresh;
            return Ok(None);
        };

        let path = cache.node(seed).path.join(&name);
        let candidate = match cache.materialize(&path) {
            Ok(id) => id,
            // listed but not statable, e.g. a dangling symlink
            Err(e) if e.is_not_found() => {
                warn!(target: LOG_EXPR, path = %path.display(), "skipping vanished entry");
                continue;
            }
            Err(e) => return Err(e),
        };
        if rest.is_empty() {
            return Ok(Some(candidate));
        }
        *pending = Some(candidate);
    }
}

fn generate_into(
    segments: &[PathSegment],
    anchor: NodeId,
    base: &Path,
    cache: &ObjectCache,
    out: &mut Vec<PathBuf>,
) -> CoreResult<()> {
    let Some((head, rest)) = segments.split_first() else {
        out.push(base.to_path_buf());
        return Ok(());
    };

    match &head.kind {
        SegmentKind::AbsoluteRoot { show: false } => {
            generate_into(rest, anchor, Path::new("/"), cache, out)
        }
        SegmentKind::AbsoluteRoot { show: true } => {
            let show = cache.show(anchor).ok_or_else(|| CoreError::UnresolvedShow {
                path: cache.node(anchor).path.clone(),
            })?;
            let show_path = cache.node(show).path.clone();
            generate_into(rest, anchor, &show_path, cache, out)
        }
        SegmentKind::RelativeUp(levels) => {
            let mut up = base.to_path_buf();
            for _ in 0..*levels {
                up.pop();
            }
            generate_into(rest, anchor, &up, cache, out)
        }
        SegmentKind::ExactName(name) => generate_into(rest, anchor, &base.join(name), cache, out),
        SegmentKind::Wildcard { regex, .. } => {
            if !cache.vfs().is_dir(base) {
                return Ok(());
            }
            for name in cache.list_dir(base)? {
                if !regex.is_match(&name) {
                    continue;
                }
                let child = base.join(&name);
                // only directories can hold the rest of the chain
                if !rest.is_empty() && !cache.vfs().is_dir(&child) {
                    continue;
                }
                generate_into(rest, anchor, &child, cache, out)?;
            }
            Ok(())
        }
    }
}
