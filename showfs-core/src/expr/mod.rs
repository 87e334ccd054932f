//! Expressions: an optional path selector plus an optional meta selector.

pub mod meta;
pub mod path;
pub mod value;

use crate::cache::{NodeId, ObjectCache, LOG_EXPR};
use crate::error::{CoreError, CoreResult};
use crate::parser::{self, ParseError};
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

pub use meta::{BinaryOp, MetaContext, MetaNode};
pub use path::{PathSegment, PathSelector, SegmentKind};
pub use value::Value;

/// A parsed `path:meta` expression.
///
/// Immutable apart from the enumeration state inside the path selector.
#[derive(Debug, Clone)]
pub struct Expression {
    source: String,
    meta: Option<MetaNode>,
    path: Option<PathSelector>,
}

impl Expression {
    pub fn new(source: impl Into<String>, path: Option<PathSelector>, meta: Option<MetaNode>) -> Self {
        Self {
            source: source.into(),
            meta,
            path,
        }
    }

    /// Parse expression text
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        parser::parse_expression(source)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn meta_selector(&self) -> Option<&MetaNode> {
        self.meta.as_ref()
    }

    pub fn path_selector(&self) -> Option<&PathSelector> {
        self.path.as_ref()
    }

    /// Evaluate from directory `dir`.
    ///
    /// - no selectors: the directory's full metadata map
    /// - meta only: the meta selector applied to the directory
    /// - path: a list of matched paths, or of meta values per match
    pub fn eval(&mut self, cache: &mut ObjectCache, dir: NodeId) -> CoreResult<Value> {
        let Some(path) = self.path.as_mut() else {
            let ctx = MetaContext::new(cache, dir);
            return match &self.meta {
                Some(meta) => meta.eval(&ctx),
                None => Ok(ctx.to_value()),
            };
        };

        path.reset();
        let mut results = Vec::new();
        while let Some(id) = path.next_match(cache, dir)? {
            let value = match &self.meta {
                Some(meta) => meta.eval(&MetaContext::new(cache, id))?,
                None => Value::from(cache.node(id).path.display().to_string()),
            };
            results.push(value);
        }
        debug!(target: LOG_EXPR, expr = %self.source, matches = results.len(), "evaluated expression");
        Ok(Value::List(results))
    }

    /// Candidate paths for new objects, anchored at `dir`.
    ///
    /// Without a path selector the candidate is `dir` itself.
    pub fn generate(&self, cache: &ObjectCache, dir: NodeId) -> CoreResult<Vec<PathBuf>> {
        if self.meta.is_some() {
            return Err(CoreError::GeneratorMetaNotAllowed {
                expr: self.source.clone(),
            });
        }
        match &self.path {
            Some(path) => path.generate(cache, dir),
            None => Ok(vec![cache.node(dir).path.clone()]),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}
