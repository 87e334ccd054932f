//! Meta selector: scalar expressions over an object's metadata.
//!
//! Evaluated bottom-up against a [`MetaContext`]. Field names are matched
//! case-insensitively, first against the structural fields of the node and
//! then against user data.

use super::value::Value;
use crate::cache::{NodeId, ObjectCache};
use crate::error::{CoreError, CoreResult};
use std::collections::BTreeMap;
use std::time::UNIX_EPOCH;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
        }
    }

    fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            // IEEE semantics: x / 0 is ±inf or NaN
            BinaryOp::Div => a / b,
        }
    }
}

/// Meta selector AST
#[derive(Debug, Clone, PartialEq)]
pub enum MetaNode {
    Number(f64),
    Str(String),
    /// Dotted identifier chain, e.g. `imginfo.width`
    Field(Vec<String>),
    Binary {
        op: BinaryOp,
        left: Box<MetaNode>,
        right: Box<MetaNode>,
    },
    Neg(Box<MetaNode>),
    /// Bare `:` selects the whole metadata map
    AllMeta,
}

/// Structural field names, in the order they appear in the all-metadata map
const STRUCTURAL_FIELDS: [&str; 14] = [
    "path",
    "name",
    "size",
    "modtime",
    "isdir",
    "show",
    "parent",
    "proto",
    "instances",
    "showroot",
    "meta",
    "imginfo",
    "seq",
    "contract",
];

/// Evaluation context: one node viewed through the cache
pub struct MetaContext<'a> {
    cache: &'a ObjectCache,
    node: NodeId,
}

impl<'a> MetaContext<'a> {
    pub fn new(cache: &'a ObjectCache, node: NodeId) -> Self {
        Self { cache, node }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Look up a top-level field by case-insensitive name.
    pub fn field(&self, name: &str) -> Option<Value> {
        let node = self.cache.node(self.node);
        let meta = &node.meta;
        let path_of = |id: NodeId| Value::from(self.cache.node(id).path.display().to_string());

        let value = match name.to_lowercase().as_str() {
            "path" => path_of(self.node),
            "name" => Value::from(node.file_info.name.clone()),
            "size" => Value::Number(node.file_info.size as f64),
            "modtime" => {
                let secs = node
                    .file_info
                    .modified?
                    .duration_since(UNIX_EPOCH)
                    .ok()?
                    .as_secs_f64();
                Value::Number(secs.floor())
            }
            "isdir" => Value::Bool(node.is_dir()),
            "show" => path_of(node.show?),
            "parent" => path_of(node.parent?),
            "proto" => Value::from(meta.proto.clone()?),
            "instances" => Value::List(meta.instances.iter().map(|i| Value::from(i.as_str())).collect()),
            "showroot" => Value::Bool(meta.is_show_root),
            "meta" | "userdata" => Value::Map(
                meta.user_data
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from_user_text(v)))
                    .collect(),
            ),
            "imginfo" => {
                let info = meta.img_info.as_ref()?;
                let mut map = BTreeMap::new();
                map.insert("width".to_string(), Value::Number(f64::from(info.width)));
                map.insert("height".to_string(), Value::Number(f64::from(info.height)));
                Value::Map(map)
            }
            "seq" => {
                let seq = meta.seq.as_ref()?;
                let mut map = BTreeMap::new();
                map.insert("basename".to_string(), Value::from(seq.base_name.as_str()));
                map.insert("first".to_string(), Value::Number(f64::from(seq.first)));
                map.insert("last".to_string(), Value::Number(f64::from(seq.last)));
                Value::Map(map)
            }
            "contract" => {
                let contract = meta.contract.as_ref()?;
                let mut map = BTreeMap::new();
                map.insert("pattern".to_string(), Value::from(contract.pattern.as_str()));
                Value::Map(map)
            }
            _ => return meta.user_value(name).map(Value::from_user_text),
        };
        Some(value)
    }

    /// The whole metadata map: structural fields plus user data.
    ///
    /// A user key that collides with a structural name is only reachable
    /// through `meta.<key>`.
    pub fn to_value(&self) -> Value {
        let mut map = BTreeMap::new();
        for name in STRUCTURAL_FIELDS {
            if let Some(value) = self.field(name) {
                map.insert(name.to_string(), value);
            }
        }
        let meta = &self.cache.node(self.node).meta;
        for (key, value) in &meta.user_data {
            let lowered = key.to_lowercase();
            if !STRUCTURAL_FIELDS.contains(&lowered.as_str()) {
                map.entry(key.clone())
                    .or_insert_with(|| Value::from_user_text(value));
            }
        }
        Value::Map(map)
    }
}

impl MetaNode {
    pub fn eval(&self, ctx: &MetaContext<'_>) -> CoreResult<Value> {
        match self {
            MetaNode::Number(n) => Ok(Value::Number(*n)),
            MetaNode::Str(s) => Ok(Value::String(s.clone())),
            MetaNode::AllMeta => Ok(ctx.to_value()),
            MetaNode::Field(chain) => eval_field(chain, ctx),
            MetaNode::Neg(inner) => match inner.eval(ctx)? {
                Value::Number(n) => Ok(Value::Number(-n)),
                other => Err(CoreError::OperandMismatch {
                    op: '-',
                    left: "unary",
                    right: other.type_name(),
                }),
            },
            MetaNode::Binary { op, left, right } => {
                let l = left.eval(ctx)?;
                let r = right.eval(ctx)?;
                match (l, r) {
                    (Value::Number(a), Value::Number(b)) => Ok(Value::Number(op.apply(a, b))),
                    (Value::String(a), Value::String(b)) if *op == BinaryOp::Add => {
                        Ok(Value::String(a + &b))
                    }
                    (l, r) => Err(CoreError::OperandMismatch {
                        op: op.symbol(),
                        left: l.type_name(),
                        right: r.type_name(),
                    }),
                }
            }
        }
    }
}

fn eval_field(chain: &[String], ctx: &MetaContext<'_>) -> CoreResult<Value> {
    let not_found = |name: &str| CoreError::FieldNotFound {
        name: name.to_string(),
    };
    let (first, rest) = chain.split_first().ok_or_else(|| not_found(""))?;
    let mut current = ctx.field(first).ok_or_else(|| not_found(first))?;
    for key in rest {
        current = current
            .lookup_ci(key)
            .cloned()
            .ok_or_else(|| not_found(key))?;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use showfs_config::MetaLayout;
    use showfs_vfs::MemoryFileSystem;
    use std::path::Path;

    fn field(names: &[&str]) -> MetaNode {
        MetaNode::Field(names.iter().map(|s| s.to_string()).collect())
    }

    fn binary(op: BinaryOp, left: MetaNode, right: MetaNode) -> MetaNode {
        MetaNode::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn fixture() -> (ObjectCache, NodeId) {
        let fs = MemoryFileSystem::with_files([
            ("/show/.meta/_", br#"{"is_show_root": true}"#.to_vec()),
            (
                "/show/.meta/plate.exr._",
                br#"{"user_data": {"Width": "1920", "artist": "kim"},
                     "img_info": {"width": 2048, "height": 1080}}"#
                    .to_vec(),
            ),
            ("/show/plate.exr", vec![0u8; 16]),
        ]);
        let mut cache = ObjectCache::new(Box::new(fs), MetaLayout::default(), "/show").unwrap();
        let id = cache.materialize(Path::new("/show/plate.exr")).unwrap();
        (cache, id)
    }

    #[test]
    fn test_arithmetic() {
        let (cache, id) = fixture();
        let ctx = MetaContext::new(&cache, id);
        let sum = binary(BinaryOp::Add, MetaNode::Number(2.0), MetaNode::Number(3.0));
        assert_eq!(sum.eval(&ctx).unwrap(), Value::Number(5.0));

        let nested = binary(
            BinaryOp::Mul,
            MetaNode::Neg(Box::new(MetaNode::Number(2.0))),
            binary(BinaryOp::Sub, MetaNode::Number(10.0), MetaNode::Number(4.0)),
        );
        assert_eq!(nested.eval(&ctx).unwrap(), Value::Number(-12.0));

        let div = binary(BinaryOp::Div, MetaNode::Number(1.0), MetaNode::Number(0.0));
        assert_eq!(div.eval(&ctx).unwrap(), Value::Number(f64::INFINITY));
    }

    #[test]
    fn test_string_concat_and_mismatch() {
        let (cache, id) = fixture();
        let ctx = MetaContext::new(&cache, id);
        let concat = binary(
            BinaryOp::Add,
            field(&["name"]),
            MetaNode::Str(".bak".to_string()),
        );
        assert_eq!(concat.eval(&ctx).unwrap(), Value::from("plate.exr.bak"));

        let mixed = binary(BinaryOp::Add, MetaNode::Number(1.0), field(&["artist"]));
        assert_eq!(
            mixed.eval(&ctx).unwrap_err(),
            CoreError::OperandMismatch {
                op: '+',
                left: "number",
                right: "string",
            }
        );

        let minus = binary(
            BinaryOp::Sub,
            MetaNode::Str("a".to_string()),
            MetaNode::Str("b".to_string()),
        );
        assert!(matches!(
            minus.eval(&ctx),
            Err(CoreError::OperandMismatch { op: '-', .. })
        ));
    }

    #[test]
    fn test_field_lookup_is_case_insensitive() {
        let (cache, id) = fixture();
        let ctx = MetaContext::new(&cache, id);
        assert_eq!(field(&["meta", "width"]).eval(&ctx).unwrap(), Value::Number(1920.0));
        assert_eq!(field(&["Meta", "WIDTH"]).eval(&ctx).unwrap(), Value::Number(1920.0));
        assert_eq!(field(&["width"]).eval(&ctx).unwrap(), Value::Number(1920.0));
        assert_eq!(field(&["ImgInfo", "Height"]).eval(&ctx).unwrap(), Value::Number(1080.0));
        assert_eq!(field(&["size"]).eval(&ctx).unwrap(), Value::Number(16.0));
        assert_eq!(field(&["show"]).eval(&ctx).unwrap(), Value::from("/show"));
    }

    #[test]
    fn test_field_not_found() {
        let (cache, id) = fixture();
        let ctx = MetaContext::new(&cache, id);
        assert_eq!(
            field(&["nope"]).eval(&ctx).unwrap_err(),
            CoreError::FieldNotFound {
                name: "nope".to_string()
            }
        );
        // descending into a scalar
        assert_eq!(
            field(&["name", "length"]).eval(&ctx).unwrap_err(),
            CoreError::FieldNotFound {
                name: "length".to_string()
            }
        );
        // optional section that is absent
        assert!(field(&["seq", "first"]).eval(&ctx).is_err());
    }

    #[test]
    fn test_all_meta_map() {
        let (cache, id) = fixture();
        let ctx = MetaContext::new(&cache, id);
        let all = MetaNode::AllMeta.eval(&ctx).unwrap();
        assert_eq!(all.lookup_ci("name"), Some(&Value::from("plate.exr")));
        assert_eq!(all.lookup_ci("isdir"), Some(&Value::Bool(false)));
        assert_eq!(all.lookup_ci("artist"), Some(&Value::from("kim")));
        assert!(all.lookup_ci("proto").is_none());
        assert!(all.lookup_ci("imginfo").is_some());
    }
}
