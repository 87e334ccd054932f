//! Expression parser
//!
//! Grammar: `expression := [path] [':' meta]`
//!
//! - path: `//` show root, `/` file-system root, `/`-separated components;
//!   `.` and `..` step up, components containing `*` are wildcards
//! - meta: numbers, quoted strings, dotted identifiers, `+ - * /`, unary
//!   `-` and parentheses; an empty meta part selects all metadata

pub mod error;
pub mod lexer;
#[allow(clippy::module_inception)]
pub mod parser;

pub use error::{ErrorLocation, ParseError, ParseErrorKind, ParseResult};

use crate::expr::meta::MetaNode;
use crate::expr::path::{PathSelector, SegmentKind};
use crate::expr::Expression;
use lexer::Lexer;
use parser::Parser;

/// Parse a full `path:meta` expression.
pub fn parse_expression(source: &str) -> ParseResult<Expression> {
    let (path_text, meta_part) = match source.find(':') {
        Some(idx) => (&source[..idx], Some((&source[idx + 1..], idx + 1))),
        None => (source, None),
    };

    let path = parse_path(path_text)?;
    let meta = match meta_part {
        Some((text, byte_offset)) => {
            let offset = source[..byte_offset].chars().count();
            Some(parse_meta(text, offset)?)
        }
        None => None,
    };
    Ok(Expression::new(source, path, meta))
}

/// Parse the path part; `None` when it is blank.
pub fn parse_path(text: &str) -> ParseResult<Option<PathSelector>> {
    let leading = text.len() - text.trim_start().len();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let mut kinds = Vec::new();
    let (mut rest, mut byte_pos) = (trimmed, leading);
    if let Some(stripped) = rest.strip_prefix("//") {
        kinds.push(SegmentKind::AbsoluteRoot { show: true });
        rest = stripped;
        byte_pos += 2;
    } else if let Some(stripped) = rest.strip_prefix('/') {
        kinds.push(SegmentKind::AbsoluteRoot { show: false });
        rest = stripped;
        byte_pos += 1;
    }

    for component in rest.split('/') {
        if !component.is_empty() {
            let kind = SegmentKind::from_component(component).map_err(|_| {
                ParseError::at(
                    ParseErrorKind::InvalidPattern(component.to_string()),
                    text[..byte_pos].chars().count() + 1,
                )
            })?;
            kinds.push(kind);
        }
        byte_pos += component.len() + 1;
    }

    Ok(Some(PathSelector::new(kinds)))
}

/// Parse the meta part; `offset` is its column offset in the whole source.
pub fn parse_meta(text: &str, offset: usize) -> ParseResult<MetaNode> {
    let tokens = Lexer::new(text, offset).tokenize()?;
    Parser::new(tokens).parse()
}
