//! 终端相关输出

mod cli;

pub use cli::{caret_line, print_error_with_source, print_json};
