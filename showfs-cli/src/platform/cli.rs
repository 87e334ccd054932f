//! CLI 格式化输出
//!
//! 提供命令行友好的错误显示和 JSON 结果打印。

use serde::Serialize;
use showfs_api::ApiError;

/// 打印错误，语法错误额外显示表达式和列标记
pub fn print_error_with_source(e: &ApiError, source: Option<&str>) {
    let report = e.to_report();
    eprintln!("error: {}", report.to_short());

    if let (ApiError::Parse(parse_error), Some(source)) = (e, source) {
        let column = parse_error.column_in(source);
        eprintln!("  | {source}");
        eprintln!("  | {}", caret_line(column));
    }
    if let Some(path) = &report.path {
        eprintln!("  = path: {path}");
    }
}

/// 指向第 `column` 列（从 1 开始）的标记行
pub fn caret_line(column: usize) -> String {
    format!("{}^", " ".repeat(column.saturating_sub(1)))
}

/// 以格式化 JSON 打印结果
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
