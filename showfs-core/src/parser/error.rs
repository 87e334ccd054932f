/// 语法错误，包含位置信息
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// 错误类型
    pub kind: ParseErrorKind,
    /// 错误发生的位置
    pub location: ErrorLocation,
}

/// 错误位置信息（列号从 1 开始，按字符计）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorLocation {
    /// 特定列
    At(usize),
    /// 输入末尾
    Eof,
}

/// 语法错误类型
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// 无法识别的字符
    UnexpectedChar(char),
    /// 字符串缺少结束引号
    UnterminatedString,
    /// 无效的数字格式
    InvalidNumber(String),
    /// 无效的通配符模式
    InvalidPattern(String),
    /// 意外的token
    UnexpectedToken {
        found: String,
        expected: Vec<String>,
    },
    /// 意外的输入结束
    UnexpectedEndOfInput,
    /// 点号后需要标识符
    ExpectedIdentifierAfterDot,
    /// 缺少右括号
    MissingRightParen,
}

impl ParseErrorKind {
    /// 错误类型名称（可用于程序化处理）
    pub fn name(&self) -> &'static str {
        match self {
            ParseErrorKind::UnexpectedChar(_) => "UnexpectedChar",
            ParseErrorKind::UnterminatedString => "UnterminatedString",
            ParseErrorKind::InvalidNumber(_) => "InvalidNumber",
            ParseErrorKind::InvalidPattern(_) => "InvalidPattern",
            ParseErrorKind::UnexpectedToken { .. } => "UnexpectedToken",
            ParseErrorKind::UnexpectedEndOfInput => "UnexpectedEndOfInput",
            ParseErrorKind::ExpectedIdentifierAfterDot => "ExpectedIdentifierAfterDot",
            ParseErrorKind::MissingRightParen => "MissingRightParen",
        }
    }
}

impl ParseError {
    /// 在指定列创建错误
    pub fn at(kind: ParseErrorKind, column: usize) -> Self {
        Self {
            kind,
            location: ErrorLocation::At(column),
        }
    }

    /// 在输入末尾创建错误
    pub fn at_eof(kind: ParseErrorKind) -> Self {
        Self {
            kind,
            location: ErrorLocation::Eof,
        }
    }

    /// 获取列号（如果可用）
    pub fn column(&self) -> Option<usize> {
        match self.location {
            ErrorLocation::At(column) => Some(column),
            ErrorLocation::Eof => None,
        }
    }

    /// 错误在 `source` 中的列号，输入末尾算作最后一个字符之后
    pub fn column_in(&self, source: &str) -> usize {
        self.column()
            .unwrap_or_else(|| source.chars().count() + 1)
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let location_prefix = match self.location {
            ErrorLocation::At(column) => format!("col {column}"),
            ErrorLocation::Eof => "EOF".to_string(),
        };

        let message = match &self.kind {
            ParseErrorKind::UnexpectedChar(c) => format!("Unexpected character '{c}'"),
            ParseErrorKind::UnterminatedString => "Unterminated string literal".to_string(),
            ParseErrorKind::InvalidNumber(s) => format!("Invalid number format: '{s}'"),
            ParseErrorKind::InvalidPattern(s) => format!("Invalid wildcard pattern: '{s}'"),
            ParseErrorKind::UnexpectedToken { found, expected } => {
                if expected.is_empty() {
                    format!("Unexpected token '{found}'")
                } else {
                    format!(
                        "Unexpected token '{}', expected: {}",
                        found,
                        expected.join(", ")
                    )
                }
            }
            ParseErrorKind::UnexpectedEndOfInput => "Unexpected end of input".to_string(),
            ParseErrorKind::ExpectedIdentifierAfterDot => {
                "Expected identifier after '.'".to_string()
            }
            ParseErrorKind::MissingRightParen => "Missing right parenthesis ')'".to_string(),
        };

        write!(f, "[{location_prefix}] {message}")
    }
}

impl std::error::Error for ParseError {}

/// 解析结果类型
pub type ParseResult<T> = Result<T, ParseError>;
