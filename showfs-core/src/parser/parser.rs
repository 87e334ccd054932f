use super::error::{ErrorLocation, ParseError, ParseErrorKind, ParseResult};
use super::lexer::{Token, TokenKind};
use crate::expr::meta::{BinaryOp, MetaNode};

/// 二元运算符优先级，0 表示不是二元运算符
fn get_precedence(kind: &TokenKind) -> i32 {
    match kind {
        TokenKind::Plus | TokenKind::Minus => 200,
        TokenKind::Asterisk | TokenKind::Slash => 300,
        _ => 0,
    }
}

fn binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Minus => Some(BinaryOp::Sub),
        TokenKind::Asterisk => Some(BinaryOp::Mul),
        TokenKind::Slash => Some(BinaryOp::Div),
        _ => None,
    }
}

/// Meta selector parser (precedence climbing)
pub struct Parser {
    tokens: std::vec::IntoIter<Token>,
    current_token: Option<Token>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        let mut parser = Self {
            tokens: tokens.into_iter(),
            current_token: None,
        };
        parser.consume(); // 预读第一个token
        parser
    }

    /// 解析整个 meta 选择器；空输入表示选择全部元数据
    pub fn parse(&mut self) -> ParseResult<MetaNode> {
        if self.current_token.is_none() {
            return Ok(MetaNode::AllMeta);
        }
        let node = self.parse_expression(0)?;
        if self.current_token.is_some() {
            return Err(self.error_here(ParseErrorKind::UnexpectedToken {
                found: self.current_token_text(),
                expected: vec!["operator".to_string()],
            }));
        }
        Ok(node)
    }

    /// 消费当前token并读取下一个
    fn consume(&mut self) -> Option<Token> {
        std::mem::replace(&mut self.current_token, self.tokens.next())
    }

    /// 检查当前token是否为指定类型
    fn check(&self, kind: &TokenKind) -> bool {
        self.current_token
            .as_ref()
            .map(|token| &token.kind == kind)
            .unwrap_or(false)
    }

    fn current_location(&self) -> ErrorLocation {
        match &self.current_token {
            Some(token) => ErrorLocation::At(token.column),
            None => ErrorLocation::Eof,
        }
    }

    fn current_token_text(&self) -> String {
        match &self.current_token {
            Some(token) => token.kind.to_string(),
            None => "EOF".to_string(),
        }
    }

    fn error_here(&self, kind: ParseErrorKind) -> ParseError {
        ParseError {
            kind,
            location: self.current_location(),
        }
    }

    fn parse_expression(&mut self, min_precedence: i32) -> ParseResult<MetaNode> {
        let mut left = self.parse_unary()?;

        loop {
            let Some(token) = &self.current_token else {
                break;
            };
            let precedence = get_precedence(&token.kind);
            let Some(op) = binary_op(&token.kind) else {
                break;
            };
            if precedence <= min_precedence {
                break;
            }
            self.consume();
            let right = self.parse_expression(precedence)?;
            left = MetaNode::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<MetaNode> {
        if self.check(&TokenKind::Minus) {
            self.consume();
            let operand = self.parse_unary()?;
            return Ok(MetaNode::Neg(Box::new(operand)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> ParseResult<MetaNode> {
        let Some(token) = self.current_token.clone() else {
            return Err(ParseError::at_eof(ParseErrorKind::UnexpectedEndOfInput));
        };

        match token.kind {
            TokenKind::Number(n) => {
                self.consume();
                Ok(MetaNode::Number(n))
            }
            TokenKind::Str(s) => {
                self.consume();
                Ok(MetaNode::Str(s))
            }
            TokenKind::Identifier(name) => {
                self.consume();
                self.parse_field(name)
            }
            TokenKind::LeftParen => {
                self.consume();
                let inner = self.parse_expression(0)?;
                if !self.check(&TokenKind::RightParen) {
                    return Err(self.error_here(ParseErrorKind::MissingRightParen));
                }
                self.consume();
                Ok(inner)
            }
            _ => Err(self.error_here(ParseErrorKind::UnexpectedToken {
                found: self.current_token_text(),
                expected: vec![
                    "number".to_string(),
                    "string".to_string(),
                    "identifier".to_string(),
                    "(".to_string(),
                ],
            })),
        }
    }

    /// `name(.name)*`
    fn parse_field(&mut self, first: String) -> ParseResult<MetaNode> {
        let mut chain = vec![first];
        while self.check(&TokenKind::Dot) {
            self.consume();
            match self.current_token.as_ref().map(|t| &t.kind) {
                Some(TokenKind::Identifier(name)) => {
                    chain.push(name.clone());
                    self.consume();
                }
                _ => return Err(self.error_here(ParseErrorKind::ExpectedIdentifierAfterDot)),
            }
        }
        Ok(MetaNode::Field(chain))
    }
}
