//! 规则字符串分词
//!
//! 括号被拆成独立的记号，`AND` / `OR` 识别为逻辑操作符，
//! 其余以空白分隔的片段原样保留。分词永远不会失败，
//! 格式错误留给语法树构建或求值阶段报告。

use crate::operators::LogicalOperator;
use std::fmt;

/// 词法记号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    LParen,
    RParen,
    Logical(LogicalOperator),
    Word(&'a str),
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LParen => f.write_str("("),
            Self::RParen => f.write_str(")"),
            Self::Logical(op) => write!(f, "{}", op),
            Self::Word(word) => f.write_str(word),
        }
    }
}

/// 将规则字符串切分为记号序列
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();

    for chunk in input.split_whitespace() {
        let mut rest = chunk;
        while !rest.is_empty() {
            match rest.find(['(', ')']) {
                Some(0) => {
                    tokens.push(if rest.starts_with('(') {
                        Token::LParen
                    } else {
                        Token::RParen
                    });
                    rest = &rest[1..];
                }
                Some(idx) => {
                    tokens.push(classify(&rest[..idx]));
                    rest = &rest[idx..];
                }
                None => {
                    tokens.push(classify(rest));
                    rest = "";
                }
            }
        }
    }

    tokens
}

fn classify(word: &str) -> Token<'_> {
    match LogicalOperator::from_keyword(word) {
        Some(op) => Token::Logical(op),
        None => Token::Word(word),
    }
}
