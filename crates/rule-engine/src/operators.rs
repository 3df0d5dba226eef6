//! 规则操作符定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 比较操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Gt,
    Lt,
    Eq,
}

impl Comparator {
    /// 从规则文本中的符号解析
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            ">" => Some(Self::Gt),
            "<" => Some(Self::Lt),
            "=" => Some(Self::Eq),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Eq => "=",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// 逻辑操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    /// 规则文本中的关键字，大小写敏感
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparator_symbols() {
        assert_eq!(Comparator::from_symbol(">"), Some(Comparator::Gt));
        assert_eq!(Comparator::from_symbol("<"), Some(Comparator::Lt));
        assert_eq!(Comparator::from_symbol("="), Some(Comparator::Eq));
        assert_eq!(Comparator::from_symbol(">="), None);
        assert_eq!(Comparator::from_symbol("=="), None);
    }

    #[test]
    fn test_logical_keywords_are_case_sensitive() {
        assert_eq!(LogicalOperator::from_keyword("AND"), Some(LogicalOperator::And));
        assert_eq!(LogicalOperator::from_keyword("OR"), Some(LogicalOperator::Or));
        assert_eq!(LogicalOperator::from_keyword("and"), None);
        assert_eq!(LogicalOperator::from_keyword("Or"), None);
    }

    #[test]
    fn test_logical_serde() {
        let json = serde_json::to_string(&LogicalOperator::And).unwrap();
        assert_eq!(json, "\"AND\"");
        let op: LogicalOperator = serde_json::from_str("\"OR\"").unwrap();
        assert_eq!(op, LogicalOperator::Or);
    }
}
