//! 规则表达式解析
//!
//! 将记号序列构建为二叉语法树。同一括号层级内 OR 的优先级低于 AND：
//! 先在第一个 `OR` 处切分，没有 `OR` 时再在第一个 `AND` 处切分，
//! 两侧递归处理。括号内的子表达式先独立成组，因此括号总是优先。
//!
//! `A AND B OR C AND D` 解析为 `OR(AND(A, B), AND(C, D))`。

use crate::ast::{MAX_TREE_DEPTH, Node};
use crate::error::{Result, RuleError};
use crate::models::Comparison;
use crate::operators::LogicalOperator;
use crate::tokenizer::{Token, tokenize};

/// 括号嵌套的最大层数
pub const MAX_NESTING_DEPTH: usize = 64;

/// 分组后的表达式元素
#[derive(Debug, Clone, PartialEq)]
enum Item<'a> {
    Word(&'a str),
    Logical(LogicalOperator),
    Group(Vec<Item<'a>>),
}

/// 解析规则字符串
///
/// 除括号和空表达式检查外，每个叶子条件都会按求值时的规则预先解析，
/// 确保能够成功构建的规则在求值时不会因条件格式而失败。
pub fn parse_rule(input: &str) -> Result<Node> {
    let tree = build_tree(input)?;

    for operand in tree.operands() {
        Comparison::parse(operand).map_err(|e| RuleError::Parse(e.to_string()))?;
    }

    Ok(tree)
}

/// 只构建语法树，不校验叶子条件
pub fn build_tree(input: &str) -> Result<Node> {
    let tokens = tokenize(input);
    let (items, consumed) = group(&tokens, 0)?;

    if consumed < tokens.len() {
        return Err(RuleError::Parse(format!(
            "第 {} 个记号处出现多余的右括号",
            consumed + 1
        )));
    }

    reduce(&items, 1)
}

/// 读取记号直到遇到未匹配的右括号或输入结束，返回元素和消耗的记号数
fn group<'a>(tokens: &[Token<'a>], depth: usize) -> Result<(Vec<Item<'a>>, usize)> {
    let mut items = Vec::new();
    let mut pos = 0;

    while pos < tokens.len() {
        match tokens[pos] {
            Token::LParen => {
                if depth + 1 > MAX_NESTING_DEPTH {
                    return Err(RuleError::Parse(format!(
                        "括号嵌套超过 {} 层",
                        MAX_NESTING_DEPTH
                    )));
                }

                let (inner, used) = group(&tokens[pos + 1..], depth + 1)?;
                let close = pos + 1 + used;
                if tokens.get(close) != Some(&Token::RParen) {
                    return Err(RuleError::Parse("括号未闭合".to_string()));
                }

                items.push(Item::Group(inner));
                pos = close + 1;
            }
            Token::RParen => return Ok((items, pos)),
            Token::Logical(op) => {
                items.push(Item::Logical(op));
                pos += 1;
            }
            Token::Word(word) => {
                items.push(Item::Word(word));
                pos += 1;
            }
        }
    }

    Ok((items, pos))
}

/// 递归归约为语法树，`depth` 为当前节点所在层（根为 1）
fn reduce(items: &[Item<'_>], depth: usize) -> Result<Node> {
    if depth > MAX_TREE_DEPTH {
        return Err(RuleError::Parse(format!(
            "语法树深度超过 {} 层",
            MAX_TREE_DEPTH
        )));
    }

    match items {
        [] => Err(RuleError::Parse("空表达式".to_string())),
        [Item::Group(inner)] => reduce(inner, depth),
        [Item::Logical(op)] => Err(RuleError::Parse(format!("操作符 {} 缺少操作数", op))),
        _ => {
            if let Some((idx, op)) = find_operator(items, LogicalOperator::Or)
                .or_else(|| find_operator(items, LogicalOperator::And))
            {
                let left =
                    reduce(&items[..idx], depth + 1).map_err(|e| side_error(e, op, "左"))?;
                let right =
                    reduce(&items[idx + 1..], depth + 1).map_err(|e| side_error(e, op, "右"))?;
                return Ok(Node::operator(op, left, right));
            }

            operand(items)
        }
    }
}

fn find_operator(items: &[Item<'_>], target: LogicalOperator) -> Option<(usize, LogicalOperator)> {
    items
        .iter()
        .position(|item| matches!(item, Item::Logical(op) if *op == target))
        .map(|idx| (idx, target))
}

fn side_error(err: RuleError, op: LogicalOperator, side: &str) -> RuleError {
    match err {
        RuleError::Parse(msg) if msg == "空表达式" => {
            RuleError::Parse(format!("操作符 {} 的{}侧为空", op, side))
        }
        other => other,
    }
}

/// 不含逻辑操作符的元素拼接为一个条件
fn operand(items: &[Item<'_>]) -> Result<Node> {
    let mut words = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Item::Word(word) => words.push(*word),
            _ => {
                return Err(RuleError::Parse(
                    "括号表达式不能与条件片段直接相邻".to_string(),
                ));
            }
        }
    }

    Ok(Node::operand(words.join(" ")))
}
