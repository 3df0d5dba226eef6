//! 规则合并
//!
//! 多条规则以 AND 连接为一条规则。N 条规则折叠为右嵌套的 AND 链
//! `AND(r1, AND(r2, ... rN))`，这正是解析器处理 `r1 AND r2 AND ... rN` 得到的形状，
//! 因此合并后的文本重新解析会得到同一棵树。根节点为逻辑节点的规则文本
//! 在拼接时加上括号，避免与相邻规则的 AND 产生新的优先级组合。

use crate::ast::{MAX_TREE_DEPTH, Node};
use crate::error::{Result, RuleError};

/// 合并时使用的分隔符
pub const COMBINE_DELIMITER: &str = " AND ";

/// 合并多条规则
///
/// 只有一条规则时树和文本都原样返回；没有规则时返回 `EmptyCombination`；
/// 合并结果深度超过 `MAX_TREE_DEPTH` 时返回 `TreeTooDeep`，此时不构建语法树。
pub fn combine<I>(rules: I) -> Result<(Node, String)>
where
    I: IntoIterator<Item = (Node, String)>,
{
    let mut rules: Vec<(Node, String)> = rules.into_iter().collect();
    if rules.is_empty() {
        return Err(RuleError::EmptyCombination);
    }
    if rules.len() == 1 {
        return rules.pop().ok_or(RuleError::EmptyCombination);
    }

    let depth = combined_depth(rules.iter().map(|(node, _)| node.depth()));
    if depth > MAX_TREE_DEPTH {
        return Err(RuleError::TreeTooDeep {
            depth,
            max: MAX_TREE_DEPTH,
        });
    }

    let rule_string = rules
        .iter()
        .map(|(node, text)| {
            if node.is_operator() {
                format!("({})", text.trim())
            } else {
                text.trim().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(COMBINE_DELIMITER);

    let ast = rules
        .into_iter()
        .map(|(node, _)| node)
        .rev()
        .reduce(|acc, node| Node::and(node, acc))
        .ok_or(RuleError::EmptyCombination)?;

    Ok((ast, rule_string))
}

/// 右嵌套 AND 链的深度：第 i 条规则（从 0 开始）位于 i 个 AND 节点之下，
/// 最后一条与倒数第二条同层
fn combined_depth(depths: impl ExactSizeIterator<Item = usize>) -> usize {
    let last = depths.len().saturating_sub(1);
    depths
        .enumerate()
        .map(|(i, depth)| i.min(last.saturating_sub(1)) + 1 + depth)
        .max()
        .unwrap_or(0)
}
