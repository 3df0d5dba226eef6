//! 规则语法树及其序列化
//!
//! 序列化格式与历史规则文档保持一致：
//!
//! ```json
//! {"type": "operator", "value": "AND",
//!  "left":  {"type": "operand", "value": "age > 30", "left": null, "right": null},
//!  "right": {"type": "operand", "value": "department = 'Sales'", "left": null, "right": null}}
//! ```
//!
//! 空子节点显式写为 `null`，反序列化时缺失字段视为结构损坏。

use crate::error::{Result, RuleError};
use crate::operators::LogicalOperator;
use serde::de::Error as _;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// 语法树的最大深度（叶子节点为 1）
///
/// 解析、合并和反序列化共用同一上限，能写入存储的树一定能被读回。
pub const MAX_TREE_DEPTH: usize = 512;

const TYPE_OPERATOR: &str = "operator";
const TYPE_OPERAND: &str = "operand";

/// 语法树节点
///
/// 节点构建后不可变，修改规则时整棵树被替换。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Operator {
        operator: LogicalOperator,
        left: Box<Node>,
        right: Box<Node>,
    },
    Operand {
        value: String,
    },
}

impl Node {
    pub fn operator(operator: LogicalOperator, left: Node, right: Node) -> Self {
        Self::Operator {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(left: Node, right: Node) -> Self {
        Self::operator(LogicalOperator::And, left, right)
    }

    pub fn or(left: Node, right: Node) -> Self {
        Self::operator(LogicalOperator::Or, left, right)
    }

    pub fn operand(value: impl Into<String>) -> Self {
        Self::Operand {
            value: value.into(),
        }
    }

    pub fn is_operator(&self) -> bool {
        matches!(self, Self::Operator { .. })
    }

    /// 树的深度，叶子节点为 1
    pub fn depth(&self) -> usize {
        match self {
            Self::Operand { .. } => 1,
            Self::Operator { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// 按从左到右的顺序收集所有叶子条件
    pub fn operands(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_operands(&mut out);
        out
    }

    fn collect_operands<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Operand { value } => out.push(value),
            Self::Operator { left, right, .. } => {
                left.collect_operands(out);
                right.collect_operands(out);
            }
        }
    }

    /// 从 JSON 值还原语法树
    pub fn from_value(value: &Value) -> Result<Self> {
        Self::decode(value, "root", 1)
    }

    fn decode(value: &Value, path: &str, depth: usize) -> Result<Self> {
        if depth > MAX_TREE_DEPTH {
            return Err(malformed(path, format!("深度超过 {} 层", MAX_TREE_DEPTH)));
        }

        let obj = value
            .as_object()
            .ok_or_else(|| malformed(path, "节点必须是 JSON 对象"))?;

        let kind = required_str(obj, "type", path)?;
        let text = required_str(obj, "value", path)?;
        let left = required_field(obj, "left", path)?;
        let right = required_field(obj, "right", path)?;

        match kind {
            TYPE_OPERATOR => {
                let operator = LogicalOperator::from_keyword(text).ok_or_else(|| {
                    malformed(path, format!("未知的逻辑操作符 '{}'", text))
                })?;
                if left.is_null() || right.is_null() {
                    return Err(malformed(path, "逻辑节点必须同时包含左右子节点"));
                }
                let left = Self::decode(left, &format!("{}.left", path), depth + 1)?;
                let right = Self::decode(right, &format!("{}.right", path), depth + 1)?;
                Ok(Self::operator(operator, left, right))
            }
            TYPE_OPERAND => {
                if !left.is_null() || !right.is_null() {
                    return Err(malformed(path, "条件节点不能包含子节点"));
                }
                Ok(Self::operand(text))
            }
            other => Err(malformed(path, format!("未知的节点类型 '{}'", other))),
        }
    }
}

fn malformed(path: &str, reason: impl fmt::Display) -> RuleError {
    RuleError::MalformedTree(format!("{}: {}", path, reason))
}

fn required_field<'a>(obj: &'a Map<String, Value>, key: &str, path: &str) -> Result<&'a Value> {
    obj.get(key)
        .ok_or_else(|| malformed(path, format!("缺少字段 '{}'", key)))
}

fn required_str<'a>(obj: &'a Map<String, Value>, key: &str, path: &str) -> Result<&'a str> {
    required_field(obj, key, path)?
        .as_str()
        .ok_or_else(|| malformed(path, format!("字段 '{}' 必须是字符串", key)))
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Node", 4)?;
        match self {
            Self::Operator {
                operator,
                left,
                right,
            } => {
                state.serialize_field("type", TYPE_OPERATOR)?;
                state.serialize_field("value", operator.keyword())?;
                state.serialize_field("left", left.as_ref())?;
                state.serialize_field("right", right.as_ref())?;
            }
            Self::Operand { value } => {
                state.serialize_field("type", TYPE_OPERAND)?;
                state.serialize_field("value", value)?;
                state.serialize_field("left", &Option::<Node>::None)?;
                state.serialize_field("right", &Option::<Node>::None)?;
            }
        }
        state.end()
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(D::Error::custom)
    }
}

/// 以全括号形式输出，便于日志阅读
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operand { value } => f.write_str(value),
            Self::Operator {
                operator,
                left,
                right,
            } => write!(f, "({} {} {})", left, operator, right),
        }
    }
}

/// 序列化语法树
pub fn to_json(node: &Node) -> Result<String> {
    Ok(serde_json::to_string(node)?)
}

/// 反序列化语法树，任何结构问题都报告为 `MalformedTree`
///
/// 嵌套层数先按 `MAX_TREE_DEPTH` 检查，之后解析不再受 serde_json
/// 默认 128 层递归限制的约束。
pub fn from_json(text: &str) -> Result<Node> {
    let nesting = json_nesting_depth(text);
    if nesting > MAX_TREE_DEPTH {
        return Err(RuleError::MalformedTree(format!(
            "JSON 嵌套 {} 层，超过上限 {}",
            nesting, MAX_TREE_DEPTH
        )));
    }

    let mut de = serde_json::Deserializer::from_str(text);
    de.disable_recursion_limit();
    let value = Value::deserialize(&mut de)
        .and_then(|value| de.end().map(|()| value))
        .map_err(|e| RuleError::MalformedTree(format!("无效的 JSON: {}", e)))?;

    Node::from_value(&value)
}

/// 统计 JSON 文本中对象与数组的最大嵌套层数，忽略字符串内容
fn json_nesting_depth(text: &str) -> usize {
    let (mut depth, mut max) = (0usize, 0usize);
    let mut in_string = false;
    let mut escaped = false;

    for byte in text.bytes() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                max = max.max(depth);
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    max
}
