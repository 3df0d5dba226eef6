//! 共享库
//!
//! 包含服务共用的配置加载与可观测性基础设施。

pub mod config;
pub mod observability;
