//! 应用状态定义

use crate::service::RuleService;
use crate::store::RuleRepository;
use std::sync::Arc;

/// Axum 应用共享状态
#[derive(Clone)]
pub struct AppState {
    pub service: RuleService,
}

impl AppState {
    pub fn new(repo: Arc<dyn RuleRepository>) -> Self {
        Self {
            service: RuleService::new(repo),
        }
    }
}
