//! 规则 API 处理器

use axum::{
    Json,
    extract::{Path, State},
};
use validator::Validate;

use super::dto::{
    ApiResponse, CombineRulesRequest, CreateRuleRequest, EvaluateRuleRequest, EvaluationDto,
    ModifyRuleRequest, RuleCreatedDto, RuleDto,
};
use super::error::ApiResult;
use super::state::AppState;
use crate::models::EvaluationContext;

/// 创建规则
///
/// POST /create_rule
pub async fn create_rule(
    State(state): State<AppState>,
    Json(req): Json<CreateRuleRequest>,
) -> ApiResult<Json<ApiResponse<RuleCreatedDto>>> {
    req.validate()?;

    let created = state.service.create_rule(&req.rule_string).await?;
    Ok(Json(ApiResponse::success(RuleCreatedDto {
        id: created.id,
        ast: created.ast,
    })))
}

/// 合并规则
///
/// POST /combine_rules
pub async fn combine_rules(
    State(state): State<AppState>,
    Json(req): Json<CombineRulesRequest>,
) -> ApiResult<Json<ApiResponse<RuleCreatedDto>>> {
    req.validate()?;

    let ids: Vec<String> = req.rule_ids.iter().map(|id| id.trim().to_string()).collect();
    let created = state.service.combine_rules(&ids).await?;
    Ok(Json(ApiResponse::success(RuleCreatedDto {
        id: created.id,
        ast: created.ast,
    })))
}

/// 对输入数据求值规则
///
/// POST /evaluate_rule
pub async fn evaluate_rule(
    State(state): State<AppState>,
    Json(req): Json<EvaluateRuleRequest>,
) -> ApiResult<Json<ApiResponse<EvaluationDto>>> {
    req.validate()?;

    let context = EvaluationContext::from(req.data);
    let dto = if req.trace {
        EvaluationDto::from(
            state
                .service
                .evaluate_rule_traced(&req.rule_id, &context)
                .await?,
        )
    } else {
        EvaluationDto::plain(state.service.evaluate_rule(&req.rule_id, &context).await?)
    };

    Ok(Json(ApiResponse::success(dto)))
}

/// 修改规则
///
/// POST /modify_rule
pub async fn modify_rule(
    State(state): State<AppState>,
    Json(req): Json<ModifyRuleRequest>,
) -> ApiResult<Json<ApiResponse<()>>> {
    req.validate()?;

    state
        .service
        .modify_rule(&req.rule_id, &req.new_rule_string)
        .await?;
    Ok(Json(ApiResponse::<()>::success_empty()))
}

/// 获取规则详情
///
/// GET /rules/{id}
pub async fn get_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<RuleDto>>> {
    let doc = state.service.get_rule(&id).await?;
    Ok(Json(ApiResponse::success(doc.into())))
}
