use axum::response::IntoResponse;

use crate::utils::success_to_api_response;

/// 受保护探活端点：能到达此处说明网关已放行
#[axum::debug_handler]
pub async fn probe() -> impl IntoResponse {
    success_to_api_response("受保护资源访问成功，当前凭证有效")
}
