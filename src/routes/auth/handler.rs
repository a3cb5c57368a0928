use std::collections::HashMap;

use axum::{
    extract::{Json, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::{
    AppState,
    utils::{client_origin, error_codes, error_to_api_response, success_to_api_response},
};

use super::model::{
    LoginRequest, LoginResponse, OAuthCallbackQuery, RegisterRequest, RegisterResponse,
    UserAccount,
};

/// 签发两条凭证：服务端会话 + 无状态令牌，并写入会话Cookie
fn issue_credentials(
    state: &AppState,
    jar: CookieJar,
    subject: &str,
    claims: HashMap<String, serde_json::Value>,
    origin: &str,
) -> Result<(CookieJar, LoginResponse), Response> {
    let session_id = state.auth.sessions.create(subject, origin);

    let (token, expires_at) = state.auth.tokens.issue(subject, claims).map_err(|e| {
        tracing::error!("Failed to issue token for {}: {}", subject, e);
        state.auth.sessions.invalidate(&session_id);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_to_api_response::<()>(error_codes::INTERNAL_ERROR, "生成令牌失败".to_string()),
        )
            .into_response()
    })?;

    let cookie = Cookie::build((state.auth.cookie_name.clone(), session_id.clone()))
        .path("/")
        .http_only(true)
        .build();

    Ok((
        jar.add(cookie),
        LoginResponse {
            session_id,
            token,
            expires_at,
        },
    ))
}

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Response {
    if req.username.is_empty() || req.password.is_empty() || req.email.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response::<()>(
                error_codes::VALIDATION_ERROR,
                "用户名、密码和邮箱不能为空".to_string(),
            ),
        )
            .into_response();
    }

    // 用户名与邮箱冲突分别提示
    match UserAccount::find_by_username(&state.pool, &req.username).await {
        Ok(Some(_)) => {
            return (
                StatusCode::BAD_REQUEST,
                error_to_api_response::<()>(error_codes::USER_EXISTS, "用户名已存在".to_string()),
            )
                .into_response();
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!("Failed to query username: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response::<()>(error_codes::INTERNAL_ERROR, "数据库错误".to_string()),
            )
                .into_response();
        }
    }
    match UserAccount::find_by_email(&state.pool, &req.email).await {
        Ok(Some(_)) => {
            return (
                StatusCode::BAD_REQUEST,
                error_to_api_response::<()>(error_codes::USER_EXISTS, "邮箱已存在".to_string()),
            )
                .into_response();
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!("Failed to query email: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response::<()>(error_codes::INTERNAL_ERROR, "数据库错误".to_string()),
            )
                .into_response();
        }
    }

    match UserAccount::create(&state.pool, req).await {
        Ok(user) => (
            StatusCode::CREATED,
            success_to_api_response(RegisterResponse {
                id: user.id,
                username: user.username,
                email: user.email,
            }),
        )
            .into_response(),
        Err(e) => {
            // 与存在性检查并发竞争时由唯一约束兜底
            if e.to_string().contains("unique constraint") {
                (
                    StatusCode::BAD_REQUEST,
                    error_to_api_response::<()>(
                        error_codes::USER_EXISTS,
                        "用户名或邮箱已存在".to_string(),
                    ),
                )
                    .into_response()
            } else {
                tracing::error!("Failed to create user: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_to_api_response::<()>(
                        error_codes::INTERNAL_ERROR,
                        "创建用户失败".to_string(),
                    ),
                )
                    .into_response()
            }
        }
    }
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Response {
    // 先校验凭证，校验不通过不签发任何凭证
    let user = match UserAccount::find_by_username(&state.pool, &req.username).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return (
                StatusCode::UNAUTHORIZED,
                error_to_api_response::<()>(
                    error_codes::AUTH_FAILED,
                    "用户名或密码错误".to_string(),
                ),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("Failed to query user: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response::<()>(error_codes::INTERNAL_ERROR, "数据库错误".to_string()),
            )
                .into_response();
        }
    };

    match user.verify_login(&req.password) {
        Ok(true) => {}
        Ok(false) => {
            return (
                StatusCode::UNAUTHORIZED,
                error_to_api_response::<()>(
                    error_codes::AUTH_FAILED,
                    "用户名或密码错误".to_string(),
                ),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("Failed to verify password: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response::<()>(
                    error_codes::INTERNAL_ERROR,
                    "校验密码失败".to_string(),
                ),
            )
                .into_response();
        }
    }

    let origin = client_origin(&headers, None);
    let claims = HashMap::from([("role".to_string(), serde_json::json!("user"))]);
    match issue_credentials(&state, jar, &user.username, claims, &origin) {
        Ok((jar, resp)) => (StatusCode::OK, jar, success_to_api_response(resp)).into_response(),
        Err(resp) => resp,
    }
}

#[axum::debug_handler]
pub async fn oauth_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Query(query): Query<OAuthCallbackQuery>,
) -> Response {
    let access_token = match state.oauth.get_access_token(&query.code).await {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("OAuth code exchange failed: {}", e);
            return (
                StatusCode::BAD_GATEWAY,
                error_to_api_response::<()>(
                    error_codes::OAUTH_FAILED,
                    "OAuth 授权码交换失败".to_string(),
                ),
            )
                .into_response();
        }
    };

    let user_info = match state.oauth.get_user_info(&access_token).await {
        Ok(info) => info,
        Err(e) => {
            tracing::error!("OAuth user info fetch failed: {}", e);
            return (
                StatusCode::BAD_GATEWAY,
                error_to_api_response::<()>(
                    error_codes::OAUTH_FAILED,
                    "获取 OAuth 用户信息失败".to_string(),
                ),
            )
                .into_response();
        }
    };

    // 以邮箱作为主体标识
    let subject = match user_info.get("email").and_then(|v| v.as_str()) {
        Some(email) => email.to_string(),
        None => {
            return (
                StatusCode::BAD_GATEWAY,
                error_to_api_response::<()>(
                    error_codes::OAUTH_FAILED,
                    "OAuth 用户信息缺少邮箱".to_string(),
                ),
            )
                .into_response();
        }
    };

    let mut claims = HashMap::from([("email".to_string(), serde_json::json!(subject))]);
    if let Some(name) = user_info.get("name") {
        claims.insert("name".to_string(), name.clone());
    }

    let origin = client_origin(&headers, None);
    match issue_credentials(&state, jar, &subject, claims, &origin) {
        Ok((jar, resp)) => (StatusCode::OK, jar, success_to_api_response(resp)).into_response(),
        Err(resp) => resp,
    }
}

#[axum::debug_handler]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    // 幂等：无论会话是否存在都返回成功
    if let Some(cookie) = jar.get(&state.auth.cookie_name) {
        state.auth.sessions.invalidate(cookie.value());
    }

    let removal = Cookie::build((state.auth.cookie_name.clone(), ""))
        .path("/")
        .build();
    let jar = jar.remove(removal);

    (StatusCode::OK, jar, success_to_api_response("已退出登录")).into_response()
}
