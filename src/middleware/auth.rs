use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::AuthState;
use crate::utils::{error_codes, error_to_api_response};

/// 认证网关
///
/// 双通道或门：先查 Bearer 令牌，令牌有效立即放行（不再查会话）；
/// 令牌缺失或无效则回落到会话Cookie通道；两者皆不通过统一返回401。
/// 放行时请求原样透传给下游 handler。
pub async fn auth_middleware(
    State(auth): State<AuthState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let token_admitted = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|token| auth.tokens.is_valid(token))
        .unwrap_or(false);

    let admitted = token_admitted
        || CookieJar::from_headers(req.headers())
            .get(&auth.cookie_name)
            .map(|cookie| auth.sessions.is_valid(cookie.value()))
            .unwrap_or(false);

    if admitted {
        next.run(req).await
    } else {
        (
            StatusCode::UNAUTHORIZED,
            error_to_api_response::<()>(error_codes::AUTH_FAILED, "未授权访问".to_string()),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{SessionStore, TokenService};
    use axum::{Router, routing::get};
    use std::collections::HashMap;
    use std::time::Duration;
    use tower::util::ServiceExt;

    const COOKIE: &str = "SESSION_ID";

    fn auth_state() -> AuthState {
        AuthState {
            tokens: TokenService::new("gateway-test-secret", Duration::from_secs(24 * 3600)),
            sessions: SessionStore::new(Duration::from_secs(1800)),
            cookie_name: COOKIE.to_string(),
        }
    }

    fn protected_app(auth: AuthState) -> Router {
        Router::new()
            .route("/api/protected", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn_with_state(auth, auth_middleware))
    }

    async fn request(auth: &AuthState, token: Option<&str>, session: Option<&str>) -> StatusCode {
        let mut builder = Request::builder().uri("/api/protected");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        if let Some(sid) = session {
            builder = builder.header("Cookie", format!("{}={}", COOKIE, sid));
        }
        let req = builder.body(Body::empty()).unwrap();

        protected_app(auth.clone())
            .oneshot(req)
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn admits_iff_token_or_session_is_valid() {
        let auth = auth_state();
        let (token, _) = auth.tokens.issue("alice", HashMap::new()).unwrap();
        let sid = auth.sessions.create("alice", "test");

        // 令牌×会话全组合：任一通道有效即放行，否则拒绝
        let cases = [
            (Some(token.as_str()), Some(sid.as_str()), StatusCode::OK),
            (Some(token.as_str()), Some("bogus"), StatusCode::OK),
            (Some(token.as_str()), None, StatusCode::OK),
            (Some("bad-token"), Some(sid.as_str()), StatusCode::OK),
            (Some("bad-token"), Some("bogus"), StatusCode::UNAUTHORIZED),
            (Some("bad-token"), None, StatusCode::UNAUTHORIZED),
            (None, Some(sid.as_str()), StatusCode::OK),
            (None, Some("bogus"), StatusCode::UNAUTHORIZED),
            (None, None, StatusCode::UNAUTHORIZED),
        ];

        for (token, session, expected) in cases {
            assert_eq!(
                request(&auth, token, session).await,
                expected,
                "token={:?} session={:?}",
                token,
                session
            );
        }
    }

    #[tokio::test]
    async fn invalid_bearer_falls_through_to_session() {
        let auth = auth_state();
        let sid = auth.sessions.create("alice", "test");

        // 过期令牌 + 有效会话：令牌通道失败不否决会话通道
        let expired = {
            let issued = chrono::Utc::now() - chrono::TimeDelta::hours(25);
            auth.tokens
                .issue_at("alice", HashMap::new(), issued)
                .unwrap()
                .0
        };
        assert_eq!(
            request(&auth, Some(&expired), Some(&sid)).await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn logout_invalidates_session_but_not_outstanding_token() {
        let auth = auth_state();
        let (token, _) = auth.tokens.issue("alice", HashMap::new()).unwrap();
        let sid = auth.sessions.create("alice", "test");

        assert_eq!(request(&auth, None, Some(&sid)).await, StatusCode::OK);

        auth.sessions.invalidate(&sid);

        // 会话已失效，令牌在到期前仍然独立有效
        assert_eq!(
            request(&auth, None, Some(&sid)).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(request(&auth, Some(&token), None).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn header_without_bearer_prefix_disables_token_path() {
        let auth = auth_state();
        let (token, _) = auth.tokens.issue("alice", HashMap::new()).unwrap();

        let req = Request::builder()
            .uri("/api/protected")
            .header("Authorization", token)
            .body(Body::empty())
            .unwrap();
        let status = protected_app(auth.clone())
            .oneshot(req)
            .await
            .unwrap()
            .status();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
