use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // 主体（用户ID）
    pub iat: i64,    // 签发时间
    pub exp: i64,    // 过期时间
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// 无状态令牌服务
///
/// 签名密钥在进程启动时派生一次，随服务实例存活；重建实例（换密钥）
/// 会使所有已签发的令牌立即失效。过期为签发后的固定时长，不滑动。
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    expiration_secs: i64,
}

impl TokenService {
    pub fn new(secret: &str, expiration: Duration) -> Self {
        // 过期校验取绝对时间，不留余量
        let mut validation = Validation::default();
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expiration_secs: expiration.as_secs() as i64,
        }
    }

    pub fn issue(
        &self,
        subject: &str,
        extra: HashMap<String, serde_json::Value>,
    ) -> Result<(String, i64), jsonwebtoken::errors::Error> {
        self.issue_at(subject, extra, Utc::now())
    }

    pub fn issue_at(
        &self,
        subject: &str,
        extra: HashMap<String, serde_json::Value>,
        now: DateTime<Utc>,
    ) -> Result<(String, i64), jsonwebtoken::errors::Error> {
        let expiration = now.timestamp() + self.expiration_secs;
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: expiration,
            extra,
        };

        let token = encode(&Header::default(), &claims, &self.encoding)?;

        Ok((token, expiration))
    }

    /// 签名、结构或过期任一不满足即失败，失败原因不对外区分
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let token_data = decode::<Claims>(token, &self.decoding, &self.validation)?;

        Ok(token_data.claims)
    }

    pub fn is_valid(&self, token: &str) -> bool {
        self.verify(token).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn service() -> TokenService {
        TokenService::new("test-secret", Duration::from_secs(24 * 3600))
    }

    fn role_claims(role: &str) -> HashMap<String, serde_json::Value> {
        HashMap::from([("role".to_string(), serde_json::json!(role))])
    }

    #[test]
    fn issue_then_verify_returns_subject_and_claims() {
        let tokens = service();
        let (token, expires_at) = tokens.issue("alice", role_claims("admin")).unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.exp, expires_at);
        assert_eq!(claims.extra["role"], serde_json::json!("admin"));
        assert!(tokens.is_valid(&token));
    }

    #[test]
    fn token_expires_after_fixed_window() {
        let tokens = service();

        // 签发时间回拨到过期边界之外
        let issued = Utc::now() - TimeDelta::hours(25);
        let (token, _) = tokens.issue_at("alice", HashMap::new(), issued).unwrap();
        assert!(tokens.verify(&token).is_err());
        assert!(!tokens.is_valid(&token));

        // 窗口内仍然有效
        let issued = Utc::now() - TimeDelta::hours(23);
        let (token, _) = tokens.issue_at("alice", HashMap::new(), issued).unwrap();
        assert!(tokens.is_valid(&token));
    }

    #[test]
    fn token_signed_with_other_key_is_rejected() {
        let tokens = service();
        let other = TokenService::new("another-secret", Duration::from_secs(24 * 3600));

        let (token, _) = other.issue("alice", role_claims("admin")).unwrap();
        assert!(tokens.verify(&token).is_err());
    }

    #[test]
    fn malformed_token_is_rejected() {
        let tokens = service();
        assert!(!tokens.is_valid("not-a-jwt"));
        assert!(!tokens.is_valid(""));
    }
}
