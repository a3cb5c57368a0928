// 认证核心模块
// 令牌签发/校验、会话存储、OAuth 令牌交换

pub mod oauth;
pub mod session;
pub mod token;

pub use oauth::OAuthClient;
pub use session::SessionStore;
pub use token::{Claims, TokenService};

use crate::config::Config;

/// 认证网关依赖的全部服务，启动时构造一次，显式注入
#[derive(Clone)]
pub struct AuthState {
    pub tokens: TokenService,
    pub sessions: SessionStore,
    pub cookie_name: String,
}

impl AuthState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            tokens: TokenService::new(&config.jwt_secret, config.jwt_expiration()),
            sessions: SessionStore::new(config.session_ttl()),
            cookie_name: config.session_cookie_name.clone(),
        }
    }
}
