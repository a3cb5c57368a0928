use std::env;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_secs: u64,
    pub session_ttl_secs: u64,
    pub session_sweep_interval_secs: u64,
    pub session_cookie_name: String,
    pub api_base_uri: String,
    pub server_host: String,
    pub server_port: u16,
    pub oauth_token_url: String,
    pub oauth_userinfo_url: String,
    pub oauth_client_id: String,
    pub oauth_client_secret: String,
    pub oauth_redirect_uri: String,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        // 令牌有效期固定为24小时，会话默认30分钟滑动窗口
        let jwt_expiration = env::var("JWT_EXPIRATION")
            .unwrap_or_default()
            .trim_end_matches('h')
            .parse::<u64>()
            .unwrap_or(24);
        let session_ttl = env::var("SESSION_TTL")
            .unwrap_or_default()
            .trim_end_matches('m')
            .parse::<u64>()
            .unwrap_or(30);
        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_expiration_secs: jwt_expiration * 3600,
            session_ttl_secs: session_ttl * 60,
            session_sweep_interval_secs: env::var("SESSION_SWEEP_INTERVAL")
                .unwrap_or_default()
                .parse()
                .unwrap_or(60),
            session_cookie_name: env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| "SESSION_ID".into()),
            api_base_uri: env::var("API_BASE_URI").unwrap_or_else(|_| "/api".into()),
            server_host: env::var("SERVER_HOST")?,
            server_port: env::var("SERVER_PORT")?.parse().unwrap_or(3000),
            oauth_token_url: env::var("OAUTH_TOKEN_URL").unwrap_or_default(),
            oauth_userinfo_url: env::var("OAUTH_USERINFO_URL").unwrap_or_default(),
            oauth_client_id: env::var("OAUTH_CLIENT_ID").unwrap_or_default(),
            oauth_client_secret: env::var("OAUTH_CLIENT_SECRET").unwrap_or_default(),
            oauth_redirect_uri: env::var("OAUTH_REDIRECT_URI").unwrap_or_default(),
        })
    }

    pub fn jwt_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_expiration_secs)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn session_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.session_sweep_interval_secs)
    }
}
