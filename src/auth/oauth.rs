use std::collections::HashMap;

use crate::config::Config;

/// OAuth 令牌交换失败
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("OAuth request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("missing `{0}` in OAuth provider response")]
    MissingField(&'static str),
}

/// 外部 OAuth 协作方：授权码换取访问令牌，再拉取用户信息
#[derive(Clone)]
pub struct OAuthClient {
    http: reqwest::Client,
    token_url: String,
    userinfo_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl OAuthClient {
    pub fn from_config(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            token_url: config.oauth_token_url.clone(),
            userinfo_url: config.oauth_userinfo_url.clone(),
            client_id: config.oauth_client_id.clone(),
            client_secret: config.oauth_client_secret.clone(),
            redirect_uri: config.oauth_redirect_uri.clone(),
        }
    }

    pub async fn get_access_token(&self, code: &str) -> Result<String, OAuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("redirect_uri", &self.redirect_uri),
        ];

        let resp: serde_json::Value = self
            .http
            .post(&self.token_url)
            .form(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        resp.get("access_token")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or(OAuthError::MissingField("access_token"))
    }

    pub async fn get_user_info(
        &self,
        access_token: &str,
    ) -> Result<HashMap<String, serde_json::Value>, OAuthError> {
        let user_info = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(user_info)
    }
}
