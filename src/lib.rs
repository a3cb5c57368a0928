use sqlx::PgPool;

use auth::{AuthState, OAuthClient};
use config::Config;

pub mod auth;
pub mod config;
pub mod middleware;
pub mod utils;

pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub auth: AuthState,
    pub oauth: OAuthClient,
}
