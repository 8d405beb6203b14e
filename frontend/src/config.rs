//! 运行时配置
//!
//! 所有可调参数集中于此。构建时可通过环境变量覆盖默认值（`option_env!`），
//! 例如 `CLASSMATE_API_URL=https://api.example.com trunk build`。

use std::time::Duration;

/// 这些是默认值，如果构建环境中没有定义对应变量，则使用这些值
const DEFAULT_API_URL: &str = "http://localhost:5000";
/// 空字符串表示与前端同源
const DEFAULT_AUTH_URL: &str = "";

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// 视口宽度小于该值时进入移动端布局
pub const MOBILE_BREAKPOINT_PX: f64 = 768.0;
pub const TOAST_DURATION_MS: u32 = 4000;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_AFTER_LOGIN: &str = "/dashboard";

pub const TOKEN_KEY: &str = "auth-token";
pub const PREFERENCES_KEY: &str = "user-preferences";
pub const SIDEBAR_KEY: &str = "sidebar-collapsed";

/// OAuth 授权范围：基础资料 + Classroom 只读 + 日历
pub const OAUTH_SCOPES: &[&str] = &[
    "openid",
    "email",
    "profile",
    "https://www.googleapis.com/auth/classroom.readonly",
    "https://www.googleapis.com/auth/calendar",
];

/// 身份服务端点配置
#[derive(Debug, Clone, PartialEq)]
pub struct AuthConfig {
    /// 返回当前会话 JSON 的端点
    pub session_url: String,
    /// 发起 OAuth 授权码流程的端点
    pub signin_url: String,
    pub signout_url: String,
    pub login_path: String,
    pub home_after_login: String,
    pub scopes: Vec<String>,
}

impl AuthConfig {
    pub fn new(auth_base: &str) -> Self {
        let base = auth_base.trim_end_matches('/');
        Self {
            session_url: format!("{}/api/auth/session", base),
            signin_url: format!("{}/api/auth/signin/google", base),
            signout_url: format!("{}/api/auth/signout", base),
            login_path: LOGIN_PATH.to_string(),
            home_after_login: HOME_AFTER_LOGIN.to_string(),
            scopes: OAUTH_SCOPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub auth: AuthConfig,
}

impl AppConfig {
    /// 读取构建时变量，缺失时使用默认值
    pub fn load() -> Self {
        Self::from_values(
            option_env!("CLASSMATE_API_URL").unwrap_or(DEFAULT_API_URL),
            option_env!("CLASSMATE_AUTH_URL").unwrap_or(DEFAULT_AUTH_URL),
        )
    }

    pub fn from_values(api_url: &str, auth_url: &str) -> Self {
        Self {
            api_base_url: api_url.trim_end_matches('/').to_string(),
            request_timeout: REQUEST_TIMEOUT,
            auth: AuthConfig::new(auth_url),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_values(DEFAULT_API_URL, DEFAULT_AUTH_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_trimmed() {
        let config = AppConfig::from_values("https://api.example.com/", "https://auth.example.com/");
        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(
            config.auth.session_url,
            "https://auth.example.com/api/auth/session"
        );
    }

    #[test]
    fn same_origin_auth_uses_relative_endpoints() {
        let config = AppConfig::default();
        assert_eq!(config.auth.signin_url, "/api/auth/signin/google");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(config.auth.scopes.iter().any(|s| s.contains("classroom")));
    }
}
