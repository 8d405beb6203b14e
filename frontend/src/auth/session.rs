//! 会话解析
//!
//! - [`IdentityProvider`]: 身份提供方会话原语（读取会话、发起登录、注销）
//! - [`HostedIdentityProvider`]: 基于 HTTP 会话端点的实现
//! - [`SessionResolver`]: 把提供方会话规范化为 `{user, is_loading, is_authenticated}`，
//!   并把访问令牌镜像到本地存储供 API 网关使用

use std::rc::Rc;

use chrono::{DateTime, Utc};
use classmate_shared::User;
use classmate_shared::protocol::HttpMethod;
use serde::Deserialize;

use crate::config::{AuthConfig, TOKEN_KEY};
use crate::error::{ClientError, ClientResult};
use crate::web::{HttpRequest, HttpTransport, SharedStore, hard_navigate};

// =========================================================
// 提供方会话 (Provider Session)
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProviderUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// 提供方签发的会话
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSession {
    #[serde(default)]
    pub user: Option<ProviderUser>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires: Option<String>,
}

impl ProviderSession {
    /// 解析会话端点的响应体；`null`、空体或空对象表示无会话
    pub fn parse(body: &str) -> ClientResult<Option<Self>> {
        let body = body.trim();
        if body.is_empty() || body == "null" {
            return Ok(None);
        }
        let session: Self = serde_json::from_str(body)?;
        if session == Self::default() {
            return Ok(None);
        }
        Ok(Some(session))
    }
}

/// 从会话派生用户
///
/// 需要用户块与非空的 `userId`，否则视为未认证。
/// 同一 id 再次解析时保留之前的 `created_at`。
pub fn derive_user(
    session: &ProviderSession,
    previous: Option<&User>,
    now: DateTime<Utc>,
) -> Option<User> {
    let profile = session.user.as_ref()?;
    let id = session.user_id.as_deref().filter(|id| !id.is_empty())?;

    let created_at = previous
        .filter(|u| u.id == id)
        .map(|u| u.created_at)
        .unwrap_or(now);

    Some(User {
        id: id.to_string(),
        email: profile.email.clone().unwrap_or_default(),
        name: profile.name.clone().unwrap_or_default(),
        avatar: profile.image.clone(),
        created_at,
    })
}

/// 提供方当前的会话快照
#[derive(Debug, Clone, PartialEq)]
pub enum SessionSnapshot {
    /// 尚未得到确定答复
    Pending,
    Resolved(Option<ProviderSession>),
}

/// 规范化的会话视图
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub user: Option<User>,
    pub is_loading: bool,
    pub is_authenticated: bool,
}

/// 从快照派生会话视图
pub fn resolve(
    snapshot: &SessionSnapshot,
    previous: Option<&User>,
    now: DateTime<Utc>,
) -> SessionView {
    match snapshot {
        SessionSnapshot::Pending => SessionView {
            user: None,
            is_loading: true,
            is_authenticated: false,
        },
        SessionSnapshot::Resolved(session) => {
            let user = session
                .as_ref()
                .and_then(|s| derive_user(s, previous, now));
            SessionView {
                is_authenticated: user.is_some(),
                user,
                is_loading: false,
            }
        }
    }
}

// =========================================================
// 身份提供方 (Identity Provider)
// =========================================================

#[async_trait::async_trait(?Send)]
pub trait IdentityProvider {
    /// 读取当前会话，`None` 表示未登录
    async fn fetch_session(&self) -> ClientResult<Option<ProviderSession>>;
    /// 发起 OAuth 授权流程，完成后回到 `callback_url`
    async fn sign_in(&self, callback_url: &str) -> ClientResult<()>;
    /// 结束会话并跳转到 `callback_url`
    async fn sign_out(&self, callback_url: &str) -> ClientResult<()>;
}

/// 整页跳转函数
pub type Redirect = Rc<dyn Fn(&str) -> ClientResult<()>>;

fn browser_redirect() -> Redirect {
    Rc::new(|url: &str| hard_navigate(url).map_err(ClientError::provider))
}

/// 托管的身份服务（会话端点 + OAuth 跳转）
pub struct HostedIdentityProvider<C: HttpTransport> {
    http: C,
    config: AuthConfig,
    redirect: Redirect,
}

impl<C: HttpTransport> HostedIdentityProvider<C> {
    pub fn new(http: C, config: AuthConfig) -> Self {
        Self::with_redirect(http, config, browser_redirect())
    }

    pub fn with_redirect(http: C, config: AuthConfig, redirect: Redirect) -> Self {
        Self {
            http,
            config,
            redirect,
        }
    }

    /// 登录跳转地址
    pub fn sign_in_url(&self, callback_url: &str) -> String {
        format!(
            "{}?callbackUrl={}&scope={}",
            self.config.signin_url,
            urlencoding::encode(callback_url),
            urlencoding::encode(&self.config.scopes.join(" "))
        )
    }
}

#[async_trait::async_trait(?Send)]
impl<C: HttpTransport> IdentityProvider for HostedIdentityProvider<C> {
    async fn fetch_session(&self) -> ClientResult<Option<ProviderSession>> {
        let req = HttpRequest::new(&self.config.session_url, HttpMethod::Get)
            .with_header("Accept", "application/json");
        let resp = self
            .http
            .send(req)
            .await
            .map_err(|e| ClientError::from(e).in_op("auth.fetch_session"))?;

        if !resp.ok() {
            return Err(ClientError::provider(format!(
                "Session request failed with status {}",
                resp.status
            ))
            .with_status(resp.status)
            .in_op("auth.fetch_session"));
        }

        ProviderSession::parse(&resp.body).map_err(|e| e.in_op("auth.fetch_session"))
    }

    async fn sign_in(&self, callback_url: &str) -> ClientResult<()> {
        let url = self.sign_in_url(callback_url);
        (self.redirect)(&url).map_err(|e| e.in_op("auth.sign_in"))
    }

    async fn sign_out(&self, callback_url: &str) -> ClientResult<()> {
        let body = serde_json::json!({ "callbackUrl": callback_url }).to_string();
        let req = HttpRequest::new(&self.config.signout_url, HttpMethod::Post)
            .with_header("Content-Type", "application/json")
            .with_json(body);
        let resp = self
            .http
            .send(req)
            .await
            .map_err(|e| ClientError::from(e).in_op("auth.sign_out"))?;

        if !resp.ok() {
            return Err(ClientError::provider(format!(
                "Sign-out failed with status {}",
                resp.status
            ))
            .with_status(resp.status)
            .in_op("auth.sign_out"));
        }

        (self.redirect)(callback_url).map_err(|e| e.in_op("auth.sign_out"))
    }
}

// =========================================================
// 会话解析器 (Session Resolver)
// =========================================================

#[derive(Clone)]
pub struct SessionResolver {
    provider: Rc<dyn IdentityProvider>,
    tokens: SharedStore,
    config: AuthConfig,
}

impl SessionResolver {
    pub fn new(provider: Rc<dyn IdentityProvider>, tokens: SharedStore, config: AuthConfig) -> Self {
        Self {
            provider,
            tokens,
            config,
        }
    }

    /// 向提供方查询会话并派生视图，同时同步本地令牌
    pub async fn load(&self, previous: Option<&User>) -> ClientResult<SessionView> {
        let session = self.provider.fetch_session().await?;
        self.mirror_token(session.as_ref());
        Ok(resolve(
            &SessionSnapshot::Resolved(session),
            previous,
            Utc::now(),
        ))
    }

    /// 发起登录，默认回到登录后首页
    pub async fn login(&self, redirect_target: Option<&str>) -> ClientResult<()> {
        let target = redirect_target.unwrap_or(&self.config.home_after_login);
        self.provider.sign_in(target).await.map_err(|e| {
            log_error!("[Auth] Login failed: {}", e.diagnostic());
            e.in_op("auth.login")
        })
    }

    /// 注销：先清理本地令牌，再通知提供方；提供方失败仍返回错误
    pub async fn logout(&self) -> ClientResult<()> {
        self.tokens.remove(TOKEN_KEY);
        self.provider
            .sign_out(&self.config.login_path)
            .await
            .map_err(|e| {
                log_error!("[Auth] Logout failed: {}", e.diagnostic());
                e.in_op("auth.logout")
            })
    }

    /// 尽力刷新用户：没有令牌时不做任何事，失败只记录日志
    ///
    /// 返回刷新后应持有的用户。
    pub async fn refresh_user(&self, current: Option<&User>) -> Option<User> {
        if self.tokens.get(TOKEN_KEY).is_none() {
            return current.cloned();
        }
        match self.load(current).await {
            Ok(view) => view.user,
            Err(e) => {
                log_warn!("[Auth] Failed to refresh user: {}", e.diagnostic());
                current.cloned()
            }
        }
    }

    fn mirror_token(&self, session: Option<&ProviderSession>) {
        match session.and_then(|s| s.access_token.as_deref()) {
            Some(token) => {
                self.tokens.set(TOKEN_KEY, token);
            }
            None => {
                self.tokens.remove(TOKEN_KEY);
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::sync::Arc;

    use chrono::TimeZone;

    use super::mock::{MockProvider, session};
    use super::*;
    use crate::web::mock::MockTransport;
    use crate::web::{KeyValueStore, MemoryStorage};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn resolver(provider: MockProvider) -> (Rc<MockProvider>, Arc<MemoryStorage>, SessionResolver) {
        let provider = Rc::new(provider);
        let tokens = Arc::new(MemoryStorage::new());
        let resolver = SessionResolver::new(
            provider.clone(),
            tokens.clone(),
            AuthConfig::new(""),
        );
        (provider, tokens, resolver)
    }

    #[test]
    fn session_without_user_block_is_unauthenticated() {
        let s = ProviderSession {
            user_id: Some("u1".into()),
            access_token: Some("t".into()),
            ..Default::default()
        };
        let view = resolve(&SessionSnapshot::Resolved(Some(s)), None, at(0));
        assert!(!view.is_authenticated);
        assert!(!view.is_loading);
        assert_eq!(view.user, None);
    }

    #[test]
    fn session_without_user_id_is_unauthenticated() {
        let mut s = session("", "t");
        assert_eq!(derive_user(&s, None, at(0)), None);
        s.user_id = None;
        assert_eq!(derive_user(&s, None, at(0)), None);
    }

    #[test]
    fn pending_snapshot_is_loading() {
        let view = resolve(&SessionSnapshot::Pending, None, at(0));
        assert!(view.is_loading);
        assert!(!view.is_authenticated);
    }

    #[test]
    fn created_at_is_kept_for_same_user() {
        let s = session("u1", "t");
        let first = derive_user(&s, None, at(100)).unwrap();
        let again = derive_user(&s, Some(&first), at(500)).unwrap();
        assert_eq!(again.created_at, at(100));

        let other = derive_user(&session("u2", "t"), Some(&first), at(500)).unwrap();
        assert_eq!(other.created_at, at(500));
    }

    #[test]
    fn empty_session_bodies_mean_no_session() {
        assert_eq!(ProviderSession::parse("").unwrap(), None);
        assert_eq!(ProviderSession::parse("null").unwrap(), None);
        assert_eq!(ProviderSession::parse("{}").unwrap(), None);

        let parsed = ProviderSession::parse(
            r#"{"user":{"name":"Ada","email":"ada@example.com","image":"https://img"},"userId":"u1","accessToken":"tok","expires":"2030-01-01T00:00:00.000Z"}"#,
        )
        .unwrap()
        .unwrap();
        assert_eq!(parsed.access_token.as_deref(), Some("tok"));
        let user = derive_user(&parsed, None, at(0)).unwrap();
        assert_eq!(user.avatar.as_deref(), Some("https://img"));
    }

    #[tokio::test]
    async fn load_mirrors_and_clears_token() {
        let (provider, tokens, resolver) = resolver(MockProvider::signed_in("u1", "tok-1"));

        let view = resolver.load(None).await.unwrap();
        assert!(view.is_authenticated);
        assert_eq!(tokens.get(TOKEN_KEY).as_deref(), Some("tok-1"));

        *provider.session.borrow_mut() = None;
        let view = resolver.load(view.user.as_ref()).await.unwrap();
        assert!(!view.is_authenticated);
        assert_eq!(tokens.get(TOKEN_KEY), None);
    }

    #[tokio::test]
    async fn login_defaults_to_dashboard() {
        let (provider, _, resolver) = resolver(MockProvider::default());
        resolver.login(None).await.unwrap();
        resolver.login(Some("/classes")).await.unwrap();
        assert_eq!(
            *provider.sign_in_calls.borrow(),
            vec!["/dashboard".to_string(), "/classes".to_string()]
        );
    }

    #[tokio::test]
    async fn login_failure_is_surfaced() {
        let provider = MockProvider::default();
        *provider.fail_sign_in.borrow_mut() = true;
        let (_, _, resolver) = resolver(provider);

        let err = resolver.login(None).await.unwrap_err();
        assert_eq!(err.message(), "popup blocked");
    }

    #[tokio::test]
    async fn logout_clears_token_even_when_provider_fails() {
        let provider = MockProvider::signed_in("u1", "tok");
        *provider.fail_sign_out.borrow_mut() = true;
        let (provider, tokens, resolver) = resolver(provider);
        resolver.load(None).await.unwrap();

        assert!(resolver.logout().await.is_err());
        assert_eq!(tokens.get(TOKEN_KEY), None);
        assert_eq!(*provider.sign_out_calls.borrow(), vec!["/login".to_string()]);
    }

    #[tokio::test]
    async fn refresh_without_token_is_noop() {
        let (provider, _, resolver) = resolver(MockProvider::default());
        *provider.fail_fetch.borrow_mut() = true;

        let current = derive_user(&session("u1", "t"), None, at(0));
        let refreshed = resolver.refresh_user(current.as_ref()).await;
        assert_eq!(refreshed, current);
    }

    #[tokio::test]
    async fn hosted_provider_reads_session_endpoint() {
        let http = MockTransport::new();
        http.mock_response(
            "/api/auth/session",
            200,
            serde_json::json!({"user": {"name": "Ada"}, "userId": "u1", "accessToken": "tok"}),
        );
        let provider = HostedIdentityProvider::new(http.clone(), AuthConfig::new(""));

        let session = provider.fetch_session().await.unwrap().unwrap();
        assert_eq!(session.user_id.as_deref(), Some("u1"));
        assert_eq!(http.last_request().unwrap().method, HttpMethod::Get);
    }

    #[tokio::test]
    async fn hosted_provider_session_error_is_provider_error() {
        let http = MockTransport::new();
        http.mock_raw("/api/auth/session", 500, "oops");
        let provider = HostedIdentityProvider::new(http, AuthConfig::new(""));

        let err = provider.fetch_session().await.unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Provider);
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn hosted_provider_redirects_through_sign_in_endpoint() {
        let visited = Rc::new(RefCell::new(Vec::<String>::new()));
        let sink = visited.clone();
        let redirect: Redirect = Rc::new(move |url: &str| {
            sink.borrow_mut().push(url.to_string());
            Ok(())
        });

        let http = MockTransport::new();
        http.mock_response("/api/auth/signout", 200, serde_json::json!({}));
        let provider =
            HostedIdentityProvider::with_redirect(http.clone(), AuthConfig::new(""), redirect);

        provider.sign_in("/dashboard").await.unwrap();
        provider.sign_out("/login").await.unwrap();

        let visited = visited.borrow();
        assert!(visited[0].starts_with("/api/auth/signin/google?callbackUrl=%2Fdashboard&scope=openid%20email%20profile"));
        assert_eq!(visited[1], "/login");

        let req = http.last_request().unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.header("content-type"), Some("application/json"));
    }
}
