//! 认证上下文
//!
//! 把会话解析器的视图组合为全局共享的认证状态。额外的“已初始化”标记
//! 只从 false 翻转到 true 一次，保证首次解析完成前不会出现“未认证”的误报。

use leptos::prelude::*;
use leptos::reactive::owner::LocalStorage;
use leptos::task::spawn_local;

use classmate_shared::User;

use super::session::{SessionResolver, SessionView};
use crate::error::ClientResult;

/// 认证状态
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    /// 解析器是否仍在等待提供方答复
    resolver_loading: bool,
    initialized: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            resolver_loading: true,
            initialized: false,
        }
    }
}

impl AuthState {
    pub fn is_loading(&self) -> bool {
        self.resolver_loading || !self.initialized
    }

    /// 加载期间从不报告已认证
    pub fn is_authenticated(&self) -> bool {
        !self.is_loading() && self.user.is_some()
    }

    /// 应用解析器的最新视图
    pub fn apply(&mut self, view: SessionView) {
        self.resolver_loading = view.is_loading;
        self.user = view.user;
        if !view.is_loading {
            self.initialized = true;
        }
    }

    /// 提供方失败：回退为未登录，交由路由守卫重定向
    pub fn fail(&mut self) {
        self.user = None;
        self.resolver_loading = false;
        self.initialized = true;
    }

    pub fn sign_out(&mut self) {
        self.user = None;
    }
}

/// 认证上下文
///
/// 应用级单例，通过 Context 共享。
#[derive(Clone, Copy)]
pub struct AuthContext {
    state: RwSignal<AuthState>,
    resolver: StoredValue<SessionResolver, LocalStorage>,
}

impl AuthContext {
    pub fn new(resolver: SessionResolver) -> Self {
        Self {
            state: RwSignal::new(AuthState::default()),
            resolver: StoredValue::new_local(resolver),
        }
    }

    pub fn state(&self) -> ReadSignal<AuthState> {
        self.state.read_only()
    }

    pub fn user(&self) -> Signal<Option<User>> {
        let state = self.state;
        Signal::derive(move || state.with(|s| s.user.clone()))
    }

    pub fn is_loading(&self) -> Signal<bool> {
        let state = self.state;
        Signal::derive(move || state.with(|s| s.is_loading()))
    }

    pub fn is_authenticated(&self) -> Signal<bool> {
        let state = self.state;
        Signal::derive(move || state.with(|s| s.is_authenticated()))
    }

    /// 首次解析会话
    pub async fn initialize(&self) {
        let resolver = self.resolver.get_value();
        match resolver.load(None).await {
            Ok(view) => {
                log_info!("[Auth] Session resolved, authenticated: {}", view.is_authenticated);
                self.state.try_update(|s| s.apply(view));
            }
            Err(e) => {
                log_error!("[Auth] Session resolution failed: {}", e.diagnostic());
                self.state.try_update(|s| s.fail());
            }
        }
    }

    /// 发起登录跳转，失败时由调用方展示错误
    pub async fn login(&self, redirect_target: Option<String>) -> ClientResult<()> {
        let resolver = self.resolver.get_value();
        resolver.login(redirect_target.as_deref()).await
    }

    /// 注销：本地状态总是被清除，提供方错误仍返回给调用方
    pub async fn logout(&self) -> ClientResult<()> {
        self.state.update(|s| s.sign_out());
        let resolver = self.resolver.get_value();
        resolver.logout().await
    }

    /// 尽力刷新当前用户，不会返回错误
    pub async fn refresh_user(&self) {
        let resolver = self.resolver.get_value();
        let current = self.state.with_untracked(|s| s.user.clone());
        let refreshed = resolver.refresh_user(current.as_ref()).await;
        self.state.try_update(|s| s.user = refreshed);
    }
}

/// 创建认证上下文并提供到 Context
pub fn provide_auth(resolver: SessionResolver) -> AuthContext {
    let ctx = AuthContext::new(resolver);
    provide_context(ctx);
    ctx
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

/// 后台解析初始会话
pub fn init_auth(ctx: AuthContext) {
    spawn_local(async move {
        ctx.initialize().await;
    });
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;
    use std::sync::Arc;

    use super::*;
    use crate::auth::session::mock::MockProvider;
    use crate::config::{AuthConfig, TOKEN_KEY};
    use crate::web::{KeyValueStore, MemoryStorage};

    fn context(provider: MockProvider) -> (Owner, Rc<MockProvider>, Arc<MemoryStorage>, AuthContext) {
        let owner = Owner::new();
        owner.set();
        let provider = Rc::new(provider);
        let tokens = Arc::new(MemoryStorage::new());
        let resolver = SessionResolver::new(provider.clone(), tokens.clone(), AuthConfig::new(""));
        (owner, provider, tokens, AuthContext::new(resolver))
    }

    #[test]
    fn initial_state_is_loading_not_unauthenticated() {
        let state = AuthState::default();
        assert!(state.is_loading());
        assert!(!state.is_authenticated());
    }

    #[test]
    fn loading_view_never_reports_authenticated() {
        let mut state = AuthState::default();
        state.user = Some(User {
            id: "u1".into(),
            email: String::new(),
            name: String::new(),
            avatar: None,
            created_at: chrono::Utc::now(),
        });
        assert!(!state.is_authenticated());
    }

    #[test]
    fn initialized_flag_flips_once() {
        let mut state = AuthState::default();
        state.apply(SessionView {
            user: None,
            is_loading: false,
            is_authenticated: false,
        });
        assert!(state.initialized);
        assert!(!state.is_loading());

        // 之后的加载中视图不会撤销初始化
        state.apply(SessionView {
            user: None,
            is_loading: true,
            is_authenticated: false,
        });
        assert!(state.initialized);
        assert!(state.is_loading());
    }

    #[tokio::test]
    async fn initialize_resolves_user() {
        let (_owner, _, tokens, ctx) = context(MockProvider::signed_in("u1", "tok"));
        assert!(ctx.is_loading().get_untracked());

        ctx.initialize().await;

        assert!(!ctx.is_loading().get_untracked());
        assert!(ctx.is_authenticated().get_untracked());
        assert_eq!(ctx.user().get_untracked().map(|u| u.id), Some("u1".to_string()));
        assert_eq!(tokens.get(TOKEN_KEY).as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn provider_failure_falls_back_to_signed_out() {
        let provider = MockProvider::signed_in("u1", "tok");
        *provider.fail_fetch.borrow_mut() = true;
        let (_owner, _, _, ctx) = context(provider);

        ctx.initialize().await;

        let state = ctx.state().get_untracked();
        assert!(!state.is_loading());
        assert!(!state.is_authenticated());
        assert_eq!(state.user, None);
    }

    #[tokio::test]
    async fn logout_clears_user_even_on_provider_error() {
        let provider = MockProvider::signed_in("u1", "tok");
        *provider.fail_sign_out.borrow_mut() = true;
        let (_owner, _, tokens, ctx) = context(provider);
        ctx.initialize().await;

        let result = ctx.logout().await;

        assert!(result.is_err());
        assert!(!ctx.is_authenticated().get_untracked());
        assert_eq!(tokens.get(TOKEN_KEY), None);
    }

    #[tokio::test]
    async fn refresh_user_picks_up_profile_changes() {
        let (_owner, provider, _, ctx) = context(MockProvider::signed_in("u1", "tok"));
        ctx.initialize().await;
        let created = ctx.user().get_untracked().unwrap().created_at;

        if let Some(session) = provider.session.borrow_mut().as_mut() {
            if let Some(user) = session.user.as_mut() {
                user.name = Some("Ada Lovelace".into());
            }
        }
        ctx.refresh_user().await;

        let user = ctx.user().get_untracked().unwrap();
        assert_eq!(user.name, "Ada Lovelace");
        assert_eq!(user.created_at, created);
    }
}
