//! ClassMate AI 前端应用
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `web::route` / `web::router`: 路由定义与 History API 路由服务
//! - `auth`: 会话解析与认证状态
//! - `store`: 全局应用状态（reducer + 辅助操作）
//! - `guard`: 路由守卫（渲染模式与重定向）
//! - `hooks`: 通用异步操作 Hook
//! - `api`: REST API 网关
//! - `components`: UI 组件层

#[macro_use]
mod log;

pub mod api;
mod auth;
mod components {
    pub mod assignments;
    pub mod callback;
    pub mod classes;
    pub mod dashboard;
    pub mod home;
    mod icons;
    pub mod layout;
    pub mod login;
    pub mod placeholder;
    pub mod toaster;
}
mod config;
pub mod error;
mod guard;
mod hooks;
mod notify;
mod store;

use std::rc::Rc;
use std::sync::Arc;

use leptos::prelude::*;

use crate::api::{ClassMateApi, provide_api};
use crate::auth::{HostedIdentityProvider, SessionResolver, init_auth, provide_auth};
use crate::components::assignments::AssignmentsPage;
use crate::components::callback::CallbackPage;
use crate::components::classes::ClassesPage;
use crate::components::dashboard::DashboardPage;
use crate::components::home::HomePage;
use crate::components::layout::AppLayout;
use crate::components::login::LoginPage;
use crate::components::placeholder::{ComingSoon, NotFound, PublicPlaceholder};
use crate::components::toaster::Toaster;
use crate::config::AppConfig;
use crate::notify::provide_effects;
use crate::store::provide_app_store;

// 浏览器 API 封装模块
// 传输、存储与路由都在 trait 之后，原生单元测试可以替换为内存实现。
pub mod web {
    mod http;
    pub mod route;
    pub mod router;
    mod storage;
    mod viewport;

    #[cfg(test)]
    pub use http::mock;
    pub use http::{FetchTransport, HttpBody, HttpError, HttpRequest, HttpResponse, HttpTransport};
    pub use router::hard_navigate;
    pub use storage::{KeyValueStore, LocalStorage, MemoryStorage, PreferenceStore, SharedStore};
    pub use viewport::use_viewport_width;
}

use web::route::AppRoute;
use web::router::{Router, RouterOutlet};
use web::{FetchTransport, LocalStorage, PreferenceStore, SharedStore};

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Home => view! { <HomePage /> }.into_any(),
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Signup | AppRoute::ForgotPassword => {
            view! { <PublicPlaceholder route=route /> }.into_any()
        }
        AppRoute::Callback => view! { <CallbackPage /> }.into_any(),
        AppRoute::Dashboard => view! { <DashboardPage /> }.into_any(),
        AppRoute::Classes => view! { <ClassesPage /> }.into_any(),
        AppRoute::Assignments => view! { <AssignmentsPage /> }.into_any(),
        AppRoute::Attendance | AppRoute::Grades | AppRoute::Calendar | AppRoute::Ai => {
            view! { <ComingSoon route=route /> }.into_any()
        }
        AppRoute::NotFound => view! { <NotFound /> }.into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    let config = AppConfig::load();
    let tokens: SharedStore = Arc::new(LocalStorage);

    // 1. 效果中心与应用状态（从偏好存储播种）
    provide_effects();
    provide_app_store(PreferenceStore::browser());

    // 2. API 网关与令牌存储共享
    provide_api(ClassMateApi::new(
        FetchTransport::new(config.request_timeout),
        &config.api_base_url,
        tokens.clone(),
    ));

    // 3. 认证上下文，后台解析初始会话
    let provider = HostedIdentityProvider::new(
        FetchTransport::new(config.request_timeout),
        config.auth.clone(),
    );
    let resolver = SessionResolver::new(Rc::new(provider), tokens, config.auth);
    init_auth(provide_auth(resolver));

    view! {
        <Router>
            <AppLayout>
                <RouterOutlet matcher=route_matcher />
            </AppLayout>
            <Toaster />
        </Router>
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::auth::session::mock::{MockProvider, session};
    use crate::config::{AuthConfig, TOKEN_KEY};
    use crate::components::dashboard::use_dashboard_stats;
    use crate::guard::{RenderMode, evaluate};
    use crate::hooks::OperationOptions;
    use crate::web::KeyValueStore;
    use crate::web::MemoryStorage;
    use crate::web::mock::MockTransport;

    const BASE: &str = "http://api.test";

    /// 未登录 → 被守卫拦截 → 登录 → 完整外壳 → 仪表盘数据入库 → 注销
    #[tokio::test]
    async fn sign_in_to_dashboard_and_out_again() {
        let owner = Owner::new();
        owner.set();
        provide_effects();
        let store = provide_app_store(PreferenceStore::new(Arc::new(MemoryStorage::new())));

        let tokens: SharedStore = Arc::new(MemoryStorage::new());
        let provider = Rc::new(MockProvider::default());
        let resolver = SessionResolver::new(provider.clone(), tokens.clone(), AuthConfig::new(""));
        let auth = provide_auth(resolver);

        // 首次解析前处于加载态
        let d = evaluate(
            auth.is_loading().get_untracked(),
            auth.is_authenticated().get_untracked(),
            "/dashboard",
        );
        assert_eq!(d.mode, RenderMode::Loading);

        auth.initialize().await;
        let d = evaluate(
            auth.is_loading().get_untracked(),
            auth.is_authenticated().get_untracked(),
            "/dashboard",
        );
        assert_eq!(d.mode, RenderMode::Bare);
        assert_eq!(d.redirect, Some("/login"));

        // 登录跳转，提供方完成 OAuth 后会话可用
        auth.login(None).await.unwrap();
        assert_eq!(provider.sign_in_calls.borrow().as_slice(), ["/dashboard"]);
        *provider.session.borrow_mut() = Some(session("u1", "tok-1"));

        auth.initialize().await;
        assert!(auth.is_authenticated().get_untracked());
        assert_eq!(tokens.get(TOKEN_KEY).as_deref(), Some("tok-1"));
        let d = evaluate(false, auth.is_authenticated().get_untracked(), "/dashboard");
        assert_eq!(d.mode, RenderMode::FullShell);

        // 仪表盘查询携带令牌，结果写入 store
        let http = MockTransport::new();
        http.mock_response(
            &format!("{}/api/dashboard/stats", BASE),
            200,
            json!({
                "success": true,
                "data": {
                    "totalClasses": 3,
                    "totalAssignments": 5,
                    "completedAssignments": 2,
                    "pendingAssignments": 3,
                    "overallAttendance": 97.0,
                    "overallGPA": 3.8,
                    "upcomingDeadlines": 1,
                    "aiSuggestions": 0
                }
            }),
        );
        let api = ClassMateApi::new(http.clone(), BASE, tokens.clone());
        let stats = use_dashboard_stats(api, store, OperationOptions::default().manual());
        stats.execute(()).await.unwrap();

        let sent = http.last_request().unwrap();
        assert_eq!(sent.header("Authorization"), Some("Bearer tok-1"));
        let snapshot = store.state().get_untracked().dashboard_stats.unwrap();
        assert_eq!(snapshot.total_classes, 3);

        // 注销：先清空 store，再通知提供方
        store.reset_app();
        auth.logout().await.unwrap();
        assert!(!auth.is_authenticated().get_untracked());
        assert_eq!(tokens.get(TOKEN_KEY), None);
        assert_eq!(store.state().get_untracked().dashboard_stats, None);
        assert_eq!(provider.sign_out_calls.borrow().as_slice(), ["/login"]);
    }
}
