//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，实现高内聚：
//! 所有对 window.history / window.location 的操作都集中在此模块。
//! 路由服务本身不做认证判断，访问控制由布局守卫（`guard`）负责。

use leptos::prelude::*;
use wasm_bindgen::prelude::*;

use super::route::AppRoute;

/// 浏览器地址（路径 + 查询串）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub path: String,
    /// 不含 `?` 的查询串
    pub search: String,
}

impl Location {
    /// 拆分相对 URL，例如 `/login?error=x` -> (`/login`, `error=x`)
    pub fn parse(url: &str) -> Self {
        let url = url.split('#').next().unwrap_or_default();
        let (path, search) = match url.split_once('?') {
            Some((path, search)) => (path, search),
            None => (url, ""),
        };
        let path = if path.is_empty() { "/" } else { path };
        Self {
            path: path.to_string(),
            search: search.to_string(),
        }
    }

    pub fn route(&self) -> AppRoute {
        AppRoute::from_path(&self.path)
    }

    /// 获取解码后的查询参数（首个匹配）
    pub fn query(&self, name: &str) -> Option<String> {
        self.search
            .split('&')
            .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
            .find(|(k, _)| *k == name)
            .map(|(_, v)| {
                let v = v.replace('+', " ");
                urlencoding::decode(&v)
                    .map(|s| s.into_owned())
                    .unwrap_or(v)
            })
    }
}

/// 获取当前浏览器地址
fn current_location() -> Location {
    let Some(location) = web_sys::window().map(|w| w.location()) else {
        return Location::parse("/");
    };
    let path = location.pathname().unwrap_or_else(|_| "/".to_string());
    let search = location.search().unwrap_or_default();
    Location {
        path,
        search: search.trim_start_matches('?').to_string(),
    }
}

/// 推送 History 状态（内部工具函数）
fn push_history_state(url: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(url));
        }
    }
}

/// 替换 History 状态（内部工具函数，用于重定向）
fn replace_history_state(url: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(url));
        }
    }
}

/// 整页跳转（离开单页应用，如 OAuth 重定向、401 处理）
pub fn hard_navigate(url: &str) -> Result<(), String> {
    let window = web_sys::window().ok_or_else(|| "window is not available".to_string())?;
    window
        .location()
        .set_href(url)
        .map_err(|e| format!("{:?}", e))
}

/// 路由器服务
///
/// 封装所有路由操作，通过 Signal 驱动界面更新。
#[derive(Clone, Copy)]
pub struct RouterService {
    location: RwSignal<Location>,
}

impl RouterService {
    fn new() -> Self {
        Self {
            location: RwSignal::new(current_location()),
        }
    }

    /// 当前路径（响应式）
    pub fn path(&self) -> Signal<String> {
        let location = self.location;
        Signal::derive(move || location.with(|l| l.path.clone()))
    }

    /// 当前路由（响应式）
    pub fn current_route(&self) -> Signal<AppRoute> {
        let location = self.location;
        Signal::derive(move || location.with(|l| l.route()))
    }

    /// 查询参数（响应式）
    pub fn query(&self, name: &'static str) -> Signal<Option<String>> {
        let location = self.location;
        Signal::derive(move || location.with(|l| l.query(name)))
    }

    /// 导航并新增历史记录
    pub fn navigate(&self, url: &str) {
        push_history_state(url);
        self.location.set(Location::parse(url));
    }

    /// 导航并替换当前历史记录（重定向）
    pub fn replace(&self, url: &str) {
        log_info!("[Router] Redirecting to {}", url);
        replace_history_state(url);
        self.location.set(Location::parse(url));
    }

    /// 初始化浏览器后退/前进按钮监听
    fn init_popstate_listener(&self) {
        let location = self.location;

        let closure = Closure::<dyn Fn()>::new(move || {
            location.set(current_location());
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活（应用级单例）
        closure.forget();
    }
}

/// 提供路由服务到 Context 并初始化
fn provide_router() -> RouterService {
    let router = RouterService::new();
    router.init_popstate_listener();
    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
///
/// 提供路由上下文，应在 App 根部使用。
#[component]
pub fn Router(children: Children) -> impl IntoView {
    provide_router();

    children()
}

/// 路由出口组件
///
/// 根据当前路由状态渲染对应的组件。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();
    let route = router.current_route();

    move || matcher(route.get())
}

/// 站内链接：拦截点击，使用 History API 导航
#[component]
pub fn Link(
    #[prop(into)] to: String,
    #[prop(into, optional)] class: String,
    children: Children,
) -> impl IntoView {
    let router = use_router();

    let target = to.clone();
    let on_click = move |ev: web_sys::MouseEvent| {
        ev.prevent_default();
        router.navigate(&target);
    };

    view! {
        <a href=to class=class on:click=on_click>
            {children()}
        </a>
    }
}
