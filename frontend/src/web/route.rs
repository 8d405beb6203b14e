//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由及其属性。

use std::fmt::Display;

/// 应用路由枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 落地页
    #[default]
    Home,
    Login,
    Signup,
    ForgotPassword,
    /// OAuth 回调
    Callback,
    Dashboard,
    Classes,
    Assignments,
    Attendance,
    Grades,
    Calendar,
    Ai,
    /// 页面未找到
    NotFound,
}

/// 无需认证即可访问的路径
pub const PUBLIC_PATHS: &[&str] = &["/", "/login", "/signup", "/forgot-password"];

/// 路径是否在公开白名单内
pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.contains(&normalize(path))
}

/// 去掉末尾斜杠（根路径除外）
fn normalize(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        match normalize(path) {
            "" | "/" => Self::Home,
            "/login" => Self::Login,
            "/signup" => Self::Signup,
            "/forgot-password" => Self::ForgotPassword,
            "/callback" => Self::Callback,
            "/dashboard" => Self::Dashboard,
            "/classes" => Self::Classes,
            "/assignments" => Self::Assignments,
            "/attendance" => Self::Attendance,
            "/grades" => Self::Grades,
            "/calendar" => Self::Calendar,
            "/ai" => Self::Ai,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
            Self::Signup => "/signup",
            Self::ForgotPassword => "/forgot-password",
            Self::Callback => "/callback",
            Self::Dashboard => "/dashboard",
            Self::Classes => "/classes",
            Self::Assignments => "/assignments",
            Self::Attendance => "/attendance",
            Self::Grades => "/grades",
            Self::Calendar => "/calendar",
            Self::Ai => "/ai",
            Self::NotFound => "/404",
        }
    }

    /// 侧边栏中显示的标题
    pub fn title(&self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Login => "Sign in",
            Self::Signup => "Sign up",
            Self::ForgotPassword => "Forgot password",
            Self::Callback => "Signing in",
            Self::Dashboard => "Dashboard",
            Self::Classes => "Classes",
            Self::Assignments => "Assignments",
            Self::Attendance => "Attendance",
            Self::Grades => "Grades",
            Self::Calendar => "Calendar",
            Self::Ai => "AI Assistant",
            Self::NotFound => "Not found",
        }
    }

    /// 认证后的主导航项（侧边栏顺序）
    pub fn navigation() -> &'static [AppRoute] {
        &[
            Self::Dashboard,
            Self::Classes,
            Self::Assignments,
            Self::Attendance,
            Self::Grades,
            Self::Calendar,
            Self::Ai,
        ]
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}
