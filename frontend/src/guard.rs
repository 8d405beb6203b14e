//! 路由守卫
//!
//! 纯函数：根据认证状态与当前路径决定渲染模式和是否重定向。
//! 已认证用户访问公开路径仍然是裸渲染，离开首页的跳转由页面自身负责。

use crate::config::{LOGIN_PATH, MOBILE_BREAKPOINT_PX};
use crate::web::route::is_public_path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// 认证状态未确定，显示加载占位
    Loading,
    /// 只渲染页面本身
    Bare,
    /// 侧边栏 + 顶部导航 + 内容 + 页脚
    FullShell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardDecision {
    pub mode: RenderMode,
    pub redirect: Option<&'static str>,
}

impl GuardDecision {
    /// 实际跳转地址
    ///
    /// 当前地址带有 OAuth 错误码（例如未认证访问 `/callback?error=...`）时一并转交给登录页。
    pub fn redirect_url(&self, error: Option<&str>) -> Option<String> {
        self.redirect.map(|target| login_url_from(target, error))
    }
}

/// 登录页地址，错误码编码进 `?error=`
pub fn login_url(error: Option<&str>) -> String {
    login_url_from(LOGIN_PATH, error)
}

fn login_url_from(target: &str, error: Option<&str>) -> String {
    match error {
        Some(code) => format!("{}?error={}", target, urlencoding::encode(code)),
        None => target.to_string(),
    }
}

/// 每次渲染重新求值
pub fn evaluate(is_loading: bool, is_authenticated: bool, path: &str) -> GuardDecision {
    if is_loading {
        return GuardDecision {
            mode: RenderMode::Loading,
            redirect: None,
        };
    }

    let public = is_public_path(path);
    if public || !is_authenticated {
        return GuardDecision {
            mode: RenderMode::Bare,
            redirect: (!public && !is_authenticated).then_some(LOGIN_PATH),
        };
    }

    GuardDecision {
        mode: RenderMode::FullShell,
        redirect: None,
    }
}

pub fn is_mobile(viewport_width: f64) -> bool {
    viewport_width < MOBILE_BREAKPOINT_PX
}

/// 侧边栏呈现方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarPresentation {
    /// 移动端：覆盖层，菜单打开时可见
    Overlay { open: bool },
    /// 桌面端：常驻，可折叠
    Persistent { collapsed: bool },
}

impl SidebarPresentation {
    pub fn new(viewport_width: f64, sidebar_collapsed: bool, mobile_menu_open: bool) -> Self {
        if is_mobile(viewport_width) {
            Self::Overlay {
                open: mobile_menu_open,
            }
        } else {
            Self::Persistent {
                collapsed: sidebar_collapsed,
            }
        }
    }

    /// 侧边栏容器的 CSS 类
    pub fn aside_class(&self) -> &'static str {
        match self {
            Self::Overlay { open: true } => "fixed inset-y-0 left-0 z-50 translate-x-0 transition-transform duration-300",
            Self::Overlay { open: false } => "fixed inset-y-0 left-0 z-50 -translate-x-full transition-transform duration-300",
            Self::Persistent { collapsed: true } => "relative w-16 transition-all duration-300",
            Self::Persistent { collapsed: false } => "relative w-64 transition-all duration-300",
        }
    }

    /// 侧边栏是否以折叠（仅图标）样式渲染
    pub fn is_collapsed(&self) -> bool {
        matches!(self, Self::Persistent { collapsed: true })
    }

    pub fn shows_backdrop(&self) -> bool {
        matches!(self, Self::Overlay { open: true })
    }
}
