//! 应用外壳
//!
//! 每次路径或认证状态变化都重新经过 [`guard::evaluate`]：
//! 加载中显示占位，公开页面裸渲染，受保护页面包裹侧边栏和顶部导航。

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::use_auth;
use crate::components::icons::*;
use crate::guard::{self, RenderMode, SidebarPresentation};
use crate::notify::{Toast, use_effects};
use crate::store::state::Theme;
use crate::store::{PreferencesPatch, use_app_store};
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};
use crate::web::use_viewport_width;

fn nav_icon(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Dashboard => view! { <LayoutDashboard attr:class="h-5 w-5 shrink-0" /> }.into_any(),
        AppRoute::Classes => view! { <BookOpen attr:class="h-5 w-5 shrink-0" /> }.into_any(),
        AppRoute::Assignments => view! { <ClipboardList attr:class="h-5 w-5 shrink-0" /> }.into_any(),
        AppRoute::Attendance => view! { <UserCheck attr:class="h-5 w-5 shrink-0" /> }.into_any(),
        AppRoute::Grades => view! { <BarChart attr:class="h-5 w-5 shrink-0" /> }.into_any(),
        AppRoute::Calendar => view! { <Calendar attr:class="h-5 w-5 shrink-0" /> }.into_any(),
        AppRoute::Ai => view! { <Brain attr:class="h-5 w-5 shrink-0" /> }.into_any(),
        _ => view! { <Circle attr:class="h-5 w-5 shrink-0" /> }.into_any(),
    }
}

/// daisyUI 主题名；跟随系统时不设置
fn theme_attr(theme: Theme) -> Option<&'static str> {
    match theme {
        Theme::Light => Some("light"),
        Theme::Dark => Some("dark"),
        Theme::System => None,
    }
}

fn next_theme(theme: Theme) -> Theme {
    match theme {
        Theme::System => Theme::Light,
        Theme::Light => Theme::Dark,
        Theme::Dark => Theme::System,
    }
}

#[component]
fn LoadingScreen() -> impl IntoView {
    view! {
        <div class="flex h-screen items-center justify-center bg-base-200">
            <div class="flex flex-col items-center gap-4">
                <span class="loading loading-spinner loading-lg text-primary"></span>
                <p class="text-sm text-base-content/60">"Loading..."</p>
            </div>
        </div>
    }
}

/// 守卫布局
#[component]
pub fn AppLayout(children: ChildrenFn) -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let store = use_app_store();

    let path = router.path();
    let oauth_error = router.query("error");
    let is_loading = auth.is_loading();
    let is_authenticated = auth.is_authenticated();

    let decision =
        Memo::new(move |_| guard::evaluate(is_loading.get(), is_authenticated.get(), &path.get()));

    Effect::new(move |_| {
        store.set_current_page(path.get());
    });

    Effect::new(move |_| {
        if let Some(target) = decision.get().redirect_url(oauth_error.get_untracked().as_deref()) {
            log_info!("[Guard] {} requires authentication", path.get_untracked());
            router.replace(&target);
        }
    });

    move || {
        let children = children.clone();
        let d = decision.get();
        match d.mode {
            RenderMode::Loading => view! { <LoadingScreen /> }.into_any(),
            // 重定向生效前不渲染受保护页面
            RenderMode::Bare if d.redirect.is_some() => view! { <LoadingScreen /> }.into_any(),
            RenderMode::Bare => children().into_any(),
            RenderMode::FullShell => view! { <Shell>{children()}</Shell> }.into_any(),
        }
    }
}

#[component]
fn Shell(children: Children) -> impl IntoView {
    let store = use_app_store();
    let router = use_router();
    let width = use_viewport_width();
    let (menu_open, set_menu_open) = signal(false);

    let collapsed = store.select(|s| s.sidebar_collapsed);
    let theme = store.select(|s| s.preferences.theme);
    let presentation =
        Memo::new(move |_| SidebarPresentation::new(width.get(), collapsed.get(), menu_open.get()));

    // 导航后收起移动端菜单
    Effect::new(move |_| {
        router.path().track();
        set_menu_open.set(false);
    });

    let toggle_menu = Callback::new(move |_: ()| {
        if guard::is_mobile(width.get_untracked()) {
            set_menu_open.update(|open| *open = !*open);
        } else {
            store.toggle_sidebar();
        }
    });

    view! {
        <div class="flex h-screen overflow-hidden bg-base-200" data-theme=move || theme_attr(theme.get())>
            <Show when=move || presentation.get().shows_backdrop()>
                <div class="fixed inset-0 z-40 bg-black/50" on:click=move |_| set_menu_open.set(false)></div>
            </Show>
            <aside class=move || presentation.get().aside_class()>
                <Sidebar collapsed=Signal::derive(move || presentation.get().is_collapsed()) />
            </aside>
            <div class="flex flex-1 flex-col overflow-hidden">
                <Navbar on_menu=toggle_menu />
                <main class="flex-1 overflow-y-auto p-4 md:p-8">{children()}</main>
                <Footer />
            </div>
        </div>
    }
}

#[component]
fn Sidebar(#[prop(into)] collapsed: Signal<bool>) -> impl IntoView {
    let store = use_app_store();
    let router = use_router();
    let current = router.current_route();

    view! {
        <div class="flex h-full flex-col bg-base-100 shadow-xl">
            <div class="flex h-16 items-center gap-3 px-4">
                <GraduationCap attr:class="h-7 w-7 text-primary shrink-0" />
                <Show when=move || !collapsed.get()>
                    <span class="text-lg font-bold">"ClassMate AI"</span>
                </Show>
            </div>
            <ul class="menu flex-1 gap-1 px-2">
                {AppRoute::navigation()
                    .iter()
                    .map(|&route| {
                        view! {
                            <li class=move || if current.get() == route { "rounded-lg bg-base-300 font-semibold" } else { "" }>
                                <Link to=route.to_path()>
                                    {nav_icon(route)}
                                    <Show when=move || !collapsed.get()>
                                        <span>{route.title()}</span>
                                    </Show>
                                </Link>
                            </li>
                        }
                    })
                    .collect_view()}
            </ul>
            <div class="hidden p-2 md:block">
                <button class="btn btn-ghost btn-sm w-full" on:click=move |_| store.toggle_sidebar()>
                    <ChevronLeft attr:class=move || {
                        if collapsed.get() { "h-4 w-4 rotate-180" } else { "h-4 w-4" }
                    } />
                </button>
            </div>
        </div>
    }
}

#[component]
fn Navbar(on_menu: Callback<()>) -> impl IntoView {
    let auth = use_auth();
    let store = use_app_store();
    let effects = use_effects();
    let router = use_router();
    let auth_state = auth.state();
    let theme = store.select(|s| s.preferences.theme);

    let on_logout = move |_| {
        // 先清空内存中的业务数据，再通知身份提供方
        store.reset_app();
        spawn_local(async move {
            if let Err(e) = auth.logout().await {
                log_error!("[Auth] Logout failed: {}", e.diagnostic());
                effects.toast(Toast::error(e.message()));
            }
        });
    };

    let on_theme = move |_| {
        store.update_preferences(PreferencesPatch {
            theme: Some(next_theme(theme.get_untracked())),
            ..Default::default()
        });
    };

    view! {
        <div class="navbar bg-base-100 shadow-sm">
            <div class="flex-1 gap-2">
                <button class="btn btn-ghost btn-square" on:click=move |_| on_menu.run(())>
                    <Menu attr:class="h-5 w-5" />
                </button>
                <span class="text-lg font-semibold">{move || router.current_route().get().title()}</span>
            </div>
            <div class="flex-none gap-2">
                <button class="btn btn-ghost btn-sm" on:click=on_theme>
                    {move || format!("{:?}", theme.get())}
                </button>
                <span class="hidden text-sm md:inline">
                    {move || auth_state.with(|s| s.user.as_ref().map(|u| u.name.clone())).unwrap_or_default()}
                </span>
                <button class="btn btn-outline btn-error btn-sm gap-2" on:click=on_logout>
                    <LogOut attr:class="h-4 w-4" />
                    "Sign out"
                </button>
            </div>
        </div>
    }
}

#[component]
fn Footer() -> impl IntoView {
    view! {
        <footer class="footer footer-center bg-base-100 p-3 text-xs text-base-content/60">
            <p>"ClassMate AI · Your AI-powered study companion"</p>
        </footer>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_cycle_visits_every_theme() {
        let mut theme = Theme::System;
        let mut seen = Vec::new();
        for _ in 0..3 {
            theme = next_theme(theme);
            seen.push(theme);
        }
        assert_eq!(seen, vec![Theme::Light, Theme::Dark, Theme::System]);
        assert_eq!(theme_attr(Theme::System), None);
        assert_eq!(theme_attr(Theme::Dark), Some("dark"));
    }
}
