//! 尚未实现的页面

use leptos::prelude::*;

use crate::components::icons::GraduationCap;
use crate::web::route::AppRoute;
use crate::web::router::Link;

/// 受保护区域内的占位页
#[component]
pub fn ComingSoon(route: AppRoute) -> impl IntoView {
    view! {
        <div class="mx-auto max-w-3xl">
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body items-center text-center">
                    <h1 class="card-title text-2xl">{route.title()}</h1>
                    <p class="text-base-content/70">"This section is coming soon."</p>
                </div>
            </div>
        </div>
    }
}

/// 公开区域的占位页（注册、找回密码）
#[component]
pub fn PublicPlaceholder(route: AppRoute) -> impl IntoView {
    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col text-center">
                <GraduationCap attr:class="h-10 w-10 text-primary" />
                <h1 class="text-3xl font-bold">{route.title()}</h1>
                <p class="text-base-content/70">"Accounts are managed through Google sign-in."</p>
                <Link to="/login" class="btn btn-primary">"Back to sign in"</Link>
            </div>
        </div>
    }
}

#[component]
pub fn NotFound() -> impl IntoView {
    view! {
        <div class="flex min-h-screen items-center justify-center bg-base-200">
            <div class="text-center">
                <h1 class="text-6xl font-bold text-error">"404"</h1>
                <p class="mt-4 text-xl">"Page not found"</p>
                <Link to="/" class="btn btn-ghost mt-6">"Go home"</Link>
            </div>
        </div>
    }
}
