use leptos::prelude::*;

use crate::auth::use_auth;
use crate::components::icons::GraduationCap;
use crate::config::{HOME_AFTER_LOGIN, LOGIN_PATH};
use crate::web::router::use_router;

/// 启动页：认证状态确定后分流
#[component]
pub fn HomePage() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let is_loading = auth.is_loading();
    let is_authenticated = auth.is_authenticated();

    Effect::new(move |_| {
        if is_loading.get() {
            return;
        }
        let target = if is_authenticated.get() {
            HOME_AFTER_LOGIN
        } else {
            LOGIN_PATH
        };
        router.replace(target);
    });

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col text-center">
                <div class="animate-pulse rounded-2xl bg-primary p-5 text-primary-content shadow-2xl">
                    <GraduationCap attr:class="h-10 w-10" />
                </div>
                <h1 class="text-3xl font-bold">"ClassMate AI"</h1>
                <p class="text-base-content/70">"Your AI-powered study companion"</p>
                <span class="loading loading-spinner loading-md text-primary"></span>
            </div>
        </div>
    }
}
