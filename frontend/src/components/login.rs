use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::use_auth;
use crate::components::icons::{CheckCircle, GraduationCap, LogIn, X};
use crate::config::HOME_AFTER_LOGIN;
use crate::notify::{Toast, use_effects};
use crate::web::router::use_router;

const BENEFITS: &[&str] = &[
    "Automatic Google Classroom integration",
    "Smart assignment reminders",
    "GPA calculation and tracking",
    "Attendance monitoring",
    "AI study recommendations",
    "Calendar synchronization",
];

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let effects = use_effects();

    let error = router.query("error");
    let callback_url = router.query("callbackUrl");
    let (is_signing_in, set_is_signing_in) = signal(false);
    let (error_dismissed, set_error_dismissed) = signal(false);

    // 已登录用户直接进入目标页面
    Effect::new(move |_| {
        if auth.is_authenticated().get() {
            let target = callback_url
                .get_untracked()
                .unwrap_or_else(|| HOME_AFTER_LOGIN.to_string());
            router.navigate(&target);
        }
    });

    let on_sign_in = move |_| {
        set_is_signing_in.set(true);
        let target = callback_url.get_untracked();
        spawn_local(async move {
            if let Err(e) = auth.login(target).await {
                log_error!("[Login] Sign in failed: {}", e.diagnostic());
                effects.toast(
                    Toast::error("Unable to sign in with Google. Please try again.")
                        .title("Sign In Failed"),
                );
            }
            set_is_signing_in.set(false);
        });
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content w-full max-w-5xl flex-col gap-10 lg:flex-row">
                <div class="flex-1 space-y-6">
                    <div class="flex items-center gap-3">
                        <div class="rounded-2xl bg-primary/10 p-3 text-primary">
                            <GraduationCap attr:class="h-8 w-8" />
                        </div>
                        <div>
                            <h1 class="text-3xl font-bold">"ClassMate AI"</h1>
                            <p class="text-base-content/70">"Your AI-powered study companion"</p>
                        </div>
                    </div>
                    <ul class="grid grid-cols-1 gap-2 sm:grid-cols-2">
                        {BENEFITS
                            .iter()
                            .map(|b| view! {
                                <li class="flex items-center gap-2 text-sm">
                                    <CheckCircle attr:class="h-4 w-4 text-success" />
                                    {*b}
                                </li>
                            })
                            .collect_view()}
                    </ul>
                </div>

                <div class="card w-full max-w-md shrink-0 bg-base-100 shadow-2xl">
                    <div class="card-body gap-4">
                        <Show when=move || error.get().is_some() && !error_dismissed.get()>
                            <div role="alert" class="alert alert-error py-2 text-sm">
                                <div class="flex flex-col">
                                    <span class="font-bold">"Authentication Error"</span>
                                    <span>"Failed to sign in. Please try again."</span>
                                    <code class="text-xs opacity-80">{move || error.get().unwrap_or_default()}</code>
                                </div>
                                <button class="btn btn-ghost btn-xs btn-circle" on:click=move |_| set_error_dismissed.set(true)>
                                    <X attr:class="h-4 w-4" />
                                </button>
                            </div>
                        </Show>

                        <h2 class="card-title justify-center text-2xl">"Welcome Back!"</h2>
                        <p class="text-center text-base-content/70">
                            "Sign in to continue your academic journey"
                        </p>

                        <button class="btn btn-primary btn-lg gap-3" on:click=on_sign_in disabled=move || is_signing_in.get()>
                            {move || if is_signing_in.get() {
                                view! { <span class="loading loading-spinner"></span> "Signing in..." }.into_any()
                            } else {
                                view! { <LogIn attr:class="h-5 w-5" /> "Continue with Google" }.into_any()
                            }}
                        </button>

                        <div class="rounded-lg bg-info/10 p-4 text-sm">
                            <p class="font-medium">"Google Integration Required"</p>
                            <p class="text-base-content/70">
                                "We use Google to sync with Classroom and Calendar for the best experience."
                            </p>
                        </div>
                    </div>
                </div>
            </div>
        </div>
    }
}
