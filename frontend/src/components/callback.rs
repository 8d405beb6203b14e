use leptos::prelude::*;

use crate::auth::use_auth;
use crate::components::icons::{CheckCircle, GraduationCap, X};
use crate::config::{HOME_AFTER_LOGIN, LOGIN_PATH};
use crate::guard::login_url;
use crate::web::router::use_router;

/// OAuth 回调后的去向；认证状态未确定时返回 `None`
fn callback_target(
    is_loading: bool,
    is_authenticated: bool,
    error: Option<&str>,
    callback_url: Option<&str>,
) -> Option<String> {
    if is_loading {
        return None;
    }
    Some(match (error, is_authenticated) {
        (Some(err), _) => login_url(Some(err)),
        (None, true) => callback_url.unwrap_or(HOME_AFTER_LOGIN).to_string(),
        (None, false) => LOGIN_PATH.to_string(),
    })
}

#[component]
pub fn CallbackPage() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();

    let error = router.query("error");
    let callback_url = router.query("callbackUrl");
    let is_loading = auth.is_loading();
    let is_authenticated = auth.is_authenticated();

    Effect::new(move |_| {
        let target = callback_target(
            is_loading.get(),
            is_authenticated.get(),
            error.get().as_deref(),
            callback_url.get().as_deref(),
        );
        if let Some(target) = target {
            router.replace(&target);
        }
    });

    view! {
        <div class="flex min-h-screen items-center justify-center bg-base-200">
            <div class="space-y-4 text-center">
                {move || {
                    if error.get().is_some() {
                        view! {
                            <X attr:class="mx-auto h-12 w-12 text-error" />
                            <h1 class="text-2xl font-bold">"Authentication Failed"</h1>
                            <p class="text-base-content/70">
                                "We encountered an error during sign-in. You'll be redirected to try again."
                            </p>
                        }
                            .into_any()
                    } else if is_authenticated.get() {
                        view! {
                            <CheckCircle attr:class="mx-auto h-12 w-12 text-success" />
                            <h1 class="text-2xl font-bold">"Welcome to ClassMate AI!"</h1>
                            <p class="text-base-content/70">
                                "Authentication successful. Redirecting to your dashboard..."
                            </p>
                        }
                            .into_any()
                    } else {
                        view! {
                            <GraduationCap attr:class="mx-auto h-12 w-12 animate-pulse text-primary" />
                            <h1 class="text-2xl font-bold">"Completing sign in..."</h1>
                        }
                            .into_any()
                    }
                }}
                <span class="loading loading-spinner loading-md text-primary"></span>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waits_while_loading() {
        assert_eq!(callback_target(true, false, Some("denied"), None), None);
    }

    #[test]
    fn error_goes_back_to_login_encoded() {
        let target = callback_target(false, true, Some("Access Denied"), Some("/classes"));
        assert_eq!(target.as_deref(), Some("/login?error=Access%20Denied"));
    }

    #[test]
    fn authenticated_follows_callback_url() {
        assert_eq!(
            callback_target(false, true, None, Some("/classes")).as_deref(),
            Some("/classes")
        );
        assert_eq!(
            callback_target(false, true, None, None).as_deref(),
            Some("/dashboard")
        );
    }

    #[test]
    fn anonymous_returns_to_login() {
        assert_eq!(
            callback_target(false, false, None, Some("/classes")).as_deref(),
            Some("/login")
        );
    }
}
