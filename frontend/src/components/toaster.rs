use std::time::Duration;

use leptos::prelude::*;

use crate::components::icons::X;
use crate::notify::{ToastEntry, ToastVariant, use_effects};

fn alert_class(variant: ToastVariant) -> &'static str {
    match variant {
        ToastVariant::Default => "alert alert-info shadow-lg",
        ToastVariant::Destructive => "alert alert-error shadow-lg",
        ToastVariant::Success => "alert alert-success shadow-lg",
    }
}

/// 渲染 [`EffectHub`](crate::notify::EffectHub) 中的提示，到期自动关闭
#[component]
pub fn Toaster() -> impl IntoView {
    let hub = use_effects();
    let toasts = hub.toasts();

    view! {
        <div class="toast toast-top toast-end z-50">
            <For
                each=move || toasts.get()
                key=|entry| entry.id
                children=move |entry: ToastEntry| {
                    let id = entry.id;
                    set_timeout(
                        move || hub.dismiss(id),
                        Duration::from_millis(entry.toast.duration_ms as u64),
                    );
                    let title = entry.toast.title.clone();
                    let description = entry.toast.description.clone();
                    view! {
                        <div class=alert_class(entry.toast.variant)>
                            <div class="flex flex-col">
                                {title.map(|t| view! { <span class="font-bold">{t}</span> })}
                                {description.map(|d| view! { <span class="text-sm">{d}</span> })}
                            </div>
                            <button class="btn btn-ghost btn-xs btn-circle" on:click=move |_| hub.dismiss(id)>
                                <X attr:class="h-4 w-4" />
                            </button>
                        </div>
                    }
                }
            />
        </div>
    }
}
