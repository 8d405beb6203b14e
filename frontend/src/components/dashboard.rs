use leptos::prelude::*;
use leptos::task::spawn_local;

use classmate_shared::{DashboardStats, UpcomingAssignment};

use crate::api::{ClassMateApi, use_api};
use crate::auth::use_auth;
use crate::components::icons::*;
use crate::hooks::{AsyncOperation, OperationOptions, use_query};
use crate::store::{AppAction, AppStore, use_app_store};
use crate::web::HttpTransport;
use crate::web::router::Link;

/// 仪表盘统计查询
///
/// 请求期间维护 `is_loading_stats`，成功后整体替换 store 中的快照。
pub fn use_dashboard_stats<C>(
    api: ClassMateApi<C>,
    store: AppStore,
    options: OperationOptions<DashboardStats>,
) -> AsyncOperation<DashboardStats>
where
    C: HttpTransport + Clone + 'static,
{
    use_query(
        move || {
            let api = api.clone();
            async move {
                store.dispatch(AppAction::SetLoadingStats(true));
                let result = api.dashboard_stats().await;
                if let Ok(stats) = &result {
                    store.dispatch(AppAction::SetDashboardStats(stats.clone()));
                }
                store.dispatch(AppAction::SetLoadingStats(false));
                result
            }
        },
        options,
    )
}

fn greeting(hour: u32) -> &'static str {
    match hour {
        0..=11 => "Good morning",
        12..=16 => "Good afternoon",
        _ => "Good evening",
    }
}

fn gpa_description(gpa: f64) -> &'static str {
    if gpa >= 3.7 {
        "Excellent performance"
    } else if gpa >= 3.0 {
        "Good performance"
    } else if gpa >= 2.5 {
        "Satisfactory"
    } else if gpa >= 2.0 {
        "Needs improvement"
    } else {
        "Academic support needed"
    }
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let api = use_api();
    let auth = use_auth();
    let store = use_app_store();

    let stats_query = use_dashboard_stats(api.clone(), store, OperationOptions::default());
    let upcoming = use_query(
        move || {
            let api = api.clone();
            async move { api.upcoming_assignments().await }
        },
        OperationOptions::default().silent_errors().on_error(|e| {
            log_warn!("[Dashboard] Upcoming assignments unavailable: {}", e.diagnostic());
        }),
    );

    let stats = store.select(|s| s.dashboard_stats.clone().unwrap_or_default());
    let loading_stats = store.select(|s| s.is_loading_stats);
    let user = auth.user();
    let stats_error = stats_query.error();

    let on_refresh = move |_| {
        spawn_local(async move {
            let _ = stats_query.execute(()).await;
            auth.refresh_user().await;
        });
        spawn_local(async move {
            let _ = upcoming.execute(()).await;
        });
    };

    let hour = js_sys::Date::new_0().get_hours();

    view! {
        <div class="mx-auto max-w-7xl space-y-8">
            <div class="flex items-center justify-between">
                <div>
                    <h1 class="text-3xl font-bold">
                        {greeting(hour)} ", "
                        {move || user.get().map(|u| u.name).unwrap_or_else(|| "Student".to_string())}
                    </h1>
                    <p class="text-base-content/70">"Here's what's happening with your studies today."</p>
                </div>
                <button class="btn btn-ghost btn-circle" on:click=on_refresh disabled=move || loading_stats.get()>
                    <RefreshCw attr:class=move || if loading_stats.get() { "h-5 w-5 animate-spin" } else { "h-5 w-5" } />
                </button>
            </div>

            {move || stats_error.get().map(|e| view! {
                <div role="alert" class="alert alert-warning">
                    <span>"Dashboard statistics are out of date: " {e.message().to_string()}</span>
                    <button class="btn btn-ghost btn-xs" on:click=move |_| stats_query.reset()>"Dismiss"</button>
                </div>
            })}

            <div class="stats stats-vertical w-full bg-base-100 shadow md:stats-horizontal">
                <div class="stat">
                    <div class="stat-figure text-primary"><BookOpen attr:class="h-8 w-8" /></div>
                    <div class="stat-title">"Total Classes"</div>
                    <div class="stat-value text-primary">{move || stats.get().total_classes}</div>
                    <div class="stat-desc">"Active this semester"</div>
                </div>
                <div class="stat">
                    <div class="stat-figure text-warning"><ClipboardList attr:class="h-8 w-8" /></div>
                    <div class="stat-title">"Assignments"</div>
                    <div class="stat-value">
                        {move || {
                            let s = stats.get();
                            format!("{}/{}", s.completed_assignments, s.total_assignments)
                        }}
                    </div>
                    <div class="stat-desc">{move || format!("{} pending", stats.get().pending_assignments)}</div>
                </div>
                <div class="stat">
                    <div class="stat-figure text-success"><UserCheck attr:class="h-8 w-8" /></div>
                    <div class="stat-title">"Attendance"</div>
                    <div class="stat-value">{move || format!("{}%", stats.get().overall_attendance)}</div>
                    <div class="stat-desc">"Overall attendance"</div>
                </div>
                <div class="stat">
                    <div class="stat-figure text-secondary"><BarChart attr:class="h-8 w-8" /></div>
                    <div class="stat-title">"GPA"</div>
                    <div class="stat-value">{move || format!("{:.1}", stats.get().overall_gpa)}</div>
                    <div class="stat-desc">{move || gpa_description(stats.get().overall_gpa)}</div>
                </div>
            </div>

            <div class="grid gap-6 lg:grid-cols-3">
                <div class="card bg-base-100 shadow-xl lg:col-span-2">
                    <div class="card-body">
                        <h3 class="card-title"><Clock attr:class="h-5 w-5" /> "Upcoming Assignments"</h3>
                        <Show
                            when=move || !upcoming.loading().get()
                            fallback=|| view! { <span class="loading loading-spinner loading-md"></span> }
                        >
                            <ul class="divide-y divide-base-200">
                                <For
                                    each=move || upcoming.data().get().unwrap_or_default()
                                    key=|a: &UpcomingAssignment| a.id.clone()
                                    children=move |a| view! {
                                        <li class="flex items-center justify-between py-2">
                                            <div>
                                                <p class="font-medium">{a.title}</p>
                                                <p class="text-sm text-base-content/60">{a.class_name}</p>
                                            </div>
                                            <span class="badge badge-outline">
                                                {format!("{} days", a.days_until_due)}
                                            </span>
                                        </li>
                                    }
                                />
                            </ul>
                        </Show>
                    </div>
                </div>

                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body gap-2">
                        <h3 class="card-title">"Quick Actions"</h3>
                        <Link to="/assignments" class="btn btn-outline justify-start gap-2">
                            <ClipboardList attr:class="h-4 w-4" /> "View assignments"
                        </Link>
                        <Link to="/classes" class="btn btn-outline justify-start gap-2">
                            <BookOpen attr:class="h-4 w-4" /> "Manage classes"
                        </Link>
                        <Link to="/ai" class="btn btn-outline justify-start gap-2">
                            <Brain attr:class="h-4 w-4" /> "Ask the AI assistant"
                        </Link>
                    </div>
                </div>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::notify::provide_effects;
    use crate::store::provide_app_store;
    use crate::web::mock::MockTransport;
    use crate::web::{MemoryStorage, PreferenceStore};

    const BASE: &str = "http://api.test";

    fn setup() -> (Owner, AppStore, MockTransport) {
        let owner = Owner::new();
        owner.set();
        provide_effects();
        let store = provide_app_store(PreferenceStore::new(Arc::new(MemoryStorage::new())));
        (owner, store, MockTransport::new())
    }

    #[test]
    fn greeting_by_hour() {
        assert_eq!(greeting(0), "Good morning");
        assert_eq!(greeting(11), "Good morning");
        assert_eq!(greeting(12), "Good afternoon");
        assert_eq!(greeting(17), "Good evening");
    }

    #[test]
    fn gpa_bands() {
        assert_eq!(gpa_description(3.9), "Excellent performance");
        assert_eq!(gpa_description(3.0), "Good performance");
        assert_eq!(gpa_description(1.2), "Academic support needed");
    }

    #[tokio::test]
    async fn stats_query_replaces_snapshot_and_clears_loading() {
        let (_owner, store, http) = setup();
        http.mock_response(
            &format!("{}/api/dashboard/stats", BASE),
            200,
            json!({
                "success": true,
                "data": {
                    "totalClasses": 4,
                    "totalAssignments": 10,
                    "completedAssignments": 6,
                    "pendingAssignments": 4,
                    "overallAttendance": 92.5,
                    "overallGPA": 3.4,
                    "upcomingDeadlines": 2,
                    "aiSuggestions": 1
                }
            }),
        );
        let api = ClassMateApi::new(http, BASE, Arc::new(MemoryStorage::new()));

        let query = use_dashboard_stats(api, store, OperationOptions::default().manual());
        let stats = query.execute(()).await.unwrap();

        let state = store.state().get_untracked();
        assert_eq!(state.dashboard_stats.as_ref(), Some(&stats));
        assert_eq!(stats.total_classes, 4);
        assert!(!state.is_loading_stats);
    }

    #[tokio::test]
    async fn failed_stats_query_keeps_previous_snapshot() {
        let (_owner, store, http) = setup();
        let previous = DashboardStats {
            total_classes: 1,
            ..Default::default()
        };
        store.dispatch(AppAction::SetDashboardStats(previous.clone()));
        http.mock_response(
            &format!("{}/api/dashboard/stats", BASE),
            500,
            json!({ "success": false, "message": "db down" }),
        );
        let api = ClassMateApi::new(http, BASE, Arc::new(MemoryStorage::new()));

        let query = use_dashboard_stats(api, store, OperationOptions::default().manual());
        assert!(query.execute(()).await.is_err());

        let state = store.state().get_untracked();
        assert_eq!(state.dashboard_stats, Some(previous));
        assert!(!state.is_loading_stats);
    }
}
