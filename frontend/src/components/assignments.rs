use std::sync::Arc;

use leptos::prelude::*;
use leptos::task::spawn_local;

use classmate_shared::protocol::{AssignmentQuery, PaginationParams};
use classmate_shared::{Assignment, Priority};

use crate::api::{ClassMateApi, use_api};
use crate::components::icons::*;
use crate::error::ClientError;
use crate::hooks::{AsyncOperation, OperationOptions, use_async_operation, use_query};
use crate::store::{AppAction, AppStore, FilterPatch, use_app_store};
use crate::web::HttpTransport;

/// 作业列表查询
///
/// 一次拉取全部作业，过滤在客户端完成。
pub fn use_assignment_list<C>(
    api: ClassMateApi<C>,
    store: AppStore,
    options: OperationOptions<Vec<Assignment>>,
) -> AsyncOperation<Vec<Assignment>>
where
    C: HttpTransport + Clone + 'static,
{
    use_query(
        move || {
            let api = api.clone();
            async move {
                store.dispatch(AppAction::SetLoadingAssignments(true));
                let result = api
                    .assignments(AssignmentQuery::default(), PaginationParams::default())
                    .await
                    .map(|envelope| envelope.data.unwrap_or_default());
                if let Ok(list) = &result {
                    store.dispatch(AppAction::SetAssignments(list.clone()));
                }
                store.dispatch(AppAction::SetLoadingAssignments(false));
                result
            }
        },
        options,
    )
}

/// 切换完成状态，以服务端返回的记录替换本地条目
pub fn use_toggle_complete<C>(
    api: ClassMateApi<C>,
    store: AppStore,
) -> AsyncOperation<Assignment, (String, bool)>
where
    C: HttpTransport + Clone + 'static,
{
    use_async_operation(
        move |(id, completed): (String, bool)| {
            let api = api.clone();
            async move {
                let updated = api.complete_assignment(&id, completed).await?;
                store.dispatch(AppAction::UpdateAssignment(updated.clone()));
                Ok::<_, ClientError>(updated)
            }
        },
        OperationOptions::default(),
    )
}

pub fn use_delete_assignment<C>(api: ClassMateApi<C>, store: AppStore) -> AsyncOperation<String, String>
where
    C: HttpTransport + Clone + 'static,
{
    use_async_operation(
        move |id: String| {
            let api = api.clone();
            async move {
                api.delete_assignment(&id).await?;
                store.dispatch(AppAction::DeleteAssignment(id.clone()));
                Ok::<_, ClientError>(id)
            }
        },
        OperationOptions::default().success_toast("Assignment deleted"),
    )
}

/// 下拉框取值到过滤字段；空串表示“全部”
fn parse_priority(value: &str) -> Option<Priority> {
    match value {
        "low" => Some(Priority::Low),
        "medium" => Some(Priority::Medium),
        "high" => Some(Priority::High),
        _ => None,
    }
}

fn parse_completed(value: &str) -> Option<bool> {
    match value {
        "done" => Some(true),
        "pending" => Some(false),
        _ => None,
    }
}

fn priority_badge(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "badge badge-ghost",
        Priority::Medium => "badge badge-warning",
        Priority::High => "badge badge-error",
    }
}

#[component]
pub fn AssignmentsPage() -> impl IntoView {
    let api = use_api();
    let store = use_app_store();

    let list = use_assignment_list(api.clone(), store, OperationOptions::default());
    let toggle = use_toggle_complete(api.clone(), store);
    let delete = use_delete_assignment(api, store);

    let visible = store.select(|s| s.filtered_assignments());
    let filters = store.select(|s| s.assignment_filters.clone());
    let loading = store.select(|s| s.is_loading_assignments);

    let on_search = move |ev: leptos::ev::Event| {
        let value: String = event_target_value(&ev);
        let search = (!value.trim().is_empty()).then_some(value);
        store.dispatch(AppAction::SetAssignmentFilters(FilterPatch {
            search: Some(search),
            ..Default::default()
        }));
    };
    let on_priority = move |ev: leptos::ev::Event| {
        store.dispatch(AppAction::SetAssignmentFilters(FilterPatch {
            priority: Some(parse_priority(&event_target_value(&ev))),
            ..Default::default()
        }));
    };
    let on_completed = move |ev: leptos::ev::Event| {
        store.dispatch(AppAction::SetAssignmentFilters(FilterPatch {
            completed: Some(parse_completed(&event_target_value(&ev))),
            ..Default::default()
        }));
    };
    let completed_value = move || match filters.get().completed {
        Some(true) => "done",
        Some(false) => "pending",
        None => "",
    };
    let on_reload = move |_| {
        spawn_local(async move {
            let _ = list.execute(()).await;
        });
    };

    view! {
        <div class="mx-auto max-w-7xl space-y-6">
            <div class="flex items-center justify-between">
                <div>
                    <h1 class="text-3xl font-bold">"Assignments"</h1>
                    <p class="text-base-content/70">"Track what's due across all your classes."</p>
                </div>
                <button class="btn btn-ghost btn-circle" on:click=on_reload disabled=move || loading.get()>
                    <RefreshCw attr:class=move || if loading.get() { "h-5 w-5 animate-spin" } else { "h-5 w-5" } />
                </button>
            </div>

            <div class="flex flex-wrap items-center gap-2">
                <label class="input input-bordered flex items-center gap-2">
                    <Search attr:class="h-4 w-4 opacity-60" />
                    <input
                        type="text"
                        class="grow"
                        placeholder="Search assignments"
                        prop:value=move || filters.get().search.unwrap_or_default()
                        on:input=on_search
                    />
                </label>
                <select
                    class="select select-bordered"
                    prop:value=move || filters.get().priority.map(|p| p.as_str()).unwrap_or("")
                    on:change=on_priority
                >
                    <option value="">"All priorities"</option>
                    <option value="high">"High"</option>
                    <option value="medium">"Medium"</option>
                    <option value="low">"Low"</option>
                </select>
                <select
                    class="select select-bordered"
                    prop:value=completed_value
                    on:change=on_completed
                >
                    <option value="">"All"</option>
                    <option value="pending">"Pending"</option>
                    <option value="done">"Completed"</option>
                </select>
                <button
                    class="btn btn-ghost"
                    on:click=move |_| store.clear_filters()
                    disabled=move || filters.get().is_empty()
                >
                    "Clear filters"
                </button>
            </div>

            <div class="card bg-base-100 shadow-xl">
                <div class="overflow-x-auto">
                    <table class="table table-zebra w-full">
                        <thead>
                            <tr>
                                <th></th>
                                <th>"Title"</th>
                                <th class="hidden md:table-cell">"Class"</th>
                                <th>"Priority"</th>
                                <th class="hidden md:table-cell">"Due"</th>
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>
                            <Show when=move || visible.with(|v| v.is_empty()) && !loading.get()>
                                <tr>
                                    <td colspan="6" class="py-8 text-center text-base-content/50">
                                        "No assignments match the current filters."
                                    </td>
                                </tr>
                            </Show>
                            <For
                                each=move || visible.get()
                                key={|a: &Arc<Assignment>| (a.id.clone(), a.updated_at, a.completed)}
                                children=move |a| {
                                    let toggle_id = a.id.clone();
                                    let delete_id = a.id.clone();
                                    let completed = a.completed;
                                    let title_class = if completed { "line-through opacity-60" } else { "" };
                                    let due = a
                                        .due_date
                                        .map(|d| d.format("%Y-%m-%d").to_string())
                                        .unwrap_or_else(|| "-".to_string());
                                    view! {
                                        <tr>
                                            <td>
                                                <button
                                                    class="btn btn-ghost btn-xs btn-circle"
                                                    on:click=move |_| {
                                                        let args = (toggle_id.clone(), !completed);
                                                        spawn_local(async move {
                                                            let _ = toggle.execute(args).await;
                                                        });
                                                    }
                                                >
                                                    {if completed {
                                                        view! { <CheckCircle attr:class="h-5 w-5 text-success" /> }.into_any()
                                                    } else {
                                                        view! { <Circle attr:class="h-5 w-5 opacity-50" /> }.into_any()
                                                    }}
                                                </button>
                                            </td>
                                            <td class=title_class>
                                                {a.title.clone()}
                                            </td>
                                            <td class="hidden md:table-cell">{a.class.name.clone()}</td>
                                            <td><span class=priority_badge(a.priority)>{a.priority.as_str()}</span></td>
                                            <td class="hidden font-mono text-xs md:table-cell">{due}</td>
                                            <td>
                                                <button
                                                    class="btn btn-ghost btn-sm btn-square text-error"
                                                    on:click=move |_| {
                                                        let id = delete_id.clone();
                                                        spawn_local(async move {
                                                            let _ = delete.execute(id).await;
                                                        });
                                                    }
                                                >
                                                    <Trash2 attr:class="h-4 w-4" />
                                                </button>
                                            </td>
                                        </tr>
                                    }
                                }
                            />
                        </tbody>
                    </table>
                </div>
            </div>
        </div>
    }
}
