use std::sync::Arc;

use leptos::prelude::*;
use leptos::task::spawn_local;

use classmate_shared::Class;

use crate::api::{ClassMateApi, use_api};
use crate::components::icons::*;
use crate::error::ClientError;
use crate::hooks::{AsyncOperation, OperationOptions, use_async_operation, use_query};
use crate::store::{AppAction, AppStore, use_app_store};
use crate::web::HttpTransport;

/// 课程列表查询，结果整体写入 store
pub fn use_class_list<C>(
    api: ClassMateApi<C>,
    store: AppStore,
    options: OperationOptions<Vec<Class>>,
) -> AsyncOperation<Vec<Class>>
where
    C: HttpTransport + Clone + 'static,
{
    use_query(
        move || {
            let api = api.clone();
            async move {
                store.dispatch(AppAction::SetLoadingClasses(true));
                let result = api.classes().await;
                if let Ok(classes) = &result {
                    store.dispatch(AppAction::SetClasses(classes.clone()));
                }
                store.dispatch(AppAction::SetLoadingClasses(false));
                result
            }
        },
        options,
    )
}

/// 删除课程；只移除课程本身，关联作业保持不变
pub fn use_delete_class<C>(api: ClassMateApi<C>, store: AppStore) -> AsyncOperation<String, String>
where
    C: HttpTransport + Clone + 'static,
{
    use_async_operation(
        move |id: String| {
            let api = api.clone();
            async move {
                api.delete_class(&id).await?;
                store.dispatch(AppAction::DeleteClass(id.clone()));
                Ok::<_, ClientError>(id)
            }
        },
        OperationOptions::default().success_toast("Class deleted"),
    )
}

#[component]
pub fn ClassesPage() -> impl IntoView {
    let api = use_api();
    let store = use_app_store();

    let list = use_class_list(api.clone(), store, OperationOptions::default());
    let delete = use_delete_class(api.clone(), store);
    let sync = use_async_operation(
        move |()| {
            let api = api.clone();
            async move { api.sync_classes().await }
        },
        OperationOptions::default()
            .success_toast("Classes synced with Google Classroom")
            .on_success(move |classes: &Vec<Class>| {
                store.dispatch(AppAction::SetClasses(classes.clone()))
            }),
    );

    let classes = store.select(|s| s.classes.clone());
    let loading = store.select(|s| s.is_loading_classes);
    let list_state = list.state();
    let load_error = move || list_state.with(|s| s.error.as_ref().map(|e| e.message().to_string()));

    let on_sync = move |_| {
        spawn_local(async move {
            let _ = sync.execute(()).await;
        });
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
                    <h1 class="text-3xl font-bold">"Classes"</h1>
                    <p class="text-base-content/70">"Your enrolled classes this semester."</p>
                </div>
                <div class="flex gap-2">
                    <button class="btn btn-ghost btn-circle" on:click=on_reload disabled=move || loading.get()>
                        <RefreshCw attr:class=move || if loading.get() { "h-5 w-5 animate-spin" } else { "h-5 w-5" } />
                    </button>
                    <button class="btn btn-primary" on:click=on_sync disabled=move || sync.loading().get()>
                        "Sync Classroom"
                    </button>
                </div>
            </div>

            {move || load_error().map(|msg| view! {
                <div role="alert" class="alert alert-warning">
                    <span>"Couldn't load classes: " {msg}</span>
                </div>
            })}

            <Show when=move || classes.with(|c| c.is_empty()) && !loading.get() && load_error().is_none()>
                <div class="card bg-base-100 shadow">
                    <div class="card-body items-center text-base-content/50">
                        "No classes yet. Sync with Google Classroom to get started."
                    </div>
                </div>
            </Show>

            <div class="grid gap-4 md:grid-cols-2 lg:grid-cols-3">
                <For
                    each=move || classes.get()
                    key={|c: &Arc<Class>| (c.id.clone(), c.updated_at)}
                    children=move |class| {
                        let id = class.id.clone();
                        let schedule = if class.schedule.days.is_empty() {
                            None
                        } else {
                            Some(format!(
                                "{} · {}-{}",
                                class.schedule.days.join(", "),
                                class.schedule.start_time,
                                class.schedule.end_time,
                            ))
                        };
                        view! {
                            <div class="card bg-base-100 shadow-xl">
                                <div class="card-body">
                                    <div class="flex items-start justify-between">
                                        <div>
                                            <h3 class="card-title">{class.name.clone()}</h3>
                                            {class.code.clone().map(|code| view! { <span class="badge badge-outline">{code}</span> })}
                                        </div>
                                        <button
                                            class="btn btn-ghost btn-sm btn-square text-error"
                                            on:click=move |_| {
                                                let id = id.clone();
                                                spawn_local(async move {
                                                    let _ = delete.execute(id).await;
                                                });
                                            }
                                        >
                                            <Trash2 attr:class="h-4 w-4" />
                                        </button>
                                    </div>
                                    {class.instructor.clone().map(|i| view! { <p class="text-sm">{i}</p> })}
                                    {class.room.clone().map(|r| view! { <p class="text-sm text-base-content/60">{r}</p> })}
                                    {schedule.map(|s| view! {
                                        <p class="flex items-center gap-1 text-sm text-base-content/60">
                                            <Clock attr:class="h-4 w-4" /> {s}
                                        </p>
                                    })}
                                </div>
                            </div>
                        }
                    }
                />
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::notify::provide_effects;
    use crate::store::fixtures;
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

    #[tokio::test]
    async fn list_query_fills_store() {
        let (_owner, store, http) = setup();
        let classes = vec![fixtures::class("c1", "Math"), fixtures::class("c2", "Physics")];
        http.mock_response(
            &format!("{}/api/classes", BASE),
            200,
            json!({ "success": true, "data": classes }),
        );
        let api = ClassMateApi::new(http, BASE, Arc::new(MemoryStorage::new()));

        let list = use_class_list(api, store, OperationOptions::default().manual());
        list.execute(()).await.unwrap();

        let state = store.state().get_untracked();
        assert_eq!(state.classes.len(), 2);
        assert_eq!(state.classes[1].name, "Physics");
        assert!(!state.is_loading_classes);
    }

    #[tokio::test]
    async fn delete_removes_class_only_after_server_confirms() {
        let (_owner, store, http) = setup();
        store.dispatch(AppAction::SetClasses(vec![
            fixtures::class("c1", "Math"),
            fixtures::class("c2", "Physics"),
        ]));
        http.mock_response(
            &format!("{}/api/classes/c1", BASE),
            200,
            json!({ "success": true }),
        );
        http.mock_response(
            &format!("{}/api/classes/c2", BASE),
            403,
            json!({ "success": false, "message": "forbidden" }),
        );
        let api = ClassMateApi::new(http, BASE, Arc::new(MemoryStorage::new()));
        let delete = use_delete_class(api, store);

        assert_eq!(delete.execute("c1".to_string()).await.unwrap(), "c1");
        assert!(delete.execute("c2".to_string()).await.is_err());

        let ids: Vec<_> = store
            .state()
            .get_untracked()
            .classes
            .iter()
            .map(|c| c.id.clone())
            .collect();
        assert_eq!(ids, vec!["c2".to_string()]);
    }
}
