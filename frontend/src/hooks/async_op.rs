//! 通用异步操作 Hook
//!
//! 包装一个异步操作，跟踪 `{data, loading, error}`，在成功/失败时调用回调，
//! 并把提示作为 [`UiEffect`] 交给顶层 [`EffectHub`] 处理。

use std::future::Future;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use leptos::prelude::*;
use leptos::reactive::owner::LocalStorage;
use leptos::task::spawn_local;

use crate::error::{ClientError, ClientResult};
use crate::notify::{EffectHub, Toast, ToastVariant, UiEffect};

const FALLBACK_ERROR_MESSAGE: &str = "Something went wrong";

// =========================================================
// 状态 (State)
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub struct OperationState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<ClientError>,
}

impl<T> Default for OperationState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

impl<T> OperationState<T> {
    fn start(&mut self) {
        self.loading = true;
        self.error = None;
    }

    fn succeed(&mut self, data: T) {
        self.data = Some(data);
        self.loading = false;
    }

    fn fail(&mut self, error: ClientError) {
        self.error = Some(error);
        self.loading = false;
    }
}

// =========================================================
// 选项 (Options)
// =========================================================

pub type SuccessCallback<T> = Rc<dyn Fn(&T)>;
pub type ErrorCallback = Rc<dyn Fn(&ClientError)>;

pub struct OperationOptions<T> {
    pub on_success: Option<SuccessCallback<T>>,
    pub on_error: Option<ErrorCallback>,
    pub show_success_toast: bool,
    /// 默认开启
    pub show_error_toast: bool,
    pub success_message: Option<String>,
    /// 仅对 `use_query` 有效：挂载时自动执行一次
    pub immediate: bool,
}

impl<T> Clone for OperationOptions<T> {
    fn clone(&self) -> Self {
        Self {
            on_success: self.on_success.clone(),
            on_error: self.on_error.clone(),
            show_success_toast: self.show_success_toast,
            show_error_toast: self.show_error_toast,
            success_message: self.success_message.clone(),
            immediate: self.immediate,
        }
    }
}

impl<T> Default for OperationOptions<T> {
    fn default() -> Self {
        Self {
            on_success: None,
            on_error: None,
            show_success_toast: false,
            show_error_toast: true,
            success_message: None,
            immediate: true,
        }
    }
}

impl<T> OperationOptions<T> {
    pub fn on_success(mut self, f: impl Fn(&T) + 'static) -> Self {
        self.on_success = Some(Rc::new(f));
        self
    }

    pub fn on_error(mut self, f: impl Fn(&ClientError) + 'static) -> Self {
        self.on_error = Some(Rc::new(f));
        self
    }

    /// 成功时提示（需要同时给出消息）
    pub fn success_toast(mut self, message: impl Into<String>) -> Self {
        self.show_success_toast = true;
        self.success_message = Some(message.into());
        self
    }

    /// 失败时不弹出提示
    pub fn silent_errors(mut self) -> Self {
        self.show_error_toast = false;
        self
    }

    /// 不在挂载时自动执行
    pub fn manual(mut self) -> Self {
        self.immediate = false;
        self
    }

    pub fn success_effect(&self) -> Option<UiEffect> {
        if !self.show_success_toast {
            return None;
        }
        let message = self.success_message.as_ref()?;
        Some(UiEffect::Toast(
            Toast::new(ToastVariant::Default)
                .title("Success")
                .description(message.clone()),
        ))
    }

    pub fn error_effect(&self, error: &ClientError) -> Option<UiEffect> {
        if !self.show_error_toast {
            return None;
        }
        let message = if error.message().is_empty() {
            FALLBACK_ERROR_MESSAGE
        } else {
            error.message()
        };
        Some(UiEffect::Toast(Toast::error(message)))
    }
}

// =========================================================
// Hook
// =========================================================

type BoxedOp<T, A> = Box<dyn Fn(A) -> LocalBoxFuture<'static, ClientResult<T>>>;

struct Runner<T, A> {
    op: BoxedOp<T, A>,
    options: OperationOptions<T>,
}

/// 异步操作句柄
///
/// `Copy`，可以直接移动进事件处理闭包。组件卸载后完成的结果被静默丢弃。
pub struct AsyncOperation<T: 'static, A: 'static = ()> {
    state: RwSignal<OperationState<T>>,
    runner: StoredValue<Runner<T, A>, LocalStorage>,
    effects: Option<EffectHub>,
}

impl<T, A> Clone for AsyncOperation<T, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, A> Copy for AsyncOperation<T, A> {}

impl<T, A> AsyncOperation<T, A>
where
    T: Clone + Send + Sync + 'static,
    A: 'static,
{
    pub fn state(&self) -> ReadSignal<OperationState<T>> {
        self.state.read_only()
    }

    pub fn data(&self) -> Signal<Option<T>> {
        let state = self.state;
        Signal::derive(move || state.with(|s| s.data.clone()))
    }

    pub fn loading(&self) -> Signal<bool> {
        let state = self.state;
        Signal::derive(move || state.with(|s| s.loading))
    }

    pub fn error(&self) -> Signal<Option<ClientError>> {
        let state = self.state;
        Signal::derive(move || state.with(|s| s.error.clone()))
    }

    /// 执行操作
    ///
    /// 完成状态记录、回调与提示后，错误仍然返回给调用方。
    pub async fn execute(&self, args: A) -> ClientResult<T> {
        let Some(future) = self.runner.try_with_value(|r| (r.op)(args)) else {
            return Err(ClientError::cancelled("Operation owner was disposed"));
        };
        self.state.try_update(|s| s.start());

        let result = future.await;

        // 卸载后不再更新状态，也不触发回调和提示
        let Some(options) = self.runner.try_with_value(|r| r.options.clone()) else {
            return result;
        };

        match &result {
            Ok(data) => {
                if self.state.try_update(|s| s.succeed(data.clone())).is_none() {
                    return result;
                }
                if let Some(cb) = &options.on_success {
                    cb(data);
                }
                if let Some(effect) = options.success_effect() {
                    self.emit(effect);
                }
            }
            Err(error) => {
                if self.state.try_update(|s| s.fail(error.clone())).is_none() {
                    return result;
                }
                log_warn!("[Hook] Operation failed: {}", error.diagnostic());
                if let Some(cb) = &options.on_error {
                    cb(error);
                }
                if let Some(effect) = options.error_effect(error) {
                    self.emit(effect);
                }
            }
        }

        result
    }

    /// 回到初始 `{data: None, loading: false, error: None}`，不执行操作
    pub fn reset(&self) {
        self.state.set(OperationState::default());
    }

    fn emit(&self, effect: UiEffect) {
        match self.effects {
            Some(hub) => {
                hub.apply(effect);
            }
            None => log_warn!("[Hook] No EffectHub in context, dropping {:?}", effect),
        }
    }
}

/// 创建异步操作（带参数）
pub fn use_async_operation<T, A, F, Fut>(op: F, options: OperationOptions<T>) -> AsyncOperation<T, A>
where
    T: Clone + Send + Sync + 'static,
    A: 'static,
    F: Fn(A) -> Fut + 'static,
    Fut: Future<Output = ClientResult<T>> + 'static,
{
    let op: BoxedOp<T, A> = Box::new(move |args| op(args).boxed_local());
    AsyncOperation {
        state: RwSignal::new(OperationState::default()),
        runner: StoredValue::new_local(Runner { op, options }),
        effects: use_context::<EffectHub>(),
    }
}

/// 查询操作：除非 `immediate` 为 false，挂载时自动执行一次
///
/// 重新获取直接调用 `execute(())`。
pub fn use_query<T, F, Fut>(op: F, options: OperationOptions<T>) -> AsyncOperation<T>
where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> Fut + 'static,
    Fut: Future<Output = ClientResult<T>> + 'static,
{
    let immediate = options.immediate;
    let query = use_async_operation(move |()| op(), options);
    if immediate {
        spawn_local(async move {
            let _ = query.execute(()).await;
        });
    }
    query
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::notify::provide_effects;

    fn setup() -> (Owner, EffectHub) {
        let owner = Owner::new();
        owner.set();
        let hub = provide_effects();
        (owner, hub)
    }

    #[tokio::test]
    async fn query_runs_once_when_attached() {
        let _ = any_spawner::Executor::init_tokio();
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let (_owner, _hub) = setup();
                let calls = Rc::new(Cell::new(0));
                let counter = calls.clone();
                let query = use_query(
                    move || {
                        counter.set(counter.get() + 1);
                        async { Ok(7u32) }
                    },
                    OperationOptions::default(),
                );

                for _ in 0..20 {
                    if query.data().get_untracked().is_some() {
                        break;
                    }
                    tokio::task::yield_now().await;
                }

                assert_eq!(calls.get(), 1);
                assert_eq!(query.data().get_untracked(), Some(7));
                assert!(!query.loading().get_untracked());
                assert!(query.error().get_untracked().is_none());
            })
            .await;
    }

    #[tokio::test]
    async fn successful_operation_stores_data() {
        let (_owner, hub) = setup();
        let op = use_async_operation(
            |()| async { Ok(serde_json::json!({"ok": true})) },
            OperationOptions::default(),
        );

        let result = op.execute(()).await;

        assert_eq!(result.unwrap(), serde_json::json!({"ok": true}));
        let state = op.state().get_untracked();
        assert_eq!(state.data, Some(serde_json::json!({"ok": true})));
        assert!(!state.loading);
        assert_eq!(state.error, None);
        assert!(hub.toasts().get_untracked().is_empty());
    }

    #[tokio::test]
    async fn failure_is_recorded_toasted_once_and_returned() {
        let (_owner, hub) = setup();
        let errors = Rc::new(Cell::new(0));
        let seen = errors.clone();
        let op = use_async_operation(
            |()| async { Err::<u32, _>(ClientError::network("boom")) },
            OperationOptions::default().on_error(move |_| seen.set(seen.get() + 1)),
        );

        let err = op.execute(()).await.unwrap_err();

        assert_eq!(err.message(), "boom");
        let state = op.state().get_untracked();
        assert_eq!(state.error.map(|e| e.message().to_string()), Some("boom".to_string()));
        assert!(!state.loading);
        assert_eq!(errors.get(), 1);

        let toasts = hub.toasts().get_untracked();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].toast.variant, ToastVariant::Destructive);
        assert_eq!(toasts[0].toast.message(), "Error: boom");
    }

    #[tokio::test]
    async fn suppressed_error_toast() {
        let (_owner, hub) = setup();
        let op = use_async_operation(
            |()| async { Err::<u32, _>(ClientError::timeout("Request timed out")) },
            OperationOptions::default().silent_errors(),
        );

        assert!(op.execute(()).await.is_err());
        assert!(hub.toasts().get_untracked().is_empty());
    }

    #[tokio::test]
    async fn success_toast_requires_message() {
        let (_owner, hub) = setup();
        let flag_only = use_async_operation(
            |()| async { Ok(1u32) },
            OperationOptions {
                show_success_toast: true,
                ..OperationOptions::default()
            },
        );
        flag_only.execute(()).await.unwrap();
        assert!(hub.toasts().get_untracked().is_empty());

        let with_message = use_async_operation(
            |()| async { Ok(2u32) },
            OperationOptions::default().success_toast("Saved"),
        );
        with_message.execute(()).await.unwrap();
        let toasts = hub.toasts().get_untracked();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].toast.message(), "Success: Saved");
    }

    #[tokio::test]
    async fn empty_error_message_uses_fallback() {
        let (_owner, hub) = setup();
        let op = use_async_operation(
            |()| async { Err::<u32, _>(ClientError::network("")) },
            OperationOptions::default(),
        );
        let _ = op.execute(()).await;
        assert_eq!(
            hub.toasts().get_untracked()[0].toast.message(),
            "Error: Something went wrong"
        );
    }

    #[tokio::test]
    async fn reset_restores_initial_state() {
        let (_owner, _hub) = setup();
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let op = use_async_operation(
            move |()| {
                counter.set(counter.get() + 1);
                async { Ok("data".to_string()) }
            },
            OperationOptions::default(),
        );
        op.execute(()).await.unwrap();

        op.reset();

        assert_eq!(op.state().get_untracked(), OperationState::default());
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn mutation_passes_arguments() {
        let (_owner, _hub) = setup();
        let success = Rc::new(Cell::new(0usize));
        let sink = success.clone();
        let op = use_async_operation(
            |id: String| async move { Ok(id.len()) },
            OperationOptions::default().on_success(move |len: &usize| sink.set(*len)),
        );

        assert_eq!(op.execute("abc".to_string()).await.unwrap(), 3);
        assert_eq!(success.get(), 3);
    }

    #[test]
    fn manual_query_does_not_run_on_attach() {
        let (_owner, _hub) = setup();
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let query = use_query(
            move || {
                counter.set(counter.get() + 1);
                async { Ok(0u32) }
            },
            OperationOptions::default().manual(),
        );

        assert_eq!(calls.get(), 0);
        assert_eq!(query.state().get_untracked(), OperationState::default());
    }
}
