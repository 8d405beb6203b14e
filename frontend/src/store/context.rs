//! 应用状态上下文
//!
//! 单向数据流：
//! 1. 启动时读取一次偏好存储，作为 reducer 的初始状态（不存在“先默认后覆盖”的闪烁）
//! 2. 辅助操作先派发动作，再把 reducer 确认后的值写回存储

use leptos::prelude::*;

use super::reducer::{AppAction, reduce};
use super::state::{AppState, FilterPatch, Preferences, PreferencesPatch};
use crate::config::{PREFERENCES_KEY, SIDEBAR_KEY};
use crate::web::PreferenceStore;

#[derive(Clone, Copy)]
pub struct AppStore {
    state: RwSignal<AppState>,
    prefs: StoredValue<PreferenceStore>,
}

impl AppStore {
    /// 从偏好存储播种初始状态
    pub fn new(prefs: PreferenceStore) -> Self {
        let (preferences, sidebar_collapsed) = stored_ui_state(&prefs);

        Self {
            state: RwSignal::new(AppState::seeded(preferences, sidebar_collapsed)),
            prefs: StoredValue::new(prefs),
        }
    }

    /// 状态信号（只读）
    pub fn state(&self) -> ReadSignal<AppState> {
        self.state.read_only()
    }

    /// 派生一个只在所选值变化时通知的信号
    pub fn select<T>(&self, f: impl Fn(&AppState) -> T + Send + Sync + 'static) -> Memo<T>
    where
        T: PartialEq + Send + Sync + 'static,
    {
        let state = self.state;
        Memo::new(move |_| state.with(|s| f(s)))
    }

    /// 按派发顺序应用动作
    pub fn dispatch(&self, action: AppAction) {
        if matches!(action, AppAction::ResetState) {
            log_info!("[Store] {}", action.name());
        }
        self.state.update(|state| *state = reduce(state, action));
    }

    // =========================================================
    // 辅助操作
    // =========================================================

    pub fn toggle_sidebar(&self) {
        let collapsed = !self.state.with_untracked(|s| s.sidebar_collapsed);
        self.dispatch(AppAction::SetSidebarCollapsed(collapsed));
        self.persist_sidebar();
    }

    pub fn set_current_page(&self, page: impl Into<String>) {
        self.dispatch(AppAction::SetCurrentPage(page.into()));
    }

    pub fn update_preferences(&self, patch: PreferencesPatch) {
        self.dispatch(AppAction::SetPreferences(patch));
        let preferences = self.state.with_untracked(|s| s.preferences);
        self.prefs
            .with_value(|p| p.set_json(PREFERENCES_KEY, &preferences));
    }

    /// 显式清除全部过滤字段
    pub fn clear_filters(&self) {
        self.dispatch(AppAction::SetAssignmentFilters(FilterPatch::clear_all()));
    }

    /// 完全重置内存状态，随后从存储重新播种偏好与侧边栏
    ///
    /// 内存与存储保持一致，之后的偏好更新不会用默认值覆盖已保存的字段。
    pub fn reset_app(&self) {
        self.dispatch(AppAction::ResetState);
        let (preferences, sidebar_collapsed) = self.prefs.with_value(stored_ui_state);
        self.dispatch(AppAction::SetPreferences(preferences.into()));
        self.dispatch(AppAction::SetSidebarCollapsed(sidebar_collapsed));
    }

    fn persist_sidebar(&self) {
        let collapsed = self.state.with_untracked(|s| s.sidebar_collapsed);
        self.prefs.with_value(|p| p.set_json(SIDEBAR_KEY, &collapsed));
    }
}

/// 读取持久化的偏好与侧边栏状态，缺失或损坏时取默认值
fn stored_ui_state(prefs: &PreferenceStore) -> (Preferences, bool) {
    (
        prefs.get_json(PREFERENCES_KEY, Preferences::default()),
        prefs.get_json(SIDEBAR_KEY, false),
    )
}

pub fn provide_app_store(prefs: PreferenceStore) -> AppStore {
    let store = AppStore::new(prefs);
    provide_context(store);
    store
}

pub fn use_app_store() -> AppStore {
    use_context::<AppStore>().expect("AppStore should be provided")
}
