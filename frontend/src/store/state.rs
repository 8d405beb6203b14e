//! 全局应用状态
//!
//! 状态只能通过 [`super::reducer::reduce`] 从上一个状态产生。
//! 实体集合中的元素以 `Arc` 共享，未被修改的条目在状态转换后保持同一引用。

use std::sync::Arc;

use classmate_shared::{Assignment, Class, DashboardStats, Priority};
use serde::{Deserialize, Serialize};

// =========================================================
// 用户偏好 (Preferences)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultView {
    #[default]
    List,
    Grid,
    Calendar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeFormat {
    #[default]
    #[serde(rename = "12h")]
    H12,
    #[serde(rename = "24h")]
    H24,
}

/// 用户偏好，持久化到 `user-preferences`
///
/// 逐字段默认：部分写入的记录保留其中有效的字段。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub theme: Theme,
    pub notifications: bool,
    pub auto_sync: bool,
    pub default_view: DefaultView,
    pub time_format: TimeFormat,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            notifications: true,
            auto_sync: true,
            default_view: DefaultView::List,
            time_format: TimeFormat::H12,
        }
    }
}

/// 偏好的部分更新，`None` 表示保持原值
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreferencesPatch {
    pub theme: Option<Theme>,
    pub notifications: Option<bool>,
    pub auto_sync: Option<bool>,
    pub default_view: Option<DefaultView>,
    pub time_format: Option<TimeFormat>,
}

/// 整条记录作为补丁：覆盖全部字段
impl From<Preferences> for PreferencesPatch {
    fn from(p: Preferences) -> Self {
        Self {
            theme: Some(p.theme),
            notifications: Some(p.notifications),
            auto_sync: Some(p.auto_sync),
            default_view: Some(p.default_view),
            time_format: Some(p.time_format),
        }
    }
}

impl Preferences {
    /// 浅合并
    pub fn merged(&self, patch: &PreferencesPatch) -> Self {
        Self {
            theme: patch.theme.unwrap_or(self.theme),
            notifications: patch.notifications.unwrap_or(self.notifications),
            auto_sync: patch.auto_sync.unwrap_or(self.auto_sync),
            default_view: patch.default_view.unwrap_or(self.default_view),
            time_format: patch.time_format.unwrap_or(self.time_format),
        }
    }
}

// =========================================================
// 作业过滤 (Assignment Filters)
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentFilters {
    pub class_id: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub search: Option<String>,
}

/// 过滤条件的部分更新
///
/// 外层 `None`：保持原值；`Some(None)`：显式清除该字段。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub class_id: Option<Option<String>>,
    pub completed: Option<Option<bool>>,
    pub priority: Option<Option<Priority>>,
    pub search: Option<Option<String>>,
}

impl FilterPatch {
    /// 清除全部字段的补丁
    pub fn clear_all() -> Self {
        Self {
            class_id: Some(None),
            completed: Some(None),
            priority: Some(None),
            search: Some(None),
        }
    }
}

impl AssignmentFilters {
    /// 浅合并：只覆盖补丁中出现的字段
    pub fn merged(&self, patch: &FilterPatch) -> Self {
        Self {
            class_id: patch.class_id.clone().unwrap_or_else(|| self.class_id.clone()),
            completed: patch.completed.unwrap_or(self.completed),
            priority: patch.priority.unwrap_or(self.priority),
            search: patch.search.clone().unwrap_or_else(|| self.search.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// 本地过滤（标题与描述大小写不敏感搜索）
    pub fn matches(&self, assignment: &Assignment) -> bool {
        if let Some(class_id) = &self.class_id {
            if &assignment.class_id != class_id {
                return false;
            }
        }
        if let Some(completed) = self.completed {
            if assignment.completed != completed {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if assignment.priority != priority {
                return false;
            }
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            let in_title = assignment.title.to_lowercase().contains(&needle);
            let in_desc = assignment
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !in_title && !in_desc {
                return false;
            }
        }
        true
    }
}

// =========================================================
// 应用状态 (AppState)
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    // UI
    pub sidebar_collapsed: bool,
    pub current_page: String,

    // 领域缓存
    pub classes: Vec<Arc<Class>>,
    pub assignments: Vec<Arc<Assignment>>,
    pub dashboard_stats: Option<DashboardStats>,

    // 加载标记
    pub is_loading_classes: bool,
    pub is_loading_assignments: bool,
    pub is_loading_stats: bool,

    pub assignment_filters: AssignmentFilters,
    pub preferences: Preferences,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            sidebar_collapsed: false,
            current_page: String::new(),
            classes: Vec::new(),
            assignments: Vec::new(),
            dashboard_stats: None,
            is_loading_classes: false,
            is_loading_assignments: false,
            is_loading_stats: false,
            assignment_filters: AssignmentFilters::default(),
            preferences: Preferences::default(),
        }
    }
}

impl AppState {
    /// 以持久化的偏好与侧边栏状态作为初始值
    pub fn seeded(preferences: Preferences, sidebar_collapsed: bool) -> Self {
        Self {
            preferences,
            sidebar_collapsed,
            ..Self::default()
        }
    }

    /// 应用当前过滤条件后的作业
    pub fn filtered_assignments(&self) -> Vec<Arc<Assignment>> {
        self.assignments
            .iter()
            .filter(|a| self.assignment_filters.matches(a))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferences_default_values() {
        let p = Preferences::default();
        assert_eq!(p.theme, Theme::System);
        assert!(p.notifications && p.auto_sync);
        assert_eq!(p.default_view, DefaultView::List);
        assert_eq!(p.time_format, TimeFormat::H12);
    }

    #[test]
    fn preferences_wire_format() {
        let json = serde_json::to_value(Preferences::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "theme": "system",
                "notifications": true,
                "autoSync": true,
                "defaultView": "list",
                "timeFormat": "12h"
            })
        );
    }

    #[test]
    fn partial_preferences_keep_valid_fields() {
        let p: Preferences = serde_json::from_str(r#"{"theme":"dark","timeFormat":"24h"}"#).unwrap();
        assert_eq!(p.theme, Theme::Dark);
        assert_eq!(p.time_format, TimeFormat::H24);
        assert!(p.notifications);
    }

    #[test]
    fn filter_patch_distinguishes_keep_and_clear() {
        let filters = AssignmentFilters {
            class_id: Some("c1".into()),
            search: Some("lab".into()),
            ..Default::default()
        };
        let kept = filters.merged(&FilterPatch {
            priority: Some(Some(Priority::High)),
            ..Default::default()
        });
        assert_eq!(kept.class_id.as_deref(), Some("c1"));
        assert_eq!(kept.priority, Some(Priority::High));

        let cleared = kept.merged(&FilterPatch::clear_all());
        assert!(cleared.is_empty());
    }
}
