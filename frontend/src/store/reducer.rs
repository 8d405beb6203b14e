use std::sync::Arc;

use classmate_shared::{Assignment, Class, DashboardStats};

use super::state::{AppState, FilterPatch, PreferencesPatch};

/// 应用状态动作
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    SetSidebarCollapsed(bool),
    SetCurrentPage(String),
    SetClasses(Vec<Class>),
    AddClass(Class),
    UpdateClass(Class),
    DeleteClass(String),
    SetAssignments(Vec<Assignment>),
    AddAssignment(Assignment),
    UpdateAssignment(Assignment),
    DeleteAssignment(String),
    SetDashboardStats(DashboardStats),
    SetLoadingClasses(bool),
    SetLoadingAssignments(bool),
    SetLoadingStats(bool),
    /// 浅合并到现有过滤条件
    SetAssignmentFilters(FilterPatch),
    /// 浅合并到现有偏好
    SetPreferences(PreferencesPatch),
    /// 回到固定初始状态（包括偏好与侧边栏）
    ResetState,
}

impl AppAction {
    /// 动作名称（日志用）
    pub fn name(&self) -> &'static str {
        match self {
            AppAction::SetSidebarCollapsed(_) => "SET_SIDEBAR_COLLAPSED",
            AppAction::SetCurrentPage(_) => "SET_CURRENT_PAGE",
            AppAction::SetClasses(_) => "SET_CLASSES",
            AppAction::AddClass(_) => "ADD_CLASS",
            AppAction::UpdateClass(_) => "UPDATE_CLASS",
            AppAction::DeleteClass(_) => "DELETE_CLASS",
            AppAction::SetAssignments(_) => "SET_ASSIGNMENTS",
            AppAction::AddAssignment(_) => "ADD_ASSIGNMENT",
            AppAction::UpdateAssignment(_) => "UPDATE_ASSIGNMENT",
            AppAction::DeleteAssignment(_) => "DELETE_ASSIGNMENT",
            AppAction::SetDashboardStats(_) => "SET_DASHBOARD_STATS",
            AppAction::SetLoadingClasses(_) => "SET_LOADING_CLASSES",
            AppAction::SetLoadingAssignments(_) => "SET_LOADING_ASSIGNMENTS",
            AppAction::SetLoadingStats(_) => "SET_LOADING_STATS",
            AppAction::SetAssignmentFilters(_) => "SET_ASSIGNMENT_FILTERS",
            AppAction::SetPreferences(_) => "SET_PREFERENCES",
            AppAction::ResetState => "RESET_STATE",
        }
    }
}

/// 具有字符串 id 的实体
trait Identified {
    fn id(&self) -> &str;
}

impl Identified for Class {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Assignment {
    fn id(&self) -> &str {
        &self.id
    }
}

/// 替换 id 匹配的条目，其余条目保持同一引用
fn replace_by_id<T: Identified>(items: &[Arc<T>], updated: T) -> Vec<Arc<T>> {
    let updated = Arc::new(updated);
    items
        .iter()
        .map(|item| {
            if item.id() == updated.id() {
                updated.clone()
            } else {
                item.clone()
            }
        })
        .collect()
}

fn remove_by_id<T: Identified>(items: &[Arc<T>], id: &str) -> Vec<Arc<T>> {
    items.iter().filter(|item| item.id() != id).cloned().collect()
}

/// 追加新条目；id 已存在时原位替换
fn upserted<T: Identified>(items: &[Arc<T>], item: T) -> Vec<Arc<T>> {
    if items.iter().any(|existing| existing.id() == item.id()) {
        return replace_by_id(items, item);
    }
    let mut out = items.to_vec();
    out.push(Arc::new(item));
    out
}

/// 按 id 去重：保留首次出现的位置，后出现的同 id 条目覆盖其内容
fn deduplicated<T: Identified>(items: Vec<T>) -> Vec<Arc<T>> {
    let mut out: Vec<Arc<T>> = Vec::with_capacity(items.len());
    for item in items {
        match out.iter().position(|existing| existing.id() == item.id()) {
            Some(index) => out[index] = Arc::new(item),
            None => out.push(Arc::new(item)),
        }
    }
    out
}

/// 纯函数状态转换
///
/// 相同的动作序列从相同的初始状态出发总是得到相同的结果。
/// 每个集合内 id 唯一：重复添加同一 id 等同于更新，批量设置时后者覆盖前者。
/// 更新/删除不存在的 id 是空操作。
pub fn reduce(state: &AppState, action: AppAction) -> AppState {
    match action {
        AppAction::SetSidebarCollapsed(collapsed) => AppState {
            sidebar_collapsed: collapsed,
            ..state.clone()
        },
        AppAction::SetCurrentPage(page) => AppState {
            current_page: page,
            ..state.clone()
        },
        AppAction::SetClasses(classes) => AppState {
            classes: deduplicated(classes),
            ..state.clone()
        },
        AppAction::AddClass(class) => AppState {
            classes: upserted(&state.classes, class),
            ..state.clone()
        },
        AppAction::UpdateClass(class) => AppState {
            classes: replace_by_id(&state.classes, class),
            ..state.clone()
        },
        AppAction::DeleteClass(id) => AppState {
            classes: remove_by_id(&state.classes, &id),
            ..state.clone()
        },
        AppAction::SetAssignments(assignments) => AppState {
            assignments: deduplicated(assignments),
            ..state.clone()
        },
        AppAction::AddAssignment(assignment) => AppState {
            assignments: upserted(&state.assignments, assignment),
            ..state.clone()
        },
        AppAction::UpdateAssignment(assignment) => AppState {
            assignments: replace_by_id(&state.assignments, assignment),
            ..state.clone()
        },
        AppAction::DeleteAssignment(id) => AppState {
            assignments: remove_by_id(&state.assignments, &id),
            ..state.clone()
        },
        AppAction::SetDashboardStats(stats) => AppState {
            dashboard_stats: Some(stats),
            ..state.clone()
        },
        AppAction::SetLoadingClasses(loading) => AppState {
            is_loading_classes: loading,
            ..state.clone()
        },
        AppAction::SetLoadingAssignments(loading) => AppState {
            is_loading_assignments: loading,
            ..state.clone()
        },
        AppAction::SetLoadingStats(loading) => AppState {
            is_loading_stats: loading,
            ..state.clone()
        },
        AppAction::SetAssignmentFilters(patch) => AppState {
            assignment_filters: state.assignment_filters.merged(&patch),
            ..state.clone()
        },
        AppAction::SetPreferences(patch) => AppState {
            preferences: state.preferences.merged(&patch),
            ..state.clone()
        },
        AppAction::ResetState => AppState::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fixtures::{assignment, class};
    use crate::store::state::{Preferences, Theme};
    use classmate_shared::Priority;

    fn apply_all(actions: Vec<AppAction>) -> AppState {
        actions
            .into_iter()
            .fold(AppState::default(), |state, action| reduce(&state, action))
    }

    fn sample_sequence() -> Vec<AppAction> {
        vec![
            AppAction::SetClasses(vec![class("c1", "Math"), class("c2", "Physics")]),
            AppAction::AddAssignment(assignment("a1", "c1", "Lab report")),
            AppAction::SetSidebarCollapsed(true),
            AppAction::UpdateClass(class("c2", "Physics II")),
            AppAction::SetAssignmentFilters(FilterPatch {
                search: Some(Some("lab".into())),
                ..Default::default()
            }),
            AppAction::SetLoadingStats(true),
        ]
    }

    #[test]
    fn replay_is_deterministic() {
        assert_eq!(apply_all(sample_sequence()), apply_all(sample_sequence()));
    }

    #[test]
    fn update_only_changes_matched_entry_reference() {
        let state = apply_all(vec![AppAction::SetClasses(vec![
            class("c1", "Math"),
            class("c2", "Physics"),
        ])]);
        let next = reduce(&state, AppAction::UpdateClass(class("c2", "Physics II")));

        assert!(Arc::ptr_eq(&state.classes[0], &next.classes[0]));
        assert!(!Arc::ptr_eq(&state.classes[1], &next.classes[1]));
        assert_eq!(next.classes[1].name, "Physics II");
    }

    #[test]
    fn update_of_missing_class_is_noop() {
        let state = apply_all(vec![AppAction::SetClasses(vec![class("c1", "Math")])]);
        let next = reduce(&state, AppAction::UpdateClass(class("zz", "Ghost")));

        assert_eq!(next.classes, state.classes);
        assert!(Arc::ptr_eq(&state.classes[0], &next.classes[0]));
    }

    #[test]
    fn delete_assignment_removes_exactly_one_match() {
        let state = apply_all(vec![AppAction::SetAssignments(vec![
            assignment("a1", "c1", "Essay"),
            assignment("a2", "c1", "Quiz"),
        ])]);

        let next = reduce(&state, AppAction::DeleteAssignment("a1".into()));
        assert_eq!(next.assignments.len(), 1);
        assert_eq!(next.assignments[0].id, "a2");

        let unchanged = reduce(&next, AppAction::DeleteAssignment("missing".into()));
        assert_eq!(unchanged.assignments, next.assignments);
    }

    #[test]
    fn adding_existing_id_replaces_in_place() {
        let state = apply_all(vec![
            AppAction::AddClass(class("c1", "Math")),
            AppAction::AddClass(class("c2", "Physics")),
            AppAction::AddClass(class("c1", "Algebra")),
        ]);
        assert_eq!(state.classes.len(), 2);
        assert_eq!(state.classes[0].name, "Algebra");
        assert_eq!(state.classes[1].id, "c2");

        let next = reduce(&state, AppAction::DeleteClass("c1".into()));
        assert_eq!(next.classes.len(), 1);
        assert_eq!(next.classes[0].id, "c2");
    }

    #[test]
    fn set_collapses_duplicate_ids() {
        let state = apply_all(vec![AppAction::SetAssignments(vec![
            assignment("a1", "c1", "Draft"),
            assignment("a2", "c1", "Quiz"),
            assignment("a1", "c1", "Final"),
        ])]);
        let ids: Vec<&str> = state.assignments.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["a1", "a2"]);
        assert_eq!(state.assignments[0].title, "Final");

        let twice = reduce(&state, AppAction::AddAssignment(assignment("a2", "c1", "Quiz 2")));
        let next = reduce(&twice, AppAction::DeleteAssignment("a2".into()));
        assert_eq!(next.assignments.len(), 1);
    }

    #[test]
    fn deleting_class_keeps_its_assignments() {
        let state = apply_all(vec![
            AppAction::SetClasses(vec![class("c1", "Math")]),
            AppAction::SetAssignments(vec![assignment("a1", "c1", "Essay")]),
            AppAction::DeleteClass("c1".into()),
        ]);
        assert!(state.classes.is_empty());
        assert_eq!(state.assignments.len(), 1);
    }

    #[test]
    fn filters_merge_instead_of_replace() {
        let state = apply_all(vec![
            AppAction::SetAssignmentFilters(FilterPatch {
                class_id: Some(Some("c1".into())),
                ..Default::default()
            }),
            AppAction::SetAssignmentFilters(FilterPatch {
                priority: Some(Some(Priority::High)),
                ..Default::default()
            }),
        ]);
        assert_eq!(state.assignment_filters.class_id.as_deref(), Some("c1"));
        assert_eq!(state.assignment_filters.priority, Some(Priority::High));
        assert_eq!(state.assignment_filters.completed, None);
        assert_eq!(state.assignment_filters.search, None);
    }

    #[test]
    fn preferences_merge_shallowly() {
        let state = apply_all(vec![AppAction::SetPreferences(PreferencesPatch {
            theme: Some(Theme::Dark),
            ..Default::default()
        })]);
        assert_eq!(
            state.preferences,
            Preferences {
                theme: Theme::Dark,
                ..Preferences::default()
            }
        );
    }

    #[test]
    fn reset_returns_initial_state() {
        let mut actions = sample_sequence();
        actions.push(AppAction::SetPreferences(PreferencesPatch {
            notifications: Some(false),
            ..Default::default()
        }));
        actions.push(AppAction::SetDashboardStats(DashboardStats::default()));
        actions.push(AppAction::ResetState);

        assert_eq!(apply_all(actions), AppState::default());
    }

    #[test]
    fn stats_are_replaced_wholesale() {
        let first = DashboardStats {
            total_classes: 3,
            overall_gpa: 3.5,
            ..Default::default()
        };
        let second = DashboardStats {
            total_assignments: 9,
            ..Default::default()
        };
        let state = apply_all(vec![
            AppAction::SetDashboardStats(first),
            AppAction::SetDashboardStats(second.clone()),
        ]);
        assert_eq!(state.dashboard_stats, Some(second));
    }

    #[test]
    fn action_names_match_wire_style() {
        assert_eq!(AppAction::ResetState.name(), "RESET_STATE");
        assert_eq!(
            AppAction::SetLoadingAssignments(true).name(),
            "SET_LOADING_ASSIGNMENTS"
        );
    }
}
