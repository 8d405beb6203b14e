//! 全局应用状态：纯 reducer + 响应式上下文

mod context;
pub mod reducer;
pub mod state;

pub use context::{AppStore, provide_app_store, use_app_store};
pub use reducer::AppAction;
pub use state::{FilterPatch, PreferencesPatch};

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, TimeZone, Utc};
    use classmate_shared::{Assignment, Class, ClassRef, ClassSchedule, Priority};

    fn epoch() -> DateTime<Utc> {
        Utc.timestamp_opt(0, 0).unwrap()
    }

    pub fn class(id: &str, name: &str) -> Class {
        Class {
            id: id.to_string(),
            name: name.to_string(),
            code: None,
            instructor: None,
            room: None,
            schedule: ClassSchedule::default(),
            google_classroom_id: None,
            created_at: epoch(),
            updated_at: epoch(),
        }
    }

    pub fn assignment(id: &str, class_id: &str, title: &str) -> Assignment {
        Assignment {
            id: id.to_string(),
            title: title.to_string(),
            description: None,
            due_date: None,
            completed: false,
            priority: Priority::Medium,
            attachments: Vec::new(),
            class_id: class_id.to_string(),
            class: ClassRef {
                id: class_id.to_string(),
                name: "Class".to_string(),
                code: None,
            },
            created_at: epoch(),
            updated_at: epoch(),
        }
    }
}
