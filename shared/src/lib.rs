//! ClassMate 共享模型
//!
//! 前端与后端之间的数据契约：领域实体、响应信封以及类型化的请求目录
//! （见 [`protocol`]）。所有字段以 camelCase 进行序列化，与后端 JSON 保持一致。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod protocol;

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const API_PREFIX: &str = "/api";
pub const HEADER_AUTHORIZATION: &str = "Authorization";

// =========================================================
// 身份 (Identity)
// =========================================================

/// 已登录用户
///
/// `created_at` 在首次解析会话时确定，客户端之后不再修改。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =========================================================
// 课程 (Classes)
// =========================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSchedule {
    /// 例如 `["monday", "wednesday", "friday"]`
    pub days: Vec<String>,
    /// `HH:MM`
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub instructor: Option<String>,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub schedule: ClassSchedule,
    #[serde(default)]
    pub google_classroom_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 嵌入在其他实体中的课程摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRef {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClassData {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    pub schedule: ClassSchedule,
}

/// 课程的部分更新，未设置的字段不会发送
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ClassSchedule>,
}

// =========================================================
// 作业 (Assignments)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentFile {
    pub id: String,
    pub filename: String,
    pub url: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    pub completed: bool,
    pub priority: Priority,
    #[serde(default)]
    pub attachments: Vec<AssignmentFile>,
    pub class_id: String,
    pub class: ClassRef,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssignmentData {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub class_id: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingAssignment {
    pub id: String,
    pub title: String,
    pub due_date: DateTime<Utc>,
    pub class_name: String,
    pub priority: Priority,
    pub days_until_due: i64,
}

// =========================================================
// 考勤 (Attendance)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub status: AttendanceStatus,
    pub class_id: String,
    pub class: ClassRef,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendanceData {
    pub date: String,
    pub status: AttendanceStatus,
    pub class_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassAttendance {
    pub class_id: String,
    pub class_name: String,
    pub percentage: f64,
    pub total: u32,
    pub present: u32,
    pub absent: u32,
    pub late: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceStats {
    pub overall: f64,
    #[serde(default)]
    pub by_class: Vec<ClassAttendance>,
}

// =========================================================
// 成绩 (Grades)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRef {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub id: String,
    pub score: f64,
    pub max_score: f64,
    pub weight: f64,
    /// exam / assignment / quiz / project ...
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub assignment_id: Option<String>,
    pub class_id: String,
    pub class: ClassRef,
    #[serde(default)]
    pub assignment: Option<AssignmentRef>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGradeData {
    pub score: f64,
    pub max_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment_id: Option<String>,
    pub class_id: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassGpa {
    pub class_id: String,
    pub class_name: String,
    pub gpa: f64,
    pub credit_hours: f64,
    pub letter_grade: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpaData {
    pub overall: f64,
    #[serde(default)]
    pub by_class: Vec<ClassGpa>,
}

// =========================================================
// 日历 (Calendar)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub google_event_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventData {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

// =========================================================
// 仪表盘 & 上传 (Dashboard & Uploads)
// =========================================================

/// 仪表盘快照，整体替换，从不部分合并
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_classes: u32,
    pub total_assignments: u32,
    pub completed_assignments: u32,
    pub pending_assignments: u32,
    pub overall_attendance: f64,
    #[serde(rename = "overallGPA")]
    pub overall_gpa: f64,
    pub upcoming_deadlines: u32,
    pub ai_suggestions: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileUploadResponse {
    pub id: String,
    pub filename: String,
    pub url: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
}

// =========================================================
// 响应信封 (Response Envelope)
// =========================================================

/// 分页信息；缺失的字段取 0，不影响整个列表的解析
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u32,
    pub pages: u32,
}

/// 所有接口统一的响应外壳
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_stats_uses_backend_gpa_key() {
        let json = r#"{
            "totalClasses": 5, "totalAssignments": 12, "completedAssignments": 7,
            "pendingAssignments": 5, "overallAttendance": 93.5, "overallGPA": 3.6,
            "upcomingDeadlines": 3, "aiSuggestions": 2
        }"#;
        let stats: DashboardStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.total_classes, 5);
        assert_eq!(stats.overall_gpa, 3.6);
    }

    #[test]
    fn envelope_without_data_parses() {
        let env: ApiResponse<Vec<Class>> =
            serde_json::from_str(r#"{"success":false,"message":"Class not found"}"#).unwrap();
        assert!(!env.success);
        assert!(env.data.is_none());
        assert_eq!(env.message.as_deref(), Some("Class not found"));
    }

    #[test]
    fn envelope_carries_pagination() {
        let env: ApiResponse<Vec<String>> = serde_json::from_str(
            r#"{"success":true,"data":[],"pagination":{"page":2,"limit":20,"total":41,"pages":3}}"#,
        )
        .unwrap();
        assert_eq!(env.pagination.unwrap().pages, 3);
    }

    #[test]
    fn partial_pagination_does_not_fail_the_list() {
        let env: ApiResponse<Vec<String>> = serde_json::from_str(
            r#"{"success":true,"data":["a"],"pagination":{"page":1,"limit":20,"total":1}}"#,
        )
        .unwrap();
        assert_eq!(env.data.unwrap().len(), 1);
        let pagination = env.pagination.unwrap();
        assert_eq!(pagination.total, 1);
        assert_eq!(pagination.pages, 0);
    }

    #[test]
    fn assignment_parses_with_optional_fields_missing() {
        let json = r#"{
            "id": "a1", "title": "Essay", "completed": false, "priority": "high",
            "classId": "c1", "class": {"id": "c1", "name": "English"},
            "createdAt": "2024-09-01T10:00:00Z", "updatedAt": "2024-09-01T10:00:00Z"
        }"#;
        let a: Assignment = serde_json::from_str(json).unwrap();
        assert_eq!(a.priority, Priority::High);
        assert!(a.due_date.is_none());
        assert!(a.attachments.is_empty());
    }

    #[test]
    fn changes_skip_unset_fields() {
        let changes = AssignmentChanges {
            completed: Some(true),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&changes).unwrap(),
            r#"{"completed":true}"#
        );
    }
}
