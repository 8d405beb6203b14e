use crate::{
    Assignment, AttendanceRecord, AttendanceStats, AttendanceStatus, CalendarEvent, Class,
    ClassChanges, CreateAssignmentData, CreateClassData, CreateEventData, CreateGradeData,
    DashboardStats, EventChanges, GpaData, Grade, GradeChanges, MarkAttendanceData, Priority,
    UpcomingAssignment, User, AssignmentChanges,
};
use serde::{Serialize, de::DeserializeOwned};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// 该方法是否携带 JSON 请求体
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
///
/// 请求结构体本身即为请求体（仅 POST/PUT 发送）。路径参数字段使用
/// `#[serde(skip)]`，只出现在 [`ApiRequest::path`] 中。
pub trait ApiRequest: Serialize {
    /// The response type carried in the envelope's `data` field.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;

    /// The URL path, including path parameters.
    fn path(&self) -> String;

    /// Query string pairs (unencoded).
    fn query(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// 完整的相对地址：路径 + 编码后的查询串
    fn url(&self) -> String {
        format!("{}{}", self.path(), encode_query(&self.query()))
    }
}

/// 编码查询参数，空列表返回空字符串
pub fn encode_query(pairs: &[(&'static str, String)]) -> String {
    if pairs.is_empty() {
        return String::new();
    }
    let encoded: Vec<String> = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect();
    format!("?{}", encoded.join("&"))
}

fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

// =========================================================
// Query Parameters
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
}

impl PaginationParams {
    fn push_into(&self, out: &mut Vec<(&'static str, String)>) {
        if let Some(page) = self.page {
            out.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            out.push(("limit", limit.to_string()));
        }
        if let Some(sort) = &self.sort {
            out.push(("sort", sort.clone()));
        }
        if let Some(order) = self.order {
            let order = match order {
                SortOrder::Asc => "asc",
                SortOrder::Desc => "desc",
            };
            out.push(("order", order.to_string()));
        }
    }
}

/// 作业列表的服务端筛选条件
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentQuery {
    pub class_id: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub due_date: Option<String>,
    pub search: Option<String>,
    pub overdue: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttendanceQuery {
    pub class_id: Option<String>,
    pub status: Option<AttendanceStatus>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub month: Option<String>,
}

// =========================================================
// Auth
// =========================================================

#[derive(Debug, Serialize)]
pub struct CurrentUserRequest;

impl ApiRequest for CurrentUserRequest {
    type Response = User;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/api/auth/me".to_string()
    }
}

#[derive(Debug, Serialize)]
pub struct LogoutRequest;

impl ApiRequest for LogoutRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/api/auth/logout".to_string()
    }
}

// =========================================================
// Dashboard
// =========================================================

#[derive(Debug, Serialize)]
pub struct DashboardStatsRequest;

impl ApiRequest for DashboardStatsRequest {
    type Response = DashboardStats;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/api/dashboard/stats".to_string()
    }
}

// =========================================================
// Classes
// =========================================================

#[derive(Debug, Serialize)]
pub struct ListClassesRequest;

impl ApiRequest for ListClassesRequest {
    type Response = Vec<Class>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/api/classes".to_string()
    }
}

#[derive(Debug, Serialize)]
pub struct GetClassRequest {
    #[serde(skip)]
    pub id: String,
}

impl ApiRequest for GetClassRequest {
    type Response = Class;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/api/classes/{}", segment(&self.id))
    }
}

impl ApiRequest for CreateClassData {
    type Response = Class;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/api/classes".to_string()
    }
}

#[derive(Debug, Serialize)]
pub struct UpdateClassRequest {
    #[serde(skip)]
    pub id: String,
    #[serde(flatten)]
    pub changes: ClassChanges,
}

impl ApiRequest for UpdateClassRequest {
    type Response = Class;
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        format!("/api/classes/{}", segment(&self.id))
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteClassRequest {
    #[serde(skip)]
    pub id: String,
}

impl ApiRequest for DeleteClassRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;
    fn path(&self) -> String {
        format!("/api/classes/{}", segment(&self.id))
    }
}

/// 从 Google Classroom 同步课程
#[derive(Debug, Serialize)]
pub struct SyncClassesRequest;

impl ApiRequest for SyncClassesRequest {
    type Response = Vec<Class>;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/api/classes/sync".to_string()
    }
}

// =========================================================
// Assignments
// =========================================================

#[derive(Debug, Default, Serialize)]
pub struct ListAssignmentsRequest {
    #[serde(skip)]
    pub filters: AssignmentQuery,
    #[serde(skip)]
    pub pagination: PaginationParams,
}

impl ApiRequest for ListAssignmentsRequest {
    type Response = Vec<Assignment>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/api/assignments".to_string()
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let f = &self.filters;
        let mut out = Vec::new();
        if let Some(v) = &f.class_id {
            out.push(("classId", v.clone()));
        }
        if let Some(v) = f.completed {
            out.push(("completed", v.to_string()));
        }
        if let Some(v) = f.priority {
            out.push(("priority", v.as_str().to_string()));
        }
        if let Some(v) = &f.due_date {
            out.push(("dueDate", v.clone()));
        }
        if let Some(v) = &f.search {
            out.push(("search", v.clone()));
        }
        if let Some(v) = f.overdue {
            out.push(("overdue", v.to_string()));
        }
        self.pagination.push_into(&mut out);
        out
    }
}

#[derive(Debug, Serialize)]
pub struct GetAssignmentRequest {
    #[serde(skip)]
    pub id: String,
}

impl ApiRequest for GetAssignmentRequest {
    type Response = Assignment;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/api/assignments/{}", segment(&self.id))
    }
}

impl ApiRequest for CreateAssignmentData {
    type Response = Assignment;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/api/assignments".to_string()
    }
}

#[derive(Debug, Serialize)]
pub struct UpdateAssignmentRequest {
    #[serde(skip)]
    pub id: String,
    #[serde(flatten)]
    pub changes: AssignmentChanges,
}

impl ApiRequest for UpdateAssignmentRequest {
    type Response = Assignment;
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        format!("/api/assignments/{}", segment(&self.id))
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteAssignmentRequest {
    #[serde(skip)]
    pub id: String,
}

impl ApiRequest for DeleteAssignmentRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;
    fn path(&self) -> String {
        format!("/api/assignments/{}", segment(&self.id))
    }
}

/// 标记作业完成状态，body: `{completed}`
#[derive(Debug, Serialize)]
pub struct CompleteAssignmentRequest {
    #[serde(skip)]
    pub id: String,
    pub completed: bool,
}

impl ApiRequest for CompleteAssignmentRequest {
    type Response = Assignment;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        format!("/api/assignments/{}/complete", segment(&self.id))
    }
}

#[derive(Debug, Serialize)]
pub struct UpcomingAssignmentsRequest;

impl ApiRequest for UpcomingAssignmentsRequest {
    type Response = Vec<UpcomingAssignment>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/api/assignments/upcoming".to_string()
    }
}

#[derive(Debug, Serialize)]
pub struct SyncAssignmentsRequest;

impl ApiRequest for SyncAssignmentsRequest {
    type Response = Vec<Assignment>;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/api/assignments/sync".to_string()
    }
}

// =========================================================
// Attendance
// =========================================================

#[derive(Debug, Default, Serialize)]
pub struct ListAttendanceRequest {
    #[serde(skip)]
    pub filters: AttendanceQuery,
    #[serde(skip)]
    pub pagination: PaginationParams,
}

impl ApiRequest for ListAttendanceRequest {
    type Response = Vec<AttendanceRecord>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/api/attendance".to_string()
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let f = &self.filters;
        let mut out = Vec::new();
        if let Some(v) = &f.class_id {
            out.push(("classId", v.clone()));
        }
        if let Some(v) = f.status {
            out.push(("status", v.as_str().to_string()));
        }
        if let Some(v) = &f.start_date {
            out.push(("startDate", v.clone()));
        }
        if let Some(v) = &f.end_date {
            out.push(("endDate", v.clone()));
        }
        if let Some(v) = &f.month {
            out.push(("month", v.clone()));
        }
        self.pagination.push_into(&mut out);
        out
    }
}

impl ApiRequest for MarkAttendanceData {
    type Response = AttendanceRecord;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/api/attendance".to_string()
    }
}

#[derive(Debug, Serialize)]
pub struct UpdateAttendanceRequest {
    #[serde(skip)]
    pub id: String,
    pub status: AttendanceStatus,
}

impl ApiRequest for UpdateAttendanceRequest {
    type Response = AttendanceRecord;
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        format!("/api/attendance/{}", segment(&self.id))
    }
}

#[derive(Debug, Serialize)]
pub struct AttendanceStatsRequest;

impl ApiRequest for AttendanceStatsRequest {
    type Response = AttendanceStats;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/api/attendance/stats".to_string()
    }
}

#[derive(Debug, Serialize)]
pub struct ClassAttendanceRequest {
    #[serde(skip)]
    pub class_id: String,
}

impl ApiRequest for ClassAttendanceRequest {
    type Response = Vec<AttendanceRecord>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/api/attendance/class/{}", segment(&self.class_id))
    }
}

// =========================================================
// Grades
// =========================================================

#[derive(Debug, Serialize)]
pub struct ListGradesRequest;

impl ApiRequest for ListGradesRequest {
    type Response = Vec<Grade>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/api/grades".to_string()
    }
}

impl ApiRequest for CreateGradeData {
    type Response = Grade;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/api/grades".to_string()
    }
}

#[derive(Debug, Serialize)]
pub struct UpdateGradeRequest {
    #[serde(skip)]
    pub id: String,
    #[serde(flatten)]
    pub changes: GradeChanges,
}

impl ApiRequest for UpdateGradeRequest {
    type Response = Grade;
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        format!("/api/grades/{}", segment(&self.id))
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteGradeRequest {
    #[serde(skip)]
    pub id: String,
}

impl ApiRequest for DeleteGradeRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;
    fn path(&self) -> String {
        format!("/api/grades/{}", segment(&self.id))
    }
}

#[derive(Debug, Serialize)]
pub struct GpaRequest;

impl ApiRequest for GpaRequest {
    type Response = GpaData;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/api/grades/gpa".to_string()
    }
}

#[derive(Debug, Serialize)]
pub struct ClassGradesRequest {
    #[serde(skip)]
    pub class_id: String,
}

impl ApiRequest for ClassGradesRequest {
    type Response = Vec<Grade>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/api/grades/class/{}", segment(&self.class_id))
    }
}

// =========================================================
// Calendar
// =========================================================

#[derive(Debug, Serialize)]
pub struct ListEventsRequest;

impl ApiRequest for ListEventsRequest {
    type Response = Vec<CalendarEvent>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/api/calendar/events".to_string()
    }
}

impl ApiRequest for CreateEventData {
    type Response = CalendarEvent;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/api/calendar/events".to_string()
    }
}

#[derive(Debug, Serialize)]
pub struct UpdateEventRequest {
    #[serde(skip)]
    pub id: String,
    #[serde(flatten)]
    pub changes: EventChanges,
}

impl ApiRequest for UpdateEventRequest {
    type Response = CalendarEvent;
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        format!("/api/calendar/events/{}", segment(&self.id))
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteEventRequest {
    #[serde(skip)]
    pub id: String,
}

impl ApiRequest for DeleteEventRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;
    fn path(&self) -> String {
        format!("/api/calendar/events/{}", segment(&self.id))
    }
}

#[derive(Debug, Serialize)]
pub struct SyncCalendarRequest;

impl ApiRequest for SyncCalendarRequest {
    type Response = Vec<CalendarEvent>;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/api/calendar/sync".to_string()
    }
}

// =========================================================
// Uploads (multipart，不走 JSON 序列化)
// =========================================================

pub const UPLOAD_PATH: &str = "/api/upload";
pub const UPLOAD_MULTIPLE_PATH: &str = "/api/upload/multiple";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_parameters_are_encoded() {
        let req = GetClassRequest {
            id: "math 101/a".to_string(),
        };
        assert_eq!(req.path(), "/api/classes/math%20101%2Fa");
    }

    #[test]
    fn complete_request_sends_only_completed_flag() {
        let req = CompleteAssignmentRequest {
            id: "a1".to_string(),
            completed: true,
        };
        assert_eq!(req.path(), "/api/assignments/a1/complete");
        assert_eq!(CompleteAssignmentRequest::METHOD, HttpMethod::Post);
        assert_eq!(
            serde_json_body(&req),
            r#"{"completed":true}"#.to_string()
        );
    }

    #[test]
    fn update_request_flattens_changes_without_id() {
        let req = UpdateClassRequest {
            id: "c1".to_string(),
            changes: ClassChanges {
                room: Some("B12".to_string()),
                ..Default::default()
            },
        };
        assert_eq!(serde_json_body(&req), r#"{"room":"B12"}"#.to_string());
    }

    #[test]
    fn assignment_filters_become_query_string() {
        let req = ListAssignmentsRequest {
            filters: AssignmentQuery {
                class_id: Some("c1".to_string()),
                priority: Some(Priority::High),
                search: Some("lab report".to_string()),
                ..Default::default()
            },
            pagination: PaginationParams {
                page: Some(2),
                ..Default::default()
            },
        };
        assert_eq!(
            req.url(),
            "/api/assignments?classId=c1&priority=high&search=lab%20report&page=2"
        );
    }

    #[test]
    fn request_without_query_has_bare_url() {
        assert_eq!(DashboardStatsRequest.url(), "/api/dashboard/stats");
        assert_eq!(ListAttendanceRequest::default().url(), "/api/attendance");
    }

    #[test]
    fn only_post_and_put_carry_bodies() {
        assert!(HttpMethod::Post.has_body());
        assert!(HttpMethod::Put.has_body());
        assert!(!HttpMethod::Get.has_body());
        assert!(!HttpMethod::Delete.has_body());
    }

    fn serde_json_body<T: Serialize>(value: &T) -> String {
        serde_json::to_string(value).unwrap()
    }
}
