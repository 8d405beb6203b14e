//! REST API 网关
//!
//! 所有请求走 [`ClassMateApi::send`]：附加 Bearer 令牌、解开响应信封、
//! 统一错误映射。401 触发未授权处理器（默认整页跳转登录页）。

use std::rc::Rc;

use classmate_shared::protocol::*;
use classmate_shared::{
    ApiResponse, Assignment, AssignmentChanges, AttendanceRecord, AttendanceStats,
    AttendanceStatus, CalendarEvent, Class, ClassChanges, CreateAssignmentData, CreateClassData,
    CreateEventData, CreateGradeData, DashboardStats, EventChanges, FileUploadResponse, GpaData,
    Grade, GradeChanges, HEADER_AUTHORIZATION, MarkAttendanceData, UpcomingAssignment, User,
};
use leptos::prelude::*;
use leptos::reactive::owner::LocalStorage;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{LOGIN_PATH, TOKEN_KEY};
use crate::error::{ClientError, ClientResult};
use crate::web::{
    FetchTransport, HttpRequest, HttpResponse, HttpTransport, SharedStore,
    hard_navigate,
};

type UnauthorizedHandler = Rc<dyn Fn()>;

fn redirect_to_login() -> UnauthorizedHandler {
    Rc::new(|| {
        log_warn!("[Api] Unauthorized, redirecting to {}", LOGIN_PATH);
        if let Err(e) = hard_navigate(LOGIN_PATH) {
            log_error!("[Api] Redirect failed: {}", e);
        }
    })
}

#[derive(Clone)]
pub struct ClassMateApi<C: HttpTransport> {
    http: C,
    base_url: String,
    tokens: SharedStore,
    on_unauthorized: UnauthorizedHandler,
}

impl<C: HttpTransport> ClassMateApi<C> {
    pub fn new(http: C, base_url: &str, tokens: SharedStore) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
            on_unauthorized: redirect_to_login(),
        }
    }

    /// 替换 401 处理器
    pub fn with_unauthorized_handler(mut self, handler: impl Fn() + 'static) -> Self {
        self.on_unauthorized = Rc::new(handler);
        self
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// 认证头
    fn authorize(&self, req: HttpRequest) -> HttpRequest {
        match self.tokens.get(TOKEN_KEY) {
            Some(token) => req.with_header(HEADER_AUTHORIZATION, &format!("Bearer {}", token)),
            None => req,
        }
    }

    fn build<R: ApiRequest>(&self, req: &R) -> ClientResult<HttpRequest> {
        let http_req = HttpRequest::new(&self.url(&req.url()), R::METHOD)
            .with_header("Content-Type", "application/json");

        if !R::METHOD.has_body() {
            return Ok(self.authorize(http_req));
        }

        let body = match serde_json::to_value(req)? {
            // 无字段的请求发送空对象
            Value::Null => "{}".to_string(),
            value => value.to_string(),
        };
        Ok(self.authorize(http_req.with_json(body)))
    }

    /// 发送并解析信封（`data` 保持为原始 JSON）
    async fn exchange(&self, req: HttpRequest) -> ClientResult<ApiResponse<Value>> {
        let path = req.url.clone();
        let resp = self
            .http
            .send(req)
            .await
            .map_err(|e| ClientError::from(e).in_op_with("api.send", path.as_str()))?;

        self.unwrap_envelope(resp)
            .map_err(|e| e.in_op_with("api.send", path.as_str()))
    }

    fn unwrap_envelope(&self, resp: HttpResponse) -> ClientResult<ApiResponse<Value>> {
        if resp.status == 401 {
            (self.on_unauthorized)();
            return Err(ClientError::unauthorized("Session expired, please sign in again"));
        }

        if !resp.ok() {
            let message = serde_json::from_str::<ApiResponse<Value>>(&resp.body)
                .ok()
                .and_then(|envelope| envelope.message)
                .unwrap_or_else(|| format!("Request failed with status {}", resp.status));
            return Err(ClientError::http(resp.status, message));
        }

        if resp.body.trim().is_empty() {
            return Ok(ApiResponse {
                success: true,
                data: None,
                message: None,
                pagination: None,
            });
        }

        let envelope: ApiResponse<Value> = serde_json::from_str(&resp.body)?;
        if !envelope.success {
            let message = envelope
                .message
                .unwrap_or_else(|| "Request was not successful".to_string());
            return Err(ClientError::backend(message));
        }
        Ok(envelope)
    }

    fn decode<T: DeserializeOwned>(data: Option<Value>) -> ClientResult<T> {
        Ok(serde_json::from_value(data.unwrap_or(Value::Null))?)
    }

    /// 发送请求，返回完整信封（含分页信息）
    pub async fn send_enveloped<R: ApiRequest>(
        &self,
        req: &R,
    ) -> ClientResult<ApiResponse<R::Response>> {
        let envelope = self.exchange(self.build(req)?).await?;
        Ok(ApiResponse {
            success: envelope.success,
            data: Some(Self::decode(envelope.data)?),
            message: envelope.message,
            pagination: envelope.pagination,
        })
    }

    /// 发送请求，只返回 `data`
    pub async fn send<R: ApiRequest>(&self, req: &R) -> ClientResult<R::Response> {
        let envelope = self.exchange(self.build(req)?).await?;
        Self::decode(envelope.data)
    }

    async fn upload(&self, path: &str, form: web_sys::FormData) -> ClientResult<Value> {
        // multipart 由浏览器生成 Content-Type（含 boundary）
        let req = self.authorize(
            HttpRequest::new(&self.url(path), HttpMethod::Post).with_form(form),
        );
        let envelope = self.exchange(req).await?;
        Ok(envelope.data.unwrap_or(Value::Null))
    }

    // =========================================================
    // Auth
    // =========================================================

    pub async fn me(&self) -> ClientResult<User> {
        self.send(&CurrentUserRequest).await
    }

    pub async fn logout(&self) -> ClientResult<()> {
        self.send(&LogoutRequest).await
    }

    // =========================================================
    // Dashboard
    // =========================================================

    pub async fn dashboard_stats(&self) -> ClientResult<DashboardStats> {
        self.send(&DashboardStatsRequest).await
    }

    // =========================================================
    // Classes
    // =========================================================

    pub async fn classes(&self) -> ClientResult<Vec<Class>> {
        self.send(&ListClassesRequest).await
    }

    pub async fn class(&self, id: &str) -> ClientResult<Class> {
        self.send(&GetClassRequest { id: id.to_string() }).await
    }

    pub async fn create_class(&self, data: &CreateClassData) -> ClientResult<Class> {
        self.send(data).await
    }

    pub async fn update_class(&self, id: &str, changes: ClassChanges) -> ClientResult<Class> {
        self.send(&UpdateClassRequest {
            id: id.to_string(),
            changes,
        })
        .await
    }

    pub async fn delete_class(&self, id: &str) -> ClientResult<()> {
        self.send(&DeleteClassRequest { id: id.to_string() }).await
    }

    pub async fn sync_classes(&self) -> ClientResult<Vec<Class>> {
        self.send(&SyncClassesRequest).await
    }

    // =========================================================
    // Assignments
    // =========================================================

    pub async fn assignments(
        &self,
        filters: AssignmentQuery,
        pagination: PaginationParams,
    ) -> ClientResult<ApiResponse<Vec<Assignment>>> {
        self.send_enveloped(&ListAssignmentsRequest {
            filters,
            pagination,
        })
        .await
    }

    pub async fn assignment(&self, id: &str) -> ClientResult<Assignment> {
        self.send(&GetAssignmentRequest { id: id.to_string() }).await
    }

    pub async fn create_assignment(&self, data: &CreateAssignmentData) -> ClientResult<Assignment> {
        self.send(data).await
    }

    pub async fn update_assignment(
        &self,
        id: &str,
        changes: AssignmentChanges,
    ) -> ClientResult<Assignment> {
        self.send(&UpdateAssignmentRequest {
            id: id.to_string(),
            changes,
        })
        .await
    }

    pub async fn delete_assignment(&self, id: &str) -> ClientResult<()> {
        self.send(&DeleteAssignmentRequest { id: id.to_string() }).await
    }

    pub async fn complete_assignment(&self, id: &str, completed: bool) -> ClientResult<Assignment> {
        self.send(&CompleteAssignmentRequest {
            id: id.to_string(),
            completed,
        })
        .await
    }

    pub async fn upcoming_assignments(&self) -> ClientResult<Vec<UpcomingAssignment>> {
        self.send(&UpcomingAssignmentsRequest).await
    }

    pub async fn sync_assignments(&self) -> ClientResult<Vec<Assignment>> {
        self.send(&SyncAssignmentsRequest).await
    }

    // =========================================================
    // Attendance
    // =========================================================

    pub async fn attendance(
        &self,
        filters: AttendanceQuery,
        pagination: PaginationParams,
    ) -> ClientResult<ApiResponse<Vec<AttendanceRecord>>> {
        self.send_enveloped(&ListAttendanceRequest {
            filters,
            pagination,
        })
        .await
    }

    pub async fn mark_attendance(&self, data: &MarkAttendanceData) -> ClientResult<AttendanceRecord> {
        self.send(data).await
    }

    pub async fn update_attendance(
        &self,
        id: &str,
        status: AttendanceStatus,
    ) -> ClientResult<AttendanceRecord> {
        self.send(&UpdateAttendanceRequest {
            id: id.to_string(),
            status,
        })
        .await
    }

    pub async fn attendance_stats(&self) -> ClientResult<AttendanceStats> {
        self.send(&AttendanceStatsRequest).await
    }

    pub async fn class_attendance(&self, class_id: &str) -> ClientResult<Vec<AttendanceRecord>> {
        self.send(&ClassAttendanceRequest {
            class_id: class_id.to_string(),
        })
        .await
    }

    // =========================================================
    // Grades
    // =========================================================

    pub async fn grades(&self) -> ClientResult<Vec<Grade>> {
        self.send(&ListGradesRequest).await
    }

    pub async fn create_grade(&self, data: &CreateGradeData) -> ClientResult<Grade> {
        self.send(data).await
    }

    pub async fn update_grade(&self, id: &str, changes: GradeChanges) -> ClientResult<Grade> {
        self.send(&UpdateGradeRequest {
            id: id.to_string(),
            changes,
        })
        .await
    }

    pub async fn delete_grade(&self, id: &str) -> ClientResult<()> {
        self.send(&DeleteGradeRequest { id: id.to_string() }).await
    }

    pub async fn gpa(&self) -> ClientResult<GpaData> {
        self.send(&GpaRequest).await
    }

    pub async fn class_grades(&self, class_id: &str) -> ClientResult<Vec<Grade>> {
        self.send(&ClassGradesRequest {
            class_id: class_id.to_string(),
        })
        .await
    }

    // =========================================================
    // Calendar
    // =========================================================

    pub async fn events(&self) -> ClientResult<Vec<CalendarEvent>> {
        self.send(&ListEventsRequest).await
    }

    pub async fn create_event(&self, data: &CreateEventData) -> ClientResult<CalendarEvent> {
        self.send(data).await
    }

    pub async fn update_event(&self, id: &str, changes: EventChanges) -> ClientResult<CalendarEvent> {
        self.send(&UpdateEventRequest {
            id: id.to_string(),
            changes,
        })
        .await
    }

    pub async fn delete_event(&self, id: &str) -> ClientResult<()> {
        self.send(&DeleteEventRequest { id: id.to_string() }).await
    }

    pub async fn sync_calendar(&self) -> ClientResult<Vec<CalendarEvent>> {
        self.send(&SyncCalendarRequest).await
    }

    // =========================================================
    // Uploads
    // =========================================================

    /// 上传单个文件（字段名 `file`）
    pub async fn upload_file(&self, file: &web_sys::File) -> ClientResult<FileUploadResponse> {
        let form = web_sys::FormData::new()
            .map_err(|e| ClientError::network(format!("FormData: {:?}", e)))?;
        form.append_with_blob("file", file)
            .map_err(|e| ClientError::network(format!("FormData append: {:?}", e)))?;
        Ok(serde_json::from_value(self.upload(UPLOAD_PATH, form).await?)?)
    }

    /// 上传多个文件（字段名 `files`）
    pub async fn upload_files(&self, files: &[web_sys::File]) -> ClientResult<Vec<FileUploadResponse>> {
        let form = web_sys::FormData::new()
            .map_err(|e| ClientError::network(format!("FormData: {:?}", e)))?;
        for file in files {
            form.append_with_blob("files", file)
                .map_err(|e| ClientError::network(format!("FormData append: {:?}", e)))?;
        }
        Ok(serde_json::from_value(self.upload(UPLOAD_MULTIPLE_PATH, form).await?)?)
    }
}

// =========================================================
// Context
// =========================================================

/// 浏览器中使用的 API 客户端
pub type ApiClient = ClassMateApi<FetchTransport>;

/// API 客户端句柄（客户端本身不是 `Send`，以本地存储方式放入 Context）
#[derive(Clone, Copy)]
struct ApiHandle(StoredValue<ApiClient, LocalStorage>);

pub fn provide_api(api: ApiClient) {
    provide_context(ApiHandle(StoredValue::new_local(api)));
}

pub fn use_api() -> ApiClient {
    use_context::<ApiHandle>()
        .expect("ApiClient should be provided")
        .0
        .get_value()
}
