use std::fmt;

use crate::web::HttpError;

// =========================================================
// 错误类别枚举
// =========================================================

/// 客户端错误类别
///
/// 与用户可见行为一一对应：
/// - 网络类 (`Network`/`Timeout`/`Http`/`Backend`)：由异步操作 Hook 捕获并提示
/// - `Unauthorized`：强制跳转登录页
/// - `Provider`：身份提供方失败，在登录页展示
/// - `Storage`：静默降级为默认值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 网络不可达 / fetch 失败
    Network,
    /// 请求超过超时时间
    Timeout,
    /// 401: 会话失效
    Unauthorized,
    /// 其他非 2xx 响应
    Http,
    /// 响应信封 `success: false`
    Backend,
    /// JSON 解析或序列化错误
    Serialization,
    /// 身份提供方（OAuth）失败
    Provider,
    /// 本地存储不可用或损坏
    Storage,
    /// 所属组件已卸载，操作未执行
    Cancelled,
}

impl ErrorKind {
    /// 机器可读的错误代码
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Network => "NETWORK_ERROR",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::Http => "HTTP_ERROR",
            ErrorKind::Backend => "BACKEND_ERROR",
            ErrorKind::Serialization => "JSON_PARSE_ERROR",
            ErrorKind::Provider => "PROVIDER_ERROR",
            ErrorKind::Storage => "STORAGE_ERROR",
            ErrorKind::Cancelled => "CANCELLED",
        }
    }
}

/// 结构化的错误追踪片段
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorSpan {
    /// 操作名称，如 "api.send", "auth.sign_in"
    pub operation: String,
    pub detail: Option<String>,
}

// =========================================================
// 核心错误类型
// =========================================================

/// 客户端统一错误
///
/// `Clone` 以便存放在响应式状态中；`Display` 只输出面向用户的消息，
/// 完整的诊断信息（代码 + 追踪栈）见 [`ClientError::diagnostic`]。
#[derive(Debug, Clone, PartialEq)]
pub struct ClientError {
    pub kind: ErrorKind,
    message: String,
    /// HTTP 状态码（若来自响应）
    status: Option<u16>,
    spans: Vec<ErrorSpan>,
}

impl ClientError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            spans: Vec::new(),
        }
    }

    // --- Convenience constructors ---

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message).with_status(401)
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Http, message).with_status(status)
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Backend, message)
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Serialization, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Provider, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled, message)
    }

    // --- Context builders ---

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// 添加操作追踪
    pub fn in_op(mut self, operation: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan {
            operation: operation.into(),
            detail: None,
        });
        self
    }

    /// 添加操作追踪（带额外细节）
    pub fn in_op_with(mut self, operation: impl Into<String>, detail: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan {
            operation: operation.into(),
            detail: Some(detail.into()),
        });
        self
    }

    // --- Accessors ---

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn error_code(&self) -> &'static str {
        self.kind.code()
    }

    /// 用于日志的完整描述：`[CODE] message | trace: a -> b(detail)`
    pub fn diagnostic(&self) -> String {
        let mut out = format!("[{}] {}", self.error_code(), self.message);
        if !self.spans.is_empty() {
            out.push_str(" | trace: ");
            for (i, span) in self.spans.iter().enumerate() {
                if i > 0 {
                    out.push_str(" -> ");
                }
                out.push_str(&span.operation);
                if let Some(detail) = &span.detail {
                    out.push_str(&format!("({})", detail));
                }
            }
        }
        out
    }
}

// =========================================================
// Display & Error trait 实现
// =========================================================

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ClientError {}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

// =========================================================
// 类型转换实现
// =========================================================

impl From<HttpError> for ClientError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::Timeout(_) => ClientError::timeout("Request timed out"),
            HttpError::RequestBuildFailed(msg) => ClientError::network(msg),
            HttpError::NetworkError(msg) => ClientError::network(msg),
            HttpError::ResponseParseFailed(msg) => ClientError::serialization(msg),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn display_is_user_message_only() {
        let err = ClientError::network("boom").in_op("api.send");
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn diagnostic_includes_code_and_trace() {
        let err = ClientError::http(503, "Service Unavailable")
            .in_op_with("api.send", "/api/classes")
            .in_op("classes.load");
        assert_eq!(err.status(), Some(503));
        assert_eq!(
            err.diagnostic(),
            "[HTTP_ERROR] Service Unavailable | trace: api.send(/api/classes) -> classes.load"
        );
    }

    #[test]
    fn transport_timeout_maps_to_timeout_kind() {
        let err = ClientError::from(HttpError::Timeout(Duration::from_secs(10)));
        assert_eq!(err.kind, ErrorKind::Timeout);
        assert_eq!(err.error_code(), "TIMEOUT");
    }

    #[test]
    fn unauthorized_carries_401() {
        let err = ClientError::unauthorized("Session expired");
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }
}
