//! HTTP 请求封装模块
//!
//! 使用 `web_sys::fetch` 提供 HTTP 传输层。上层（API 网关、身份提供方）
//! 只依赖 [`HttpTransport`] trait，测试中以 `MockTransport` 替换。

use std::time::Duration;

use classmate_shared::protocol::HttpMethod;
use futures::future::{Either, select};
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, FormData, Headers, Request, RequestInit, Response};

/// HTTP 错误类型
#[derive(Debug, Clone, PartialEq)]
pub enum HttpError {
    /// 请求构建失败
    RequestBuildFailed(String),
    /// 网络请求失败
    NetworkError(String),
    /// 超过超时时间，请求已被中止
    Timeout(Duration),
    /// 响应解析失败
    ResponseParseFailed(String),
}

impl core::fmt::Display for HttpError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HttpError::RequestBuildFailed(msg) => write!(f, "Request build failed: {}", msg),
            HttpError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            HttpError::Timeout(d) => write!(f, "Request timed out after {} ms", d.as_millis()),
            HttpError::ResponseParseFailed(msg) => write!(f, "Response parse failed: {}", msg),
        }
    }
}

/// 请求体
#[derive(Debug, Clone)]
pub enum HttpBody {
    Json(String),
    /// multipart/form-data，Content-Type 由浏览器生成（含 boundary）
    Form(FormData),
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: Option<HttpBody>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: Vec::new(),
            body: None,
        }
    }

    /// 添加请求头
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_json(mut self, body: String) -> Self {
        self.body = Some(HttpBody::Json(body));
        self
    }

    pub fn with_form(mut self, form: FormData) -> Self {
        self.body = Some(HttpBody::Form(form));
        self
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// HTTP 响应封装
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// 检查响应是否成功 (2xx)
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait::async_trait(?Send)]
pub trait HttpTransport {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, HttpError>;
}

// =========================================================
// 实现层: fetch 客户端
// =========================================================

/// 基于 `window.fetch` 的传输层，超时后通过 `AbortController` 中止请求
#[derive(Debug, Clone, Copy)]
pub struct FetchTransport {
    timeout: Duration,
}

impl FetchTransport {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait::async_trait(?Send)]
impl HttpTransport for FetchTransport {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        let headers = Headers::new()
            .map_err(|e| HttpError::RequestBuildFailed(format!("Headers: {:?}", e)))?;

        for (key, value) in &req.headers {
            headers
                .set(key, value)
                .map_err(|e| HttpError::RequestBuildFailed(format!("Header {}: {:?}", key, e)))?;
        }

        let controller = AbortController::new()
            .map_err(|e| HttpError::RequestBuildFailed(format!("AbortController: {:?}", e)))?;

        let opts = RequestInit::new();
        opts.set_method(req.method.as_str());
        opts.set_headers(&headers.into());
        opts.set_signal(Some(&controller.signal()));

        match &req.body {
            Some(HttpBody::Json(body)) => opts.set_body(&JsValue::from_str(body)),
            Some(HttpBody::Form(form)) => {
                let body: &JsValue = form.as_ref();
                opts.set_body(body);
            }
            None => {}
        }

        let request = Request::new_with_str_and_init(&req.url, &opts)
            .map_err(|e| HttpError::RequestBuildFailed(format!("{:?}", e)))?;

        let window = web_sys::window()
            .ok_or_else(|| HttpError::NetworkError("window is not available".to_string()))?;

        let fetch = Box::pin(JsFuture::from(window.fetch_with_request(&request)));
        let timer = Box::pin(TimeoutFuture::new(u32::try_from(self.timeout.as_millis()).unwrap_or(u32::MAX)));

        let resp_value = match select(fetch, timer).await {
            Either::Left((result, _)) => {
                result.map_err(|e| HttpError::NetworkError(format!("{:?}", e)))?
            }
            Either::Right(_) => {
                controller.abort();
                return Err(HttpError::Timeout(self.timeout));
            }
        };

        let response: Response = resp_value
            .dyn_into()
            .map_err(|e| HttpError::ResponseParseFailed(format!("Response cast: {:?}", e)))?;
        let status = response.status();

        let promise = response
            .text()
            .map_err(|e| HttpError::ResponseParseFailed(format!("{:?}", e)))?;
        let text = JsFuture::from(promise)
            .await
            .map_err(|e| HttpError::ResponseParseFailed(format!("{:?}", e)))?;
        let body = text
            .as_string()
            .ok_or_else(|| HttpError::ResponseParseFailed("body is not a string".to_string()))?;

        Ok(HttpResponse { status, body })
    }
}

// =========================================================
// 测试工具: MockTransport
// =========================================================
