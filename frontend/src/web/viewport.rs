//! 视口宽度跟踪

use leptos::ev;
use leptos::prelude::*;

/// 当前窗口内宽度（逻辑像素）
fn inner_width() -> f64 {
    web_sys::window()
        .and_then(|w| w.inner_width().ok())
        .and_then(|v| v.as_f64())
        .unwrap_or(f64::MAX)
}

/// 返回随 `resize` 事件更新的视口宽度信号
///
/// 监听器随当前响应式作用域一起释放。
pub fn use_viewport_width() -> ReadSignal<f64> {
    let (width, set_width) = signal(inner_width());

    let handle = window_event_listener(ev::resize, move |_| {
        set_width.set(inner_width());
    });
    on_cleanup(move || handle.remove());

    width
}
