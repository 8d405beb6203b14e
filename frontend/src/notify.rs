//! 通知效果模块
//!
//! 业务逻辑（如异步操作 Hook）不直接弹出提示，而是产出 [`UiEffect`] 描述；
//! 顶层唯一的 [`EffectHub`] 负责解释这些效果，`Toaster` 组件负责渲染。

use leptos::prelude::*;

use crate::config::TOAST_DURATION_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastVariant {
    #[default]
    Default,
    Destructive,
    Success,
}

/// 提示消息描述
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub title: Option<String>,
    pub description: Option<String>,
    pub variant: ToastVariant,
    pub duration_ms: u32,
}

impl Toast {
    pub fn new(variant: ToastVariant) -> Self {
        Self {
            title: None,
            description: None,
            variant,
            duration_ms: TOAST_DURATION_MS,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// 操作失败提示
    pub fn error(description: impl Into<String>) -> Self {
        Self::new(ToastVariant::Destructive)
            .title("Error")
            .description(description)
    }

    pub fn success(description: impl Into<String>) -> Self {
        Self::new(ToastVariant::Success).description(description)
    }

    /// 渲染文本：标题与描述同时存在时为 `"title: description"`
    pub fn message(&self) -> String {
        match (&self.title, &self.description) {
            (Some(title), Some(desc)) => format!("{}: {}", title, desc),
            (Some(text), None) | (None, Some(text)) => text.clone(),
            (None, None) => String::new(),
        }
    }
}

/// 界面副作用描述
#[derive(Debug, Clone, PartialEq)]
pub enum UiEffect {
    Toast(Toast),
}

/// 队列中的提示（带唯一 id，用于关闭）
#[derive(Debug, Clone, PartialEq)]
pub struct ToastEntry {
    pub id: u64,
    pub toast: Toast,
}

/// 效果中心
///
/// 应用级单例，通过 Context 共享。
#[derive(Clone, Copy)]
pub struct EffectHub {
    toasts: RwSignal<Vec<ToastEntry>>,
    next_id: StoredValue<u64>,
}

impl EffectHub {
    pub fn new() -> Self {
        Self {
            toasts: RwSignal::new(Vec::new()),
            next_id: StoredValue::new(0),
        }
    }

    /// 解释一个效果；提示类效果返回其队列 id
    pub fn apply(&self, effect: UiEffect) -> u64 {
        match effect {
            UiEffect::Toast(toast) => {
                let id = self.next_id.get_value();
                self.next_id.set_value(id + 1);
                self.toasts.update(|list| list.push(ToastEntry { id, toast }));
                id
            }
        }
    }

    pub fn toast(&self, toast: Toast) -> u64 {
        self.apply(UiEffect::Toast(toast))
    }

    pub fn dismiss(&self, id: u64) {
        self.toasts.update(|list| list.retain(|entry| entry.id != id));
    }

    /// 当前提示队列（只读）
    pub fn toasts(&self) -> ReadSignal<Vec<ToastEntry>> {
        self.toasts.read_only()
    }
}

impl Default for EffectHub {
    fn default() -> Self {
        Self::new()
    }
}

pub fn provide_effects() -> EffectHub {
    let hub = EffectHub::new();
    provide_context(hub);
    hub
}

pub fn use_effects() -> EffectHub {
    use_context::<EffectHub>().expect("EffectHub should be provided")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_joins_title_and_description() {
        assert_eq!(Toast::error("boom").message(), "Error: boom");
        assert_eq!(Toast::success("Saved").message(), "Saved");
        assert_eq!(Toast::new(ToastVariant::Default).message(), "");
    }

    #[test]
    fn hub_queues_and_dismisses() {
        let owner = Owner::new();
        owner.set();

        let hub = EffectHub::new();
        let first = hub.toast(Toast::error("a"));
        let second = hub.apply(UiEffect::Toast(Toast::success("b")));
        assert_ne!(first, second);
        assert_eq!(hub.toasts().with(|t| t.len()), 2);

        hub.dismiss(first);
        let remaining = hub.toasts().get();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, second);
        assert_eq!(remaining[0].toast.duration_ms, TOAST_DURATION_MS);
    }
}
