//! 本地存储封装模块
//!
//! - [`KeyValueStore`]: 字符串键值存储抽象
//! - [`LocalStorage`]: 基于 `web_sys::Storage` 的浏览器实现
//! - [`MemoryStorage`]: 内存实现（非浏览器环境与测试）
//! - [`PreferenceStore`]: 在键值存储之上读写 JSON 值，损坏或缺失时回退默认值

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Serialize, de::DeserializeOwned};

use crate::error::ClientError;

/// 字符串键值存储
///
/// 所有操作都不会失败：存储不可用时 `get` 返回 `None`，写操作返回 `false`。
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> bool;
    fn remove(&self, key: &str) -> bool;
}

/// 本地存储操作封装
///
/// 提供静态方法访问浏览器 LocalStorage API。
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
    /// 获取 LocalStorage 实例
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }

    /// 获取存储的字符串值
    ///
    /// # 返回
    /// - `Some(String)` 如果键存在且有值
    /// - `None` 如果键不存在或发生错误
    pub fn get(key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    /// 设置存储值，成功返回 `true`
    pub fn set(key: &str, value: &str) -> bool {
        Self::storage()
            .and_then(|s| s.set_item(key, value).ok())
            .is_some()
    }

    /// 删除存储的键值对，成功返回 `true`
    pub fn delete(key: &str) -> bool {
        Self::storage()
            .and_then(|s| s.remove_item(key).ok())
            .is_some()
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        LocalStorage::get(key)
    }

    fn set(&self, key: &str, value: &str) -> bool {
        LocalStorage::set(key, value)
    }

    fn remove(&self, key: &str) -> bool {
        LocalStorage::delete(key)
    }
}

/// 内存键值存储
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        match self.entries.lock() {
            Ok(mut entries) => {
                entries.insert(key.to_string(), value.to_string());
                true
            }
            Err(_) => false,
        }
    }

    fn remove(&self, key: &str) -> bool {
        match self.entries.lock() {
            Ok(mut entries) => {
                entries.remove(key);
                true
            }
            Err(_) => false,
        }
    }
}

pub type SharedStore = Arc<dyn KeyValueStore + Send + Sync>;

/// 偏好存储
///
/// 读取：键缺失或内容无法解析时返回调用方提供的默认值（损坏会被记录）。
#[derive(Clone)]
pub struct PreferenceStore {
    store: SharedStore,
}

impl PreferenceStore {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// 浏览器 LocalStorage 版本
    pub fn browser() -> Self {
        Self::new(Arc::new(LocalStorage))
    }

    pub fn get_json<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(raw) = self.store.get(key) else {
            return default;
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                let err = ClientError::storage(format!("Ignoring corrupt entry '{}': {}", key, e))
                    .in_op("storage.get_json");
                log_warn!("[Storage] {}", err.diagnostic());
                default
            }
        }
    }

    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> bool {
        match serde_json::to_string(value) {
            Ok(raw) => self.store.set(key, &raw),
            Err(e) => {
                log_warn!("[Storage] Failed to serialize '{}': {}", key, e);
                false
            }
        }
    }

    pub fn remove(&self, key: &str) -> bool {
        self.store.remove(key)
    }
}
