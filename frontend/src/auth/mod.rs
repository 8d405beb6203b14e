//! 认证模块
//!
//! 管理用户认证状态，与路由系统解耦。
//! 布局守卫通过 `AuthContext` 的信号检查认证状态。

mod context;
pub mod session;

pub use context::{init_auth, provide_auth, use_auth};
pub use session::{HostedIdentityProvider, SessionResolver};
