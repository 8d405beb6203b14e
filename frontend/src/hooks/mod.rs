mod async_op;

pub use async_op::{AsyncOperation, OperationOptions, use_async_operation, use_query};
