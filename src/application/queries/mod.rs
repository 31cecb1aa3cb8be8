//! 应用层 - 查询（读操作）
//!
//! CQRS 查询侧：远端任务状态与存储信息，均不缓存

mod prediction_queries;

pub mod handlers;

pub use prediction_queries::*;
