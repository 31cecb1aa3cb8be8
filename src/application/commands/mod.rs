//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：生成试衣图、取消远端任务

mod tryon_commands;

pub mod handlers;

pub use tryon_commands::*;
