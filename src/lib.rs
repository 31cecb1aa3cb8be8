//! Try-On - 虚拟试衣编排服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Try-On Context: 图片类型、服装描述、推理输出等值对象
//!
//! 应用层 (application/):
//! - Ports: StorageBackend（远端 / 本地回退）、InferenceJob
//! - Staging: 两张输入图片并发暂存
//! - Commands: 生成试衣图、取消任务
//! - Queries: 任务状态、存储信息
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + multipart 上传 + /uploads 静态目录
//! - Adapters: GCS 存储、本地存储、Replicate 客户端

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
