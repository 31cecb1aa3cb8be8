//! Replicate Adapter - 远端推理任务客户端

mod http_replicate_client;

pub use http_replicate_client::*;
