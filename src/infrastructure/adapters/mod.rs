//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现：存储后端与远端推理客户端

pub mod replicate;
pub mod storage;

pub use replicate::*;
pub use storage::*;
