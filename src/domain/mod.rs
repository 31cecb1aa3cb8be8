//! Domain Layer - 领域层
//!
//! Try-On Context: 虚拟试衣的值对象与输入规则

pub mod tryon;
