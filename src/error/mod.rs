//! Docker 发现错误处理模块
//!
//! 区分构造期的配置错误与单次发现中的瞬时错误，并提供错误代码分类

pub mod code;
pub mod conversions;
pub mod discovery_error;

pub use code::{ErrorCategory, ErrorCode};
pub use discovery_error::{DiscoveryError, Result};
