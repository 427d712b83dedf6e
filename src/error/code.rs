//! 错误代码和错误类别定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 错误代码枚举
///
/// 错误代码按类别分组，每个类别占用1000个代码范围：
/// - 1000-1999: 配置相关错误（构造期，致命）
/// - 2000-2999: 编排 API 访问错误（单次发现，可恢复）
/// - 3000-3999: 序列化相关错误
/// - 9000-9999: 通用错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u32)]
pub enum ErrorCode {
    // ============================================================
    // 配置相关错误 (1000-1999)
    // ============================================================
    ConfigurationInvalid = 1000,
    EndpointMissing = 1001,
    FilterMalformed = 1002,
    FilterFieldUnknown = 1003,
    EndpointSchemeUnsupported = 1004,

    // ============================================================
    // API 访问错误 (2000-2999)
    // ============================================================
    ApiRequestFailed = 2000,
    ApiStatusError = 2001,
    ConnectionFailed = 2002,

    // ============================================================
    // 序列化相关错误 (3000-3999)
    // ============================================================
    DeserializationError = 3000,

    // ============================================================
    // 通用错误 (9000-9999)
    // ============================================================
    IoError = 9000,
    OperationTimeout = 9001,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ErrorCode {
    /// 获取错误代码的数字值
    #[inline]
    pub fn as_u32(&self) -> u32 {
        *self as u32
    }

    /// 获取错误代码的英文标识符
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigurationInvalid => "CONFIGURATION_INVALID",
            ErrorCode::EndpointMissing => "ENDPOINT_MISSING",
            ErrorCode::FilterMalformed => "FILTER_MALFORMED",
            ErrorCode::FilterFieldUnknown => "FILTER_FIELD_UNKNOWN",
            ErrorCode::EndpointSchemeUnsupported => "ENDPOINT_SCHEME_UNSUPPORTED",
            ErrorCode::ApiRequestFailed => "API_REQUEST_FAILED",
            ErrorCode::ApiStatusError => "API_STATUS_ERROR",
            ErrorCode::ConnectionFailed => "CONNECTION_FAILED",
            ErrorCode::DeserializationError => "DESERIALIZATION_ERROR",
            ErrorCode::IoError => "IO_ERROR",
            ErrorCode::OperationTimeout => "OPERATION_TIMEOUT",
        }
    }

    /// 获取错误代码的类别
    pub fn category(&self) -> ErrorCategory {
        match self.as_u32() {
            1000..=1999 => ErrorCategory::Configuration,
            2000..=2999 => ErrorCategory::Api,
            3000..=3999 => ErrorCategory::Serialization,
            _ => ErrorCategory::General,
        }
    }

    /// 判断是否为瞬时错误（调用方下一个周期重试即可）
    pub fn is_transient(&self) -> bool {
        !matches!(self.category(), ErrorCategory::Configuration)
    }
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    Configuration,
    Api,
    Serialization,
    General,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "CONFIGURATION"),
            ErrorCategory::Api => write!(f, "API"),
            ErrorCategory::Serialization => write!(f, "SERIALIZATION"),
            ErrorCategory::General => write!(f, "GENERAL"),
        }
    }
}
