//! Docker 发现统一错误类型

use super::code::ErrorCode;
use thiserror::Error;

/// Docker 发现统一错误类型
///
/// 配置类错误在构造期抛出，其余错误只在单次发现内部出现，
/// 由地址提供者记录日志后转换为空结果。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    /// 配置错误（构造期致命）
    #[error("配置错误 [{code}] {reason}")]
    Configuration { code: ErrorCode, reason: String },

    /// 编排 API 访问错误
    #[error("Docker API 错误 [{code}] {reason}")]
    Api { code: ErrorCode, reason: String },

    /// 响应反序列化错误
    #[error("反序列化错误: {0}")]
    Deserialization(String),

    /// 超时
    #[error("操作超时: {0}")]
    Timeout(String),

    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(String),
}

impl DiscoveryError {
    /// 创建配置错误
    pub fn configuration(code: ErrorCode, reason: impl Into<String>) -> Self {
        DiscoveryError::Configuration {
            code,
            reason: reason.into(),
        }
    }

    /// 通用配置错误
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::configuration(ErrorCode::ConfigurationInvalid, reason)
    }

    /// 缺少 endpoint
    pub fn endpoint_missing() -> Self {
        Self::configuration(ErrorCode::EndpointMissing, "Endpoint cannot be null or empty!")
    }

    /// 过滤器字符串中的某一段无法解析
    pub fn malformed_filter(segment: impl AsRef<str>) -> Self {
        Self::configuration(
            ErrorCode::FilterMalformed,
            format!(
                "Failed to parse one of the key-value pairs in filters: {}",
                segment.as_ref()
            ),
        )
    }

    /// 过滤器引用了未注册的字段
    pub fn unknown_filter_field(name: impl AsRef<str>) -> Self {
        Self::configuration(
            ErrorCode::FilterFieldUnknown,
            format!("Unknown container filter field: {}", name.as_ref()),
        )
    }

    /// 不支持的 endpoint 协议
    pub fn unsupported_scheme(endpoint: impl AsRef<str>) -> Self {
        Self::configuration(
            ErrorCode::EndpointSchemeUnsupported,
            format!(
                "Unsupported Docker endpoint (expected unix://, tcp://, http:// or https://): {}",
                endpoint.as_ref()
            ),
        )
    }

    /// 创建 API 错误
    pub fn api(reason: impl Into<String>) -> Self {
        DiscoveryError::Api {
            code: ErrorCode::ApiRequestFailed,
            reason: reason.into(),
        }
    }

    /// API 返回非成功状态码
    pub fn api_status(status: u16, body: impl AsRef<str>) -> Self {
        DiscoveryError::Api {
            code: ErrorCode::ApiStatusError,
            reason: format!("unexpected status {}: {}", status, body.as_ref().trim()),
        }
    }

    /// 无法建立到 API 的连接
    pub fn connection_failed(reason: impl Into<String>) -> Self {
        DiscoveryError::Api {
            code: ErrorCode::ConnectionFailed,
            reason: reason.into(),
        }
    }

    /// 创建超时错误
    pub fn timeout(msg: impl Into<String>) -> Self {
        DiscoveryError::Timeout(msg.into())
    }

    /// 创建反序列化错误
    pub fn deserialization(msg: impl Into<String>) -> Self {
        DiscoveryError::Deserialization(msg.into())
    }

    /// 创建 IO 错误
    pub fn io(msg: impl Into<String>) -> Self {
        DiscoveryError::Io(msg.into())
    }

    /// 在错误信息前附加上下文（如失败的步骤）
    #[must_use]
    pub fn with_context(self, context: impl std::fmt::Display) -> Self {
        match self {
            DiscoveryError::Configuration { code, reason } => DiscoveryError::Configuration {
                code,
                reason: format!("{}: {}", context, reason),
            },
            DiscoveryError::Api { code, reason } => DiscoveryError::Api {
                code,
                reason: format!("{}: {}", context, reason),
            },
            DiscoveryError::Deserialization(msg) => {
                DiscoveryError::Deserialization(format!("{}: {}", context, msg))
            }
            DiscoveryError::Timeout(msg) => {
                DiscoveryError::Timeout(format!("{}: {}", context, msg))
            }
            DiscoveryError::Io(msg) => DiscoveryError::Io(format!("{}: {}", context, msg)),
        }
    }

    /// 获取错误代码
    pub fn code(&self) -> ErrorCode {
        match self {
            DiscoveryError::Configuration { code, .. } | DiscoveryError::Api { code, .. } => *code,
            DiscoveryError::Deserialization(_) => ErrorCode::DeserializationError,
            DiscoveryError::Timeout(_) => ErrorCode::OperationTimeout,
            DiscoveryError::Io(_) => ErrorCode::IoError,
        }
    }

    /// 是否为配置错误
    pub fn is_configuration(&self) -> bool {
        matches!(self, DiscoveryError::Configuration { .. })
    }

    /// 是否为瞬时错误
    pub fn is_transient(&self) -> bool {
        self.code().is_transient()
    }
}

/// Docker 发现结果类型
pub type Result<T> = std::result::Result<T, DiscoveryError>;
