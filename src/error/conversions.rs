//! 错误类型转换实现
//!
//! 提供外部库错误到 `DiscoveryError` 的转换

use super::DiscoveryError;
use std::io;

impl From<io::Error> for DiscoveryError {
    fn from(err: io::Error) -> Self {
        DiscoveryError::io(err.to_string())
    }
}

impl From<serde_json::Error> for DiscoveryError {
    fn from(err: serde_json::Error) -> Self {
        DiscoveryError::deserialization(format!("JSON 反序列化错误: {}", err))
    }
}

impl From<toml::de::Error> for DiscoveryError {
    fn from(err: toml::de::Error) -> Self {
        DiscoveryError::invalid_config(format!("TOML 解析错误: {}", err))
    }
}

impl From<tokio::time::error::Elapsed> for DiscoveryError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        DiscoveryError::timeout(err.to_string())
    }
}

impl From<reqwest::Error> for DiscoveryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DiscoveryError::timeout(err.to_string())
        } else if err.is_decode() {
            DiscoveryError::deserialization(err.to_string())
        } else if err.is_connect() {
            DiscoveryError::connection_failed(err.to_string())
        } else if let Some(status) = err.status() {
            DiscoveryError::api_status(status.as_u16(), err.to_string())
        } else {
            DiscoveryError::api(err.to_string())
        }
    }
}

impl From<hyper_util::client::legacy::Error> for DiscoveryError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        if err.is_connect() {
            DiscoveryError::connection_failed(err.to_string())
        } else {
            DiscoveryError::api(err.to_string())
        }
    }
}

impl From<hyper::Error> for DiscoveryError {
    fn from(err: hyper::Error) -> Self {
        DiscoveryError::api(format!("读取响应失败: {}", err))
    }
}
