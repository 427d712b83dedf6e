//! 地址提供者
//!
//! 两种模式共享 `ProviderBase`（设置、过滤引擎、连接器）和
//! `IpAddressProvider::get_ip_addresses` 的超时与失败隔离逻辑，
//! 各自只实现 `raw_addresses`。

pub mod container;
pub mod swarm;

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::discovery::api::{DockerApi, DockerConnector};
use crate::discovery::expression::FilterEngine;
use crate::discovery::settings::DockerDiscoverySettings;
use crate::error::{DiscoveryError, ErrorCode, Result};

pub use container::DockerIpAddressProvider;
pub use swarm::DockerSwarmIpAddressProvider;

/// 地址提供者共享状态，只读，可在并发 lookup 间共享
pub struct ProviderBase {
    settings: Arc<DockerDiscoverySettings>,
    engine: Arc<FilterEngine>,
    connector: Arc<dyn DockerConnector>,
}

impl ProviderBase {
    /// 构建过滤引擎；过滤器引用未知字段时报配置错误
    pub fn new(
        settings: Arc<DockerDiscoverySettings>,
        connector: Arc<dyn DockerConnector>,
    ) -> Result<Self> {
        let engine = FilterEngine::new(settings.container_filters().to_vec());
        engine.validate()?;

        Ok(Self {
            settings,
            engine: Arc::new(engine),
            connector,
        })
    }

    pub fn settings(&self) -> &DockerDiscoverySettings {
        &self.settings
    }

    pub fn engine(&self) -> &FilterEngine {
        &self.engine
    }

    /// 获取本次 lookup 使用的连接
    pub async fn connect(&self) -> Result<Box<dyn DockerApi>> {
        self.connector
            .connect(self.settings.endpoint())
            .await
            .map_err(|e| e.with_context("connect"))
    }
}

/// IP 地址提供者
#[async_trait]
pub trait IpAddressProvider: Send + Sync {
    /// 模式名（日志用）
    fn mode(&self) -> &'static str;

    /// Docker API 地址（日志用）
    fn endpoint(&self) -> &str;

    /// 查询 API 并返回未解析的地址字符串
    async fn raw_addresses(&self) -> Result<Vec<String>>;

    /// 在超时内获取地址
    ///
    /// 永不失败：API 错误和超时都会记录日志并返回空列表，
    /// 超时时在途请求随 future 一起被丢弃，连接随之释放。
    /// 无法解析为 IP 的字符串直接丢弃。
    async fn get_ip_addresses(&self, timeout: Duration) -> Vec<IpAddr> {
        info!(
            endpoint = %self.endpoint(),
            mode = self.mode(),
            "Getting addresses of Docker services"
        );

        let result = match tokio::time::timeout(timeout, self.raw_addresses()).await {
            Ok(result) => result,
            Err(elapsed) => Err(DiscoveryError::from(elapsed)
                .with_context(format!("lookup exceeded {}ms", timeout.as_millis()))),
        };

        let raw = match result {
            Ok(raw) => raw,
            Err(e) if e.code() == ErrorCode::OperationTimeout => {
                warn!(
                    endpoint = %self.endpoint(),
                    mode = self.mode(),
                    timeout_ms = timeout.as_millis() as u64,
                    error = %e,
                    "⚠️ Docker address lookup timed out"
                );
                return Vec::new();
            }
            Err(e) => {
                error!(
                    endpoint = %self.endpoint(),
                    mode = self.mode(),
                    code = %e.code(),
                    transient = e.is_transient(),
                    error = %e,
                    "❌ Docker address lookup failed"
                );
                return Vec::new();
            }
        };

        info!(mode = self.mode(), count = raw.len(), "Found services");
        parse_addresses(raw)
    }
}

/// 解析地址字符串，失败的静默丢弃
pub fn parse_addresses(raw: Vec<String>) -> Vec<IpAddr> {
    raw.into_iter()
        .filter_map(|address| {
            debug!(address = %address, "Found address");
            address.trim().parse::<IpAddr>().ok()
        })
        .collect()
}

/// 去掉 `/前缀长度` 后缀（"10.0.0.5/24" -> "10.0.0.5"）
pub fn strip_prefix_length(address: &str) -> &str {
    address
        .split('/')
        .find(|part| !part.is_empty())
        .unwrap_or_default()
}
