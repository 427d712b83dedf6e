//! 服务发现工厂
//!
//! 提供快速构建方法，按 endpoint 协议选择 HTTP 或本地 socket 连接器

use std::sync::Arc;

use tracing::info;

use crate::config::DockerDiscoveryConfig;
use crate::discovery::api::unix::UNIX_SCHEME;
use crate::discovery::api::{DockerConnector, HttpDockerConnector, UnixDockerConnector};
use crate::discovery::resolver::DockerServiceDiscovery;
use crate::discovery::settings::DockerDiscoverySettings;
use crate::error::Result;

const USER_AGENT: &str = concat!("flare-discovery-docker/", env!("CARGO_PKG_VERSION"));

/// 服务发现工厂
pub struct DiscoveryFactory;

impl DiscoveryFactory {
    /// 按 endpoint 协议创建服务发现
    ///
    /// endpoint 协议不受支持时在这里就返回配置错误，而不是等到第一次 lookup。
    pub fn create(settings: DockerDiscoverySettings) -> Result<DockerServiceDiscovery> {
        let connector = Self::connector_for(settings.endpoint())?;
        Self::create_with_connector(settings, connector)
    }

    /// 为 endpoint 选择连接器
    ///
    /// `unix://` 走本地 socket，`tcp://`、`http://`、`https://` 走 HTTP。
    pub fn connector_for(endpoint: &str) -> Result<Arc<dyn DockerConnector>> {
        if endpoint.trim().starts_with(UNIX_SCHEME) {
            UnixDockerConnector::socket_path(endpoint)?;
            return Ok(Arc::new(UnixDockerConnector::new()));
        }

        HttpDockerConnector::base_url(endpoint)?;
        Ok(Arc::new(HttpDockerConnector::new().with_user_agent(USER_AGENT)))
    }

    /// 使用自定义连接器创建服务发现（如测试替身）
    pub fn create_with_connector(
        settings: DockerDiscoverySettings,
        connector: Arc<dyn DockerConnector>,
    ) -> Result<DockerServiceDiscovery> {
        DockerServiceDiscovery::new(settings, connector)
    }

    /// 从原始配置创建
    pub fn create_from_config(config: DockerDiscoveryConfig) -> Result<DockerServiceDiscovery> {
        let settings = config.into_settings()?;
        Self::create(settings)
    }

    /// 使用默认配置创建服务发现
    ///
    /// # 参数
    /// * `endpoint` - Docker API 地址（如 `unix:///var/run/docker.sock`）
    /// * `ports` - 每个发现到的地址要组合的端口
    ///
    /// # 默认配置
    /// - 独立容器模式
    /// - 无过滤器、无网络名过滤
    /// - 容器列表参数：`{"all": true}`
    pub fn create_with_defaults(
        endpoint: impl Into<String>,
        ports: impl IntoIterator<Item = u16>,
    ) -> Result<DockerServiceDiscovery> {
        let settings = DockerDiscoverySettings::new(endpoint)?.with_ports(ports);
        info!(endpoint = %settings.endpoint(), "Creating Docker discovery with defaults");
        Self::create(settings)
    }
}
