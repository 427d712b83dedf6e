//! Docker 服务发现入口
//!
//! 外部的集群引导组件按自己的周期调用 `lookup`；每次调用独立、无状态，
//! 失败时返回空结果，由调用方在下一个周期重试。

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::discovery::api::DockerConnector;
use crate::discovery::provider::{
    DockerIpAddressProvider, DockerSwarmIpAddressProvider, IpAddressProvider, ProviderBase,
};
use crate::discovery::settings::DockerDiscoverySettings;
use crate::error::Result;

/// 查询请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lookup {
    /// 只按服务名查询
    Name(String),

    /// SRV 风格查询；端口名和协议对 Docker 发现没有意义，仅透传
    Srv {
        service_name: String,
        port_name: String,
        protocol: String,
    },
}

impl Lookup {
    pub fn srv(
        service_name: impl Into<String>,
        port_name: impl Into<String>,
        protocol: impl Into<String>,
    ) -> Self {
        Lookup::Srv {
            service_name: service_name.into(),
            port_name: port_name.into(),
            protocol: protocol.into(),
        }
    }

    /// 服务名
    pub fn service_name(&self) -> &str {
        match self {
            Lookup::Name(name) => name,
            Lookup::Srv { service_name, .. } => service_name,
        }
    }
}

impl From<&str> for Lookup {
    fn from(name: &str) -> Self {
        Lookup::Name(name.to_string())
    }
}

impl From<String> for Lookup {
    fn from(name: String) -> Self {
        Lookup::Name(name)
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookup::Name(name) => write!(f, "{}", name),
            Lookup::Srv {
                service_name,
                port_name,
                protocol,
            } => write!(f, "_{}._{}.{}", port_name, protocol, service_name),
        }
    }
}

/// 单个解析结果
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedTarget {
    pub host: String,
    pub port: u16,
    pub address: IpAddr,
}

impl ResolvedTarget {
    pub fn new(address: IpAddr, port: u16) -> Self {
        Self {
            host: address.to_string(),
            port,
            address,
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }
}

/// 一次 lookup 的结果；空列表表示当前没有可发现的节点，不是错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolved {
    pub service_name: String,
    pub addresses: Vec<ResolvedTarget>,
}

impl Resolved {
    pub fn new(service_name: impl Into<String>, addresses: Vec<ResolvedTarget>) -> Self {
        Self {
            service_name: service_name.into(),
            addresses,
        }
    }

    pub fn empty(service_name: impl Into<String>) -> Self {
        Self::new(service_name, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn socket_addrs(&self) -> Vec<SocketAddr> {
        self.addresses.iter().map(ResolvedTarget::socket_addr).collect()
    }
}

/// 服务发现接口，由集群引导组件持有并周期调用
#[async_trait]
pub trait ServiceDiscovery: Send + Sync {
    async fn lookup(&self, lookup: Lookup, resolve_timeout: Duration) -> Resolved;
}

/// 基于 Docker / Swarm API 的服务发现
pub struct DockerServiceDiscovery {
    settings: Arc<DockerDiscoverySettings>,
    provider: Arc<dyn IpAddressProvider>,
}

impl DockerServiceDiscovery {
    /// 创建服务发现，过滤器配置错误在这里直接返回
    ///
    /// `use_swarm == true` 使用 Swarm 任务模式，否则使用独立容器模式。
    pub fn new(
        settings: DockerDiscoverySettings,
        connector: Arc<dyn DockerConnector>,
    ) -> Result<Self> {
        let settings = Arc::new(settings);
        let base = ProviderBase::new(settings.clone(), connector)?;

        let provider: Arc<dyn IpAddressProvider> = if settings.use_swarm() {
            Arc::new(DockerSwarmIpAddressProvider::new(base))
        } else {
            Arc::new(DockerIpAddressProvider::new(base))
        };

        info!(
            endpoint = %settings.endpoint(),
            mode = provider.mode(),
            ports = ?settings.ports(),
            filters = settings.container_filters().len(),
            "✅ Docker service discovery created"
        );

        Ok(Self { settings, provider })
    }

    pub fn settings(&self) -> &DockerDiscoverySettings {
        &self.settings
    }

    /// 当前使用的模式
    pub fn mode(&self) -> &'static str {
        self.provider.mode()
    }
}

impl fmt::Debug for DockerServiceDiscovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DockerServiceDiscovery")
            .field("mode", &self.mode())
            .field("settings", &self.settings)
            .finish()
    }
}

#[async_trait]
impl ServiceDiscovery for DockerServiceDiscovery {
    async fn lookup(&self, lookup: Lookup, resolve_timeout: Duration) -> Resolved {
        let service_name = lookup.service_name().to_string();
        let ports = self.settings.ports();

        if ports.is_empty() {
            debug!(service = %service_name, "No ports configured, skipping Docker discovery");
            return Resolved::empty(service_name);
        }

        let addresses = self.provider.get_ip_addresses(resolve_timeout).await;

        let targets: Vec<ResolvedTarget> = addresses
            .iter()
            .flat_map(|address| ports.iter().map(move |port| ResolvedTarget::new(*address, *port)))
            .collect();

        info!(
            service = %service_name,
            addresses = addresses.len(),
            targets = targets.len(),
            "Docker discovery lookup finished"
        );

        Resolved::new(service_name, targets)
    }
}
