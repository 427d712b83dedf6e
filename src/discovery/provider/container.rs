//! 独立容器模式地址提供者

use async_trait::async_trait;
use tracing::debug;

use crate::discovery::provider::{IpAddressProvider, ProviderBase};
use crate::discovery::record::DiscoveredRecord;
use crate::error::Result;

/// 通过容器列表发现地址
pub struct DockerIpAddressProvider {
    base: ProviderBase,
}

impl DockerIpAddressProvider {
    pub fn new(base: ProviderBase) -> Self {
        Self { base }
    }

    /// 从过滤后的容器中提取地址
    ///
    /// 有网络元数据时取匹配网络的地址；完全没有网络元数据（如 host 网络）时
    /// 退回到端口绑定里非空的宿主机 IP。
    pub fn container_addresses(&self, containers: &[DiscoveredRecord]) -> Vec<String> {
        let network_name_filter = self.base.settings().network_name_filter();
        let mut addresses = Vec::new();

        for container in containers {
            if container.networks.is_none() {
                addresses.extend(
                    container
                        .ports
                        .iter()
                        .filter(|port| !port.host_ip.is_empty())
                        .map(|port| port.host_ip.clone()),
                );
                continue;
            }

            for network in container.attachments(network_name_filter) {
                addresses.extend(network.addresses.iter().cloned());
            }
        }

        addresses
    }
}

#[async_trait]
impl IpAddressProvider for DockerIpAddressProvider {
    fn mode(&self) -> &'static str {
        "container"
    }

    fn endpoint(&self) -> &str {
        self.base.settings().endpoint()
    }

    async fn raw_addresses(&self) -> Result<Vec<String>> {
        let containers = {
            let api = self.base.connect().await?;
            api.list_containers(self.base.settings().containers_list_parameters())
                .await
                .map_err(|e| e.with_context("list containers"))?
        };

        let listed = containers.len();
        let containers = self
            .base
            .engine()
            .apply(containers)
            .map_err(|e| e.with_context("apply container filters"))?;
        debug!(listed, matched = containers.len(), "Applied container filters");

        Ok(self.container_addresses(&containers))
    }
}
