//! Swarm 任务模式地址提供者

use async_trait::async_trait;
use futures::future::try_join_all;
use tracing::debug;

use crate::discovery::provider::{IpAddressProvider, ProviderBase, strip_prefix_length};
use crate::discovery::record::DiscoveredRecord;
use crate::error::Result;

/// 通过 Swarm 任务列表发现地址
///
/// 任务列表里的摘要不带网络信息，每个任务都要再查一次详情；
/// 详情查询全部并发发出，任意一个失败则本次查询失败。
pub struct DockerSwarmIpAddressProvider {
    base: ProviderBase,
}

impl DockerSwarmIpAddressProvider {
    pub fn new(base: ProviderBase) -> Self {
        Self { base }
    }

    /// 从任务详情中提取地址
    ///
    /// 只保留运行中且带网络挂载的任务，地址去掉前缀长度。
    /// 容器过滤器只作用于独立容器模式，任务不经过过滤引擎。
    pub fn task_addresses(&self, tasks: &[DiscoveredRecord]) -> Vec<String> {
        let network_name_filter = self.base.settings().network_name_filter();
        let mut addresses = Vec::new();

        for task in tasks {
            if !task.is_running() || task.networks.is_none() {
                continue;
            }

            addresses.extend(
                task.attachments(network_name_filter)
                    .flat_map(|network| network.addresses.iter())
                    .map(|address| strip_prefix_length(address).to_string()),
            );
        }

        addresses
    }
}

#[async_trait]
impl IpAddressProvider for DockerSwarmIpAddressProvider {
    fn mode(&self) -> &'static str {
        "swarm"
    }

    fn endpoint(&self) -> &str {
        self.base.settings().endpoint()
    }

    async fn raw_addresses(&self) -> Result<Vec<String>> {
        let details = {
            let api = self.base.connect().await?;
            let tasks = api
                .list_tasks(self.base.settings().tasks_list_parameters())
                .await
                .map_err(|e| e.with_context("list tasks"))?;
            debug!(tasks = tasks.len(), "Inspecting swarm tasks");

            try_join_all(tasks.iter().map(|task| api.inspect_task(&task.id)))
                .await
                .map_err(|e| e.with_context("inspect task"))?
        };

        Ok(self.task_addresses(&details))
    }
}
