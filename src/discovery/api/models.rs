//! Docker Engine API 响应模型
//!
//! 只声明发现需要的字段；null 与缺失一律按空处理。

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::discovery::record::{DiscoveredRecord, NetworkAttachment, PortBinding, TaskSummary};

/// `GET /containers/json` 的单个元素
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerSummary {
    pub id: Option<String>,
    pub names: Option<Vec<String>>,
    pub image: Option<String>,
    #[serde(rename = "ImageID")]
    pub image_id: Option<String>,
    pub state: Option<String>,
    pub labels: Option<HashMap<String, String>>,
    pub ports: Option<Vec<ContainerPort>>,
    pub network_settings: Option<ContainerNetworkSettings>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerPort {
    #[serde(rename = "IP")]
    pub ip: Option<String>,
    pub public_port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerNetworkSettings {
    /// 按网络名排序，保证同一响应的遍历顺序稳定
    pub networks: Option<BTreeMap<String, EndpointSettings>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointSettings {
    #[serde(rename = "IPAddress")]
    pub ip_address: Option<String>,
}

impl From<ContainerSummary> for DiscoveredRecord {
    fn from(container: ContainerSummary) -> Self {
        let networks = container
            .network_settings
            .and_then(|settings| settings.networks)
            .map(|networks| {
                networks
                    .into_iter()
                    .map(|(name, endpoint)| {
                        let addresses = endpoint
                            .ip_address
                            .filter(|ip| !ip.is_empty())
                            .into_iter()
                            .collect();
                        NetworkAttachment::new(name, addresses)
                    })
                    .collect()
            });

        let ports = container
            .ports
            .unwrap_or_default()
            .into_iter()
            .map(|port| PortBinding::new(port.ip.unwrap_or_default(), port.public_port))
            .collect();

        DiscoveredRecord {
            id: container.id.unwrap_or_default(),
            image: container.image.unwrap_or_default(),
            image_id: container.image_id.unwrap_or_default(),
            state: container.state.unwrap_or_default(),
            names: container.names.unwrap_or_default(),
            labels: container.labels.unwrap_or_default(),
            networks,
            ports,
        }
    }
}

/// `GET /tasks` 与 `GET /tasks/{id}` 的任务对象
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Task {
    #[serde(rename = "ID")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub labels: Option<HashMap<String, String>>,
    pub spec: Option<TaskSpec>,
    pub status: Option<TaskStatus>,
    pub networks_attachments: Option<Vec<TaskNetworkAttachment>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskSpec {
    pub container_spec: Option<TaskContainerSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskContainerSpec {
    pub image: Option<String>,
    pub labels: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskStatus {
    pub state: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskNetworkAttachment {
    pub network: Option<TaskNetwork>,
    pub addresses: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskNetwork {
    pub spec: Option<TaskNetworkSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskNetworkSpec {
    pub name: Option<String>,
}

impl Task {
    /// 任务摘要；没有 ID 的任务无法查询详情
    pub fn summary(&self) -> Option<TaskSummary> {
        self.id.as_ref().map(TaskSummary::new)
    }
}

impl From<Task> for DiscoveredRecord {
    fn from(task: Task) -> Self {
        let container_spec = task.spec.and_then(|spec| spec.container_spec);
        let (image, mut labels) = match container_spec {
            Some(spec) => (
                spec.image.unwrap_or_default(),
                spec.labels.unwrap_or_default(),
            ),
            None => (String::new(), HashMap::new()),
        };
        labels.extend(task.labels.unwrap_or_default());

        let networks = task.networks_attachments.map(|attachments| {
            attachments
                .into_iter()
                .map(|attachment| {
                    let name = attachment
                        .network
                        .and_then(|network| network.spec)
                        .and_then(|spec| spec.name)
                        .unwrap_or_default();
                    NetworkAttachment::new(name, attachment.addresses.unwrap_or_default())
                })
                .collect()
        });

        DiscoveredRecord {
            id: task.id.unwrap_or_default(),
            image,
            image_id: String::new(),
            state: task
                .status
                .and_then(|status| status.state)
                .unwrap_or_default(),
            names: task.name.into_iter().collect(),
            labels,
            networks,
            ports: Vec::new(),
        }
    }
}
