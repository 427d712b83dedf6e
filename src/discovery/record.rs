//! 发现记录定义
//!
//! `DiscoveredRecord` 统一了独立容器列表与 Swarm 任务详情两种结构，
//! 过滤引擎和地址提取都只针对这个类型工作。

use std::collections::HashMap;

/// 网络挂载
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkAttachment {
    /// 网络名称
    pub network_name: String,

    /// 挂载地址（Swarm 任务的地址可能带 `/前缀长度` 后缀）
    pub addresses: Vec<String>,
}

impl NetworkAttachment {
    pub fn new(network_name: impl Into<String>, addresses: Vec<String>) -> Self {
        Self {
            network_name: network_name.into(),
            addresses,
        }
    }

    /// 网络名是否包含给定子串（未设置过滤器时总是匹配）
    pub fn matches_network(&self, network_name_filter: Option<&str>) -> bool {
        match network_name_filter {
            None => true,
            Some(filter) => self.network_name.contains(filter),
        }
    }
}

/// 端口发布绑定
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortBinding {
    /// 宿主机 IP（可能为空）
    pub host_ip: String,

    /// 宿主机端口
    pub host_port: Option<u16>,
}

impl PortBinding {
    pub fn new(host_ip: impl Into<String>, host_port: Option<u16>) -> Self {
        Self {
            host_ip: host_ip.into(),
            host_port,
        }
    }
}

/// 一次 API 调用返回的容器或任务描述
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredRecord {
    /// 容器 / 任务 ID
    pub id: String,

    /// 镜像引用
    pub image: String,

    /// 镜像摘要
    pub image_id: String,

    /// 生命周期状态（如 "running"、"exited"）
    pub state: String,

    /// 名称列表
    pub names: Vec<String>,

    /// 标签
    pub labels: HashMap<String, String>,

    /// 网络挂载；`None` 表示响应中完全没有网络元数据
    pub networks: Option<Vec<NetworkAttachment>>,

    /// 端口发布绑定
    pub ports: Vec<PortBinding>,
}

impl DiscoveredRecord {
    /// 创建新的记录
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// 设置镜像
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// 设置镜像摘要
    pub fn with_image_id(mut self, image_id: impl Into<String>) -> Self {
        self.image_id = image_id.into();
        self
    }

    /// 设置状态
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    /// 添加名称
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    /// 添加标签
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// 添加网络挂载
    pub fn with_network(mut self, network_name: impl Into<String>, addresses: Vec<String>) -> Self {
        self.networks
            .get_or_insert_with(Vec::new)
            .push(NetworkAttachment::new(network_name, addresses));
        self
    }

    /// 添加端口绑定
    pub fn with_port(mut self, host_ip: impl Into<String>, host_port: Option<u16>) -> Self {
        self.ports.push(PortBinding::new(host_ip, host_port));
        self
    }

    /// 是否处于运行状态
    pub fn is_running(&self) -> bool {
        self.state.eq_ignore_ascii_case("running")
    }

    /// 过滤后的网络挂载
    pub fn attachments<'a>(
        &'a self,
        network_name_filter: Option<&'a str>,
    ) -> impl Iterator<Item = &'a NetworkAttachment> + 'a {
        self.networks
            .iter()
            .flatten()
            .filter(move |network| network.matches_network(network_name_filter))
    }
}

/// 任务列表中的摘要，仅用于发起详情查询
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSummary {
    /// 任务 ID
    pub id: String,
}

impl TaskSummary {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}
