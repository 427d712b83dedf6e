//! Docker 发现设置

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::discovery::filter::{Filter, parse_filters};
use crate::error::{DiscoveryError, Result};

/// 透传给 Docker API 列表查询的原始参数
///
/// 键为 Docker Engine API 的查询参数名（如 `all`、`filters`），值原样转发。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListParameters(Map<String, Value>);

impl ListParameters {
    /// 空参数
    pub fn new() -> Self {
        Self::default()
    }

    /// 容器列表默认参数：包含已停止的容器
    pub fn containers_default() -> Self {
        Self::new().with("all", Value::Bool(true))
    }

    /// 从 JSON 值解析；字符串会再按 JSON 解析一次
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::new()),
            Value::String(raw) if raw.trim().is_empty() => Ok(Self::new()),
            Value::String(raw) => {
                let parsed: Value = serde_json::from_str(&raw).map_err(|e| {
                    DiscoveryError::invalid_config(format!(
                        "Invalid list parameters '{}': {}",
                        raw, e
                    ))
                })?;
                match parsed {
                    Value::String(_) => Err(DiscoveryError::invalid_config(format!(
                        "List parameters must be a JSON object: {}",
                        raw
                    ))),
                    other => Self::from_value(other),
                }
            }
            other => Err(DiscoveryError::invalid_config(format!(
                "List parameters must be a JSON object, got: {}",
                other
            ))),
        }
    }

    /// 设置一个参数
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

/// Docker 发现设置
///
/// 构造后只读；`with_*` 返回替换了单个字段的新实例，其余字段拷贝。
#[derive(Debug, Clone, PartialEq)]
pub struct DockerDiscoverySettings {
    endpoint: String,
    ports: Vec<u16>,
    container_filters: Vec<Filter>,
    network_name_filter: Option<String>,
    use_swarm: bool,
    containers_list_parameters: ListParameters,
    tasks_list_parameters: ListParameters,
}

impl DockerDiscoverySettings {
    /// 创建设置，endpoint 为空白时报配置错误
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Ok(Self {
            endpoint: validate_endpoint(endpoint.into())?,
            ports: Vec::new(),
            container_filters: Vec::new(),
            network_name_filter: None,
            use_swarm: false,
            containers_list_parameters: ListParameters::containers_default(),
            tasks_list_parameters: ListParameters::new(),
        })
    }

    /// Docker API 地址
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// 与每个地址组合的端口
    pub fn ports(&self) -> &[u16] {
        &self.ports
    }

    /// 容器过滤器
    pub fn container_filters(&self) -> &[Filter] {
        &self.container_filters
    }

    /// 网络名过滤（子串）
    pub fn network_name_filter(&self) -> Option<&str> {
        self.network_name_filter.as_deref()
    }

    /// 是否使用 Swarm 任务模式
    pub fn use_swarm(&self) -> bool {
        self.use_swarm
    }

    /// 容器列表查询参数
    pub fn containers_list_parameters(&self) -> &ListParameters {
        &self.containers_list_parameters
    }

    /// 任务列表查询参数
    pub fn tasks_list_parameters(&self) -> &ListParameters {
        &self.tasks_list_parameters
    }

    /// 当前模式名，用于日志
    pub fn mode(&self) -> &'static str {
        if self.use_swarm { "swarm" } else { "container" }
    }

    pub fn with_endpoint(&self, endpoint: impl Into<String>) -> Result<Self> {
        Ok(Self {
            endpoint: validate_endpoint(endpoint.into())?,
            ..self.clone()
        })
    }

    /// 替换端口列表，重复端口只保留第一次出现
    pub fn with_ports(&self, ports: impl IntoIterator<Item = u16>) -> Self {
        let mut unique = Vec::new();
        for port in ports {
            if !unique.contains(&port) {
                unique.push(port);
            }
        }
        Self {
            ports: unique,
            ..self.clone()
        }
    }

    pub fn with_container_filters(&self, container_filters: Vec<Filter>) -> Self {
        Self {
            container_filters,
            ..self.clone()
        }
    }

    /// 从序列化字符串替换过滤器
    pub fn with_container_filters_str(&self, filters: &str) -> Result<Self> {
        Ok(self.with_container_filters(parse_filters(filters)?))
    }

    /// 替换网络名过滤，空字符串视为未设置
    pub fn with_network_name_filter(&self, network_name_filter: Option<String>) -> Self {
        Self {
            network_name_filter: network_name_filter.filter(|name| !name.is_empty()),
            ..self.clone()
        }
    }

    pub fn with_use_swarm(&self, use_swarm: bool) -> Self {
        Self {
            use_swarm,
            ..self.clone()
        }
    }

    pub fn with_containers_list_parameters(&self, parameters: ListParameters) -> Self {
        Self {
            containers_list_parameters: parameters,
            ..self.clone()
        }
    }

    pub fn with_tasks_list_parameters(&self, parameters: ListParameters) -> Self {
        Self {
            tasks_list_parameters: parameters,
            ..self.clone()
        }
    }
}

fn validate_endpoint(endpoint: String) -> Result<String> {
    let trimmed = endpoint.trim();
    if trimmed.is_empty() {
        return Err(DiscoveryError::endpoint_missing());
    }
    Ok(trimmed.to_string())
}
