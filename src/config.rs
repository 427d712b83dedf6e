//! Docker 发现配置
//!
//! 分层顺序：配置文件（TOML）→ 环境变量 → 显式覆盖（`DockerDiscoveryOverrides`），
//! 最终得到只读的 `DockerDiscoverySettings`。

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::discovery::filter::Filter;
use crate::discovery::settings::{DockerDiscoverySettings, ListParameters};
use crate::error::{DiscoveryError, Result};

/// 环境变量前缀
pub const ENV_PREFIX: &str = "DOCKER_DISCOVERY_";

/// 原始配置
///
/// ```toml
/// endpoint = "tcp://127.0.0.1:2375"
/// ports = [8558]
/// container_filters = "state=running;labels=com.docker.compose.service:weather"
/// network_name_filter = "weather-bridge"
/// use_swarm = false
/// containers_list_parameters = { all = true }
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DockerDiscoveryConfig {
    pub endpoint: Option<String>,
    pub ports: Vec<u16>,
    /// 序列化的过滤器：`name=v1,v2;name2=v3`
    pub container_filters: Option<String>,
    pub network_name_filter: Option<String>,
    #[serde(alias = "use_orchestrator_mode")]
    pub use_swarm: bool,
    /// JSON 对象，或内容为 JSON 的字符串
    pub containers_list_parameters: Option<Value>,
    pub tasks_list_parameters: Option<Value>,
}

impl DockerDiscoveryConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DiscoveryError::invalid_config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// 用进程环境变量覆盖
    pub fn with_env_overrides(self) -> Result<Self> {
        self.apply_env(|name| std::env::var(name).ok())
    }

    /// 用给定的变量查找函数覆盖
    ///
    /// 识别的变量（均带 `DOCKER_DISCOVERY_` 前缀）：`ENDPOINT`、`PORTS`（逗号分隔）、
    /// `CONTAINER_FILTERS`、`NETWORK_NAME_FILTER`、`USE_SWARM`、
    /// `CONTAINERS_LIST_PARAMETERS`、`TASKS_LIST_PARAMETERS`。
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(endpoint) = var("ENDPOINT") {
            self.endpoint = Some(endpoint);
        }
        if let Some(ports) = var("PORTS") {
            self.ports = parse_ports(&ports)?;
        }
        if let Some(filters) = var("CONTAINER_FILTERS") {
            self.container_filters = Some(filters);
        }
        if let Some(network) = var("NETWORK_NAME_FILTER") {
            self.network_name_filter = Some(network);
        }
        if let Some(use_swarm) = var("USE_SWARM") {
            self.use_swarm = parse_bool(&use_swarm)?;
        }
        if let Some(parameters) = var("CONTAINERS_LIST_PARAMETERS") {
            self.containers_list_parameters = Some(Value::String(parameters));
        }
        if let Some(parameters) = var("TASKS_LIST_PARAMETERS") {
            self.tasks_list_parameters = Some(Value::String(parameters));
        }

        Ok(self)
    }

    /// 转换为设置；缺少 endpoint 或过滤器格式错误时报配置错误
    pub fn into_settings(self) -> Result<DockerDiscoverySettings> {
        let endpoint = self.endpoint.ok_or_else(DiscoveryError::endpoint_missing)?;
        let mut settings = DockerDiscoverySettings::new(endpoint)?
            .with_ports(self.ports)
            .with_network_name_filter(self.network_name_filter)
            .with_use_swarm(self.use_swarm);

        if let Some(filters) = self.container_filters.as_deref() {
            settings = settings.with_container_filters_str(filters)?;
        }
        if let Some(parameters) = self.containers_list_parameters {
            let parameters = ListParameters::from_value(parameters)?;
            settings = settings.with_containers_list_parameters(parameters);
        }
        if let Some(parameters) = self.tasks_list_parameters {
            let parameters = ListParameters::from_value(parameters)?;
            settings = settings.with_tasks_list_parameters(parameters);
        }

        Ok(settings)
    }
}

/// 显式覆盖，最后应用；只有设置过的字段会替换
#[derive(Debug, Clone, Default)]
pub struct DockerDiscoveryOverrides {
    endpoint: Option<String>,
    ports: Option<Vec<u16>>,
    container_filters: Option<Vec<Filter>>,
    network_name_filter: Option<String>,
    use_swarm: Option<bool>,
    containers_list_parameters: Option<ListParameters>,
    tasks_list_parameters: Option<ListParameters>,
}

impl DockerDiscoveryOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    #[must_use]
    pub fn ports(mut self, ports: impl IntoIterator<Item = u16>) -> Self {
        self.ports = Some(ports.into_iter().collect());
        self
    }

    #[must_use]
    pub fn container_filters(mut self, filters: Vec<Filter>) -> Self {
        self.container_filters = Some(filters);
        self
    }

    #[must_use]
    pub fn network_name_filter(mut self, network_name_filter: impl Into<String>) -> Self {
        self.network_name_filter = Some(network_name_filter.into());
        self
    }

    #[must_use]
    pub fn use_swarm(mut self, use_swarm: bool) -> Self {
        self.use_swarm = Some(use_swarm);
        self
    }

    #[must_use]
    pub fn containers_list_parameters(mut self, parameters: ListParameters) -> Self {
        self.containers_list_parameters = Some(parameters);
        self
    }

    #[must_use]
    pub fn tasks_list_parameters(mut self, parameters: ListParameters) -> Self {
        self.tasks_list_parameters = Some(parameters);
        self
    }

    /// 应用到已有设置上，返回新设置
    pub fn apply(&self, settings: &DockerDiscoverySettings) -> Result<DockerDiscoverySettings> {
        let mut settings = settings.clone();

        if let Some(endpoint) = &self.endpoint {
            settings = settings.with_endpoint(endpoint.as_str())?;
        }
        if let Some(ports) = &self.ports {
            settings = settings.with_ports(ports.iter().copied());
        }
        if let Some(filters) = &self.container_filters {
            settings = settings.with_container_filters(filters.clone());
        }
        if let Some(network) = &self.network_name_filter {
            settings = settings.with_network_name_filter(Some(network.clone()));
        }
        if let Some(use_swarm) = self.use_swarm {
            settings = settings.with_use_swarm(use_swarm);
        }
        if let Some(parameters) = &self.containers_list_parameters {
            settings = settings.with_containers_list_parameters(parameters.clone());
        }
        if let Some(parameters) = &self.tasks_list_parameters {
            settings = settings.with_tasks_list_parameters(parameters.clone());
        }

        Ok(settings)
    }
}

fn parse_ports(raw: &str) -> Result<Vec<u16>> {
    raw.split(',')
        .map(str::trim)
        .filter(|port| !port.is_empty())
        .map(|port| {
            port.parse::<u16>().map_err(|_| {
                DiscoveryError::invalid_config(format!(
                    "Invalid port in {}PORTS: {}",
                    ENV_PREFIX, port
                ))
            })
        })
        .collect()
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        other => Err(DiscoveryError::invalid_config(format!(
            "Invalid boolean in {}USE_SWARM: {}",
            ENV_PREFIX, other
        ))),
    }
}
