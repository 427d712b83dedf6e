//! Docker Engine HTTP API 客户端

use async_trait::async_trait;
use http::StatusCode;
use reqwest::{Client as HttpClient, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::discovery::api::models::{ContainerSummary, Task};
use crate::discovery::api::{DockerApi, DockerConnector};
use crate::discovery::record::{DiscoveredRecord, TaskSummary};
use crate::discovery::settings::ListParameters;
use crate::error::{DiscoveryError, Result};

/// 基于 reqwest 的连接器
///
/// 支持 `tcp://`（按 `http://` 访问）、`http://` 与 `https://` endpoint。
#[derive(Debug, Clone, Default)]
pub struct HttpDockerConnector {
    user_agent: Option<String>,
}

impl HttpDockerConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置请求的 User-Agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// 把 endpoint 规范化为 HTTP 基础地址，不支持的协议返回配置错误
    pub fn base_url(endpoint: &str) -> Result<String> {
        let endpoint = endpoint.trim();
        let base = if let Some(rest) = endpoint.strip_prefix("tcp://") {
            format!("http://{}", rest)
        } else if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            return Err(DiscoveryError::unsupported_scheme(endpoint));
        };

        let base = base.trim_end_matches('/').to_string();
        if base.ends_with(':') || base.ends_with("//") {
            return Err(DiscoveryError::unsupported_scheme(endpoint));
        }
        Ok(base)
    }
}

#[async_trait]
impl DockerConnector for HttpDockerConnector {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn DockerApi>> {
        let base_url = Self::base_url(endpoint)?;

        let mut builder = HttpClient::builder();
        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        let client = builder.build().map_err(|e| {
            DiscoveryError::connection_failed(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Box::new(HttpDockerApi::new(client, base_url)))
    }
}

/// 单次 lookup 使用的 Docker API 连接
pub struct HttpDockerApi {
    http_client: HttpClient,
    base_url: String,
}

impl HttpDockerApi {
    pub fn new(http_client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    /// 基础地址
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T>(&self, path: &str, query: &[(String, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, params = query.len(), "Querying Docker API");

        let resp = self.http_client.get(&url).query(query).send().await?;

        let status = resp.status();
        let body = resp.bytes().await?;
        decode_response(status, &body)
    }
}

/// 非 2xx 状态返回 API 错误（带响应体），否则按 JSON 解码
pub(crate) fn decode_response<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T> {
    if !status.is_success() {
        return Err(DiscoveryError::api_status(status.as_u16(), String::from_utf8_lossy(body)));
    }
    Ok(serde_json::from_slice(body)?)
}

/// 把透传参数转换为查询串
///
/// 字符串原样发送，对象 / 数组按 JSON 编码（Docker `filters` 参数的格式），null 跳过。
pub fn encode_query(parameters: &ListParameters) -> Vec<(String, String)> {
    parameters
        .iter()
        .filter_map(|(key, value)| {
            let encoded = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                other => other.to_string(),
            };
            Some((key.clone(), encoded))
        })
        .collect()
}

/// 把查询参数编码为 `application/x-www-form-urlencoded` 查询串，无参数时返回 `None`
pub fn encode_query_string(query: &[(String, String)]) -> Result<Option<String>> {
    if query.is_empty() {
        return Ok(None);
    }

    let mut url = Url::parse("http://localhost/").map_err(|e| DiscoveryError::api(e.to_string()))?;
    url.query_pairs_mut().extend_pairs(query);
    Ok(url.query().map(str::to_string))
}

#[async_trait]
impl DockerApi for HttpDockerApi {
    async fn list_containers(&self, parameters: &ListParameters) -> Result<Vec<DiscoveredRecord>> {
        let containers: Vec<ContainerSummary> = self
            .get_json("/containers/json", &encode_query(parameters))
            .await?;
        Ok(containers.into_iter().map(DiscoveredRecord::from).collect())
    }

    async fn list_tasks(&self, parameters: &ListParameters) -> Result<Vec<TaskSummary>> {
        let tasks: Vec<Task> = self.get_json("/tasks", &encode_query(parameters)).await?;
        Ok(tasks.iter().filter_map(Task::summary).collect())
    }

    async fn inspect_task(&self, task_id: &str) -> Result<DiscoveredRecord> {
        let task: Task = self.get_json(&format!("/tasks/{}", task_id), &[]).await?;
        Ok(DiscoveredRecord::from(task))
    }
}
