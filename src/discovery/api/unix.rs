//! Docker Engine 本地 socket 客户端
//!
//! 守护进程默认监听 `unix:///var/run/docker.sock`，请求走 HTTP/1.1 over unix socket。

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client;
use hyperlocal::{UnixClientExt, UnixConnector, Uri as UnixUri};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::discovery::api::http::{decode_response, encode_query, encode_query_string};
use crate::discovery::api::models::{ContainerSummary, Task};
use crate::discovery::api::{DockerApi, DockerConnector};
use crate::discovery::record::{DiscoveredRecord, TaskSummary};
use crate::discovery::settings::ListParameters;
use crate::error::{DiscoveryError, Result};

/// `unix://` endpoint 前缀
pub const UNIX_SCHEME: &str = "unix://";

/// 基于 hyperlocal 的本地 socket 连接器
#[derive(Debug, Clone, Default)]
pub struct UnixDockerConnector;

impl UnixDockerConnector {
    pub fn new() -> Self {
        Self
    }

    /// 从 `unix://` endpoint 中取出 socket 路径
    pub fn socket_path(endpoint: &str) -> Result<PathBuf> {
        let endpoint = endpoint.trim();
        match endpoint.strip_prefix(UNIX_SCHEME) {
            Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
            _ => Err(DiscoveryError::unsupported_scheme(endpoint)),
        }
    }
}

#[async_trait]
impl DockerConnector for UnixDockerConnector {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn DockerApi>> {
        let socket_path = Self::socket_path(endpoint)?;

        // socket 不存在时直接失败，不必等第一个请求
        tokio::fs::metadata(&socket_path).await.map_err(|e| {
            DiscoveryError::from(e).with_context(format!("Docker socket {}", socket_path.display()))
        })?;

        Ok(Box::new(UnixDockerApi::new(socket_path)))
    }
}

/// 单次 lookup 使用的本地 socket 连接
pub struct UnixDockerApi {
    client: Client<UnixConnector, Full<Bytes>>,
    socket_path: PathBuf,
}

impl UnixDockerApi {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            client: Client::unix(),
            socket_path: socket_path.into(),
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    async fn get_json<T>(&self, path: &str, query: &[(String, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let target = match encode_query_string(query)? {
            Some(query) => format!("{}?{}", path, query),
            None => path.to_string(),
        };
        debug!(
            socket = %self.socket_path.display(),
            target = %target,
            "Querying Docker API"
        );

        let uri: hyper::Uri = UnixUri::new(&self.socket_path, &target).into();
        let resp = self.client.get(uri).await?;

        let status = resp.status();
        let body = resp.into_body().collect().await?.to_bytes();
        decode_response(status, &body)
    }
}

#[async_trait]
impl DockerApi for UnixDockerApi {
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
