//! Docker 编排 API 抽象
//!
//! 地址提供者只依赖这里的查询接口，具体传输（HTTP、本地 socket 等）通过
//! `DockerConnector` 注入。每次 lookup 通过连接器获取一个新的 `DockerApi`，
//! 在 lookup 结束（包括超时和出错）时随 drop 一起释放。

pub mod http;
pub mod models;
pub mod unix;

use async_trait::async_trait;

use crate::discovery::record::{DiscoveredRecord, TaskSummary};
use crate::discovery::settings::ListParameters;
use crate::error::Result;

pub use http::{HttpDockerApi, HttpDockerConnector};
pub use unix::{UnixDockerApi, UnixDockerConnector};

/// Docker API 查询接口
///
/// 由于需要动态分发（dyn），使用 async-trait
#[async_trait]
pub trait DockerApi: Send + Sync {
    /// 列出容器
    ///
    /// # 参数
    /// * `parameters` - 原样转发的查询参数
    async fn list_containers(&self, parameters: &ListParameters) -> Result<Vec<DiscoveredRecord>>;

    /// 列出 Swarm 任务
    async fn list_tasks(&self, parameters: &ListParameters) -> Result<Vec<TaskSummary>>;

    /// 查询单个任务详情
    async fn inspect_task(&self, task_id: &str) -> Result<DiscoveredRecord>;
}

impl std::fmt::Debug for dyn DockerApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DockerApi").finish_non_exhaustive()
    }
}

/// API 连接器
///
/// 每次调用 `connect` 都返回一个独立的连接，调用方持有到本次 lookup 结束。
#[async_trait]
pub trait DockerConnector: Send + Sync {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn DockerApi>>;
}
