//! Docker / Swarm 集群节点发现
//!
//! 查询 Docker Engine（独立容器）或 Swarm（任务）API，按配置的过滤器和网络名
//! 挑出候选节点，把地址与配置端口组合成解析结果。

pub mod api;
pub mod expression;
pub mod factory;
pub mod filter;
pub mod provider;
pub mod record;
pub mod resolver;
pub mod settings;

pub use api::{
    DockerApi, DockerConnector, HttpDockerApi, HttpDockerConnector, UnixDockerApi,
    UnixDockerConnector,
};
pub use expression::{FilterEngine, Predicate};
pub use factory::DiscoveryFactory;
pub use filter::{Filter, FilterField, parse_filters};
pub use provider::{
    DockerIpAddressProvider, DockerSwarmIpAddressProvider, IpAddressProvider, ProviderBase,
};
pub use record::{DiscoveredRecord, NetworkAttachment, PortBinding, TaskSummary};
pub use resolver::{
    DockerServiceDiscovery, Lookup, Resolved, ResolvedTarget, ServiceDiscovery,
};
pub use settings::{DockerDiscoverySettings, ListParameters};
