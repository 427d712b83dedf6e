//! Flare Docker Discovery
//!
//! Cluster peer discovery backed by the Docker Engine / Swarm API: filters containers or
//! swarm tasks, extracts their network addresses and pairs them with the configured ports.

pub mod config;
pub mod discovery;
pub mod error;

// Re-exports
pub use config::{DockerDiscoveryConfig, DockerDiscoveryOverrides};
pub use error::{DiscoveryError, ErrorCategory, ErrorCode, Result};

pub use discovery::{
    DiscoveredRecord, DiscoveryFactory, DockerApi, DockerConnector, DockerDiscoverySettings,
    DockerServiceDiscovery, Filter, FilterEngine, FilterField, HttpDockerConnector,
    IpAddressProvider, ListParameters, Lookup, Resolved, ResolvedTarget, ServiceDiscovery,
    UnixDockerConnector, parse_filters,
};
