//! 单次 Docker 发现探测
//!
//! 配置文件中的值会被 `DOCKER_DISCOVERY_*` 环境变量覆盖。
//! 设置 `DOCKER_DISCOVERY_LOG_JSON` 时输出 JSON 日志。
//!
//! ```bash
//! DOCKER_DISCOVERY_ENDPOINT=unix:///var/run/docker.sock DOCKER_DISCOVERY_PORTS=8558 \
//!   discovery-lookup weather --timeout 3
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use flare_discovery_docker::{DiscoveryFactory, DockerDiscoveryConfig, Lookup, ServiceDiscovery};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "discovery-lookup",
    about = "Resolve cluster peers once through the Docker / Swarm API."
)]
struct Args {
    /// Service name to look up
    service_name: String,

    /// TOML configuration file
    #[arg(long, short, env = "DOCKER_DISCOVERY_CONFIG")]
    config: Option<PathBuf>,

    /// Resolve timeout in seconds
    #[arg(long, default_value_t = 5)]
    timeout: u64,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    if std::env::var_os("DOCKER_DISCOVERY_LOG_JSON").is_some() {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing();

    let config = match &args.config {
        Some(path) => DockerDiscoveryConfig::load_from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => DockerDiscoveryConfig::default(),
    }
    .with_env_overrides()?;

    let discovery = DiscoveryFactory::create_from_config(config)?;
    let resolved = discovery
        .lookup(
            Lookup::from(args.service_name),
            Duration::from_secs(args.timeout),
        )
        .await;

    if resolved.is_empty() {
        eprintln!("no peers found for {}", resolved.service_name);
    }
    for target in &resolved.addresses {
        println!("{}", target.socket_addr());
    }

    Ok(())
}
