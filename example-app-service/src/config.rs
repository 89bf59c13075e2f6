use std::{
    env,
    net::{IpAddr, SocketAddr},
    path::Path,
};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::AppResult;

/// Application configuration.
///
/// Contains all configuration settings for the example app service,
/// including server, database, tracing and query settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Distribution metadata configuration
    pub distribution: DistributionConfig,
    /// Node-specific configuration
    pub node: NodeConfig,
    /// Server configuration settings
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Tracing configuration
    pub tracing: TracingConfig,
    /// List query limits
    #[serde(default)]
    pub query: QueryConfig,
}

/// Server configuration settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// gRPC server bind address
    pub grpc_address: SocketAddr,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind")]
pub enum DatabaseConfig {
    /// In-memory database storage
    Memory,
}

/// Tracing configuration.
///
/// Controls how tracing data is output from the service.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind")]
pub enum TracingConfig {
    /// Log events only, no span export
    Memory,
    /// Standard output tracing
    Stdout,
}

/// Query configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryConfig {
    /// Upper bound for the page size of list calls
    pub max_page_size: Option<i32>,
}

/// Distribution metadata configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DistributionConfig {
    /// Distribution name
    pub name: String,
    /// Distribution version
    pub version: Option<String>,
}

/// Node-specific configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    /// Host IP address of the node
    pub host_ip: IpAddr,
    /// Worker number for this node instance
    pub worker_number: u16,
}

const CONFIG_PATH_ENV: &str = "EXAMPLE_APP_CONFIG_PATH";
const ENV_PREFIX: &str = "EXAMPLE_APP";
const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

const DISTRIBUTION_VERSION_KEY: &str = "distribution.version";
const NODE_HOST_IP_KEY: &str = "node.host_ip";
const NODE_WORKER_NUMBER_KEY: &str = "node.worker_number";

impl AppConfig {
    /// Loads configuration from files and environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load() -> AppResult<Self> {
        let config_path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config".to_string());
        let config_path = Path::new(&config_path);

        let mut config_builder =
            Config::builder().set_default(DISTRIBUTION_VERSION_KEY, PKG_VERSION)?;

        // Initial "default" configuration file
        let default_path = config_path.join("default");
        config_builder =
            config_builder.add_source(File::with_name(&default_path.to_string_lossy()));

        // Add in a local configuration file
        // This file shouldn't be checked in to git
        let local_path = config_path.join("local");
        config_builder = config_builder
            .add_source(File::with_name(&local_path.to_string_lossy()).required(false));

        // Add override settings file.
        if let Ok(override_path) = env::var(CONFIG_PATH_ENV) {
            config_builder =
                config_builder.add_source(File::with_name(&override_path).required(false));
        }

        // Add in settings from the environment (with a prefix of EXAMPLE_APP)
        config_builder =
            config_builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

        // Set derived properties
        let config = config_builder.build()?;
        let mut config_builder = Config::builder();
        if let Ok(node_host_ip) = config.get::<IpAddr>(NODE_HOST_IP_KEY) {
            config_builder = config_builder
                .set_default(NODE_WORKER_NUMBER_KEY, get_worker_number(node_host_ip))?;
        }

        Ok(config_builder
            .add_source(config)
            .build()?
            .try_deserialize()?)
    }
}

/// Calculates worker number from IP address.
///
/// Uses the last two octets of an IPv4 address, or the last segment of an IPv6 address.
fn get_worker_number(ip: IpAddr) -> u16 {
    match ip {
        IpAddr::V4(ip) => {
            let octets = ip.octets();
            (u16::from(octets[2]) << 8u16) | u16::from(octets[3])
        }
        IpAddr::V6(ip) => ip.segments()[7],
    }
}
