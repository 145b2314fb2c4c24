use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use crate::classifier::ClassifierConfig;
use crate::gate::GateConfig;
use crate::orchestrator::BatchConfig;
use crate::service::ClientConfig;

/// Root configuration
///
/// The simulator binary reads `[server]` and `[simulator]`; the sync runner
/// reads `[client]`, `[gates]`, `[batch]` and `[classifier]`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub simulator: SimulatorConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub gates: GateConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8000
}

/// Remote service simulator configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulatorConfig {
    /// Number of items generated when no catalog file is given.
    #[serde(default = "default_catalog_size")]
    pub catalog_size: usize,

    /// Seed for the generated catalog.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// JSON catalog to serve instead of a generated one.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// Fixed delay of the list operation (milliseconds).
    #[serde(default = "default_list_delay")]
    pub list_delay_ms: u64,

    #[serde(default = "OperationProfile::metadata")]
    pub metadata: OperationProfile,

    #[serde(default = "OperationProfile::transcript")]
    pub transcript: OperationProfile,

    #[serde(default = "OperationProfile::update")]
    pub update: OperationProfile,
}

fn default_catalog_size() -> usize {
    1000
}

fn default_seed() -> u64 {
    42
}

fn default_list_delay() -> u64 {
    50
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            catalog_size: default_catalog_size(),
            seed: default_seed(),
            catalog_path: None,
            list_delay_ms: default_list_delay(),
            metadata: OperationProfile::metadata(),
            transcript: OperationProfile::transcript(),
            update: OperationProfile::update(),
        }
    }
}

impl SimulatorConfig {
    pub fn list_delay(&self) -> Duration {
        Duration::from_millis(self.list_delay_ms)
    }
}

/// Latency model for one simulated operation.
///
/// A caller that finds `waiters` other callers queued is delayed by
/// `base_delay + degradation_factor * min(waiters, degradation_cap)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct OperationProfile {
    /// Requests served at once.
    pub capacity: usize,
    pub base_delay_ms: u64,
    /// Extra delay per queued waiter.
    pub degradation_factor_ms: u64,
    /// Waiters counted at most.
    pub degradation_cap: usize,
}

impl OperationProfile {
    pub fn new(
        capacity: usize,
        base_delay_ms: u64,
        degradation_factor_ms: u64,
        degradation_cap: usize,
    ) -> Self {
        Self {
            capacity,
            base_delay_ms,
            degradation_factor_ms,
            degradation_cap,
        }
    }

    pub fn metadata() -> Self {
        Self::new(10, 200, 100, 10)
    }

    pub fn transcript() -> Self {
        Self::new(20, 100, 100, 10)
    }

    pub fn update() -> Self {
        Self::new(50, 50, 0, 10)
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn degradation_factor(&self) -> Duration {
        Duration::from_millis(self.degradation_factor_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::CompletionPolicy;

    #[test]
    fn test_deserialize_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.simulator.catalog_size, 1000);
        assert_eq!(config.simulator.metadata, OperationProfile::metadata());
        assert_eq!(config.client.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.gates.metadata_capacity, 5);
        assert_eq!(config.gates.transcript_capacity, 10);
        assert_eq!(config.gates.connection_budget, 50);
        assert_eq!(config.batch.size, 100);
        assert_eq!(config.batch.policy, CompletionPolicy::FailFast);
    }

    #[test]
    fn test_default_profiles() {
        let config = SimulatorConfig::default();
        assert_eq!(config.metadata, OperationProfile::new(10, 200, 100, 10));
        assert_eq!(config.transcript, OperationProfile::new(20, 100, 100, 10));
        assert_eq!(config.update, OperationProfile::new(50, 50, 0, 10));
        assert_eq!(config.list_delay(), Duration::from_millis(50));
    }

    #[test]
    fn test_deserialize_simulator_profile() {
        let toml = r#"
[simulator]
catalog_size = 20
seed = 7

[simulator.metadata]
capacity = 2
base_delay_ms = 10
degradation_factor_ms = 5
degradation_cap = 3
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.simulator.catalog_size, 20);
        assert_eq!(config.simulator.seed, 7);
        assert_eq!(config.simulator.metadata, OperationProfile::new(2, 10, 5, 3));
        assert_eq!(
            config.simulator.metadata.degradation_factor(),
            Duration::from_millis(5)
        );
        // Sections left out keep their own defaults
        assert_eq!(config.simulator.transcript, OperationProfile::transcript());
    }

    #[test]
    fn test_deserialize_partial_profile_fails() {
        let toml = r#"
[simulator.update]
capacity = 2
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_client_side_sections() {
        let toml = r#"
[client]
base_url = "http://10.0.0.2:8000"
timeout_secs = 5

[gates]
metadata_capacity = 2
classification_capacity = 1

[batch]
size = 10
policy = "fail_soft"

[classifier]
work_rounds = 0
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.client.timeout_secs, 5);
        assert_eq!(config.gates.metadata_capacity, 2);
        assert_eq!(config.gates.transcript_capacity, 10);
        assert_eq!(config.gates.classification_capacity, 1);
        assert_eq!(config.batch.size, 10);
        assert_eq!(config.batch.policy, CompletionPolicy::FailSoft);
        assert_eq!(config.classifier.work_rounds, 0);
        assert_eq!(config.classifier.work_bytes, 8 * 1024 * 1024);
    }
}
