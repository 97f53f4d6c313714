//! Layered configuration: a TOML file merged under CLI overrides, mirroring
//! the teacher's `node/core::config` + `node/core::cli` two-layer shape
//! (highest priority wins: CLI flags, then file, then defaults).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use snrr_transport::{Layer, LayerSet};

/// The five enumerated options plus the ambient fields a runnable binary
/// needs (data directory, logging).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnrrConfig {
    /// Bitmask of enabled overlay transports, default `{onion}`. Encoded on
    /// disk as a list of names rather than the raw bitmask so the TOML file
    /// stays human-editable.
    pub selected_layers: Vec<String>,
    pub testnet: bool,
    pub http_timeout_seconds: u64,
    pub max_retries: u32,
    pub max_file_size_bytes: usize,
    pub target_swarm_snode_count: usize,
    pub data_dir: PathBuf,
    pub log: LogConfig,
}

impl Default for SnrrConfig {
    fn default() -> Self {
        Self {
            selected_layers: vec!["onion".to_string()],
            testnet: false,
            http_timeout_seconds: 20,
            max_retries: snrr_rpc::MAX_RETRIES_RPC,
            max_file_size_bytes: 10 * 1024 * 1024,
            target_swarm_snode_count: snrr_swarm::DEFAULT_TARGET_SWARM_SNODE_COUNT,
            data_dir: PathBuf::from(".snrr"),
            log: LogConfig::default(),
        }
    }
}

impl SnrrConfig {
    /// Load from a TOML file if it exists, falling back to defaults
    /// otherwise; never errors on a missing file (spec §6: defaults are the
    /// base layer, not a hard requirement).
    pub fn load(config_path: Option<&Path>) -> eyre::Result<Self> {
        let Some(path) = config_path.filter(|p| p.exists()) else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("failed to read config file {}: {e}", path.display()))?;
        toml::from_str(&raw).map_err(|e| eyre::eyre!("failed to parse config file {}: {e}", path.display()))
    }

    /// Apply command-line overrides on top of the loaded/default config.
    #[cfg(feature = "cli-args")]
    pub fn apply_args(&mut self, args: &crate::cli::ConfigArgs) {
        if let Some(testnet) = args.testnet {
            self.testnet = testnet;
        }
        if let Some(timeout) = args.http_timeout_seconds {
            self.http_timeout_seconds = timeout;
        }
        if let Some(max_retries) = args.max_retries {
            self.max_retries = max_retries;
        }
        if let Some(data_dir) = &args.data_dir {
            self.data_dir = data_dir.clone();
        }
        if !args.layers.is_empty() {
            self.selected_layers = args.layers.clone();
        }
    }

    pub fn layer_set(&self) -> LayerSet {
        let layers = self.selected_layers.iter().filter_map(|name| parse_layer(name));
        LayerSet::from_layers(layers)
    }
}

fn parse_layer(name: &str) -> Option<Layer> {
    match name {
        "onion" => Some(Layer::Onion),
        "lokinet" => Some(Layer::Lokinet),
        "native_lokinet" => Some(Layer::NativeLokinet),
        "direct" => Some(Layer::Direct),
        _ => None,
    }
}

/// Logging configuration, mirroring `vertex-node-core::args::log::LogArgs`
/// at reduced scale (no file rotation — this is a client library, not a
/// long-running node process).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub quiet: bool,
    #[serde(skip)]
    pub verbosity: u8,
    pub filter: Option<String>,
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            quiet: false,
            verbosity: 0,
            filter: None,
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layer_set_is_onion_only() {
        let config = SnrrConfig::default();
        let set = config.layer_set();
        assert!(set.contains(Layer::Onion));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn unknown_layer_names_are_dropped_silently() {
        let mut config = SnrrConfig::default();
        config.selected_layers = vec!["onion".into(), "carrier_pigeon".into()];
        assert_eq!(config.layer_set().len(), 1);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = SnrrConfig::load(Some(Path::new("/nonexistent/snrr.toml"))).unwrap();
        assert_eq!(config.max_retries, snrr_rpc::MAX_RETRIES_RPC);
    }
}
