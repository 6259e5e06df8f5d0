// File: config.rs
// Run parameters of the workflows. The distance run records its parameters
// next to the matrices as `distance_config.toml`.

use std::io::Write;
use std::path::Path;

use toml::map::Map;

use crate::cluster::hdbscan::DEFAULT_MIN_CLUSTER_SIZE;
use crate::cluster::DEFAULT_MIN_UNIQUE_SEQUENCES;
use crate::controller::summary::DEFAULT_RESOLUTION_CUTOFF;
use crate::error::{LoopwarpError, Result};
use crate::geometry::anchor::DEFAULT_ANCHOR_COUNT;

pub const DISTANCE_CONFIG_FILE: &str = "distance_config.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct DistanceConfig {
    pub stcrdab_path: String,
    pub resolution_cutoff: f64,
    pub anchor_count: usize,
    pub compress_output: bool,
    pub num_threads: usize,
}

impl Default for DistanceConfig {
    fn default() -> Self {
        DistanceConfig {
            stcrdab_path: String::new(),
            resolution_cutoff: DEFAULT_RESOLUTION_CUTOFF,
            anchor_count: DEFAULT_ANCHOR_COUNT,
            compress_output: false,
            num_threads: 1,
        }
    }
}

fn missing_key(key: &str) -> LoopwarpError {
    LoopwarpError::Parse(format!("config key '{}' is missing or has the wrong type", key))
}

impl DistanceConfig {
    pub fn new(
        stcrdab_path: &str, resolution_cutoff: f64, anchor_count: usize, compress_output: bool, num_threads: usize,
    ) -> Self {
        Self {
            stcrdab_path: stcrdab_path.to_string(),
            resolution_cutoff,
            anchor_count,
            compress_output,
            num_threads,
        }
    }

    pub fn from_toml(toml: &toml::Value) -> Result<Self> {
        let stcrdab_path = toml.get("stcrdab_path").and_then(|v| v.as_str()).ok_or_else(|| missing_key("stcrdab_path"))?;
        let resolution_cutoff = toml
            .get("resolution_cutoff")
            .and_then(|v| v.as_float())
            .ok_or_else(|| missing_key("resolution_cutoff"))?;
        let anchor_count = toml
            .get("anchor_count")
            .and_then(|v| v.as_integer())
            .ok_or_else(|| missing_key("anchor_count"))? as usize;
        let compress_output = toml
            .get("compress_output")
            .and_then(|v| v.as_bool())
            .ok_or_else(|| missing_key("compress_output"))?;
        let num_threads = toml.get("num_threads").and_then(|v| v.as_integer()).unwrap_or(1) as usize;
        Ok(Self::new(stcrdab_path, resolution_cutoff, anchor_count, compress_output, num_threads))
    }

    pub fn to_toml(&self) -> toml::Value {
        let mut map = Map::new();
        map.insert("stcrdab_path".to_string(), toml::Value::String(self.stcrdab_path.clone()));
        map.insert("resolution_cutoff".to_string(), toml::Value::Float(self.resolution_cutoff));
        map.insert("anchor_count".to_string(), toml::Value::Integer(self.anchor_count as i64));
        map.insert("compress_output".to_string(), toml::Value::Boolean(self.compress_output));
        map.insert("num_threads".to_string(), toml::Value::Integer(self.num_threads as i64));
        toml::Value::Table(map)
    }
}

pub fn write_distance_config_to_file<P: AsRef<Path>>(path: P, config: &DistanceConfig) -> Result<()> {
    let text = toml::to_string(&config.to_toml()).map_err(|e| LoopwarpError::Parse(e.to_string()))?;
    let mut file = std::fs::File::create(path)?;
    file.write_all(text.as_bytes())?;
    Ok(())
}

pub fn read_distance_config_from_file<P: AsRef<Path>>(path: P) -> Result<DistanceConfig> {
    let text = std::fs::read_to_string(path)?;
    let toml: toml::Value = toml::from_str(&text).map_err(|e| LoopwarpError::Parse(e.to_string()))?;
    DistanceConfig::from_toml(&toml)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterConfig {
    pub min_cluster_size: usize,
    /// Defaults to `min_cluster_size`
    pub min_samples: Option<usize>,
    pub assign_cluster_types: bool,
    pub min_unique_sequences: usize,
    /// Needed to read loop sequences when assigning cluster types
    pub stcrdab_path: Option<String>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        ClusterConfig {
            min_cluster_size: DEFAULT_MIN_CLUSTER_SIZE,
            min_samples: None,
            assign_cluster_types: false,
            min_unique_sequences: DEFAULT_MIN_UNIQUE_SEQUENCES,
            stcrdab_path: None,
        }
    }
}

impl ClusterConfig {
    /// Cluster typing needs the STCRDab location.
    pub fn validate(&self) -> Result<()> {
        if self.assign_cluster_types && self.stcrdab_path.is_none() {
            return Err(LoopwarpError::InvalidInput(
                "--assign-cluster-types requires --stcrdab-path".to_string(),
            ));
        }
        if self.min_cluster_size < 2 {
            return Err(LoopwarpError::InvalidInput("--min-cluster-size must be at least 2".to_string()));
        }
        if self.min_samples == Some(0) {
            return Err(LoopwarpError::InvalidInput("--min-samples must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DISTANCE_CONFIG_FILE);
        let config = DistanceConfig::new("data/stcrdab", 2.75, 4, true, 8);
        write_distance_config_to_file(&path, &config).unwrap();
        assert_eq!(read_distance_config_from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_distance_config_missing_key() {
        let toml: toml::Value = toml::from_str("stcrdab_path = \"x\"\nanchor_count = 5\n").unwrap();
        let err = DistanceConfig::from_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("resolution_cutoff"));
    }

    #[test]
    fn test_cluster_config_validation() {
        let mut config = ClusterConfig::default();
        assert!(config.validate().is_ok());
        config.assign_cluster_types = true;
        assert!(config.validate().is_err());
        config.stcrdab_path = Some("stcrdab".to_string());
        assert!(config.validate().is_ok());
        config.min_samples = Some(0);
        assert!(config.validate().is_err());
    }
}
