//! Serde-backed configuration for executors and stores.
//!
//! Every field has a default so partial JSON documents are accepted:
//!
//! ```rust
//! use arbor::config::StoreConfig;
//!
//! let cfg = StoreConfig::from_json(r#"{ "symmetric": true, "executor": { "threads": 2 } }"#).unwrap();
//! assert!(cfg.symmetric);
//! assert_eq!(cfg.executor.threads, Some(2));
//! assert_eq!(cfg.executor.grain, arbor::config::DEFAULT_GRAIN);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Subtree size below which tree operations stop forking.
pub const DEFAULT_GRAIN: usize = 512;

/// Worker pool settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Dedicated pool size. `None` shares rayon's global pool, `Some(1)` runs
    /// everything on the calling thread.
    pub threads: Option<usize>,
    /// Minimum amount of work (tree entries) worth a fork.
    pub grain: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            threads: None,
            grain: DEFAULT_GRAIN,
        }
    }
}

/// Settings used by [`crate::loader::initialize_graph_with`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Executor the store hands to batch operations.
    pub executor: ExecutorConfig,
    /// Treat the loaded graph as undirected (both directions stored).
    pub symmetric: bool,
    /// Read per-edge weights from the input.
    pub weighted: bool,
    /// Memory-map the input file instead of reading it into a buffer.
    pub mapped_io: bool,
}

impl StoreConfig {
    /// Parses a JSON document; missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serializes the configuration as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = StoreConfig::from_json("{}").unwrap();
        assert_eq!(cfg, StoreConfig::default());
        assert_eq!(cfg.executor.grain, DEFAULT_GRAIN);
        assert!(!cfg.mapped_io);
    }

    #[test]
    fn json_round_trip() {
        let cfg = StoreConfig {
            executor: ExecutorConfig {
                threads: Some(4),
                grain: 64,
            },
            symmetric: true,
            weighted: true,
            mapped_io: true,
        };
        let text = cfg.to_json().unwrap();
        assert_eq!(StoreConfig::from_json(&text).unwrap(), cfg);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = StoreConfig::from_json("{ symmetric: ").unwrap_err();
        assert!(matches!(err, crate::GraphError::Config(_)));
    }
}
