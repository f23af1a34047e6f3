//! 应用配置

use std::path::Path;

use serde::{Deserialize, Serialize};

use ag_consensus::ConsensusConfig;
use ag_core::{AugurError, CacheKeyDeriver, Result};
use ag_engine::OrchestratorConfig;
use ag_synthesis::AggregatorConfig;

/// 配置文件路径的环境变量
pub const CONFIG_ENV: &str = "AUGUR_CONFIG";

/// 应用配置 (JSON)，缺省字段取各组件默认值
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 缓存键命名空间
    pub namespace: String,
    pub orchestrator: OrchestratorConfig,
    pub aggregator: AggregatorConfig,
    pub consensus: ConsensusConfig,
    pub cache: CacheKeyDeriver,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            namespace: "reading".to_string(),
            orchestrator: OrchestratorConfig::default(),
            aggregator: AggregatorConfig::default(),
            consensus: ConsensusConfig::default(),
            cache: CacheKeyDeriver::default(),
        }
    }
}

impl AppConfig {
    /// 从 `AUGUR_CONFIG` 指向的文件加载；未设置时使用默认配置
    pub fn load() -> Result<Self> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(path),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw).map_err(|e| {
            AugurError::Config(format!("{}: {e}", path.as_ref().display()))
        })
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ag_consensus::ConfidenceModel;
    use ag_core::KeyEncoding;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = AppConfig::from_json(
            r#"{
                "orchestrator": { "engine_timeout_ms": 1500 },
                "consensus": { "pass_threshold": 70.0, "model": "mean_reliability" },
                "cache": { "encoding": "sha256" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.namespace, "reading");
        assert_eq!(config.orchestrator.engine_timeout_ms, Some(1500));
        assert_eq!(config.orchestrator.max_concurrency, 16);
        assert_eq!(config.consensus.pass_threshold, 70.0);
        assert_eq!(config.consensus.model, ConfidenceModel::MeanReliability);
        assert_eq!(config.aggregator.theme_min_engines, 2);
        assert_eq!(config.cache.encoding, KeyEncoding::Sha256);
        assert_eq!(config.cache.separator, '|');
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        assert!(AppConfig::from_json("{ not json").is_err());
        assert!(matches!(
            AppConfig::from_file("/nonexistent/augur.json"),
            Err(AugurError::Io(_))
        ));
    }
}
