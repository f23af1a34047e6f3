//! 共识验证器
//!
//! 众数按出现次数选取，次数相同时取最先出现的值。
//! 阈值均为可配置常量，不代表经过验证的统计方法。

use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use ag_core::{AugurError, Result};

use crate::report::{ConsensusReport, Discrepancy};

/// 置信度模型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceModel {
    /// 一致来源的可靠性之和 / 全部可靠性之和 × 100
    ///
    /// 一致比例低于 `discrepancy_ratio` 时，置信度封顶为一致比例 × 100。
    #[default]
    WeightedAgreement,
    /// (可靠性之和 / N) × 一致比例 × 100
    MeanReliability,
}

/// 验证器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusConfig {
    /// 通过阈值 (置信度 >= 该值视为有效)
    pub pass_threshold: f64,
    /// 一致比例低于该值时记录分歧
    pub discrepancy_ratio: f64,
    /// 置信度模型
    pub model: ConfidenceModel,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            pass_threshold: 85.0,
            discrepancy_ratio: 0.8,
            model: ConfidenceModel::WeightedAgreement,
        }
    }
}

/// 验证来源: 某个算法变体的计算结果及其可靠性
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSource<V> {
    /// 来源名称
    pub name: String,
    /// 可靠性权重 ∈ (0, 1]
    pub reliability: f64,
    /// 计算值
    pub value: V,
}

impl<V> ValidationSource<V> {
    pub fn new(name: impl Into<String>, reliability: f64, value: V) -> Self {
        Self {
            name: name.into(),
            reliability,
            value,
        }
    }
}

/// 共识验证器 (无状态，可跨线程共享)
#[derive(Debug, Clone, Default)]
pub struct ConsensusValidator {
    config: ConsensusConfig,
}

impl ConsensusValidator {
    pub fn new(config: ConsensusConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    /// 对多个来源计算共识
    #[instrument(skip_all, fields(sources = sources.len()))]
    pub fn validate<V>(&self, sources: &[ValidationSource<V>]) -> Result<ConsensusReport<V>>
    where
        V: PartialEq + Clone + Debug,
    {
        self.consensus(sources, Vec::new())
    }

    pub(crate) fn consensus<V>(
        &self,
        sources: &[ValidationSource<V>],
        mut discrepancies: Vec<Discrepancy>,
    ) -> Result<ConsensusReport<V>>
    where
        V: PartialEq + Clone + Debug,
    {
        if sources.is_empty() {
            return Err(AugurError::Validation(
                "at least one source is required".to_string(),
            ));
        }
        if let Some(bad) = sources
            .iter()
            .find(|s| !(s.reliability > 0.0 && s.reliability <= 1.0))
        {
            return Err(AugurError::Validation(format!(
                "source '{}' has reliability {} outside (0, 1]",
                bad.name, bad.reliability
            )));
        }

        let mode = mode_of(sources);
        let (agreeing, dissenting): (Vec<&ValidationSource<V>>, Vec<&ValidationSource<V>>) =
            sources.iter().partition(|s| s.value == *mode);

        let total = sources.len() as f64;
        let consensus_ratio = agreeing.len() as f64 / total;
        let total_reliability: f64 = sources.iter().map(|s| s.reliability).sum();

        let confidence = match self.config.model {
            ConfidenceModel::WeightedAgreement => {
                let agreeing_reliability: f64 = agreeing.iter().map(|s| s.reliability).sum();
                agreeing_reliability / total_reliability * 100.0
            }
            ConfidenceModel::MeanReliability => {
                total_reliability / total * consensus_ratio * 100.0
            }
        };

        // 出现分歧时置信度不超过一致比例
        let disagreement = consensus_ratio < self.config.discrepancy_ratio;
        let confidence = if disagreement {
            confidence.min(consensus_ratio * 100.0)
        } else {
            confidence
        };

        if disagreement {
            discrepancies.insert(
                0,
                Discrepancy::disagreement(
                    1.0 - consensus_ratio,
                    dissenting.iter().map(|s| s.name.clone()).collect(),
                ),
            );
        }

        let is_valid = confidence >= self.config.pass_threshold;
        info!(
            confidence = format!("{confidence:.2}"),
            consensus_ratio,
            is_valid,
            discrepancies = discrepancies.len(),
            "consensus computed"
        );

        Ok(ConsensusReport {
            confidence,
            consensus_ratio,
            consensus_value: Some(mode.clone()),
            sources: sources.iter().map(|s| s.name.clone()).collect(),
            discrepancies,
            is_valid,
        })
    }
}

/// 出现次数最多的值；次数相同时取最先出现者
fn mode_of<V: PartialEq>(sources: &[ValidationSource<V>]) -> &V {
    let mut best: Option<(&V, usize)> = None;
    for (i, source) in sources.iter().enumerate() {
        if sources[..i].iter().any(|earlier| earlier.value == source.value) {
            continue;
        }
        let count = sources[i..]
            .iter()
            .filter(|s| s.value == source.value)
            .count();
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((&source.value, count));
        }
    }
    // 调用方已保证非空
    best.map(|(value, _)| value).unwrap_or(&sources[0].value)
}
